use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use groov::app::App;
use groov::config::Config;
use groov::handlers::{handle_line, CommandAction};
use groov::logging::init_logging;
use groov::search::SearchResponse;
use groov::ui::render_help;

enum Input {
    Line(Option<String>),
    Search(Option<SearchResponse>),
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let mut app = match App::new(config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize app: {:#}", e);
            return Err(e);
        }
    };
    tracing::info!(playlists = app.playlists.len(), "groov started");

    print_lines(render_help());
    print_lines(app.take_output());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut show_prompt = true;
    loop {
        if show_prompt {
            prompt()?;
        }
        show_prompt = true;
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            response = app.search.recv() => Input::Search(response),
        };

        match input {
            Input::Line(Some(line)) => {
                if let CommandAction::Quit = handle_line(&mut app, &line) {
                    break;
                }
            }
            // stdin closed
            Input::Line(None) => break,
            Input::Search(Some(response)) => {
                app.apply_search_response(response);
                let output = app.take_output();
                if output.is_empty() {
                    // Stale response, the prompt is still showing
                    show_prompt = false;
                    continue;
                }
                // Results arriving mid-prompt start on a fresh line
                println!();
                print_lines(output);
                continue;
            }
            Input::Search(None) => {}
        }
        print_lines(app.take_output());
    }

    app.playlists.remove_observer();
    app.search.remove_observer();
    tracing::info!("groov exiting");
    Ok(())
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "groov> ")?;
    stdout.flush()?;
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
