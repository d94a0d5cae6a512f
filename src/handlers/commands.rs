use crate::app::App;
use crate::search::Selection;
use crate::ui::{render_help, render_playlists_view, render_search_view, video_line};

pub enum CommandAction {
    Continue,
    Quit,
}

/// One line of user input. Row numbers are shown from 1 and stored here as
/// 0-based indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type(String),
    Search(String),
    Select(usize),
    More,
    Show,
    Playlists,
    New(String),
    Remove(usize),
    Save(usize),
    ClearAll,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        // `type` with no text clears the query
        "type" | "t" => Ok(Command::Type(rest.to_string())),
        "search" | "s" => require_text(rest, "search <text>").map(Command::Search),
        "select" | "sel" => parse_row(rest, "select <n>").map(Command::Select),
        "more" | "m" => Ok(Command::More),
        "show" | "ls" => Ok(Command::Show),
        "playlists" | "pl" => Ok(Command::Playlists),
        "new" => require_text(rest, "new <title>").map(Command::New),
        "rm" => parse_row(rest, "rm <n>").map(Command::Remove),
        "save" => parse_row(rest, "save <n>").map(Command::Save),
        "clear-all" => Ok(Command::ClearAll),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "" => Err("Type `help` for commands".to_string()),
        other => Err(format!("Unknown command `{}`, type `help` for commands", other)),
    }
}

fn require_text(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

fn parse_row(rest: &str, usage: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("usage: {}", usage)),
    }
}

/// Parse and run one input line, reporting parse errors to the user.
pub fn handle_line(app: &mut App, line: &str) -> CommandAction {
    match parse_command(line) {
        Ok(command) => handle_command(app, command),
        Err(message) => {
            app.say(message);
            CommandAction::Continue
        }
    }
}

pub fn handle_command(app: &mut App, command: Command) -> CommandAction {
    match command {
        Command::Type(text) => app.search.query_changed(&text),
        Command::Search(query) => {
            if !app.search.submit(&query) {
                app.say("Already searching");
            }
        }
        Command::Select(index) => match app.search.select_row(index) {
            Some(Selection::Suggestion(keyword)) => app.say(format!("Searching \"{}\"", keyword)),
            Some(Selection::Video(video)) => {
                app.say(format!("Selected {}, `save <n>` to add it to a playlist", video_line(&video)));
                app.pending_video = Some(video);
            }
            None => app.say(format!("No row {}", index + 1)),
        },
        Command::More => {
            if !app.search.request_next_page() {
                app.say("No more results to load");
            }
        }
        Command::Show => {
            let lines = render_search_view(&app.search);
            app.say_lines(lines);
        }
        Command::Playlists => {
            let lines = render_playlists_view(app.playlists.playlists());
            app.say_lines(lines);
        }
        Command::New(title) => {
            if let Err(e) = app.playlists.add(&title) {
                app.set_status_error(&e);
            }
        }
        Command::Remove(index) => match app.playlists.get(index).map(|p| p.id.clone()) {
            Some(id) => {
                if let Err(e) = app.playlists.delete(&id) {
                    app.set_status_error(&e);
                }
            }
            None => app.say(format!("No playlist {}", index + 1)),
        },
        Command::Save(index) => save_pending_video(app, index),
        Command::ClearAll => match app.playlists.clear_all() {
            Ok(()) => app.pending_video = None,
            Err(e) => app.set_status_error(&e),
        },
        Command::Help => app.say_lines(render_help()),
        Command::Quit => return CommandAction::Quit,
    }

    app.process_events();
    CommandAction::Continue
}

fn save_pending_video(app: &mut App, index: usize) {
    let Some(video) = app.pending_video.clone() else {
        app.say("Select a video first");
        return;
    };
    let Some(playlist_id) = app.playlists.get(index).map(|p| p.id.clone()) else {
        app.say(format!("No playlist {}", index + 1));
        return;
    };
    match app.playlists.add_video(&playlist_id, video) {
        Ok(_) => app.pending_video = None,
        Err(e) => app.set_status_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::test_app;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("type lofi"), Ok(Command::Type("lofi".to_string())));
        assert_eq!(parse_command("type"), Ok(Command::Type(String::new())));
        assert_eq!(
            parse_command("  search   cat videos "),
            Ok(Command::Search("cat videos".to_string()))
        );
        assert_eq!(parse_command("select 3"), Ok(Command::Select(2)));
        assert_eq!(parse_command("rm 1"), Ok(Command::Remove(0)));
        assert_eq!(parse_command("save 2"), Ok(Command::Save(1)));
        assert_eq!(parse_command("new Road trip"), Ok(Command::New("Road trip".to_string())));
        assert_eq!(parse_command("clear-all"), Ok(Command::ClearAll));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_command("select 0"), Err("usage: select <n>".to_string()));
        assert_eq!(parse_command("rm two"), Err("usage: rm <n>".to_string()));
        assert_eq!(parse_command("search"), Err("usage: search <text>".to_string()));
        assert!(parse_command("dance").unwrap_err().contains("Unknown command `dance`"));
        assert!(parse_command("").is_err());
    }

    #[tokio::test]
    async fn test_search_select_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_line(&mut app, "new Workout");
        handle_line(&mut app, "search run");
        let response = app.search.recv().await.unwrap();
        app.apply_search_response(response);
        app.take_output();

        handle_line(&mut app, "select 2");
        assert_eq!(app.pending_video.as_ref().map(|v| v.id.as_str()), Some("run-1"));

        handle_line(&mut app, "save 1");
        assert!(app.pending_video.is_none());
        assert_eq!(app.playlists.get(0).unwrap().videos.len(), 1);
        assert_eq!(app.search.state().recently_added[0].id, "run-1");
    }

    #[tokio::test]
    async fn test_remove_and_missing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_line(&mut app, "new Workout");
        handle_line(&mut app, "new Chill");
        handle_line(&mut app, "rm 1");
        assert_eq!(app.playlists.len(), 1);
        assert_eq!(app.playlists.get(0).unwrap().title, "Chill");
        assert_eq!(app.playlists.get(0).unwrap().order, 0);
        app.take_output();

        handle_line(&mut app, "rm 5");
        handle_line(&mut app, "save 1");
        assert_eq!(
            app.take_output(),
            vec!["No playlist 5".to_string(), "Select a video first".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blank_title_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_line(&mut app, "new    ");
        let output = app.take_output();
        assert_eq!(output, vec!["usage: new <title>".to_string()]);
        assert!(matches!(handle_line(&mut app, "quit"), CommandAction::Quit));
    }
}
