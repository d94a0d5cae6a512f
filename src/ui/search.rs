use crate::search::{Row, SearchController, SearchPhase, SelectedView};
use crate::service::{Video, VideoSearchApi};

/// One line per row of the selected collection, numbered from 1.
pub fn render_search_view<A: VideoSearchApi + ?Sized + 'static>(
    search: &SearchController<A>,
) -> Vec<String> {
    let view = search.selected_view();
    let mut lines = vec![header(search, view)];

    if view.is_empty() {
        lines.push(blank_state(view).to_string());
        return lines;
    }

    for index in 0..view.len() {
        match view.row(index) {
            Some(Row::Suggestion(keyword)) => lines.push(format!("{:>3}  {}", index + 1, keyword)),
            Some(Row::Video(video)) => lines.push(format!("{:>3}  {}", index + 1, video_line(video))),
            None => {}
        }
    }

    match search.phase() {
        SearchPhase::FetchingNextPage => lines.push("  ... loading more".to_string()),
        _ if search.state().can_request_next_page => lines.push("  (more available)".to_string()),
        _ => {}
    }
    lines
}

fn header<A: VideoSearchApi + ?Sized + 'static>(
    search: &SearchController<A>,
    view: SelectedView<'_>,
) -> String {
    let title = match view {
        SelectedView::Suggest(_) => "Suggestions",
        SelectedView::Recently(_) => "Recently added",
        SelectedView::Searched(_) => "Results",
    };
    let query = search.current_query();
    let mut header = if query.is_empty() {
        title.to_string()
    } else {
        format!("{} for \"{}\"", title, query)
    };
    match search.phase() {
        SearchPhase::FetchingFirstPage => header.push_str(" [searching]"),
        SearchPhase::Error => {
            if let Some(error) = search.last_error() {
                header.push_str(&format!(" [{}]", error));
            }
        }
        _ => {}
    }
    header
}

fn blank_state(view: SelectedView<'_>) -> &'static str {
    match view {
        SelectedView::Recently(_) => "  Videos you add to playlists show up here",
        SelectedView::Suggest(_) | SelectedView::Searched(_) => "  No results",
    }
}

pub fn video_line(video: &Video) -> String {
    format!("{}  ({}, {})", video.title, video.channel, video.duration_label())
}
