//! Picks which of the three search collections the result list shows.

use crate::service::Video;

/// Row height for keyword suggestion rows
pub const SUGGEST_ROW_HEIGHT: u16 = 44;
/// Row height for video rows (recently added and searched)
pub const VIDEO_ROW_HEIGHT: u16 = 110;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Suggest,
    Recently,
    Searched,
}

/// The collection currently shown, borrowed from the search state.
///
/// Counting and rendering both go through this value, so they can never
/// disagree about which collection is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedView<'a> {
    Suggest(&'a [String]),
    Recently(&'a [Video]),
    Searched(&'a [Video]),
}

/// Searched results win, then suggestions, then recently added videos.
pub fn selected_view<'a>(
    suggestions: &'a [String],
    recently_added: &'a [Video],
    searched: &'a [Video],
) -> SelectedView<'a> {
    if !searched.is_empty() {
        SelectedView::Searched(searched)
    } else if !suggestions.is_empty() {
        SelectedView::Suggest(suggestions)
    } else {
        SelectedView::Recently(recently_added)
    }
}

/// One row of the result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Suggestion(&'a str),
    Video(&'a Video),
}

impl<'a> SelectedView<'a> {
    pub fn kind(&self) -> ResultKind {
        match self {
            SelectedView::Suggest(_) => ResultKind::Suggest,
            SelectedView::Recently(_) => ResultKind::Recently,
            SelectedView::Searched(_) => ResultKind::Searched,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SelectedView::Suggest(items) => items.len(),
            SelectedView::Recently(items) | SelectedView::Searched(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<Row<'a>> {
        match *self {
            SelectedView::Suggest(items) => items.get(index).map(|s| Row::Suggestion(s.as_str())),
            SelectedView::Recently(items) | SelectedView::Searched(items) => {
                items.get(index).map(Row::Video)
            }
        }
    }

    pub fn row_height(&self) -> u16 {
        match self.kind() {
            ResultKind::Suggest => SUGGEST_ROW_HEIGHT,
            ResultKind::Recently | ResultKind::Searched => VIDEO_ROW_HEIGHT,
        }
    }

    /// Suggestions are drawn as a plain list, videos get separators
    pub fn shows_separators(&self) -> bool {
        self.kind() != ResultKind::Suggest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: id.to_string(),
            channel: "Channel".to_string(),
            duration_seconds: 60,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_priority_over_all_combinations() {
        let suggestions = vec!["cat videos".to_string()];
        let recently = vec![video("recent")];
        let searched = vec![video("found"), video("found 2")];

        for mask in 0..8u8 {
            let s: &[String] = if mask & 1 != 0 { &suggestions } else { &[] };
            let r: &[Video] = if mask & 2 != 0 { &recently } else { &[] };
            let v: &[Video] = if mask & 4 != 0 { &searched } else { &[] };

            let view = selected_view(s, r, v);
            let expected = if !v.is_empty() {
                ResultKind::Searched
            } else if !s.is_empty() {
                ResultKind::Suggest
            } else {
                ResultKind::Recently
            };
            assert_eq!(view.kind(), expected, "mask {:03b}", mask);
        }
    }

    #[test]
    fn test_all_empty_is_recently() {
        let view = selected_view(&[], &[], &[]);
        assert_eq!(view, SelectedView::Recently(&[]));
        assert!(view.is_empty());
        assert!(view.row(0).is_none());
    }

    #[test]
    fn test_rows_and_layout_follow_branch() {
        let suggestions = vec!["a".to_string(), "b".to_string()];
        let searched = vec![video("x")];

        let view = selected_view(&suggestions, &[], &[]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.row(1), Some(Row::Suggestion("b")));
        assert_eq!(view.row_height(), SUGGEST_ROW_HEIGHT);
        assert!(!view.shows_separators());

        let view = selected_view(&suggestions, &[], &searched);
        assert_eq!(view.len(), 1);
        assert_eq!(view.row(0), Some(Row::Video(&searched[0])));
        assert_eq!(view.row_height(), VIDEO_ROW_HEIGHT);
        assert!(view.shows_separators());
    }
}
