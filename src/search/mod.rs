//! Search screen state: suggestions, recently added videos, paged results.
//!
//! Fetches run on spawned tokio tasks and report back through a channel as
//! [`SearchResponse`]s. Only the owner of the [`SearchController`] mutates
//! state, by feeding those responses to [`SearchController::apply`]. A
//! response is applied only if it answers the request currently occupying
//! its slot for the current query; anything else is stale and dropped.

pub mod selector;

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::Error;
use crate::service::{Video, VideoPage, VideoSearchApi};
pub use selector::{selected_view, ResultKind, Row, SelectedView};

/// Which fetch a request belongs to. Each kind has one in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Suggestions,
    FirstPage,
    NextPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    FetchingFirstPage,
    FetchingNextPage,
    /// Last fetch failed and nothing is in flight
    Error,
}

/// Notifications for the search screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    SuggestionsUpdated,
    VideoListUpdated { can_request_next_page: bool },
    Failed { kind: RequestKind, error: Error },
}

/// What tapping a row means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A keyword was picked and a search for it started
    Suggestion(String),
    /// A video was picked, to be added to a playlist by the caller
    Video(Video),
}

#[derive(Debug)]
pub enum Payload {
    Suggestions(Result<Vec<String>, Error>),
    Page(Result<VideoPage, Error>),
}

/// A finished fetch on its way back to the owning context
#[derive(Debug)]
pub struct SearchResponse {
    pub id: u64,
    pub kind: RequestKind,
    pub query: String,
    pub page: u32,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: u64,
    query: String,
}

/// Collections shown by the search screen
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub suggestions: Vec<String>,
    pub recently_added: Vec<Video>,
    pub searched: Vec<Video>,
    pub can_request_next_page: bool,
    pub current_query: String,
    next_page: u32,
}

pub struct SearchController<A: ?Sized> {
    api: Arc<A>,
    state: SearchState,
    suggest_slot: Option<InFlight>,
    first_page_slot: Option<InFlight>,
    next_page_slot: Option<InFlight>,
    last_error: Option<Error>,
    next_request_id: u64,
    response_tx: UnboundedSender<SearchResponse>,
    response_rx: UnboundedReceiver<SearchResponse>,
    observer: Option<UnboundedSender<SearchEvent>>,
}

impl<A: VideoSearchApi + ?Sized + 'static> SearchController<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: SearchState::default(),
            suggest_slot: None,
            first_page_slot: None,
            next_page_slot: None,
            last_error: None,
            next_request_id: 0,
            response_tx,
            response_rx,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: UnboundedSender<SearchEvent>) {
        self.observer = Some(observer);
    }

    pub fn remove_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&self, event: SearchEvent) {
        if let Some(ref tx) = self.observer {
            let _ = tx.send(event);
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn current_query(&self) -> &str {
        &self.state.current_query
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> SearchPhase {
        if self.first_page_slot.is_some() {
            SearchPhase::FetchingFirstPage
        } else if self.next_page_slot.is_some() {
            SearchPhase::FetchingNextPage
        } else if self.last_error.is_some() {
            SearchPhase::Error
        } else {
            SearchPhase::Idle
        }
    }

    /// True while any fetch, including suggestions, is outstanding
    pub fn is_loading(&self) -> bool {
        self.suggest_slot.is_some() || self.first_page_slot.is_some() || self.next_page_slot.is_some()
    }

    // === Rows ===

    pub fn selected_view(&self) -> SelectedView<'_> {
        selected_view(
            &self.state.suggestions,
            &self.state.recently_added,
            &self.state.searched,
        )
    }

    pub fn row_count(&self) -> usize {
        self.selected_view().len()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.selected_view().row(index)
    }

    /// Tapping a row: a suggestion starts a search, a video is handed back.
    pub fn select_row(&mut self, index: usize) -> Option<Selection> {
        let selection = match self.selected_view().row(index)? {
            Row::Suggestion(keyword) => Selection::Suggestion(keyword.to_string()),
            Row::Video(video) => Selection::Video(video.clone()),
        };
        if let Selection::Suggestion(ref keyword) = selection {
            self.submit(keyword);
        }
        Some(selection)
    }

    /// Called as a row becomes visible; the last searched row asks for more.
    pub fn row_will_display(&mut self, index: usize) -> bool {
        let is_last_searched = match self.selected_view() {
            SelectedView::Searched(items) => index + 1 == items.len(),
            _ => false,
        };
        is_last_searched && self.request_next_page()
    }

    pub fn set_recently_added(&mut self, videos: Vec<Video>) {
        self.state.recently_added = videos;
    }

    // === Requests ===

    /// The search text changed. Retyping the current text is a no-op, so at
    /// most one suggestion request per keyword is in flight.
    pub fn query_changed(&mut self, text: &str) {
        let query = text.trim();
        if query == self.state.current_query {
            return;
        }
        self.reset_for_query(query);

        if query.is_empty() {
            self.notify(SearchEvent::SuggestionsUpdated);
            return;
        }
        self.issue(RequestKind::Suggestions, query.to_string(), 1);
    }

    /// Search for videos: page 1 of `query`. Returns false when coalesced.
    pub fn submit(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            self.query_changed(query);
            return false;
        }
        if query != self.state.current_query {
            self.reset_for_query(query);
        }

        if self.slot(RequestKind::FirstPage).is_some_and(|f| f.query == query) {
            tracing::debug!(query, "first page already in flight");
            return false;
        }
        // A fresh first page supersedes any pending next page
        self.next_page_slot = None;
        self.issue(RequestKind::FirstPage, query.to_string(), 1);
        true
    }

    /// Ask for the page after the last one received. Returns false when there
    /// is nothing more to load or a page request is already in flight.
    pub fn request_next_page(&mut self) -> bool {
        if !self.state.can_request_next_page
            || self.state.searched.is_empty()
            || self.state.current_query.is_empty()
        {
            return false;
        }
        if self.first_page_slot.is_some() || self.next_page_slot.is_some() {
            tracing::debug!(query = %self.state.current_query, "page request already in flight");
            return false;
        }
        let query = self.state.current_query.clone();
        let page = self.state.next_page;
        self.issue(RequestKind::NextPage, query, page);
        true
    }

    /// Everything fetched or in flight belongs to the old query
    fn reset_for_query(&mut self, query: &str) {
        self.state.current_query = query.to_string();
        self.state.suggestions.clear();
        self.state.searched.clear();
        self.state.can_request_next_page = false;
        self.state.next_page = 1;
        self.suggest_slot = None;
        self.first_page_slot = None;
        self.next_page_slot = None;
        self.last_error = None;
    }

    fn slot(&self, kind: RequestKind) -> Option<&InFlight> {
        match kind {
            RequestKind::Suggestions => self.suggest_slot.as_ref(),
            RequestKind::FirstPage => self.first_page_slot.as_ref(),
            RequestKind::NextPage => self.next_page_slot.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: RequestKind) -> &mut Option<InFlight> {
        match kind {
            RequestKind::Suggestions => &mut self.suggest_slot,
            RequestKind::FirstPage => &mut self.first_page_slot,
            RequestKind::NextPage => &mut self.next_page_slot,
        }
    }

    fn issue(&mut self, kind: RequestKind, query: String, page: u32) {
        self.next_request_id += 1;
        let id = self.next_request_id;
        *self.slot_mut(kind) = Some(InFlight {
            id,
            query: query.clone(),
        });
        if kind != RequestKind::Suggestions {
            self.last_error = None;
        }
        tracing::debug!(id, ?kind, query = %query, page, "search request issued");

        let api = Arc::clone(&self.api);
        let tx = self.response_tx.clone();
        tokio::spawn(async move {
            let payload = match kind {
                RequestKind::Suggestions => Payload::Suggestions(
                    api.search_suggestions(&query)
                        .await
                        .map_err(|e| Error::network(&e)),
                ),
                RequestKind::FirstPage | RequestKind::NextPage => Payload::Page(
                    api.search_videos(&query, page)
                        .await
                        .map_err(|e| Error::network(&e)),
                ),
            };
            let _ = tx.send(SearchResponse {
                id,
                kind,
                query,
                page,
                payload,
            });
        });
    }

    // === Responses ===

    /// Wait for the next finished fetch.
    pub async fn recv(&mut self) -> Option<SearchResponse> {
        self.response_rx.recv().await
    }

    /// Apply every response that has already arrived. Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(response) = self.response_rx.try_recv() {
            if self.apply(response) {
                applied += 1;
            }
        }
        applied
    }

    /// Fold a response into the state. Returns false if it was stale.
    pub fn apply(&mut self, response: SearchResponse) -> bool {
        let owns_slot = self.slot(response.kind).is_some_and(|f| f.id == response.id);
        if owns_slot {
            *self.slot_mut(response.kind) = None;
        }
        if !owns_slot || response.query != self.state.current_query {
            tracing::debug!(
                id = response.id,
                kind = ?response.kind,
                query = %response.query,
                "dropping stale search response"
            );
            return false;
        }

        match response.payload {
            Payload::Suggestions(Ok(suggestions)) => {
                self.state.suggestions = suggestions;
                self.notify(SearchEvent::SuggestionsUpdated);
            }
            Payload::Page(Ok(page)) => {
                if response.kind == RequestKind::FirstPage {
                    self.state.searched = page.items;
                } else {
                    self.state.searched.extend(page.items);
                }
                self.state.can_request_next_page = page.has_next_page;
                self.state.next_page = response.page + 1;
                self.last_error = None;
                self.notify(SearchEvent::VideoListUpdated {
                    can_request_next_page: page.has_next_page,
                });
            }
            Payload::Suggestions(Err(error)) | Payload::Page(Err(error)) => {
                tracing::warn!(kind = ?response.kind, query = %response.query, "search failed: {}", error);
                if response.kind != RequestKind::Suggestions {
                    self.last_error = Some(error.clone());
                }
                self.notify(SearchEvent::Failed {
                    kind: response.kind,
                    error,
                });
            }
        }
        true
    }
}
