//! Document search overlay controller.
//!
//! Same shape as the chat widget: state behind a mutex that is never held
//! across an await, a transport trait for the backend, and a surface trait
//! for drawing. Ranking and scoring come entirely from the backend; the
//! overlay only highlights, truncates, and labels what it gets back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::timeout;
use wire::{SearchResponse, SortBy};

use crate::chat::Key;
use crate::config::SearchConfig;
use crate::net::{SearchTransport, TransportError};
use crate::render::{ResultView, query_terms, render_hit};
use crate::state::{DocType, OverlayState, SearchFilters, SearchIgnored};
use crate::surface::{Notice, SearchSurface};

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

/// User interactions a host forwards to the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    ToggleClicked,
    CloseClicked,
    /// A click landed outside the overlay.
    OutsideClicked,
    QueryChanged(String),
    SearchClicked,
    KeyPressed { key: Key },
    DocTypeChanged(Option<DocType>),
    SortChanged(SortBy),
}

/// What a search attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query was blank; the prompt notice was shown and nothing was sent.
    Prompted,
    /// Another search was still in flight.
    Busy,
    /// Results were rendered.
    Results(usize),
    NoResults,
    Failed,
}

pub struct SearchOverlay<T, S> {
    config: Arc<SearchConfig>,
    state: Arc<Mutex<OverlayState>>,
    transport: Arc<T>,
    surface: Arc<S>,
}

impl<T, S> Clone for SearchOverlay<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            surface: Arc::clone(&self.surface),
        }
    }
}

impl<T: SearchTransport, S: SearchSurface> SearchOverlay<T, S> {
    pub fn new(config: SearchConfig, transport: T, surface: S) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(OverlayState::default())),
            transport: Arc::new(transport),
            surface: Arc::new(surface),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.lock().is_searching()
    }

    #[must_use]
    pub fn query(&self) -> String {
        self.lock().query().to_owned()
    }

    #[must_use]
    pub fn filters(&self) -> SearchFilters {
        self.lock().filters()
    }

    /// Draw the initial prompt.
    pub fn mount(&self) {
        self.surface.set_visible(false);
        self.surface.show_notice(Notice::Prompt, self.config.language.strings().search_intro);
    }

    pub fn show(&self) {
        if self.lock().set_open(true) {
            self.surface.set_visible(true);
            self.surface.focus_input();
        }
    }

    pub fn hide(&self) {
        if self.lock().set_open(false) {
            self.surface.set_visible(false);
        }
    }

    pub fn toggle(&self) -> bool {
        let open = self.lock().toggle();
        self.surface.set_visible(open);
        if open {
            self.surface.focus_input();
        }
        open
    }

    /// Search for `query` with `filters`, replacing the overlay's current
    /// query and filters.
    pub async fn search(&self, query: &str, filters: SearchFilters) -> SearchOutcome {
        {
            let mut state = self.lock();
            state.set_query(query);
            state.set_filters(filters);
        }
        self.run().await
    }

    /// Search again with whatever query and filters the overlay holds.
    pub async fn run(&self) -> SearchOutcome {
        let strings = self.config.language.strings();
        let begun = self.lock().begin_search();
        let request = match begun {
            Ok(request) => request,
            Err(SearchIgnored::Empty) => {
                self.surface.show_notice(Notice::Prompt, strings.search_empty_query);
                return SearchOutcome::Prompted;
            }
            Err(SearchIgnored::Busy) => {
                if self.config.debug {
                    tracing::debug!("search ignored while another is in flight");
                }
                return SearchOutcome::Busy;
            }
        };

        let _searching = Searching { state: self.state.as_ref() };
        self.surface.show_loading(strings.searching);
        if self.config.debug {
            tracing::debug!(
                endpoint = %self.config.api_url,
                query = %request.query,
                doc_type = ?request.doc_type,
                sort_by = request.sort_by.as_str(),
                "sending search request"
            );
        }

        let limit = self.config.request_timeout();
        let result = match timeout(limit, self.transport.search(&request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(limit)),
        };

        match result {
            Ok(SearchResponse { results }) if results.is_empty() => {
                self.surface.show_notice(Notice::NoResults, strings.no_results);
                SearchOutcome::NoResults
            }
            Ok(SearchResponse { results }) => {
                let terms = query_terms(&request.query);
                let views: Vec<ResultView> = results.iter().map(|hit| render_hit(hit, &terms, strings)).collect();
                self.surface.show_results(&views);
                SearchOutcome::Results(views.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, query = %request.query, "search request failed");
                self.surface.show_notice(Notice::Error, strings.search_error);
                SearchOutcome::Failed
            }
        }
    }

    /// Dispatch one host event. Returns the outcome for events that search.
    pub async fn handle_event(&self, event: SearchEvent) -> Option<SearchOutcome> {
        match event {
            SearchEvent::ToggleClicked => {
                self.toggle();
                None
            }
            SearchEvent::CloseClicked | SearchEvent::OutsideClicked => {
                self.hide();
                None
            }
            SearchEvent::QueryChanged(query) => {
                self.lock().set_query(query);
                None
            }
            SearchEvent::SearchClicked | SearchEvent::KeyPressed { key: Key::Enter } => Some(self.run().await),
            SearchEvent::KeyPressed { .. } => None,
            SearchEvent::DocTypeChanged(doc_type) => {
                self.lock().set_doc_type(doc_type);
                Some(self.run().await)
            }
            SearchEvent::SortChanged(sort_by) => {
                self.lock().set_sort_by(sort_by);
                Some(self.run().await)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the searching flag when the search ends, however it ends.
struct Searching<'a> {
    state: &'a Mutex<OverlayState>,
}

impl Drop for Searching<'_> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).finish_search();
    }
}
