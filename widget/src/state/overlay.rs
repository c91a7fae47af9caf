//! Search overlay state: visibility, current query and filters, and the
//! single in-flight search guard.

use wire::{SearchRequest, SortBy};

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

/// Document type filter offered by the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocType {
    Pdf,
    Docx,
    Html,
    Txt,
}

impl DocType {
    /// Parse a filter value. Empty or unknown values mean "all types".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "html" => Some(Self::Html),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Html => "html",
            Self::Txt => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub doc_type: Option<DocType>,
    pub sort_by: SortBy,
}

/// Why a search did not reach the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchIgnored {
    /// Query was blank; the overlay shows a prompt instead.
    Empty,
    /// Another search is still in flight.
    Busy,
}

#[derive(Clone, Debug, Default)]
pub struct OverlayState {
    open: bool,
    searching: bool,
    query: String,
    filters: SearchFilters,
}

impl OverlayState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn filters(&self) -> SearchFilters {
        self.filters
    }

    /// Returns whether visibility changed.
    pub fn set_open(&mut self, open: bool) -> bool {
        let changed = self.open != open;
        self.open = open;
        changed
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    pub fn set_doc_type(&mut self, doc_type: Option<DocType>) {
        self.filters.doc_type = doc_type;
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.filters.sort_by = sort_by;
    }

    /// Build the request for the current query and filters and mark the
    /// overlay as searching.
    ///
    /// # Errors
    ///
    /// [`SearchIgnored::Busy`] while a search is in flight,
    /// [`SearchIgnored::Empty`] for a blank query.
    pub fn begin_search(&mut self) -> Result<SearchRequest, SearchIgnored> {
        if self.searching {
            return Err(SearchIgnored::Busy);
        }
        let query = self.query.trim();
        if query.is_empty() {
            return Err(SearchIgnored::Empty);
        }
        let request = SearchRequest {
            query: query.to_owned(),
            doc_type: self.filters.doc_type.map(|d| d.as_str().to_owned()),
            sort_by: self.filters.sort_by,
        };
        self.searching = true;
        Ok(request)
    }

    pub fn finish_search(&mut self) {
        self.searching = false;
    }
}
