//! Fixed user-facing strings for each supported language.

#[cfg(test)]
#[path = "i18n_test.rs"]
mod i18n_test;

/// Language of the fixed widget strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    /// Parse a language tag (`en`, `es`, `es-MX`, ...). Unknown tags yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_ascii_lowercase();
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" => Some(Self::English),
            "es" => Some(Self::Spanish),
            _ => None,
        }
    }

    #[must_use]
    pub fn strings(self) -> &'static Strings {
        match self {
            Self::English => &ENGLISH,
            Self::Spanish => &SPANISH,
        }
    }
}

/// Every fixed string the widgets display.
#[derive(Debug)]
pub struct Strings {
    /// Assistant message appended when a chat request fails for any reason.
    pub fallback_reply: &'static str,
    pub input_placeholder: &'static str,
    pub typing: &'static str,
    pub search_title: &'static str,
    pub search_placeholder: &'static str,
    /// Shown before the first search.
    pub search_intro: &'static str,
    /// Shown when a search is requested with an empty query.
    pub search_empty_query: &'static str,
    pub searching: &'static str,
    pub no_results: &'static str,
    pub search_error: &'static str,
    pub untitled_document: &'static str,
    pub document: &'static str,
    pub relevance: &'static str,
    pub page: &'static str,
}

static ENGLISH: Strings = Strings {
    fallback_reply: "I'm sorry, I encountered an error while processing your request. Please try again later.",
    input_placeholder: "Type your message...",
    typing: "typing...",
    search_title: "Semantic Search",
    search_placeholder: "Search the documents...",
    search_intro: "Enter a search term to begin",
    search_empty_query: "Enter a search term",
    searching: "Searching...",
    no_results: "No results found",
    search_error: "The search could not be completed",
    untitled_document: "Untitled document",
    document: "Document",
    relevance: "relevance",
    page: "Page",
};

static SPANISH: Strings = Strings {
    fallback_reply: "Lo siento, ha ocurrido un error al procesar tu mensaje. Por favor, inténtalo de nuevo.",
    input_placeholder: "Escribe tu mensaje...",
    typing: "escribiendo...",
    search_title: "Buscador Semántico",
    search_placeholder: "Buscar en los documentos...",
    search_intro: "Ingresa un término de búsqueda para comenzar",
    search_empty_query: "Ingresa un término de búsqueda",
    searching: "Buscando información...",
    no_results: "No se encontraron resultados",
    search_error: "Error al realizar la búsqueda",
    untitled_document: "Documento sin título",
    document: "Documento",
    relevance: "relevancia",
    page: "Página",
};
