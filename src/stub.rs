//! Stub chatbot and search backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Implements the HTTP contract the widgets talk to so they can be exercised
//! end to end without the real NLP service: an echoing chat endpoint, the
//! health probe, and keyword search over a small built-in corpus. CORS is
//! fully permissive, matching how the production backend is configured for
//! cross-origin embedding.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wire::{ChatResponse, HealthResponse, SearchHit, SearchRequest, SearchResponse, SortBy};

#[cfg(test)]
#[path = "stub_test.rs"]
mod stub_test;

pub const SERVICE_NAME: &str = "meribot-api";

const GREETING_WORDS: &[&str] = &["hola", "hello", "hi", "buenas"];

/// Inbound chat body. Unlike the client's request type the token is optional.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub question: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chatbot/query", post(query))
        .route("/chatbot/health", get(health))
        .route("/api/search", post(search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn query(Json(body): Json<QueryBody>) -> Json<ChatResponse> {
    let reply = answer(&body);
    tracing::info!(
        conversation_id = reply.conversation_id.as_deref().unwrap_or_default(),
        intent = reply.intent.as_deref().unwrap_or_default(),
        "chat query answered"
    );
    Json(reply)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_owned(), service: Some(SERVICE_NAME.to_owned()) })
}

async fn search(Json(request): Json<SearchRequest>) -> Json<SearchResponse> {
    let results = rank(&request);
    tracing::info!(query = %request.query, hits = results.len(), "search answered");
    Json(SearchResponse { results })
}

// =============================================================================
// CHAT
// =============================================================================

/// Build the reply for one question. The caller's token is kept when present;
/// otherwise a new one is assigned.
#[must_use]
pub fn answer(body: &QueryBody) -> ChatResponse {
    let conversation_id = body
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| format!("srv-{}", uuid::Uuid::new_v4().simple()), str::to_owned);

    let question = body.question.trim();
    let first_word = question
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or_default()
        .to_lowercase();

    let (response, intent) = if GREETING_WORDS.contains(&first_word.as_str()) {
        ("¡Hola! ¿En qué puedo ayudarte?".to_owned(), "greeting")
    } else {
        (format!("Recibí tu pregunta: {question}"), "echo")
    };

    ChatResponse {
        response,
        conversation_id: Some(conversation_id),
        intent: Some(intent.to_owned()),
        confidence: Some(1.0),
        suggested_questions: vec![
            "¿Cuáles son los horarios de atención?".to_owned(),
            "¿Cómo solicito una beca?".to_owned(),
        ],
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// One document in the built-in corpus.
#[derive(Clone, Copy, Debug)]
pub struct Doc {
    pub title: &'static str,
    pub source: &'static str,
    pub content: &'static str,
    /// ISO date, compared lexically.
    pub date: &'static str,
    pub page: Option<u32>,
}

pub const CORPUS: &[Doc] = &[
    Doc {
        title: "Reglamento de becas 2024",
        source: "docs/becas/reglamento_becas.pdf",
        content: "Las becas se otorgan por mérito académico y situación económica. \
                  La solicitud de beca se presenta al inicio de cada semestre.",
        date: "2024-01-15",
        page: Some(3),
    },
    Doc {
        title: "Calendario académico",
        source: "docs/calendario/calendario.html",
        content: "El semestre inicia en agosto. Las inscripciones abren dos semanas antes \
                  del inicio de clases.",
        date: "2024-06-01",
        page: None,
    },
    Doc {
        title: "Guía de inscripción",
        source: "docs/guias/inscripcion.docx",
        content: "Para la inscripción necesitas tu matrícula, comprobante de pago y \
                  el formato de carga académica.",
        date: "2023-11-20",
        page: Some(1),
    },
    Doc {
        title: "Horarios de atención",
        source: "docs/servicios/horarios.txt",
        content: "Servicios escolares atiende de lunes a viernes de 9:00 a 17:00 horas.",
        date: "2024-03-10",
        page: None,
    },
    Doc {
        title: "Informe financiero trimestral",
        source: "docs/finanzas/informe_q1.pdf",
        content: "Resumen del presupuesto ejercido y pagos de colegiatura del primer trimestre.",
        date: "2024-04-05",
        page: Some(12),
    },
];

/// Score and order the corpus for `request`. Documents matching no term are
/// dropped; `docType` filters by source extension.
#[must_use]
pub fn rank(request: &SearchRequest) -> Vec<SearchHit> {
    let terms: Vec<String> = request.query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(Doc, f64)> = CORPUS
        .iter()
        .filter(|doc| matches_doc_type(doc, request.doc_type.as_deref()))
        .map(|doc| (*doc, score(doc, &terms)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    match request.sort_by {
        SortBy::Relevance => scored.sort_by(|a, b| b.1.total_cmp(&a.1)),
        SortBy::Date => scored.sort_by(|a, b| b.0.date.cmp(a.0.date)),
        SortBy::Title => scored.sort_by(|a, b| a.0.title.cmp(b.0.title)),
    }

    scored
        .into_iter()
        .map(|(doc, score)| SearchHit {
            title: Some(doc.title.to_owned()),
            content: doc.content.to_owned(),
            source: Some(doc.source.to_owned()),
            score,
            page: doc.page,
        })
        .collect()
}

/// Fraction of `terms` found in the title or content, in `0.0..=1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(doc: &Doc, terms: &[String]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = format!("{} {}", doc.title, doc.content).to_lowercase();
    let found = terms.iter().filter(|term| haystack.contains(term.as_str())).count();
    found as f64 / terms.len() as f64
}

fn matches_doc_type(doc: &Doc, doc_type: Option<&str>) -> bool {
    match doc_type.map(str::trim).filter(|t| !t.is_empty()) {
        None => true,
        Some(wanted) => doc
            .source
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(wanted)),
    }
}
