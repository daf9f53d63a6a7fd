use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use engine::config::{DEFAULT_K, MAX_DOCUMENT_BYTES, MAX_K};
use engine::{DocumentId, EngineError, IndexStats, Scored, SharedIndex};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Runtime settings read from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// When set, document writes must carry a matching `X-ADMIN-TOKEN` header.
    pub admin_token: Option<String>,
    /// Comma-separated list of allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        }
    }
}

#[derive(Deserialize)]
pub struct TermParams {
    pub term: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub term: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize {
    DEFAULT_K
}

#[derive(Serialize)]
pub struct IndexedResponse {
    pub id: DocumentId,
    /// False when the id already existed and the body was ignored.
    pub indexed: bool,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub term: String,
    pub documents: Vec<DocumentId>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub term: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Scored<DocumentId>>,
}

#[derive(Serialize)]
pub struct ScoreResponse<T> {
    pub id: DocumentId,
    pub term: String,
    pub value: T,
}

#[derive(Serialize)]
pub struct IdfResponse {
    pub term: String,
    pub idf: f64,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex<DocumentId>,
    pub admin_token: Option<String>,
}

pub fn build_app(config: ServerConfig) -> Router {
    build_app_with_index(config, SharedIndex::new())
}

pub fn build_app_with_index(config: ServerConfig, index: SharedIndex<DocumentId>) -> Router {
    let app_state = AppState { index, admin_token: config.admin_token };

    let cors = match config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/documents/:id", put(put_document))
        .route("/documents/:id/tf", get(tf_handler))
        .route("/documents/:id/tfidf", get(tfidf_handler))
        .route("/lookup", get(lookup_handler))
        .route("/search", get(search_handler))
        .route("/idf", get(idf_handler))
        .route("/stats", get(stats_handler))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn put_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<IndexedResponse>), ApiError> {
    authorize(&state, &headers)?;
    // a rejected body must not register the id
    let text = std::str::from_utf8(&body).map_err(|err| {
        let error = format!("document body is not valid UTF-8: {err}");
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error }))
    })?;
    let id = DocumentId::from(id);
    let indexed = state
        .index
        .insert_if_absent(id.clone(), text.as_bytes())
        .map_err(engine_error)?;
    if indexed {
        tracing::info!(doc = %id, bytes = body.len(), "document indexed");
    }
    let status = if indexed { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(IndexedResponse { id, indexed })))
}

pub async fn lookup_handler(
    State(state): State<AppState>,
    Query(params): Query<TermParams>,
) -> Json<LookupResponse> {
    let mut documents: Vec<DocumentId> =
        state.index.index_lookup(&params.term).into_iter().collect();
    documents.sort();
    Json(LookupResponse { term: params.term, documents })
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let scored = state.index.relevance_scores(&params.term);
    let total_hits = scored.len();
    let k = params.k.clamp(1, MAX_K);
    let results: Vec<_> = scored.into_iter().take(k).collect();
    let elapsed = start.elapsed();
    Json(SearchResponse {
        term: params.term,
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    })
}

pub async fn idf_handler(
    State(state): State<AppState>,
    Query(params): Query<TermParams>,
) -> Json<IdfResponse> {
    let idf = state.index.inverse_document_frequency(&params.term);
    Json(IdfResponse { term: params.term, idf })
}

pub async fn tf_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<TermParams>,
) -> Result<Json<ScoreResponse<u32>>, ApiError> {
    let id = DocumentId::from(id);
    let value = state.index.term_frequency(&id, &params.term).map_err(engine_error)?;
    Ok(Json(ScoreResponse { id, term: params.term, value }))
}

pub async fn tfidf_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<TermParams>,
) -> Result<Json<ScoreResponse<f64>>, ApiError> {
    let id = DocumentId::from(id);
    let value = state.index.tf_idf(&id, &params.term).map_err(engine_error)?;
    Ok(Json(ScoreResponse { id, term: params.term, value }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index.stats())
}

fn engine_error(err: EngineError) -> ApiError {
    let status = match &err {
        EngineError::UnknownDocument(_) => StatusCode::NOT_FOUND,
        EngineError::Io(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorBody { error: err.to_string() }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Ok(()),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        let error = "invalid admin token".to_string();
        Err((StatusCode::UNAUTHORIZED, Json(ErrorBody { error })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn engine_errors_map_to_status_codes() {
        let (status, body) = engine_error(EngineError::UnknownDocument("\"a\"".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.error, "unknown document: \"a\"");

        let io_err = io::Error::new(io::ErrorKind::InvalidData, "bad bytes");
        let (status, body) = engine_error(EngineError::Io(io_err));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.error, "bad bytes");
    }
}
