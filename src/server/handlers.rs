//! Request handlers.
//!
//! Thin adapters between HTTP and the render pipeline: they extract the
//! input bytes, call into the core, and shape the response.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{info, instrument};

use crate::domain::ARTIFACT_CONTENT_TYPE;

use super::error::ApiError;
use super::routes::{parse_view_path, view_path, GRAPH_FORM_FIELD};
use super::AppState;

const TEXT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// `GET /`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    info!(%method, %uri, "index");
    let page = super::template::index_page(&base_url(&headers));
    (
        [(header::CACHE_CONTROL, state.cache_control().to_string())],
        Html(page),
    )
        .into_response()
}

/// `POST /upload`: multipart form with a `graph` field, redirects to the artifact
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    info!(%method, %uri, "upload");

    let mut contents = Bytes::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(GRAPH_FORM_FIELD) {
            contents = field.bytes().await?;
            break;
        }
    }

    let id = state.pipeline().render(&contents).await?;
    Ok(Redirect::to(&view_path(&id)))
}

/// `POST /raw`: the whole body is the graph; replies with the artifact URL
#[instrument(skip_all)]
pub async fn raw(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    info!(%method, %uri, bytes = body.len(), "raw");

    let id = state.pipeline().render(&body).await?;
    let url = format!("{}{}", base_url(&headers), view_path(&id));

    Ok((
        [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        format!("Open: {}\n", url),
    )
        .into_response())
}

/// `GET /view/<id>`: serves a stored artifact
#[instrument(skip_all)]
pub async fn view(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    info!(%method, %uri, "view");

    let id = parse_view_path(uri.path()).ok_or(ApiError::NotFound)?;
    let artifact = state.store().get(&id)?;

    Ok((
        [
            (header::CONTENT_TYPE, ARTIFACT_CONTENT_TYPE.to_string()),
            (header::CACHE_CONTROL, state.cache_control().to_string()),
            (header::LAST_MODIFIED, artifact.last_modified()),
        ],
        artifact.bytes().clone(),
    )
        .into_response())
}

/// Anything unrouted
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    info!(%method, %uri, "not found");
    (StatusCode::NOT_FOUND, "not found")
}

/// Scheme and host the client used, e.g. `https://example.com`
fn base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|v| matches!(*v, "http" | "https"))
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_base_url_defaults() {
        assert_eq!(base_url(&HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn test_base_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("graphs.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(base_url(&headers), "https://graphs.example.com");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("gopher"));
        assert_eq!(base_url(&headers), "http://graphs.example.com");
    }
}
