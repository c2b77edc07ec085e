//! `/api` route handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use super::wire::*;
use crate::words::{SourceStore, SourceStoreError, StoreResult};

/// Server state shared across requests.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn SourceStore>,
}

/// Error response in the `{success: false, error}` shape
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<SourceStoreError> for ApiError {
    fn from(err: SourceStoreError) -> Self {
        let status = match &err {
            SourceStoreError::SourceNotFound(_) => StatusCode::NOT_FOUND,
            SourceStoreError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Source store error: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(StatusResponse::failed(self.message))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Run a store operation off the async workers; stores do blocking I/O.
async fn with_store<T, F>(state: &ApiState, op: F) -> ApiResult<T>
where
    F: FnOnce(&dyn SourceStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| ApiError::internal(format!("store task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Parse a create/update body. `words` must be present and an array.
fn parse_source_body(body: &[u8]) -> ApiResult<SourceBody> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {}", e)))?;

    match value.get("words") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(ApiError::bad_request("words must be an array")),
        None => return Err(ApiError::bad_request("words is required")),
    }

    serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_sources(State(state): State<ApiState>) -> ApiResult<Json<SourceListResponse>> {
    let sources = with_store(&state, |store| store.list_sources()).await?;
    Ok(Json(SourceListResponse {
        success: true,
        sources,
    }))
}

async fn get_source(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> ApiResult<Json<SourceResponse>> {
    let source = with_store(&state, move |store| store.get_source(&name)).await?;
    Ok(Json(SourceResponse {
        success: true,
        source,
    }))
}

async fn create_source(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SourceResponse>)> {
    let body = parse_source_body(&body)?;
    let name = match body.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(ApiError::bad_request("name is required")),
    };

    let source = with_store(&state, move |store| {
        store.save_source(&name, body.words, body.origin_link)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SourceResponse {
            success: true,
            source,
        }),
    ))
}

async fn update_source(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SourceResponse>> {
    let body = parse_source_body(&body)?;

    let source = with_store(&state, move |store| {
        // Keep the existing link unless the body supplies one
        let origin_link = match body.origin_link {
            Some(link) => Some(link),
            None => match store.get_source(&name) {
                Ok(existing) => existing.origin_link,
                Err(SourceStoreError::SourceNotFound(_)) => None,
                Err(e) => return Err(e),
            },
        };
        store.save_source(&name, body.words, origin_link)
    })
    .await?;

    Ok(Json(SourceResponse {
        success: true,
        source,
    }))
}

async fn delete_source(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let deleted = name.clone();
    with_store(&state, move |store| store.delete_source(&name)).await?;
    Ok(Json(StatusResponse::ok(format!("Source '{}' deleted", deleted))))
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/sources", get(list_sources).post(create_source))
        .route(
            "/api/sources/{name}",
            get(get_source).put(update_source).delete(delete_source),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::FileSourceStore;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_router() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSourceStore::new(temp_dir.path().to_path_buf());
        store.init().unwrap();
        let state = ApiState {
            store: Arc::new(store),
        };
        (router(state), temp_dir)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _temp) = create_test_router();

        let (status, body) = send(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_get_list_delete() {
        let (router, _temp) = create_test_router();

        let (status, body) = send(
            &router,
            "POST",
            "/api/sources",
            Some(serde_json::json!({
                "name": "Colors",
                "words": [{"term": "red"}, {"term": "blue"}],
                "originLink": "https://example.com"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["name"], "Colors");

        let (status, body) = send(&router, "GET", "/api/sources/Colors", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"].as_array().unwrap().len(), 2);
        assert_eq!(body["originLink"], "https://example.com");

        let (status, body) = send(&router, "GET", "/api/sources", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sources"].as_array().unwrap().len(), 1);

        let (status, body) = send(&router, "DELETE", "/api/sources/Colors", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(&router, "GET", "/api/sources/Colors", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_or_non_array_words_is_400() {
        let (router, _temp) = create_test_router();

        let (status, body) = send(
            &router,
            "POST",
            "/api/sources",
            Some(serde_json::json!({"name": "Colors"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &router,
            "PUT",
            "/api/sources/Colors",
            Some(serde_json::json!({"words": "red"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_words_is_400() {
        let (router, _temp) = create_test_router();

        let (status, body) = send(
            &router,
            "PUT",
            "/api/sources/Empty",
            Some(serde_json::json!({"words": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_put_keeps_existing_link() {
        let (router, _temp) = create_test_router();

        send(
            &router,
            "PUT",
            "/api/sources/Colors",
            Some(serde_json::json!({"words": [{"term": "red"}], "originLink": "https://a.example"})),
        )
        .await;
        let (status, body) = send(
            &router,
            "PUT",
            "/api/sources/Colors",
            Some(serde_json::json!({"words": [{"term": "red"}, {"term": "green"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["originLink"], "https://a.example");
        assert_eq!(body["words"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_404() {
        let (router, _temp) = create_test_router();

        let (status, body) = send(&router, "DELETE", "/api/sources/Nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
