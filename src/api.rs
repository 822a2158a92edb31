//! HTTP surface: `POST /analyze` and `GET /health`.

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::AnalysisError;
use crate::ml::{SentimentClassifier, VaderScorer};
use crate::pipeline::{AnalysisPipeline, AnalysisResult, AnalyzeRequest};
use crate::translate::{LibreTranslator, Passthrough, Translator};
use crate::youtube::{CommentFetcher, YouTubeCommentSource};

pub struct AppState {
    pub pipeline: AnalysisPipeline<YouTubeCommentSource>,
}

impl AppState {
    /// Wires the pipeline from configuration. The VADER scorer is built once here and
    /// shared read-only by every request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        let source = YouTubeCommentSource::new(
            client.clone(),
            config.youtube_api_url.clone(),
            config.youtube_api_key.clone(),
        );
        let translator: Arc<dyn Translator> = if config.translate_enabled {
            Arc::new(LibreTranslator::new(
                client,
                config.translate_url.clone(),
                config.translate_api_key.clone(),
            ))
        } else {
            Arc::new(Passthrough)
        };

        Ok(Self {
            pipeline: AnalysisPipeline::new(
                CommentFetcher::new(source, config.max_comments, config.batch_size),
                translator,
                SentimentClassifier::new(Arc::new(VaderScorer::new())),
                config.workers,
            ),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid YouTube URL")]
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Maps pipeline failures and unreadable bodies onto HTTP status codes. Every error
/// response carries a JSON `{detail}` body.
pub enum ApiError {
    Analysis(AnalysisError),
    Body(JsonRejection),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Body(rejection) => {
                warn!("⚠️ [API] unreadable request body: {}", rejection.body_text());
                (rejection.status(), rejection.body_text())
            }
            ApiError::Analysis(e) => {
                if let AnalysisError::InvalidUrl(url) = &e {
                    warn!("⚠️ [API] rejected URL {:?}", url);
                }
                if e.is_client_error() {
                    (StatusCode::BAD_REQUEST, e.to_string())
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to analyze comments".to_string(),
                    )
                }
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Analyze the sentiment of a video's comments
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Page of labeled comments plus corpus-wide labels", body = AnalysisResult),
        (status = 400, description = "Unrecognized video URL or bad paging parameters", body = ErrorResponse),
        (status = 422, description = "Body is not a valid analyze request", body = ErrorResponse),
        (status = 500, description = "Comment source or scoring failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_comments(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(req) = payload?;
    let result = state.pipeline.analyze(&req).await?;
    Ok(Json(result))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse)),
    tag = "analysis"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_comments))
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn thread(text: &str) -> Value {
        json!({ "snippet": { "topLevelComment": { "snippet": { "textDisplay": text } } } })
    }

    async fn app_against(youtube: &MockServer, translate: &MockServer) -> Router {
        let config = Config::from_lookup(|key| match key {
            "YOUTUBE_API_KEY" => Some("test-key".to_string()),
            "YOUTUBE_API_URL" => Some(format!("{}/commentThreads", youtube.uri())),
            "TRANSLATE_URL" => Some(format!("{}/translate", translate.uri())),
            _ => None,
        })
        .unwrap();
        router(Arc::new(AppState::from_config(&config).unwrap()))
    }

    async fn post_analyze(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_end_to_end() {
        let youtube = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    thread("This is <b>amazing</b>, I love it 😍"),
                    thread("Worst video ever https://spam.example"),
                    thread("🔥🔥🔥"),
                    thread("Muy malo")
                ]
            })))
            .mount(&youtube)
            .await;

        let translate = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&translate)
            .await;

        let app = app_against(&youtube, &translate).await;
        let (status, body) = post_analyze(
            app,
            json!({ "url": "https://youtu.be/abc123", "page": 1, "limit": 2 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["videoId"], "abc123");
        assert_eq!(body["total_comments"], 3);
        assert_eq!(body["all_sentiments"].as_array().unwrap().len(), 3);
        assert_eq!(body["sentiments"][0]["comment"], "this is amazing, i love it");
        assert_eq!(body["sentiments"][0]["sentiment"], "Positive");
        assert_eq!(body["sentiments"][1]["sentiment"], "Negative");
        assert_eq!(body["summary"], json!({ "Positive": 1, "Neutral": 0, "Negative": 1 }));
    }

    #[tokio::test]
    async fn test_bad_url_is_400() {
        let youtube = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(0)
            .mount(&youtube)
            .await;
        let translate = MockServer::start().await;

        let app = app_against(&youtube, &translate).await;
        let (status, body) = post_analyze(app, json!({ "url": "https://example.com" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid YouTube URL");
    }

    #[tokio::test]
    async fn test_oversized_limit_is_400() {
        let youtube = MockServer::start().await;
        let translate = MockServer::start().await;

        let app = app_against(&youtube, &translate).await;
        let (status, _) = post_analyze(
            app,
            json!({ "url": "https://youtu.be/abc123", "limit": 1000 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_source_failure_is_500() {
        let youtube = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "commentsDisabled" }
            })))
            .mount(&youtube)
            .await;
        let translate = MockServer::start().await;

        let app = app_against(&youtube, &translate).await;
        let (status, body) =
            post_analyze(app, json!({ "url": "https://www.youtube.com/watch?v=abc123" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Failed to analyze comments");
    }

    #[tokio::test]
    async fn test_missing_url_is_422_with_detail() {
        let youtube = MockServer::start().await;
        let translate = MockServer::start().await;

        let app = app_against(&youtube, &translate).await;
        let (status, body) = post_analyze(app, json!({ "page": 1 })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_negative_page_is_422_with_detail() {
        let youtube = MockServer::start().await;
        let translate = MockServer::start().await;

        let app = app_against(&youtube, &translate).await;
        let (status, body) = post_analyze(
            app,
            json!({ "url": "https://youtu.be/abc123", "page": -1 }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let youtube = MockServer::start().await;
        let translate = MockServer::start().await;
        let app = app_against(&youtube, &translate).await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
