mod api;
mod clean;
mod config;
mod error;
mod ml;
mod pipeline;
mod translate;
mod video;
mod youtube;

use axum::http::HeaderValue;
use dotenv::dotenv;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze_comments, api::health),
    components(
        schemas(
            pipeline::AnalyzeRequest,
            pipeline::AnalysisResult,
            pipeline::CommentSentiment,
            pipeline::LabelCounts,
            ml::SentimentLabel,
            api::ErrorResponse,
            api::HealthResponse
        )
    ),
    tags(
        (name = "analysis", description = "Video comment sentiment analysis")
    )
)]
struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::Config::from_env()?;
    info!(
        "⚙️ Corpus cap {}, batch {}, {} workers, translation {}",
        config.max_comments,
        config.batch_size,
        config.workers,
        if config.translate_enabled { "on" } else { "off" }
    );

    let state = Arc::new(api::AppState::from_config(&config)?);

    let app = api::router(state)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
