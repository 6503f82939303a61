use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rebar_core::render::render_svg;
use rebar_core::{OptimizationRequest, OptimizationResult, Optimizer, OptimizerError};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const OPENAPI_SPEC: &str = include_str!("../../../openapi.yaml");
const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Rebar Optimizer API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: '/openapi.yaml',
                dom_id: '#swagger-ui',
                presets: [SwaggerUIBundle.presets.apis],
                layout: 'BaseLayout',
            });
        };
    </script>
</body>
</html>"#;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_PIECES: u64 = 5000;

/// Runtime settings read from the environment
#[derive(Debug, Clone)]
struct Config {
    addr: SocketAddr,
    /// Upper bound on expanded pieces per request
    max_pieces: u64,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("REBAR_API_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid REBAR_API_ADDR: {e}"))?;

        let max_pieces = match lookup("REBAR_API_MAX_PIECES") {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid REBAR_API_MAX_PIECES: {e}"))?,
            None => DEFAULT_MAX_PIECES,
        };

        Ok(Self { addr, max_pieces })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        max_pieces = config.max_pieces,
        "Starting Rebar Optimizer API"
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!("API server listening on http://{}", config.addr);
    info!("Try: curl http://localhost:{}/api/health", config.addr.port());

    axum::serve(listener, app(config)).await?;

    Ok(())
}

fn app(config: Config) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/optimize", post(optimize))
        .route("/api/generate/svg", post(generate_svg))
        .route("/openapi.yaml", get(serve_openapi_spec))
        .route("/docs", get(serve_swagger_ui))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(config)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "rebar-optimizer-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main optimization endpoint
async fn optimize(
    State(config): State<Config>,
    Json(request): Json<OptimizationRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    let total_pieces = request.total_pieces();
    info!(
        "Received optimization request with {} pieces on {}m stock",
        total_pieces, request.stock_length
    );

    if total_pieces > config.max_pieces {
        return Err(AppError::TooManyPieces {
            requested: total_pieces,
            limit: config.max_pieces,
        });
    }

    let optimizer = Optimizer::new(request)?;
    let result = optimizer.optimize()?;

    info!(
        "Optimization complete: {} groups, {} bars required, {:.2}% waste",
        result.summary.total_groups, result.summary.total_bars, result.summary.waste_percentage
    );

    Ok(Json(result))
}

/// Generate SVG visualization
async fn generate_svg(Json(result): Json<OptimizationResult>) -> Result<Response, AppError> {
    info!("Generating SVG for {} groups", result.groups.len());

    let svg = render_svg(&result).map_err(|e| AppError::Internal(e.into()))?;

    Ok((StatusCode::OK, [("Content-Type", "image/svg+xml")], svg).into_response())
}

/// Application error type
#[derive(Debug)]
enum AppError {
    Optimizer(OptimizerError),
    TooManyPieces { requested: u64, limit: u64 },
    Internal(anyhow::Error),
}

impl From<OptimizerError> for AppError {
    fn from(err: OptimizerError) -> Self {
        AppError::Optimizer(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Optimizer(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyPieces { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Optimizer(err) => err.to_string(),
            AppError::TooManyPieces { requested, limit } => format!(
                "Request contains {requested} pieces, the limit is {limit}"
            ),
            AppError::Internal(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.message();
        error!("Request error: {}", message);

        (
            self.status(),
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}

async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/yaml")],
        OPENAPI_SPEC,
    )
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_config(max_pieces: u64) -> Config {
        Config {
            addr: DEFAULT_ADDR.parse().unwrap(),
            max_pieces,
        }
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_pieces, DEFAULT_MAX_PIECES);
    }

    #[test]
    fn test_config_overrides_and_rejects_garbage() {
        let config = Config::from_lookup(|key| match key {
            "REBAR_API_ADDR" => Some("127.0.0.1:8080".to_string()),
            "REBAR_API_MAX_PIECES" => Some("10".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.max_pieces, 10);

        let invalid = Config::from_lookup(|key| {
            (key == "REBAR_API_MAX_PIECES").then(|| "many".to_string())
        });
        assert!(invalid.is_err());
    }

    #[tokio::test]
    async fn test_optimize_endpoint_returns_plan() {
        let (status, body) = post_json(
            app(test_config(100)),
            "/api/optimize",
            json!({
                "stock_length": 12.0,
                "pieces": [
                    {"diameter": "10", "length": 6.0, "quantity": 2},
                    {"diameter": "10", "length": 4.0, "quantity": 1}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let result: OptimizationResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.groups["10"].total_bars, 2);
        assert_eq!(result.summary.total_pieces, 3);
    }

    #[tokio::test]
    async fn test_optimize_endpoint_rejects_long_piece() {
        let (status, body) = post_json(
            app(test_config(100)),
            "/api/optimize",
            json!({"pieces": [{"group_key": "12", "length": 13.0, "quantity": 1}]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("exceeds stock length"));
    }

    #[tokio::test]
    async fn test_optimize_endpoint_rejects_loose_tolerance() {
        let (status, _) = post_json(
            app(test_config(100)),
            "/api/optimize",
            json!({
                "tolerance": 1.0,
                "pieces": [
                    {"group_key": "10", "length": 6.5, "quantity": 2},
                    {"group_key": "10", "length": 12.9, "quantity": 1}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_optimize_endpoint_bounds_piece_count() {
        let (status, _) = post_json(
            app(test_config(10)),
            "/api/optimize",
            json!({"pieces": [{"group_key": "8", "length": 1.0, "quantity": 11}]}),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_generate_svg_endpoint() {
        let request = OptimizationRequest::new(
            vec![rebar_core::RequiredPiece::new("10", 5.0, 2)],
            12.0,
        );
        let result = Optimizer::new(request).unwrap().optimize().unwrap();

        let (status, body) = post_json(
            app(test_config(100)),
            "/api/generate/svg",
            serde_json::to_value(&result).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let svg = String::from_utf8(body).unwrap();
        assert!(svg.contains("<svg"));
    }
}
