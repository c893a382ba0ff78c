use crate::config::{CorsSettings, OcrConfig};
use crate::handlers;
use crate::services::{build_recognizer, Transcriber};
use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware, tracing::REQUEST_ID_HEADER,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: OcrConfig,
    pub transcriber: Transcriber,
}

impl AppState {
    pub fn new(config: OcrConfig) -> Self {
        let recognizer = build_recognizer(&config.ocr);
        let transcriber = Transcriber::new(config.ocr.image_path.clone(), recognizer);

        Self {
            config,
            transcriber,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route(
            "/",
            get(handlers::extract_text).post(handlers::extract_text),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins = if settings.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(settings.allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

type Server = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: OcrConfig) -> Result<Self, AppError> {
        Self::build_with_shutdown(config, std::future::pending()).await
    }

    /// Build the application; the server drains and stops once `shutdown` resolves.
    pub async fn build_with_shutdown<F>(config: OcrConfig, shutdown: F) -> Result<Self, AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            image_path = ?config.ocr.image_path,
            engine = ?config.ocr.engine,
            language = %config.ocr.language,
            "Configuring OCR service"
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = AppState::new(config);
        let app = build_router(state);

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .into_future();

        Ok(Self {
            port,
            server: Box::pin(server),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineKind, OcrSettings};
    use axum::body::{to_bytes, Body};
    use axum::http::StatusCode;
    use service_core::config::Config as CoreConfig;
    use tower::util::ServiceExt;

    fn router(image_path: std::path::PathBuf) -> Router {
        build_router(AppState::new(OcrConfig {
            common: CoreConfig::default(),
            ocr: OcrSettings {
                image_path,
                engine: EngineKind::Mock,
                mock_text: "HELLO\n".to_string(),
                ..OcrSettings::default()
            },
            cors: CorsSettings {
                allowed_origins: vec![],
            },
        }))
    }

    #[tokio::test]
    async fn root_accepts_get_and_post() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");
        image::DynamicImage::new_luma8(8, 8).save(&path).unwrap();
        let app = router(path);

        for method in [Method::GET, Method::POST] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json, serde_json::json!({ "data": "HELLO\n" }));
        }
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path().join("test.png"))
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn ready_is_unavailable_without_image() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path().join("missing.png"))
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
