//! HTTP surface, one POST route per stage.

pub mod handlers;

use crate::{
    config::{Config, ServerConfig, DEFAULT_MAX_BODY_BYTES},
    error::{MonumentError, Result},
    studio::MonumentStudio,
};
use actix_web::{
    http::StatusCode, middleware, web, App, HttpResponse, HttpServer, Resource, ResponseError,
    Route,
};
use serde::Serialize;

/// Shared per-process state. `studio` is absent when no API key was configured;
/// every route then answers with the configuration error.
///
/// Handlers read request bodies themselves, up to `max_body_bytes`, and only
/// after the credential check has passed.
#[derive(Clone)]
pub struct AppState {
    studio: Option<MonumentStudio>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(studio: MonumentStudio) -> Self {
        Self {
            studio: Some(studio),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            studio: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let state = match MonumentStudio::from_app_config(config) {
            Ok(studio) => Self::new(studio),
            Err(e) => {
                log::error!("❌ {}; every request will be rejected", e);
                Self::unconfigured()
            }
        };
        state.with_max_body_bytes(config.server.max_body_bytes())
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn studio(&self) -> Result<&MonumentStudio> {
        self.studio.as_ref().ok_or_else(MonumentError::missing_api_key)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a serde_json::Value>,
}

impl ResponseError for MonumentError {
    fn status_code(&self) -> StatusCode {
        match self {
            MonumentError::ValidationError(_) | MonumentError::InvalidImageFormat => {
                StatusCode::BAD_REQUEST
            }
            MonumentError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            MonumentError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            MonumentError::ConfigError(_)
            | MonumentError::UpstreamError { .. }
            | MonumentError::NoContentError(_)
            | MonumentError::RequestError(_)
            | MonumentError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: self.details(),
        })
    }
}

/// Register every stage route. Non-POST methods fall through to 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(stage("/api/generate", web::post().to(handlers::generate)))
        .service(stage("/api/describe-scene", web::post().to(handlers::describe_scene)))
        .service(stage(
            "/api/synthesize-prompt",
            web::post().to(handlers::synthesize_prompt),
        ))
        .service(stage(
            "/api/composite-single",
            web::post().to(handlers::composite_single),
        ))
        .service(stage("/api/composite", web::post().to(handlers::composite)));
}

fn stage(path: &str, route: Route) -> Resource {
    web::resource(path)
        .route(route)
        .default_service(web::to(handlers::method_not_allowed))
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_config(&config));
    let server_config: ServerConfig = config.server.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure)
    })
    .bind((server_config.host(), server_config.port()))?
    .run()
    .await
}
