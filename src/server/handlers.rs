use crate::{
    codec,
    error::{MonumentError, Result},
    models::{CompositeInput, MonumentInput},
    server::AppState,
};
use actix_web::{web, HttpResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub mode: Option<String>,
    pub prompt: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeSceneRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DescribeSceneResponse {
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizePromptRequest {
    pub monument_description: Option<String>,
    pub scene_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizePromptResponse {
    pub composite_prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSingleRequest {
    pub monument_ref_image: Option<String>,
    pub scene_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRequest {
    pub composite_prompt: Option<String>,
    pub monument_image: Option<String>,
    pub scene_image: Option<String>,
    pub monument_description: Option<String>,
    pub scene_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResponse {
    pub image_url: String,
}

/// `POST /api/generate`
pub async fn generate(state: web::Data<AppState>, payload: web::Payload) -> Result<HttpResponse> {
    let studio = state.studio()?;
    let request: GenerateRequest = read_body(&state, payload).await?;
    let request_id = Uuid::new_v4();

    let input = match request.mode.as_deref() {
        Some("text") => {
            let prompt = present(request.prompt)
                .ok_or_else(|| MonumentError::validation("Prompt is required for text mode"))?;
            MonumentInput::Description(prompt)
        }
        Some("image") => {
            let image = present(request.image)
                .ok_or_else(|| MonumentError::validation("Image is required for image mode"))?;
            MonumentInput::Reference(codec::decode(&image)?)
        }
        _ => return Err(MonumentError::validation("Invalid mode")),
    };

    log::info!("[req:{}] Generating monument", request_id);
    let monument = studio
        .generate_monument(&input)
        .await
        .map_err(|e| log_failure(request_id, "generate", e))?;

    Ok(HttpResponse::Ok().json(GenerateResponse {
        image_url: monument.image_url,
        description: monument.description,
    }))
}

/// `POST /api/describe-scene`
pub async fn describe_scene(state: web::Data<AppState>, payload: web::Payload) -> Result<HttpResponse> {
    let studio = state.studio()?;
    let request: DescribeSceneRequest = read_body(&state, payload).await?;
    let request_id = Uuid::new_v4();

    let image = present(request.image).ok_or_else(|| MonumentError::validation("Image is required"))?;
    let scene = codec::decode(&image)?;

    log::info!("[req:{}] Describing scene ({})", request_id, scene.mime_type);
    let description = studio
        .describe_scene(&scene)
        .await
        .map_err(|e| log_failure(request_id, "describe-scene", e))?;

    Ok(HttpResponse::Ok().json(DescribeSceneResponse { description }))
}

/// `POST /api/synthesize-prompt`
pub async fn synthesize_prompt(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let studio = state.studio()?;
    let request: SynthesizePromptRequest = read_body(&state, payload).await?;
    let request_id = Uuid::new_v4();

    let (monument, scene) = match (
        present(request.monument_description),
        present(request.scene_description),
    ) {
        (Some(monument), Some(scene)) => (monument, scene),
        _ => {
            return Err(MonumentError::validation(
                "Monument description and scene description are required",
            ))
        }
    };

    log::info!("[req:{}] Synthesizing composite prompt", request_id);
    let composite_prompt = studio
        .synthesize_prompt(&monument, &scene)
        .await
        .map_err(|e| log_failure(request_id, "synthesize-prompt", e))?;

    Ok(HttpResponse::Ok().json(SynthesizePromptResponse { composite_prompt }))
}

/// `POST /api/composite-single`
pub async fn composite_single(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let studio = state.studio()?;
    let request: CompositeSingleRequest = read_body(&state, payload).await?;
    let request_id = Uuid::new_v4();

    let (reference, scene) = match (present(request.monument_ref_image), present(request.scene_image)) {
        (Some(reference), Some(scene)) => (reference, scene),
        _ => {
            return Err(MonumentError::validation(
                "Both monument reference and scene images are required",
            ))
        }
    };
    let reference = codec::decode(&reference)?;
    let scene = codec::decode(&scene)?;

    log::info!("[req:{}] Compositing reference into scene", request_id);
    let image_url = studio
        .reference_composite(&reference, &scene)
        .await
        .map_err(|e| log_failure(request_id, "composite-single", e))?;

    Ok(HttpResponse::Ok().json(CompositeResponse { image_url }))
}

/// `POST /api/composite`
pub async fn composite(state: web::Data<AppState>, payload: web::Payload) -> Result<HttpResponse> {
    let studio = state.studio()?;
    let request: CompositeRequest = read_body(&state, payload).await?;
    let request_id = Uuid::new_v4();

    let monument = present(request.monument_image)
        .ok_or_else(|| MonumentError::validation("Monument image is required"))?;

    let mut input = CompositeInput::new(codec::decode(&monument)?).with_descriptions(
        present(request.monument_description),
        present(request.scene_description),
    );
    if let Some(scene) = present(request.scene_image) {
        input = input.with_scene_image(codec::decode(&scene)?);
    }
    if let Some(prompt) = present(request.composite_prompt) {
        input = input.with_composite_prompt(prompt);
    }

    log::info!(
        "[req:{}] Compositing monument ({} scene image)",
        request_id,
        if input.scene_image.is_some() { "with" } else { "without" }
    );
    let image_url = studio
        .composite(&input)
        .await
        .map_err(|e| log_failure(request_id, "composite", e))?;

    Ok(HttpResponse::Ok().json(CompositeResponse { image_url }))
}

/// Any method other than POST on a stage route.
pub async fn method_not_allowed(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.studio()?;
    Err(MonumentError::MethodNotAllowed)
}

/// Buffer the body up to the configured limit, then parse it as JSON.
async fn read_body<T: DeserializeOwned>(state: &AppState, payload: web::Payload) -> Result<T> {
    let limit = state.max_body_bytes();
    let body = match payload.to_bytes_limited(limit).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            log::debug!("Failed to read request body: {}", e);
            return Err(MonumentError::validation("Invalid request body"));
        }
        Err(_) => return Err(MonumentError::PayloadTooLarge(limit)),
    };
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        log::debug!("Rejecting request body: {}", e);
        MonumentError::validation("Invalid JSON body")
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn log_failure(request_id: Uuid, route: &str, err: MonumentError) -> MonumentError {
    if err.is_client_error() {
        log::warn!("[req:{}] {} rejected: {}", request_id, route, err);
    } else {
        log::error!("[req:{}] Error in {}: {}", request_id, route, err);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_treats_blank_as_missing() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x".into())), Some("x".into()));
    }

    #[test]
    fn test_parse_body_rejects_non_json() {
        let err = parse_body::<GenerateRequest>(b"mode=text").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");

        let request: GenerateRequest = parse_body(br#"{"mode": "text", "prompt": "owl"}"#).unwrap();
        assert_eq!(request.mode.as_deref(), Some("text"));
        assert_eq!(request.image, None);
    }
}
