use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use thermal_dither::{ConvertError, DitherConfig};

use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{PreviewSession, SessionHandle, SessionId, SessionRegistry};

/// Conversion parameters; omitted fields keep their current value
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ConversionParams {
    /// atkinson_plus, atkinson, floyd_steinberg, sierra24a or stucki
    pub algorithm: Option<String>,
    /// Output width in dots
    pub width: Option<u32>,
    /// -100 to 100
    pub brightness: Option<i32>,
    /// 0.0 to 2.0
    pub contrast: Option<f32>,
}

impl ConversionParams {
    /// Overlay these parameters on `base` and validate the result
    pub fn apply(&self, base: DitherConfig) -> Result<DitherConfig, ConvertError> {
        let mut config = base;
        if let Some(name) = &self.algorithm {
            config.algorithm = name.parse()?;
        }
        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(brightness) = self.brightness {
            config.brightness = brightness;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Request body for opening a preview session
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Path of the source image on the server
    pub path: String,
    #[serde(flatten)]
    pub params: ConversionParams,
}

/// Current state of a preview session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: String,
    pub source: String,
    /// Preview width in dots
    pub width: u32,
    /// Preview height in dots
    pub height: u32,
    pub algorithm: String,
    pub brightness: i32,
    pub contrast: f32,
}

impl SessionResponse {
    fn new(id: &SessionId, session: &PreviewSession) -> Self {
        let config = session.config();
        Self {
            session: id.to_string(),
            source: session.source_path().display().to_string(),
            width: session.preview().width(),
            height: session.preview().height(),
            algorithm: config.algorithm.to_string(),
            brightness: config.brightness,
            contrast: config.contrast,
        }
    }
}

/// Request body for saving a preview
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveRequest {
    /// Output file name; defaults to the source stem with a .png extension
    pub filename: Option<String>,
}

/// Response from a successful save
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse {
    pub path: String,
}

async fn find_session<R: SessionRegistry>(
    sessions: &R,
    id: &SessionId,
) -> Result<SessionHandle, ApiError> {
    sessions.get(id).await?.ok_or(ApiError::SessionNotFound)
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::Internal(format!("Task error: {e}"))
}

/// Serve the preview control page
pub async fn handle_index() -> Html<&'static str> {
    Html(include_str!("../../static/preview/index.html"))
}

/// Open a preview session
///
/// Decodes the image at `path` and renders a first preview with the
/// configured defaults, overridden by any parameters in the request.
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Invalid parameter"),
        (status = 422, description = "Source image cannot be decoded"),
    ),
    tag = "Preview"
)]
pub async fn handle_create_session<R: SessionRegistry>(
    State(config): State<Arc<AppConfig>>,
    State(sessions): State<Arc<R>>,
    request: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request?;
    let dither_config = request.params.apply(config.defaults.dither_config())?;
    let path = PathBuf::from(&request.path);

    let session =
        tokio::task::spawn_blocking(move || PreviewSession::load_with(&path, dither_config))
            .await
            .map_err(join_error)??;

    let id = sessions.insert(session).await?;
    let handle = find_session(sessions.as_ref(), &id).await?;
    let response = SessionResponse::new(&id, &*handle.lock().await);

    tracing::info!(session = %id, source = %response.source, "Preview session created");

    Ok((StatusCode::CREATED, Json(response)))
}

/// Describe a preview session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Unknown session"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Preview"
)]
pub async fn handle_get_session<R: SessionRegistry>(
    State(sessions): State<Arc<R>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = SessionId::new(id);
    let handle = find_session(sessions.as_ref(), &id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionResponse::new(&id, &session)))
}

/// Render the preview with new parameters
///
/// Every call reruns the full pipeline on the source image. If the
/// parameters are invalid the session keeps its previous preview.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/preview",
    responses(
        (status = 200, description = "1-bit PNG preview", content_type = "image/png"),
        (status = 400, description = "Invalid parameter"),
        (status = 404, description = "Unknown session"),
    ),
    params(("id" = String, Path, description = "Session id"), ConversionParams),
    tag = "Preview"
)]
pub async fn handle_preview<R: SessionRegistry>(
    State(sessions): State<Arc<R>>,
    Path(id): Path<String>,
    query: Result<Query<ConversionParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let id = SessionId::new(id);
    let handle = find_session(sessions.as_ref(), &id).await?;

    let png_bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let mut session = handle.blocking_lock();
        let config = params.apply(session.config())?;
        let preview = session.update(config)?;
        thermal_dither::output::encode_png(preview)
            .map_err(|e| ApiError::Internal(format!("PNG encode error: {e}")))
    })
    .await
    .map_err(join_error)??;

    tracing::debug!(session = %id, size_bytes = png_bytes.len(), "Preview rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Bytes::from(png_bytes),
    )
        .into_response())
}

/// Save the current preview to the output directory
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/save",
    request_body = SaveRequest,
    responses(
        (status = 200, description = "Preview written", body = SaveResponse),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "Unknown session"),
        (status = 500, description = "Output could not be written"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Preview"
)]
pub async fn handle_save<R: SessionRegistry>(
    State(config): State<Arc<AppConfig>>,
    State(sessions): State<Arc<R>>,
    Path(id): Path<String>,
    body: Option<Json<SaveRequest>>,
) -> Result<Json<SaveResponse>, ApiError> {
    let id = SessionId::new(id);
    let handle = find_session(sessions.as_ref(), &id).await?;
    let filename = body.and_then(|Json(request)| request.filename);
    let output_dir = config.output_dir.clone();

    let path = tokio::task::spawn_blocking(move || {
        let session = handle.blocking_lock();
        session.save(&output_dir, filename.as_deref())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(SaveResponse {
        path: path.display().to_string(),
    }))
}

/// Close a preview session
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Preview"
)]
pub async fn handle_delete_session<R: SessionRegistry>(
    State(sessions): State<Arc<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::new(id);
    if sessions.remove(&id).await? {
        tracing::info!(session = %id, "Preview session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound)
    }
}
