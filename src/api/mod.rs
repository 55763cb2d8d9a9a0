pub mod preview;

use axum::Json;
use utoipa::OpenApi;

pub use preview::{
    handle_create_session, handle_delete_session, handle_get_session, handle_index, handle_preview,
    handle_save, ConversionParams, CreateSessionRequest, SaveRequest, SaveResponse,
    SessionResponse,
};
pub use preview::{
    __path_handle_create_session, __path_handle_delete_session, __path_handle_get_session,
    __path_handle_preview, __path_handle_save,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photoprint API",
        description = "Interactive preview of photos dithered for thermal receipt printers",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        handle_create_session,
        handle_get_session,
        handle_preview,
        handle_save,
        handle_delete_session,
    ),
    components(schemas(
        ConversionParams,
        CreateSessionRequest,
        SessionResponse,
        SaveRequest,
        SaveResponse,
    )),
    tags(
        (name = "Preview", description = "Preview sessions for tuning a conversion")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn handle_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
