use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use nf_core::NewtonParams;
use nf_render::RenderServer;

use crate::WindowParams;

/// File name offered by the download route.
pub const DOWNLOAD_NAME: &str = "newton_fractal.png";

/// The image for the query, shown in the page.
pub async fn inline(
    State(server): State<Arc<RenderServer>>,
    Query(query): Query<WindowParams>,
) -> axum::response::Result<impl IntoResponse> {
    render(&server, query.to_params(), None).await
}

/// The image for the query, as a file to save.
pub async fn download(
    State(server): State<Arc<RenderServer>>,
    Query(query): Query<WindowParams>,
) -> axum::response::Result<impl IntoResponse> {
    render(&server, query.to_params(), Some(DOWNLOAD_NAME)).await
}

/// Render the fractal with the provided params, as PNG.
/// With `attachment`, the browser is asked to save it under that name.
async fn render(
    server: &RenderServer,
    params: NewtonParams,
    attachment: Option<&str>,
) -> axum::response::Result<impl IntoResponse> {
    let rendered = server.render(params).await.map_err(|err| match err {
        nf_render::Error::InvalidArgument(msg) => {
            tracing::info!("rejected request: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        nf_render::Error::Internal(msg) => {
            tracing::error!("request error: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    })?;

    let png = nf_core::image::encode_png(&rendered.image).map_err(|err| {
        tracing::error!("image serialization error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let disposition = match attachment {
        Some(name) => HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
        None => HeaderValue::from_static("inline"),
    };

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (CACHE_CONTROL, HeaderValue::from_static("max-age=3600")),
            (CONTENT_DISPOSITION, disposition),
        ],
        png,
    ))
}
