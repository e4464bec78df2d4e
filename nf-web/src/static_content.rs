use axum::extract::Path;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Result};

pub async fn get(Path(file): Path<String>) -> Result<impl IntoResponse> {
    match file.as_str() {
        "style.css" => Ok(static_file("text/css", include_str!("static/style.css"))),
        "app.js" => Ok(static_file("text/javascript", include_str!("static/app.js"))),
        _ => Err(StatusCode::NOT_FOUND.into()),
    }
}

type StaticResponse = ([(HeaderName, &'static str); 1], &'static str);

fn static_file(content_type: &'static str, body: &'static str) -> StaticResponse {
    ([(header::CONTENT_TYPE, content_type)], body)
}
