//! Embedded upload UI served at `/`.

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "assets/"]
struct UiAssets;

/// Serve the UI index for bare `/` requests.
pub async fn index() -> Response {
    serve_embedded::<UiAssets>("index.html")
}

/// Fallback handler: serve embedded assets, JSON 404 for anything else.
pub async fn fallback(uri: Uri) -> Response {
    let request_path = uri.path();
    let asset_path = request_path.trim_start_matches('/');

    if !asset_path.is_empty() && UiAssets::get(asset_path).is_some() {
        return serve_embedded::<UiAssets>(asset_path);
    }

    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "success": false,
            "error": "Not Found",
            "path": request_path,
        })),
    )
        .into_response()
}

fn serve_embedded<E: Embed>(path: &str) -> Response {
    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::{fallback, index};
    use axum::body::to_bytes;
    use axum::http::{StatusCode, Uri, header};

    #[tokio::test]
    async fn index_serves_html() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }

    #[tokio::test]
    async fn fallback_serves_embedded_script() {
        let response = fallback(Uri::from_static("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn fallback_returns_json_404() {
        let response = fallback(Uri::from_static("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/nope");
        assert_eq!(body["success"], false);
    }
}
