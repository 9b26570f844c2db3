use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use imaging::ImagingError;
use serde::Deserialize;
use shared::{
    domain::Filename,
    error::{ApiError, ErrorCode},
    protocol::{self, HealthResponse, FILE_FIELD},
};
use storage::UploadStore;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod config;
mod pages;

use config::{load_settings, prepare_upload_dir};

#[derive(Clone)]
struct AppState {
    store: UploadStore,
}

#[derive(Debug, Deserialize)]
struct FlashQuery {
    flash: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    prepare_upload_dir(&settings.upload_dir)?;
    let store = UploadStore::open(&settings.upload_dir).await?;

    let state = AppState { store };
    let app = build_router(Arc::new(state), settings.max_upload_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, upload_dir = %settings.upload_dir.display(), "image server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(protocol::index_route(), get(index))
        .route(protocol::upload_route(), post(upload_file))
        .route("/view/:filename", get(view_image))
        .route("/uploads/:filename", get(uploaded_file))
        .route(protocol::health_route(), get(health_check))
        .route(protocol::transform_grayscale_route(), post(transform_grayscale))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

async fn index(Query(q): Query<FlashQuery>) -> Html<String> {
    Html(pages::index_page(q.flash.as_deref()))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn flash_redirect(path: &str, message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("{path}?flash={encoded}"))
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, Json<ApiError>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, err.to_string())),
        )
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let raw_filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|err| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, err.to_string())),
            )
        })?;
        upload = Some((raw_filename, bytes.to_vec()));
        break;
    }

    let Some((raw_filename, bytes)) = upload else {
        return Ok(flash_redirect(protocol::index_route(), "No file selected"));
    };
    if raw_filename.is_empty() {
        return Ok(flash_redirect(protocol::index_route(), "No file selected"));
    }

    let filename = match Filename::sanitize(&raw_filename) {
        Some(filename) if filename.has_allowed_extension() => filename,
        _ => {
            return Ok(flash_redirect(
                protocol::index_route(),
                "Invalid file type. Please upload an image file.",
            ));
        }
    };

    state.store.save(&filename, &bytes).await.map_err(|err| {
        error!(filename = %filename, %err, "failed to store upload");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, "failed to store upload")),
        )
    })?;

    info!(filename = %filename, size_bytes = bytes.len(), "upload stored");
    Ok(flash_redirect(
        &protocol::view_route_for(&filename),
        "File uploaded successfully!",
    ))
}

async fn view_image(
    Path(raw_filename): Path<String>,
    Query(q): Query<FlashQuery>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let filename = Filename::sanitize(&raw_filename).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, "file not found")),
        )
    })?;
    Ok(Html(pages::view_page(&filename, q.flash.as_deref())))
}

async fn uploaded_file(
    State(state): State<Arc<AppState>>,
    Path(raw_filename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, "file not found")),
        )
    };

    let filename = Filename::sanitize(&raw_filename).ok_or_else(not_found)?;
    let stored = state
        .store
        .load(&filename)
        .await
        .map_err(|err| {
            error!(filename = %filename, %err, "failed to read upload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "failed to read upload")),
            )
        })?
        .ok_or_else(not_found)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&stored.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    Ok((StatusCode::OK, headers, stored.bytes))
}

/// Grayscale transform endpoint. Failure bodies are plain text so callers
/// can surface them directly.
async fn transform_grayscale(
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let raw_filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
        upload = Some((raw_filename, bytes.to_vec()));
        break;
    }

    let Some((raw_filename, bytes)) = upload else {
        return Err((
            StatusCode::BAD_REQUEST,
            "No file part in the request".to_string(),
        ));
    };
    if raw_filename.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No file selected".to_string()));
    }

    let valid_name = Filename::sanitize(&raw_filename)
        .map(|filename| filename.has_allowed_extension())
        .unwrap_or(false);
    if !valid_name {
        return Err((StatusCode::BAD_REQUEST, "Invalid file type".to_string()));
    }

    match imaging::grayscale_png(&bytes) {
        Ok(png) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(imaging::OUTPUT_CONTENT_TYPE),
            );
            Ok((StatusCode::OK, headers, png))
        }
        Err(err @ ImagingError::Decode { .. }) => {
            warn!(filename = %raw_filename, %err, "transform request with undecodable image");
            Err((StatusCode::BAD_REQUEST, "Invalid image file".to_string()))
        }
        Err(err @ ImagingError::Encode { .. }) => {
            error!(filename = %raw_filename, %err, "grayscale encode failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode image".to_string(),
            ))
        }
    }
}
