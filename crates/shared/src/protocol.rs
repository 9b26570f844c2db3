use serde::{Deserialize, Serialize};

use crate::domain::Filename;

/// Name of the multipart field carrying image bytes, on both the upload and
/// the transform endpoint.
pub const FILE_FIELD: &str = "file";

/// Maximum accepted request body, 16 MiB.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn index_route() -> &'static str {
    "/"
}

pub fn upload_route() -> &'static str {
    "/upload"
}

pub fn health_route() -> &'static str {
    "/health"
}

pub fn transform_grayscale_route() -> &'static str {
    "/image/transform/grayscale"
}

pub fn view_route_for(filename: &Filename) -> String {
    format!("/view/{filename}")
}

pub fn uploads_route_for(filename: &Filename) -> String {
    format!("/uploads/{filename}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "image server is running".to_string(),
        }
    }
}
