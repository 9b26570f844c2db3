use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header,
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::protocol::{transform_grayscale_route, FILE_FIELD};
use url::Url;

const OCTET_STREAM: &str = "application/octet-stream";

/// Image bytes plus the content type they were served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Raw outcome of one transform request. Status interpretation belongs to
/// the controller, not the transport.
#[derive(Debug, Clone)]
pub struct TransformReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransformReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The two network calls of a conversion attempt.
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Read the original image bytes for a previously uploaded filename.
    async fn fetch_original(&self, filename: &str) -> Result<ImagePayload>;

    /// Re-submit the original as multipart form data to the grayscale
    /// transform endpoint.
    async fn request_grayscale(
        &self,
        filename: &str,
        payload: ImagePayload,
    ) -> Result<TransformReply>;
}

/// reqwest-backed transport against a running image server.
pub struct HttpImageTransport {
    http: Client,
    base_url: Url,
}

impl HttpImageTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{path}'"))
    }
}

#[async_trait]
impl ImageTransport for HttpImageTransport {
    async fn fetch_original(&self, filename: &str) -> Result<ImagePayload> {
        let url = self.endpoint(&format!("uploads/{filename}"))?;
        let response = self.http.get(url).send().await?;

        // The read path trusts whatever comes back: a transport failure
        // propagates, anything else is consumed as the original image.
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(OCTET_STREAM)
            .to_string();
        let bytes = response.bytes().await?;

        Ok(ImagePayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    async fn request_grayscale(
        &self,
        filename: &str,
        payload: ImagePayload,
    ) -> Result<TransformReply> {
        let url = self.endpoint(transform_grayscale_route().trim_start_matches('/'))?;

        let part = Part::bytes(payload.bytes)
            .file_name(filename.to_string())
            .mime_str(&payload.content_type)
            .with_context(|| format!("invalid content type '{}'", payload.content_type))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(TransformReply {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
