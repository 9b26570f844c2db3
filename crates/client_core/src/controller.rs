use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    page::{Element, ImageNode, ImageSource, Node, Page, TextNode},
    transport::{ImageTransport, TransformReply},
};

pub const GRAYSCALE_BUTTON_ID: &str = "grayscaleBtn";
pub const LOADING_INDICATOR_ID: &str = "loading";
pub const RESULT_CONTAINER_ID: &str = "processedImageContainer";

const PROCESSED_IMAGE_ALT: &str = "Processed image";
const PROCESSED_IMAGE_CLASS: &str = "processed-image";
const ERROR_TEXT_CLASS: &str = "error";
const GENERIC_NETWORK_MESSAGE: &str = "an unexpected error occurred";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("required page element '{0}' is missing")]
    MissingElement(&'static str),
}

/// How one conversion attempt settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success,
    ApiError,
    NetworkError,
    /// Trigger arrived while an attempt was already in flight.
    Ignored,
}

/// Orchestrates a single user-triggered grayscale conversion: fetch the
/// original upload, re-post it to the transform endpoint, and render the
/// result into the page.
pub struct TransformController<T: ImageTransport> {
    filename: String,
    transport: T,
    button: Element,
    loading: Element,
    container: Element,
    busy: AtomicBool,
}

impl<T: ImageTransport> TransformController<T> {
    /// Bind the controller to a page.
    ///
    /// All three required elements must exist before the trigger is
    /// click-bound; a malformed page fails construction outright.
    pub fn bind(
        page: &Page,
        filename: impl Into<String>,
        transport: T,
    ) -> Result<Self, ControllerError> {
        let button = page
            .element(GRAYSCALE_BUTTON_ID)
            .ok_or(ControllerError::MissingElement(GRAYSCALE_BUTTON_ID))?;
        let loading = page
            .element(LOADING_INDICATOR_ID)
            .ok_or(ControllerError::MissingElement(LOADING_INDICATOR_ID))?;
        let container = page
            .element(RESULT_CONTAINER_ID)
            .ok_or(ControllerError::MissingElement(RESULT_CONTAINER_ID))?;

        button.bind_click();

        Ok(Self {
            filename: filename.into(),
            transport,
            button,
            loading,
            container,
            busy: AtomicBool::new(false),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// One conversion attempt: `Idle -> Busy -> outcome -> Idle`.
    ///
    /// The busy exit runs on every settle path, so the trigger is always
    /// usable again after the attempt.
    pub async fn handle_grayscale_conversion(&self) -> ConversionOutcome {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!(filename = %self.filename, "conversion already in flight, trigger ignored");
            return ConversionOutcome::Ignored;
        }

        self.button.set_disabled(true);
        self.loading.set_hidden(false);

        let outcome = match self.process_image().await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(filename = %self.filename, %error, "conversion attempt failed");
                self.render_network_error(&error);
                ConversionOutcome::NetworkError
            }
        };

        self.button.set_disabled(false);
        self.loading.set_hidden(true);
        self.busy.store(false, Ordering::SeqCst);

        outcome
    }

    /// The transform step. Failures before a transform reply exists
    /// propagate to the caller's network-error fallback.
    async fn process_image(&self) -> anyhow::Result<ConversionOutcome> {
        let original = self.transport.fetch_original(&self.filename).await?;
        let reply = self
            .transport
            .request_grayscale(&self.filename, original)
            .await?;

        if reply.is_success() {
            self.render_processed_image(reply);
            Ok(ConversionOutcome::Success)
        } else {
            self.render_api_error(&reply.body_text());
            Ok(ConversionOutcome::ApiError)
        }
    }

    fn render_processed_image(&self, reply: TransformReply) {
        let source = ImageSource {
            content_type: reply
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes: reply.body,
        };
        self.container
            .replace_children(vec![Node::Image(ImageNode {
                source,
                alt: PROCESSED_IMAGE_ALT.to_string(),
                class: PROCESSED_IMAGE_CLASS.to_string(),
            })]);
    }

    fn render_api_error(&self, detail: &str) {
        self.render_error_text(format!("Error: {detail}"));
    }

    fn render_network_error(&self, error: &anyhow::Error) {
        let message = error.to_string();
        let message = if message.trim().is_empty() {
            GENERIC_NETWORK_MESSAGE
        } else {
            message.as_str()
        };
        self.render_error_text(format!("Network error: {message}"));
    }

    fn render_error_text(&self, content: String) {
        self.container.replace_children(vec![Node::Text(TextNode {
            content,
            class: ERROR_TEXT_CLASS.to_string(),
        })]);
    }
}
