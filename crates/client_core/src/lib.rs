pub mod controller;
pub mod page;
pub mod transport;

pub use controller::{
    ControllerError, ConversionOutcome, TransformController, GRAYSCALE_BUTTON_ID,
    LOADING_INDICATOR_ID, RESULT_CONTAINER_ID,
};
pub use page::{Element, ImageNode, ImageSource, Node, Page, TextNode};
pub use transport::{HttpImageTransport, ImagePayload, ImageTransport, TransformReply};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
