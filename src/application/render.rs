//! Page rendering seam.
//!
//! The gateway only sees [`PageRenderer`]; the askama implementation lives in
//! `presentation::views`.

use std::error::Error as StdError;

use bytes::Bytes;
use thiserror::Error;

use crate::domain::pages::PageRequest;

#[derive(Debug, Error)]
#[error("failed to render template `{template}`")]
pub struct RenderError {
    pub template: &'static str,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl RenderError {
    pub fn new(template: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            template,
            source: Box::new(source),
        }
    }
}

/// Turns a page descriptor into HTML bytes.
///
/// Implementations are pure: the same request always yields the same bytes
/// and no I/O is performed.
pub trait PageRenderer: Send + Sync {
    fn render(&self, request: &PageRequest) -> Result<Bytes, RenderError>;
}
