use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Coarse classification of browser failures so callers can branch on
/// what happened rather than on driver message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NotFound,
    SessionClosed,
    Other,
}

#[derive(Debug, Clone)]
pub struct BrowserError {
    pub kind: ErrorKind,
    pub message: String,
}

impl BrowserError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(what: &str, after: Duration) -> Self {
        Self::new(ErrorKind::Timeout, format!("{} timed out after {:?}", what, after))
    }

    pub fn closed() -> Self {
        Self::new(ErrorKind::SessionClosed, "session already closed")
    }
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for BrowserError {}

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// A located element on the page
#[async_trait]
pub trait ElementHandle: Send + Sync {
    async fn is_visible(&self) -> BrowserResult<bool>;

    async fn click(&self) -> BrowserResult<()>;

    /// Rendered text of the element, bounded by `timeout`
    async fn text_content(&self, timeout: Duration) -> BrowserResult<String>;
}

/// Base trait for the browser page the quote lookup runs against
#[async_trait]
pub trait QuotePage: Send + Sync {
    /// Load `url` and wait for the document, failing with `Timeout` after `timeout`
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// First element matching the CSS `selector`, if any
    async fn locate(&self, selector: &str) -> BrowserResult<Option<Box<dyn ElementHandle>>>;

    /// Replace the contents of the input at `selector` with `text`
    async fn fill(&self, selector: &str, text: &str, timeout: Duration) -> BrowserResult<()>;

    async fn press_enter(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Release page, browser and driver. A second call reports `SessionClosed`.
    async fn close(&mut self) -> BrowserResult<()>;
}
