//! Browser navigation contract.

use pharma_direct_core::Area;

/// Error raised by a navigation mechanism.
#[derive(thiserror::Error, Debug, Clone)]
#[error("navigation failed: {0}")]
pub struct NavigateError(String);

impl NavigateError {
    /// Describe why the mechanism failed.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Contract for the hosting page's navigation facilities.
///
/// [`assign`](Navigator::assign) and [`replace`](Navigator::replace) mirror
/// the two independent browser mechanisms for changing the current document.
/// Either can be rejected in degraded embeddings, which is why redirect
/// execution falls back from one to the other.
pub trait Navigator: Send + Sync {
    /// The area the current document belongs to, per the hosting page.
    fn current_area(&self) -> Area;

    /// Navigate by assigning a new location (adds a history entry).
    ///
    /// # Errors
    ///
    /// Returns [`NavigateError`] when the mechanism is rejected.
    fn assign(&self, href: &str) -> Result<(), NavigateError>;

    /// Navigate by replacing the current location (no history entry).
    ///
    /// # Errors
    ///
    /// Returns [`NavigateError`] when the mechanism is rejected.
    fn replace(&self, href: &str) -> Result<(), NavigateError>;
}

/// Navigate with the fallback chain: `assign` first, then `replace`.
///
/// When both mechanisms are rejected the attempt is logged and abandoned.
/// There is no retry; the user is left on the current page.
pub(crate) fn navigate(navigator: &dyn Navigator, href: &str) {
    if let Err(first) = navigator.assign(href) {
        tracing::warn!(%href, error = %first, "assign navigation rejected, falling back to replace");
        if let Err(second) = navigator.replace(href) {
            tracing::error!(%href, error = %second, "all navigation mechanisms rejected");
        }
    }
}
