//! Error taxonomy for the data-access layer.
//!
//! Every external collaborator (the pip binary, the index listing page, the
//! PyPI JSON API) maps its failures onto one of four kinds so the UI boundary
//! can decide what to surface and what to merely log.

use thiserror::Error;

/// Errors produced by [`crate::registry::PackageRegistry`] and its helpers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The index listing page or the JSON API could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// The named package does not exist on the index (non-2xx response or a
    /// body without an `info` object).
    #[error("package '{0}' is not available from the index")]
    NotFound(String),
    /// External command output or an HTTP response body had an unexpected
    /// shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// A pip subcommand could not be spawned or exited non-zero; carries the
    /// captured output.
    #[error("pip command failed: {output}")]
    Execution {
        /// Combined stdout/stderr captured from the failed invocation.
        output: String,
    },
}

impl RegistryError {
    /// Whether this error is a remote-lookup miss that the UI surfaces as a
    /// "package unavailable" dialog rather than a generic failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias used throughout the data-access layer.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::RegistryError;

    /// What: Display impls carry the package name / captured output
    ///
    /// - Input: NotFound and Execution variants
    /// - Output: Messages mention the offending name or output
    #[test]
    fn error_display_carries_context() {
        let e = RegistryError::NotFound("leftpad".into());
        assert!(e.to_string().contains("leftpad"));
        assert!(e.is_not_found());

        let e = RegistryError::Execution {
            output: "No matching distribution".into(),
        };
        assert!(e.to_string().contains("No matching distribution"));
        assert!(!e.is_not_found());
    }
}
