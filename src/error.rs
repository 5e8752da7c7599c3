//! Failure taxonomy for scenario execution
//!
//! Distinguishes skip conditions, assertion failures, and environment
//! failures so the runner can classify outcomes.

#![allow(dead_code)]

use thiserror::Error;

/// Errors raised by scenarios and helpers
#[derive(Error, Debug)]
pub enum CheckError {
    /// A required feature is not enabled; the scenario body never ran.
    #[error("skipped: {0}")]
    Skip(String),

    /// An expected resource or state was absent.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    /// The requested operation is not supported (e.g. service type).
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// No traffic passed through the service within the readiness window.
    #[error("server fault: no traffic passed within {0}s")]
    ServerFault(u64),

    /// A host-side probe subprocess returned a failure.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A bounded wait elapsed without the condition becoming true.
    #[error("timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },
}

impl CheckError {
    pub fn skip(reason: impl Into<String>) -> Self {
        CheckError::Skip(reason.into())
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        CheckError::AssertionFailed(message.into())
    }

    pub fn timeout(what: impl Into<String>, seconds: u64) -> Self {
        CheckError::Timeout {
            what: what.into(),
            seconds,
        }
    }

    /// True for failures that mean "the check did not hold", as opposed to
    /// environment or transport problems.
    pub fn is_assertion(&self) -> bool {
        matches!(self, CheckError::AssertionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CheckError::timeout("pod demo to reach Running", 300);
        assert_eq!(
            err.to_string(),
            "timed out after 300s waiting for pod demo to reach Running"
        );

        let err = CheckError::ServerFault(60);
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_assertion_classification() {
        assert!(CheckError::assertion("missing subnet").is_assertion());
        assert!(!CheckError::skip("feature off").is_assertion());
    }
}
