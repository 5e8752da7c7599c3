//! Integration scenarios
//!
//! Each scenario is a fixed script over the Kubernetes and OpenStack
//! helpers: create resources, assert the derived networking state, probe
//! traffic, tear down, assert disappearance.

mod context;
mod isolation;
mod namespace;

pub use context::{CleanupRegistry, CleanupTask, ScenarioContext};
pub use isolation::{PodIsolationScenario, ServiceIsolationScenario};
pub use namespace::NamespaceLifecycleScenario;

use std::fmt::Display;

use anyhow::Result;

use crate::error::CheckError;

/// Assert that `wanted` appears in `items`.
pub(crate) fn assert_in<T: PartialEq + Display>(items: &[T], wanted: &T, what: &str) -> Result<()> {
    if items.contains(wanted) {
        Ok(())
    } else {
        Err(CheckError::assertion(format!("{wanted} not found in {what}")).into())
    }
}

/// Assert that `unwanted` does not appear in `items`.
pub(crate) fn assert_not_in<T: PartialEq + Display>(
    items: &[T],
    unwanted: &T,
    what: &str,
) -> Result<()> {
    if items.contains(unwanted) {
        Err(CheckError::assertion(format!("{unwanted} still present in {what}")).into())
    } else {
        Ok(())
    }
}

/// Assert that `haystack` contains `needle`.
pub(crate) fn assert_contains(haystack: &str, needle: &str, what: &str) -> Result<()> {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(CheckError::assertion(format!("{what}: expected {needle:?} in output")).into())
    }
}

/// Assert that `haystack` does not contain `needle`.
pub(crate) fn assert_not_contains(haystack: &str, needle: &str, what: &str) -> Result<()> {
    if haystack.contains(needle) {
        Err(CheckError::assertion(format!("{what}: {needle:?} unexpectedly present in output")).into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_in() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert!(assert_in(&items, &"a".to_string(), "letters").is_ok());

        let err = assert_in(&items, &"c".to_string(), "letters").unwrap_err();
        assert!(err
            .downcast_ref::<CheckError>()
            .map(CheckError::is_assertion)
            .unwrap_or(false));
    }

    #[test]
    fn test_assert_not_in() {
        let items = vec!["a".to_string()];
        assert!(assert_not_in(&items, &"b".to_string(), "letters").is_ok());
        assert!(assert_not_in(&items, &"a".to_string(), "letters").is_err());
    }

    #[test]
    fn test_marker_containment() {
        let alive = "HELLO! I AM ALIVE!!!\n";
        assert!(assert_contains(alive, crate::probe::LIVENESS_MARKER, "probe").is_ok());
        assert!(assert_not_contains("", crate::probe::LIVENESS_MARKER, "probe").is_ok());
        assert!(assert_not_contains(alive, crate::probe::LIVENESS_MARKER, "probe").is_err());
    }
}
