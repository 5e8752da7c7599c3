//! Random resource names
//!
//! Scenario resources get unique generated names so concurrent runs against
//! the same cluster do not collide.

use rand::Rng;

/// Generate a unique resource name with the given prefix, e.g.
/// `netcheck-pod-483920`.
pub fn rand_name(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: u32 = rng.random_range(100_000..1_000_000);
    format!("{prefix}-{suffix}")
}

/// Subnet name the integration layer derives for a namespace.
pub fn namespace_subnet_name(namespace: &str) -> String {
    format!("ns/{namespace}-subnet")
}

/// Network CRD name the integration layer derives for a namespace.
pub fn namespace_net_name(namespace: &str) -> String {
    format!("ns-{namespace}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_name_prefix_and_uniqueness() {
        let a = rand_name("netcheck-pod");
        let b = rand_name("netcheck-pod");
        assert!(a.starts_with("netcheck-pod-"));
        // Six-digit suffixes collide rarely enough for a smoke check.
        assert_ne!(a, b);
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(namespace_subnet_name("ns-test"), "ns/ns-test-subnet");
        assert_eq!(namespace_net_name("ns-test"), "ns-ns-test");
    }
}
