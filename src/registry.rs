//! Per-provider record of wildcard variable keys.

use std::collections::HashMap;

/// Operation name to the variable keys marked as wildcards for it.
///
/// Entries are only ever appended. A registry belongs to the provider that
/// built it and lives exactly as long as that provider.
#[derive(Debug, Clone, Default)]
pub struct WildcardRegistry {
    keys_by_operation: HashMap<String, Vec<String>>,
}

impl WildcardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as a wildcard for `operation_name`. Duplicates are kept.
    pub fn register(&mut self, operation_name: &str, key: impl Into<String>) {
        self.keys_by_operation
            .entry(operation_name.to_string())
            .or_default()
            .push(key.into());
    }

    /// Wildcard keys registered for an operation, in registration order.
    pub fn keys_for(&self, operation_name: &str) -> Option<&[String]> {
        self.keys_by_operation
            .get(operation_name)
            .map(|keys| keys.as_slice())
    }

    /// Number of operations with at least one wildcard key.
    pub fn len(&self) -> usize {
        self.keys_by_operation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys_by_operation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_appends_per_operation() {
        let mut registry = WildcardRegistry::new();
        registry.register("GetUser", "id");
        registry.register("GetUser", "timestamp");
        registry.register("ListUsers", "cursor");

        assert_eq!(
            registry.keys_for("GetUser"),
            Some(&["id".to_string(), "timestamp".to_string()][..])
        );
        assert_eq!(registry.keys_for("ListUsers"), Some(&["cursor".to_string()][..]));
        assert_eq!(registry.keys_for("Other"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut registry = WildcardRegistry::new();
        registry.register("GetUser", "id");
        registry.register("GetUser", "id");
        assert_eq!(registry.keys_for("GetUser").map(|k| k.len()), Some(2));
    }

    #[test]
    fn test_empty_registry() {
        let registry = WildcardRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.keys_for("GetUser"), None);
    }
}
