//! Structural fingerprint of a generation request.
//!
//! Two configurations with equal keys share one generated class. Key
//! equality is structural across every component except the filter, which is
//! compared by object identity: two filter instances with identical logic
//! still produce different keys. This is deliberate, preserving the ability
//! to distinguish routing strategies that happen to be implemented
//! identically; callers who want sharing must share the filter value.

use std::sync::Arc;

use proxyforge_core::{CallbackFilter, CallbackKind, TypeHash};

/// Identity token for a filter instance.
pub fn filter_identity(filter: &Arc<dyn CallbackFilter>) -> usize {
    Arc::as_ptr(filter) as *const () as usize
}

/// The cache key derived from a validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    superclass: Option<TypeHash>,
    interfaces: Vec<TypeHash>,
    filter_id: usize,
    slot_kinds: Vec<CallbackKind>,
    use_factory: bool,
    intercept_during_construction: bool,
    version_tag: Option<i64>,
}

impl GenerationKey {
    /// Build a key from configuration components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        superclass: Option<TypeHash>,
        interfaces: Vec<TypeHash>,
        filter_id: usize,
        slot_kinds: Vec<CallbackKind>,
        use_factory: bool,
        intercept_during_construction: bool,
        version_tag: Option<i64>,
    ) -> Self {
        Self {
            superclass,
            interfaces,
            filter_id,
            slot_kinds,
            use_factory,
            intercept_during_construction,
            version_tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyforge_core::AllZero;

    fn key_with_filter(filter_id: usize) -> GenerationKey {
        GenerationKey::new(
            Some(TypeHash::from_name("Base")),
            vec![TypeHash::from_name("Capability")],
            filter_id,
            vec![CallbackKind::AroundAdvice],
            true,
            true,
            None,
        )
    }

    #[test]
    fn structural_components_compare_by_value() {
        assert_eq!(key_with_filter(1), key_with_filter(1));
    }

    #[test]
    fn filter_compares_by_identity() {
        let a: Arc<dyn CallbackFilter> = Arc::new(AllZero);
        let b: Arc<dyn CallbackFilter> = Arc::new(AllZero);
        // Same logic, different instances: different keys.
        assert_ne!(
            key_with_filter(filter_identity(&a)),
            key_with_filter(filter_identity(&b))
        );
        let a2 = Arc::clone(&a);
        assert_eq!(
            key_with_filter(filter_identity(&a)),
            key_with_filter(filter_identity(&a2))
        );
    }

    #[test]
    fn flags_participate_in_equality() {
        let base = key_with_filter(1);
        let other = GenerationKey::new(
            Some(TypeHash::from_name("Base")),
            vec![TypeHash::from_name("Capability")],
            1,
            vec![CallbackKind::AroundAdvice],
            false,
            true,
            None,
        );
        assert_ne!(base, other);
    }
}
