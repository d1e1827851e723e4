//! Generation, caching, and collection behavior.

mod common;

use std::sync::Arc;

use proxyforge::{
    CallbackFilter, CallbackKind, GenerationCache, GenerationError, ProxyBuilder, ProxyError,
    ValueKind, collect_methods, factory_capability_hash, is_proxy,
};

use common::{NameRouting, Recorder, Wild, counter_class, renderable_interface};

#[test]
fn identical_configurations_share_one_generated_class() {
    let cache = Arc::new(GenerationCache::new());
    let (advice_a, _) = Recorder::new(0);
    let (advice_b, _) = Recorder::new(10);

    // Different callback values, same structural configuration.
    let a = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice_a)
        .cache(Arc::clone(&cache))
        .create()
        .expect("first build");
    let b = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice_b)
        .cache(Arc::clone(&cache))
        .create()
        .expect("second build");

    assert!(Arc::ptr_eq(a.class(), b.class()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn filter_identity_distinguishes_identical_logic() {
    let cache = Arc::new(GenerationCache::new());
    let routes = || NameRouting {
        routes: vec![("get", 0)],
        fallback: 0,
    };
    let (advice_a, _) = Recorder::new(0);
    let (advice_b, _) = Recorder::new(0);

    let filter_a: Arc<dyn CallbackFilter> = Arc::new(routes());
    let filter_b: Arc<dyn CallbackFilter> = Arc::new(routes());
    let a = ProxyBuilder::new()
        .superclass(counter_class())
        .filter(filter_a)
        .callbacks(vec![advice_a])
        .cache(Arc::clone(&cache))
        .create()
        .expect("first build");
    let b = ProxyBuilder::new()
        .superclass(counter_class())
        .filter(filter_b)
        .callbacks(vec![advice_b])
        .cache(Arc::clone(&cache))
        .create()
        .expect("second build");

    // Same routing logic, new filter instance: a distinct generated class.
    assert!(!Arc::ptr_eq(a.class(), b.class()));
    assert_eq!(cache.len(), 2);
}

#[test]
fn shared_filter_instance_shares_the_class() {
    let cache = Arc::new(GenerationCache::new());
    let filter: Arc<dyn CallbackFilter> = Arc::new(NameRouting {
        routes: vec![("get", 0)],
        fallback: 0,
    });
    let (advice_a, _) = Recorder::new(0);
    let (advice_b, _) = Recorder::new(0);

    let a = ProxyBuilder::new()
        .superclass(counter_class())
        .filter(Arc::clone(&filter))
        .callbacks(vec![advice_a])
        .cache(Arc::clone(&cache))
        .create()
        .expect("first build");
    let b = ProxyBuilder::new()
        .superclass(counter_class())
        .filter(filter)
        .callbacks(vec![advice_b])
        .cache(Arc::clone(&cache))
        .create()
        .expect("second build");

    assert!(Arc::ptr_eq(a.class(), b.class()));
}

#[test]
fn differing_flags_generate_distinct_classes() {
    let cache = Arc::new(GenerationCache::new());
    let (advice_a, _) = Recorder::new(0);
    let (advice_b, _) = Recorder::new(0);

    let a = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice_a)
        .cache(Arc::clone(&cache))
        .create()
        .expect("factory build");
    let b = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice_b)
        .use_factory(false)
        .cache(Arc::clone(&cache))
        .create()
        .expect("no-factory build");

    assert!(!Arc::ptr_eq(a.class(), b.class()));
}

#[test]
fn out_of_range_filter_index_fails_generation() {
    let (advice, _) = Recorder::new(0);
    let err = ProxyBuilder::new()
        .superclass(counter_class())
        .filter(Arc::new(Wild(9)))
        .callbacks(vec![advice])
        .cache(Arc::new(GenerationCache::new()))
        .create()
        .unwrap_err();
    assert!(matches!(
        err,
        ProxyError::Generation(GenerationError::FilterIndexOutOfRange { index: 9, slots: 1, .. })
    ));
}

#[test]
fn class_only_generation_returns_a_class() {
    let class = ProxyBuilder::new()
        .superclass(counter_class())
        .callback_kind(CallbackKind::AroundAdvice)
        .cache(Arc::new(GenerationCache::new()))
        .create_class()
        .expect("class-only build");
    assert_eq!(class.slot_kinds(), &[CallbackKind::AroundAdvice]);
    assert_eq!(class.table().len(), 3);
    assert!(class.implements(factory_capability_hash()));
}

#[test]
fn disabling_factory_removes_the_capability_interface() {
    let class = ProxyBuilder::new()
        .superclass(counter_class())
        .callback_kind(CallbackKind::PassThrough)
        .use_factory(false)
        .cache(Arc::new(GenerationCache::new()))
        .create_class()
        .expect("class-only build");
    assert!(!class.implements(factory_capability_hash()));
}

#[test]
fn collect_methods_lists_overridable_members_in_walk_order() {
    let members = collect_methods(Some(&counter_class()), &[renderable_interface()]);
    let names: Vec<&str> = members.iter().map(|m| m.sig.name()).collect();
    assert_eq!(names, vec!["get", "set", "describe", "render"]);
}

#[test]
fn generated_instances_are_recognizable() {
    let (advice, _) = Recorder::new(0);
    let instance = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice)
        .cache(Arc::new(GenerationCache::new()))
        .create()
        .expect("build");
    assert!(is_proxy(&instance));
    assert!(!is_proxy(&42i32));
}

#[test]
fn no_matching_constructor_is_reported() {
    let (advice, _) = Recorder::new(0);
    let err = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice)
        .cache(Arc::new(GenerationCache::new()))
        .create_with(vec![ValueKind::Str], vec!["x".into()])
        .unwrap_err();
    assert!(matches!(
        err,
        ProxyError::Generation(GenerationError::NoMatchingConstructor { arity: 1 })
    ));
}

#[test]
fn constructor_argument_arity_must_match() {
    let (advice, _) = Recorder::new(0);
    let err = ProxyBuilder::new()
        .superclass(counter_class())
        .callback(advice)
        .cache(Arc::new(GenerationCache::new()))
        .create_with(vec![ValueKind::Int], vec![])
        .unwrap_err();
    assert!(err.is_config());
}
