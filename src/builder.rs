//! Proxy configuration, validation, and generation.
//!
//! [`ProxyBuilder`] accumulates a configuration through setters, validates
//! it, and either returns the generated class (class-only mode) or creates
//! an instance with the configured callbacks. Generated classes are cached
//! by structural key; two builds with equal keys share one class.

use std::sync::Arc;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use proxyforge_core::model::{ClassModel, CtorModel, InterfaceModel, TypeRef};
use proxyforge_core::runtime::{ProxyClass, ProxyClassSpec, ProxyInstance, factory_capability_hash};
use proxyforge_core::{
    AllZero, Callback, CallbackFilter, CallbackKind, CallbackSet, ConfigError, GenerationError,
    MemberInfo, ProxyError, TypeHash, Value, ValueKind, Visibility, determine_kind, determine_kinds,
};
use proxyforge_registry::{GenerationCache, GenerationKey, filter_identity};

use crate::collect::{CollectedMember, collect_members};
use crate::emit::{EmitContext, TableBuilder, emitter_for};

/// Builder for proxy classes and instances.
///
/// A builder is intended for one configuration; to create further instances
/// of an already generated class, use the instance factory surface instead.
pub struct ProxyBuilder {
    superclass: Option<Arc<ClassModel>>,
    interfaces: Vec<Arc<InterfaceModel>>,
    callbacks: Option<CallbackSet>,
    callback_kinds: Option<Vec<CallbackKind>>,
    filter: Option<Arc<dyn CallbackFilter>>,
    use_factory: bool,
    intercept_during_construction: bool,
    version_tag: Option<i64>,
    class_only: bool,
    cache: Option<Arc<GenerationCache>>,
}

impl Default for ProxyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            superclass: None,
            interfaces: Vec::new(),
            callbacks: None,
            callback_kinds: None,
            filter: None,
            use_factory: true,
            intercept_during_construction: true,
            version_tag: None,
            class_only: false,
            cache: None,
        }
    }

    /// Create an instance over `superclass` with one callback for every
    /// member.
    pub fn proxy(
        superclass: Arc<ClassModel>,
        callback: Arc<dyn Callback>,
    ) -> Result<ProxyInstance, ProxyError> {
        ProxyBuilder::new()
            .superclass(superclass)
            .callback(callback)
            .create()
    }

    /// Create an instance over `superclass` and `interfaces`, routing
    /// members through `filter` into `callbacks`.
    pub fn proxy_with(
        superclass: Arc<ClassModel>,
        interfaces: Vec<Arc<InterfaceModel>>,
        filter: Arc<dyn CallbackFilter>,
        callbacks: CallbackSet,
    ) -> Result<ProxyInstance, ProxyError> {
        ProxyBuilder::new()
            .superclass(superclass)
            .interfaces(interfaces)
            .filter(filter)
            .callbacks(callbacks)
            .create()
    }

    // ==========================================================================
    // Configuration
    // ==========================================================================

    /// Set the base class the generated type extends.
    pub fn superclass(mut self, superclass: Arc<ClassModel>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Extend a base-type reference. A class lands in the superclass
    /// position; an interface is added to the interface list instead.
    pub fn extend(mut self, base: impl Into<TypeRef>) -> Self {
        match base.into() {
            TypeRef::Class(model) => self.superclass = Some(model),
            TypeRef::Interface(model) => self.interfaces.push(model),
        }
        self
    }

    /// Add a capability interface.
    pub fn interface(mut self, interface: Arc<InterfaceModel>) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set the capability interface list.
    pub fn interfaces(mut self, interfaces: Vec<Arc<InterfaceModel>>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Use a single callback for every member.
    pub fn callback(self, callback: Arc<dyn Callback>) -> Self {
        self.callbacks(vec![callback])
    }

    /// Set the callback array; the filter routes members into it by index.
    pub fn callbacks(mut self, callbacks: CallbackSet) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Declare a single callback kind without a concrete value (class-only
    /// generation).
    pub fn callback_kind(self, kind: CallbackKind) -> Self {
        self.callback_kinds(vec![kind])
    }

    /// Declare the callback kind array without concrete values (class-only
    /// generation).
    pub fn callback_kinds(mut self, kinds: Vec<CallbackKind>) -> Self {
        self.callback_kinds = Some(kinds);
        self
    }

    /// Set the member-to-slot filter.
    pub fn filter(mut self, filter: Arc<dyn CallbackFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Control whether generated instances expose the factory capability.
    /// Defaults to `true`.
    pub fn use_factory(mut self, use_factory: bool) -> Self {
        self.use_factory = use_factory;
        self
    }

    /// Control whether members called from within the constructor are
    /// intercepted. Defaults to `true`; when disabled, such calls dispatch
    /// to the original implementation until construction completes.
    pub fn intercept_during_construction(mut self, intercept: bool) -> Self {
        self.intercept_during_construction = intercept;
        self
    }

    /// Attach a serializable version tag; participates in the cache key.
    pub fn version_tag(mut self, tag: i64) -> Self {
        self.version_tag = Some(tag);
        self
    }

    /// Generate against a private cache instead of the process-wide one.
    pub fn cache(mut self, cache: Arc<GenerationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    // ==========================================================================
    // Creation entry points
    // ==========================================================================

    /// Generate the class if necessary and create an instance through the
    /// no-arg constructor, using the configured callbacks.
    pub fn create(mut self) -> Result<ProxyInstance, ProxyError> {
        self.class_only = false;
        let (class, callbacks) = self.build_parts()?;
        let callbacks = callbacks.ok_or(ConfigError::CallbacksRequired)?;
        class.instantiate(&callbacks)
    }

    /// Generate the class if necessary and create an instance through the
    /// constructor matching `arg_kinds`, passing `args`.
    pub fn create_with(
        mut self,
        arg_kinds: Vec<ValueKind>,
        args: Vec<Value>,
    ) -> Result<ProxyInstance, ProxyError> {
        self.class_only = false;
        if arg_kinds.len() != args.len() {
            return Err(ConfigError::ArgumentArityMismatch.into());
        }
        let (class, callbacks) = self.build_parts()?;
        let callbacks = callbacks.ok_or(ConfigError::CallbacksRequired)?;
        class.instantiate_with(&arg_kinds, &args, &callbacks)
    }

    /// Generate the class if necessary and return it without creating an
    /// instance. Concrete callbacks are not accepted in this mode; declare
    /// callback kinds instead and register callbacks before constructing.
    pub fn create_class(mut self) -> Result<Arc<ProxyClass>, ProxyError> {
        self.class_only = true;
        let (class, _) = self.build_parts()?;
        Ok(class)
    }

    // ==========================================================================
    // Validation and generation
    // ==========================================================================

    fn validate(&mut self) -> Result<(), ProxyError> {
        if self.class_only {
            if self.callbacks.is_some() {
                return Err(ConfigError::CallbacksNotAccepted.into());
            }
            if self.callback_kinds.is_none() {
                return Err(ConfigError::KindsRequired.into());
            }
        } else if self.callbacks.is_none() {
            return Err(ConfigError::CallbacksRequired.into());
        }
        if let Some(callbacks) = &self.callbacks {
            if callbacks.is_empty() {
                return Err(ConfigError::EmptyCallbacks.into());
            }
        }
        if let Some(kinds) = &self.callback_kinds {
            if kinds.is_empty() {
                return Err(ConfigError::EmptyCallbacks.into());
            }
        }

        match (&self.callbacks, &self.callback_kinds) {
            (Some(callbacks), Some(kinds)) => {
                if callbacks.len() != kinds.len() {
                    return Err(ConfigError::LengthMismatch {
                        callbacks: callbacks.len(),
                        kinds: kinds.len(),
                    }
                    .into());
                }
                for (index, (cb, declared)) in callbacks.iter().zip(kinds).enumerate() {
                    let found = determine_kind(cb.as_ref(), index)?;
                    if found != *declared {
                        return Err(ConfigError::NotAssignable {
                            index,
                            found,
                            declared: *declared,
                        }
                        .into());
                    }
                }
            }
            (Some(callbacks), None) => {
                self.callback_kinds = Some(determine_kinds(callbacks)?);
            }
            _ => {}
        }

        if self.filter.is_none() {
            let slot_count = self.callback_kinds.as_ref().map(Vec::len).unwrap_or(0);
            if slot_count > 1 {
                return Err(ConfigError::AmbiguousRouting.into());
            }
            self.filter = Some(default_filter());
        }

        if let Some(superclass) = &self.superclass {
            if superclass.is_final() {
                return Err(ConfigError::FinalSuperclass {
                    name: superclass.name().to_string(),
                }
                .into());
            }
            let visible = superclass
                .constructors()
                .iter()
                .any(|c| c.visibility != Visibility::Private);
            if !visible {
                return Err(ConfigError::NoVisibleConstructors {
                    name: superclass.name().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn build_parts(&mut self) -> Result<(Arc<ProxyClass>, Option<CallbackSet>), ProxyError> {
        self.validate()?;
        let kinds = self
            .callback_kinds
            .clone()
            .ok_or(ConfigError::KindsRequired)?;
        let filter = self
            .filter
            .clone()
            .ok_or(ConfigError::AmbiguousRouting)?;

        let key = GenerationKey::new(
            self.superclass.as_ref().map(|m| m.type_hash()),
            self.interfaces.iter().map(|i| i.type_hash()).collect(),
            filter_identity(&filter),
            kinds.clone(),
            self.use_factory,
            self.intercept_during_construction,
            self.version_tag,
        );

        let cache = self.cache.clone();
        let cache: &GenerationCache = cache.as_deref().unwrap_or_else(|| GenerationCache::global());
        let superclass = self.superclass.clone();
        let interfaces = self.interfaces.clone();
        let use_factory = self.use_factory;
        let intercept = self.intercept_during_construction;
        let version_tag = self.version_tag;
        let class = cache.get_or_generate(key, || {
            generate_class(
                superclass,
                interfaces,
                kinds,
                filter,
                use_factory,
                intercept,
                version_tag,
            )
        })?;
        Ok((class, self.callbacks.clone()))
    }
}

/// The shared default filter. A single instance is reused so that
/// single-callback configurations keep identical generation keys across
/// builders; the filter component of the key compares by identity.
fn default_filter() -> Arc<dyn CallbackFilter> {
    static ALL_ZERO: std::sync::OnceLock<Arc<dyn CallbackFilter>> = std::sync::OnceLock::new();
    Arc::clone(ALL_ZERO.get_or_init(|| Arc::new(AllZero)))
}

/// Synthesize a proxy class for a validated configuration.
#[allow(clippy::too_many_arguments)]
fn generate_class(
    superclass: Option<Arc<ClassModel>>,
    interfaces: Vec<Arc<InterfaceModel>>,
    kinds: Vec<CallbackKind>,
    filter: Arc<dyn CallbackFilter>,
    use_factory: bool,
    intercept_during_construction: bool,
    version_tag: Option<i64>,
) -> Result<Arc<ProxyClass>, GenerationError> {
    let package = superclass.as_ref().map(|m| m.package()).unwrap_or("");
    let members = collect_members(superclass.as_ref(), &interfaces, package);
    debug!(
        "generating proxy class over {:?}: {} member(s), {} slot(s)",
        superclass.as_ref().map(|m| m.name()),
        members.len(),
        kinds.len()
    );

    // Classify every member through the filter, then group by strategy.
    let infos: Vec<MemberInfo> = members.iter().map(|m| m.info.clone()).collect();
    let mut slot_of: FxHashMap<TypeHash, usize> = FxHashMap::default();
    let mut groups: FxHashMap<CallbackKind, Vec<usize>> = FxHashMap::default();
    for (position, member) in members.iter().enumerate() {
        let index = filter.accept(&member.info, &infos);
        if index >= kinds.len() {
            return Err(GenerationError::FilterIndexOutOfRange {
                member: member.info.sig.to_string(),
                index,
                slots: kinds.len(),
            });
        }
        slot_of.insert(member.info.sig.hash(), index);
        groups.entry(kinds[index]).or_default().push(position);
    }

    // Each strategy's emitter runs exactly once, in the stable order the
    // kind sequence first mentions it.
    let ctx = EmitContext::new(slot_of, intercept_during_construction);
    let mut builder = TableBuilder::new();
    let mut emitted: FxHashSet<CallbackKind> = FxHashSet::default();
    for kind in &kinds {
        if !emitted.insert(*kind) {
            continue;
        }
        if let Some(group) = groups.get(kind) {
            let group: Vec<&CollectedMember> = group.iter().map(|&i| &members[i]).collect();
            emitter_for(*kind).emit(&mut builder, &ctx, &group)?;
        }
    }
    let (table, originals) = builder.finish();

    // Record the base constructors a subclass could forward to.
    let constructors: Vec<CtorModel> = match &superclass {
        Some(model) => model
            .constructors()
            .iter()
            .filter(|c| c.visibility != Visibility::Private)
            .cloned()
            .collect(),
        None => vec![CtorModel::no_arg()],
    };

    let mut interface_hashes: Vec<TypeHash> = interfaces.iter().map(|i| i.type_hash()).collect();
    if use_factory {
        interface_hashes.push(factory_capability_hash());
    }

    Ok(ProxyClass::from_spec(ProxyClassSpec {
        superclass,
        interfaces: interface_hashes,
        slot_kinds: kinds,
        use_factory,
        intercept_during_construction,
        version_tag,
        table,
        originals,
        constructors,
    }))
}
