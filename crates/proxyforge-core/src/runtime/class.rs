//! The generated proxy class: a value-level dispatch record.
//!
//! Instead of emitting loadable code, generation assembles a [`ProxyClass`]:
//! an owned table of method thunks keyed by member signature, the
//! original-implementation trampolines those thunks proceed through, the
//! recorded visible constructors, and the slot layout. Once assembled and
//! published through the generation cache, a `ProxyClass` is immutable apart
//! from its callback registries and safe for unlimited concurrent reads.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use log::debug;
use rustc_hash::FxHashMap;

use crate::callback::{CallbackKind, CallbackSet, determine_kind};
use crate::model::{AllocFn, ClassModel, CtorModel, OriginalFn};
use crate::runtime::instance::ProxyInstance;
use crate::runtime::registry::{self, ScopedRegistration};
use crate::{CallError, GenerationError, MemberSig, ProxyError, TypeHash, Value, ValueKind};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

fn unit_alloc() -> Box<dyn Any + Send + Sync> {
    Box::new(())
}

/// A compiled override body: the trampoline chosen for one member at
/// generation time.
pub type MethodThunk = Box<dyn Fn(&ProxyInstance, &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// One override in the dispatch table.
pub struct CompiledMethod {
    sig: MemberSig,
    hash: TypeHash,
    slot: usize,
    force_public: bool,
    is_abstract: bool,
    thunk: MethodThunk,
}

impl CompiledMethod {
    /// Create a table entry for `sig`, dispatching through `thunk`.
    pub fn new(sig: MemberSig, slot: usize, thunk: MethodThunk) -> Self {
        let hash = sig.hash();
        Self {
            sig,
            hash,
            slot,
            force_public: false,
            is_abstract: false,
            thunk,
        }
    }

    /// Mark the override's visibility as forced public.
    pub fn force_public(mut self) -> Self {
        self.force_public = true;
        self
    }

    /// Mark the member abstract (no original implementation exists).
    pub fn abstract_member(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// The member signature.
    pub fn sig(&self) -> &MemberSig {
        &self.sig
    }

    /// The signature hash.
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// The callback slot this member routes through.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Whether the override is forced public.
    pub fn is_force_public(&self) -> bool {
        self.force_public
    }

    /// Whether the member is abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub(crate) fn dispatch(
        &self,
        instance: &ProxyInstance,
        args: &[Value],
    ) -> Result<Value, CallError> {
        (self.thunk)(instance, args)
    }
}

impl std::fmt::Debug for CompiledMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledMethod")
            .field("sig", &self.sig)
            .field("slot", &self.slot)
            .field("force_public", &self.force_public)
            .field("abstract", &self.is_abstract)
            .finish()
    }
}

/// Signature-keyed table of compiled overrides, in collection order.
#[derive(Default)]
pub struct DispatchTable {
    methods: Vec<CompiledMethod>,
    by_hash: FxHashMap<TypeHash, usize>,
}

impl DispatchTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an override. The first entry for a signature wins.
    pub fn insert(&mut self, method: CompiledMethod) {
        let hash = method.hash();
        if self.by_hash.contains_key(&hash) {
            return;
        }
        self.by_hash.insert(hash, self.methods.len());
        self.methods.push(method);
    }

    /// Look up an override by signature hash.
    pub fn get(&self, hash: TypeHash) -> Option<&CompiledMethod> {
        self.by_hash.get(&hash).map(|&i| &self.methods[i])
    }

    /// Resolve an override by name and argument values.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Option<&CompiledMethod> {
        self.methods
            .iter()
            .find(|m| m.sig().name() == name && m.sig().accepts(args))
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Iterate overrides in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledMethod> {
        self.methods.iter()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Everything the generator hands over when assembling a class.
pub struct ProxyClassSpec {
    /// The base type, if any.
    pub superclass: Option<Arc<ClassModel>>,
    /// Implemented interface hashes, in declaration order.
    pub interfaces: Vec<TypeHash>,
    /// Declared callback slot kinds, in order.
    pub slot_kinds: Vec<CallbackKind>,
    /// Whether the factory capability is exposed.
    pub use_factory: bool,
    /// Whether interception is active during construction.
    pub intercept_during_construction: bool,
    /// Optional serializable version tag.
    pub version_tag: Option<i64>,
    /// The compiled dispatch table.
    pub table: DispatchTable,
    /// Original-implementation siblings keyed by signature hash.
    pub originals: FxHashMap<TypeHash, OriginalFn>,
    /// Recorded visible constructors.
    pub constructors: Vec<CtorModel>,
}

/// A generated type: dispatch table, slot layout, recorded constructors,
/// and the class-level callback registries.
pub struct ProxyClass {
    class_id: u64,
    self_ref: Weak<ProxyClass>,
    superclass: Option<Arc<ClassModel>>,
    interfaces: Vec<TypeHash>,
    slot_kinds: Vec<CallbackKind>,
    use_factory: bool,
    intercept_during_construction: bool,
    version_tag: Option<i64>,
    table: DispatchTable,
    originals: FxHashMap<TypeHash, OriginalFn>,
    constructors: Vec<CtorModel>,
    allocate: AllocFn,
    process_callbacks: RwLock<Option<CallbackSet>>,
}

impl ProxyClass {
    /// Assemble a class from its generated parts.
    pub fn from_spec(spec: ProxyClassSpec) -> Arc<Self> {
        let class_id = NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed);
        let allocate = spec
            .superclass
            .as_ref()
            .map(|m| m.allocator())
            .unwrap_or(unit_alloc);
        debug!(
            "assembled proxy class #{class_id} over {:?} ({} member(s), {} slot(s))",
            spec.superclass.as_ref().map(|m| m.name().to_string()),
            spec.table.len(),
            spec.slot_kinds.len()
        );
        Arc::new_cyclic(|self_ref| Self {
            class_id,
            self_ref: self_ref.clone(),
            superclass: spec.superclass,
            interfaces: spec.interfaces,
            slot_kinds: spec.slot_kinds,
            use_factory: spec.use_factory,
            intercept_during_construction: spec.intercept_during_construction,
            version_tag: spec.version_tag,
            table: spec.table,
            originals: spec.originals,
            constructors: spec.constructors,
            allocate,
            process_callbacks: RwLock::new(None),
        })
    }

    fn arc(&self) -> Arc<ProxyClass> {
        match self.self_ref.upgrade() {
            Some(class) => class,
            // from_spec is the only constructor, so any live borrow implies
            // a live Arc.
            None => unreachable!("proxy class used outside its Arc"),
        }
    }

    /// Unique identity of this generated class within the process.
    pub fn class_id(&self) -> u64 {
        self.class_id
    }

    /// The base type model, if any.
    pub fn superclass(&self) -> Option<&Arc<ClassModel>> {
        self.superclass.as_ref()
    }

    /// Implemented interface hashes.
    pub fn interfaces(&self) -> &[TypeHash] {
        &self.interfaces
    }

    /// Whether the class implements the interface with the given hash.
    pub fn implements(&self, hash: TypeHash) -> bool {
        self.interfaces.contains(&hash)
    }

    /// Declared callback slot kinds.
    pub fn slot_kinds(&self) -> &[CallbackKind] {
        &self.slot_kinds
    }

    /// Whether the factory capability is exposed.
    pub fn use_factory(&self) -> bool {
        self.use_factory
    }

    /// Whether interception is active during construction.
    pub fn intercepts_during_construction(&self) -> bool {
        self.intercept_during_construction
    }

    /// The serializable version tag, if set.
    pub fn version_tag(&self) -> Option<i64> {
        self.version_tag
    }

    /// The compiled dispatch table.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Recorded visible constructors.
    pub fn constructors(&self) -> &[CtorModel] {
        &self.constructors
    }

    /// Original-implementation sibling for a member, if one exists.
    pub fn original(&self, hash: TypeHash) -> Option<&OriginalFn> {
        self.originals.get(&hash)
    }

    /// Display name for a member hash, for error reporting.
    pub(crate) fn member_name(&self, hash: TypeHash) -> String {
        self.table
            .get(hash)
            .map(|m| m.sig().to_string())
            .unwrap_or_else(|| hash.to_string())
    }

    // ==========================================================================
    // Callback registries
    // ==========================================================================

    /// Validate a callback set against the declared slot layout.
    pub fn check_set(&self, callbacks: &CallbackSet) -> Result<(), CallError> {
        if callbacks.len() != self.slot_kinds.len() {
            return Err(CallError::SlotCountMismatch {
                expected: self.slot_kinds.len(),
                got: callbacks.len(),
            });
        }
        for (index, (cb, declared)) in callbacks.iter().zip(&self.slot_kinds).enumerate() {
            match determine_kind(cb.as_ref(), index) {
                Ok(kind) if kind == *declared => {}
                _ => {
                    return Err(CallError::CallbackKindMismatch {
                        index,
                        declared: *declared,
                    });
                }
            }
        }
        Ok(())
    }

    /// Register callbacks for instances constructed on the current logical
    /// thread of control. Returns a guard that clears the registration when
    /// dropped, including on error paths.
    pub fn register_scoped(&self, callbacks: CallbackSet) -> Result<ScopedRegistration, CallError> {
        self.check_set(&callbacks)?;
        Ok(ScopedRegistration::enter(self.class_id, callbacks))
    }

    /// Overwrite the raw task-scoped registration without a guard. Passing
    /// `None` clears it. External drivers constructing instances outside the
    /// factory surface use this; prefer [`ProxyClass::register_scoped`].
    pub fn set_scoped_callbacks(&self, callbacks: Option<CallbackSet>) -> Result<(), CallError> {
        if let Some(cbs) = &callbacks {
            self.check_set(cbs)?;
        }
        registry::set_scoped(self.class_id, callbacks);
        Ok(())
    }

    /// Register process-wide callbacks. Never cleared automatically;
    /// concurrent registration is last-writer-wins.
    pub fn register_process_wide(&self, callbacks: CallbackSet) -> Result<(), CallError> {
        self.check_set(&callbacks)?;
        let mut guard = match self.process_callbacks.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(callbacks);
        Ok(())
    }

    pub(crate) fn scoped_callbacks(&self) -> Option<CallbackSet> {
        registry::get_scoped(self.class_id)
    }

    pub(crate) fn process_wide_callbacks(&self) -> Option<CallbackSet> {
        let guard = match self.process_callbacks.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Create an instance with the given callbacks via the no-arg
    /// constructor. The callbacks are registered task-scoped for exactly the
    /// duration of construction.
    pub fn instantiate(&self, callbacks: &CallbackSet) -> Result<ProxyInstance, ProxyError> {
        let _scope = self.register_scoped(callbacks.clone())?;
        self.construct_default()
    }

    /// Create an instance with the given callbacks via the constructor
    /// matching `arg_kinds`, passing `args`.
    pub fn instantiate_with(
        &self,
        arg_kinds: &[ValueKind],
        args: &[Value],
        callbacks: &CallbackSet,
    ) -> Result<ProxyInstance, ProxyError> {
        let _scope = self.register_scoped(callbacks.clone())?;
        self.construct_matching(arg_kinds, args)
    }

    /// Construct via the no-arg constructor using whatever the registries
    /// currently hold; the registries are read, not cleared. This is the
    /// path externally registered (factory-less) instances come through.
    pub fn construct_default(&self) -> Result<ProxyInstance, ProxyError> {
        let ctor = self
            .constructors
            .iter()
            .find(|c| c.is_no_arg())
            .ok_or_else(|| GenerationError::NoDefaultConstructor {
                name: self.superclass_name(),
            })?;
        Ok(self.construct(ctor, &[])?)
    }

    /// Construct via explicit constructor-descriptor matching.
    pub fn construct_matching(
        &self,
        arg_kinds: &[ValueKind],
        args: &[Value],
    ) -> Result<ProxyInstance, ProxyError> {
        let ctor = self
            .constructors
            .iter()
            .find(|c| c.matches(arg_kinds))
            .filter(|_| args.len() == arg_kinds.len())
            .ok_or(GenerationError::NoMatchingConstructor {
                arity: arg_kinds.len(),
            })?;
        Ok(self.construct(ctor, args)?)
    }

    fn construct(&self, ctor: &CtorModel, args: &[Value]) -> Result<ProxyInstance, CallError> {
        let target = (self.allocate)();
        let instance = ProxyInstance::shell(self.arc(), target);
        (ctor.init)(&instance, args)?;
        instance.ensure_bound()?;
        instance.mark_constructed();
        Ok(instance)
    }

    fn superclass_name(&self) -> String {
        self.superclass
            .as_ref()
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| "Object".to_string())
    }
}

impl std::fmt::Debug for ProxyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClass")
            .field("class_id", &self.class_id)
            .field("superclass", &self.superclass.as_ref().map(|m| m.name()))
            .field("slots", &self.slot_kinds)
            .field("members", &self.table.len())
            .finish()
    }
}
