//! Proxy instances and the lazy binding runtime.
//!
//! An instance owns its receiver state and its callback slot array. Slots
//! start empty; the first access after construction claims the `bound` flag
//! and populates the slots from the task-scoped registry, falling back to
//! the process-scoped one. After binding, the slot fields are authoritative
//! and the registries are never consulted again for this instance.
//!
//! Binding races between concurrent first-calls are benign by construction:
//! the claim is an atomic compare-and-set and the slot writes are idempotent
//! (every binder reads the same registries and writes the same values).

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};

use log::trace;

use crate::callback::{Callback, LazyDelegate};
use crate::model::OriginalFn;
use crate::runtime::class::ProxyClass;
use crate::{CallError, TypeHash, Value};

type Slots = RwLock<Box<[Option<Arc<dyn Callback>>]>>;

/// One object of a generated proxy class.
pub struct ProxyInstance {
    class: Arc<ProxyClass>,
    target: Mutex<Box<dyn Any + Send + Sync>>,
    slots: Slots,
    lazy: Box<[Mutex<Option<Box<dyn Any + Send + Sync>>>]>,
    bound: AtomicBool,
    constructed: AtomicBool,
}

impl ProxyInstance {
    pub(crate) fn shell(class: Arc<ProxyClass>, target: Box<dyn Any + Send + Sync>) -> Self {
        let slot_count = class.slot_kinds().len();
        let slots = (0..slot_count).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        let lazy = (0..slot_count)
            .map(|_| Mutex::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            class,
            target: Mutex::new(target),
            slots: RwLock::new(slots),
            lazy,
            bound: AtomicBool::new(false),
            constructed: AtomicBool::new(false),
        }
    }

    /// The generated class this instance belongs to.
    pub fn class(&self) -> &Arc<ProxyClass> {
        &self.class
    }

    /// Invoke an overridden member by name, resolving among overloads by the
    /// supplied argument values.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let method = self
            .class
            .table()
            .resolve(name, args)
            .ok_or_else(|| CallError::unknown_member(name, args.len()))?;
        method.dispatch(self, args)
    }

    /// Invoke an overridden member by signature hash.
    pub fn invoke_hash(&self, hash: TypeHash, args: &[Value]) -> Result<Value, CallError> {
        let method = self
            .class
            .table()
            .get(hash)
            .ok_or_else(|| CallError::unknown_member(self.class.member_name(hash), args.len()))?;
        method.dispatch(self, args)
    }

    /// Run an original-implementation trampoline against this instance's
    /// receiver state, bypassing dispatch entirely.
    pub fn apply_original(&self, f: &OriginalFn, args: &[Value]) -> Result<Value, CallError> {
        let mut target = self.lock_target();
        f(target.as_mut(), args)
    }

    /// Call the original superclass implementation of a member directly,
    /// bypassing interception. This is the sibling entry advice `proceed`
    /// routes through.
    pub fn call_original(&self, hash: TypeHash, args: &[Value]) -> Result<Value, CallError> {
        let original = self
            .class
            .original(hash)
            .cloned()
            .ok_or_else(|| CallError::AbstractOriginal {
                member: self.class.member_name(hash),
            })?;
        let mut target = self.lock_target();
        original(target.as_mut(), args)
    }

    // ==========================================================================
    // Binding
    // ==========================================================================

    /// Whether the instance has bound its callback slots.
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    /// Bind callback slots from the registries, exactly once per instance.
    ///
    /// The first caller claims the `bound` flag and copies the resolved
    /// callbacks into the slot fields; every later call is a no-op. Returns
    /// whether this call performed the bind.
    pub fn ensure_bound(&self) -> Result<bool, CallError> {
        if self
            .bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }
        let source = self
            .class
            .scoped_callbacks()
            .or_else(|| self.class.process_wide_callbacks());
        if let Some(callbacks) = source {
            self.class.check_set(&callbacks)?;
            let mut slots = self.write_slots();
            for (slot, cb) in slots.iter_mut().zip(callbacks) {
                *slot = Some(cb);
            }
            trace!("bound callbacks for instance of class#{}", self.class.class_id());
        }
        Ok(true)
    }

    /// Read a callback slot, binding first if the slot is still empty and
    /// the instance is unbound. Errors if the slot stays empty.
    pub fn callback_at(&self, index: usize, member: &str) -> Result<Arc<dyn Callback>, CallError> {
        if let Some(cb) = self.read_slot(index) {
            return Ok(cb);
        }
        self.ensure_bound()?;
        self.read_slot(index).ok_or_else(|| CallError::UnboundCallback {
            member: member.to_string(),
            index,
        })
    }

    pub(crate) fn read_slot(&self, index: usize) -> Option<Arc<dyn Callback>> {
        let slots = self.read_slots();
        slots.get(index).and_then(|s| s.clone())
    }

    pub(crate) fn write_slot(&self, index: usize, cb: Arc<dyn Callback>) {
        let mut slots = self.write_slots();
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(cb);
        }
    }

    pub(crate) fn snapshot_slots(&self) -> Vec<Option<Arc<dyn Callback>>> {
        self.read_slots().to_vec()
    }

    // ==========================================================================
    // Construction-time interception
    // ==========================================================================

    /// Whether the generated constructor has completed.
    pub fn is_constructed(&self) -> bool {
        self.constructed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_constructed(&self) {
        self.constructed.store(true, Ordering::Release);
    }

    // ==========================================================================
    // Receiver state access
    // ==========================================================================

    /// Run a closure against the typed receiver state.
    pub fn with_target<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, CallError> {
        let target = self.lock_target();
        let typed = target
            .downcast_ref::<T>()
            .ok_or(CallError::TargetTypeMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(f(typed))
    }

    /// Run a closure against the typed receiver state, mutably.
    pub fn with_target_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, CallError> {
        let mut target = self.lock_target();
        let typed = target
            .downcast_mut::<T>()
            .ok_or(CallError::TargetTypeMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(f(typed))
    }

    /// Resolve the lazy delegate for a slot (once per instance) and run a
    /// closure against it.
    pub fn with_lazy_delegate<R>(
        &self,
        index: usize,
        callback: &dyn LazyDelegate,
        f: impl FnOnce(&mut (dyn Any + Send + Sync)) -> Result<R, CallError>,
    ) -> Result<R, CallError> {
        let cell = self
            .lazy
            .get(index)
            .ok_or(CallError::DelegateResolution {
                detail: format!("no delegate cell for slot {index}"),
            })?;
        let mut guard = match cell.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_none() {
            *guard = Some(callback.resolve()?);
        }
        match guard.as_mut() {
            Some(delegate) => f(delegate.as_mut()),
            None => Err(CallError::DelegateResolution {
                detail: format!("delegate for slot {index} unavailable"),
            }),
        }
    }

    fn lock_target(&self) -> MutexGuard<'_, Box<dyn Any + Send + Sync>> {
        match self.target.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, Box<[Option<Arc<dyn Callback>>]>> {
        match self.slots.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, Box<[Option<Arc<dyn Callback>>]>> {
        match self.slots.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for ProxyInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyInstance")
            .field("class", &self.class.class_id())
            .field("bound", &self.is_bound())
            .field("constructed", &self.is_constructed())
            .finish()
    }
}

/// Handle through which around-advice proceeds to the original
/// implementation of the intercepted member.
pub struct MethodProxy<'a> {
    instance: &'a ProxyInstance,
    hash: TypeHash,
}

impl<'a> MethodProxy<'a> {
    /// Create a proceed handle for the member with the given signature hash.
    pub fn new(instance: &'a ProxyInstance, hash: TypeHash) -> Self {
        Self { instance, hash }
    }

    /// Invoke the original implementation with the given arguments.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, CallError> {
        self.instance.call_original(self.hash, args)
    }
}
