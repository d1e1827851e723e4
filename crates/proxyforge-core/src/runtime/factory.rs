//! Factory capability of generated instances.
//!
//! When enabled at generation time, instances can create further instances
//! sharing the class's callback configuration, and can read or replace
//! individual callback slots after construction. Every accessor binds
//! defensively first, so instances constructed outside the factory surface
//! (via external registration) still observe bound slots.

use std::any::Any;
use std::sync::Arc;

use crate::callback::{Callback, CallbackSet, determine_kind};
use crate::runtime::instance::ProxyInstance;
use crate::{CallError, ProxyError, TypeHash, Value, ValueKind};

/// Identity hash of the factory capability interface itself.
///
/// The member collector skips this interface to avoid self-reference, and
/// generated classes that expose the capability list it among their
/// implemented interfaces.
pub fn factory_capability_hash() -> TypeHash {
    TypeHash::from_name("proxyforge.Factory")
}

/// Whether a value is an instance produced by this engine.
pub fn is_proxy(value: &dyn Any) -> bool {
    value.is::<ProxyInstance>()
}

impl ProxyInstance {
    fn require_factory(&self) -> Result<(), CallError> {
        if self.class().use_factory() {
            Ok(())
        } else {
            Err(CallError::FactoryDisabled)
        }
    }

    /// Create a new instance of the same class with the given callbacks,
    /// using the no-arg constructor.
    pub fn new_instance(&self, callbacks: CallbackSet) -> Result<ProxyInstance, ProxyError> {
        self.require_factory().map_err(ProxyError::from)?;
        self.class().instantiate(&callbacks)
    }

    /// Create a new instance with a single callback. Valid only when the
    /// class declares at most one callback slot.
    pub fn new_instance_single(&self, callback: Arc<dyn Callback>) -> Result<ProxyInstance, ProxyError> {
        self.require_factory().map_err(ProxyError::from)?;
        match self.class().slot_kinds().len() {
            0 => self.class().instantiate(&Vec::new()),
            1 => self.class().instantiate(&vec![callback]),
            _ => Err(CallError::MoreThanOneCallback.into()),
        }
    }

    /// Create a new instance via the constructor matching `arg_kinds`.
    pub fn new_instance_with(
        &self,
        arg_kinds: &[ValueKind],
        args: &[Value],
        callbacks: CallbackSet,
    ) -> Result<ProxyInstance, ProxyError> {
        self.require_factory().map_err(ProxyError::from)?;
        self.class().instantiate_with(arg_kinds, args, &callbacks)
    }

    /// Read one callback slot. Out-of-range indices return `None`.
    pub fn get_callback(&self, index: usize) -> Result<Option<Arc<dyn Callback>>, CallError> {
        self.require_factory()?;
        self.ensure_bound()?;
        Ok(self.read_slot(index))
    }

    /// Replace one callback slot. Out-of-range indices are ignored; the
    /// supplied callback must implement the slot's declared kind.
    pub fn set_callback(&self, index: usize, callback: Arc<dyn Callback>) -> Result<(), CallError> {
        self.require_factory()?;
        self.ensure_bound()?;
        let Some(declared) = self.class().slot_kinds().get(index).copied() else {
            return Ok(());
        };
        match determine_kind(callback.as_ref(), index) {
            Ok(kind) if kind == declared => {
                self.write_slot(index, callback);
                Ok(())
            }
            _ => Err(CallError::CallbackKindMismatch { index, declared }),
        }
    }

    /// Read the whole callback slot array, in slot order.
    pub fn get_callbacks(&self) -> Result<Vec<Option<Arc<dyn Callback>>>, CallError> {
        self.require_factory()?;
        self.ensure_bound()?;
        Ok(self.snapshot_slots())
    }

    /// Replace the whole callback slot array.
    pub fn set_callbacks(&self, callbacks: CallbackSet) -> Result<(), CallError> {
        self.require_factory()?;
        self.ensure_bound()?;
        self.class().check_set(&callbacks)?;
        for (index, cb) in callbacks.into_iter().enumerate() {
            self.write_slot(index, cb);
        }
        Ok(())
    }
}
