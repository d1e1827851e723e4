//! Task-scoped callback storage.
//!
//! Callbacks travel from "about to construct" to the constructor's binding
//! step through per-thread, per-class storage. The storage is isolated per
//! logical thread of control, so concurrent unrelated constructions never
//! observe each other's callbacks, and it is always cleared after use:
//! [`ScopedRegistration`] clears on drop, including on exceptional exits.

use std::cell::RefCell;
use std::marker::PhantomData;

use log::trace;
use rustc_hash::FxHashMap;

use crate::callback::CallbackSet;

thread_local! {
    static SCOPED_CALLBACKS: RefCell<FxHashMap<u64, CallbackSet>> =
        RefCell::new(FxHashMap::default());
}

pub(crate) fn set_scoped(class_id: u64, callbacks: Option<CallbackSet>) {
    SCOPED_CALLBACKS.with(|cell| {
        let mut map = cell.borrow_mut();
        match callbacks {
            Some(cbs) => {
                trace!("scoped callbacks registered for class#{class_id}");
                map.insert(class_id, cbs);
            }
            None => {
                trace!("scoped callbacks cleared for class#{class_id}");
                map.remove(&class_id);
            }
        }
    });
}

pub(crate) fn get_scoped(class_id: u64) -> Option<CallbackSet> {
    SCOPED_CALLBACKS.with(|cell| cell.borrow().get(&class_id).cloned())
}

/// RAII handle for a task-scoped callback registration.
///
/// The registration is visible to binding performed on this thread while the
/// guard is alive, and removed when it drops. Guards are deliberately not
/// `Send`: a registration belongs to the thread of control that created it.
pub struct ScopedRegistration {
    class_id: u64,
    // Pins the guard to its creating thread.
    _not_send: PhantomData<*const ()>,
}

impl ScopedRegistration {
    pub(crate) fn enter(class_id: u64, callbacks: CallbackSet) -> Self {
        set_scoped(class_id, Some(callbacks));
        Self {
            class_id,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ScopedRegistration {
    fn drop(&mut self) {
        set_scoped(self.class_id, None);
    }
}
