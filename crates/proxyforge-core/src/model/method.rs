//! Method models: a signature plus its original-implementation trampoline.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{CallError, MemberModifiers, MemberSig, Value, Visibility};

/// A statically compiled trampoline invoking a member's original
/// implementation against receiver state.
pub type OriginalFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// An overridable member as declared by a base type.
#[derive(Clone)]
pub struct MethodModel {
    /// The member signature.
    pub sig: MemberSig,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declared modifiers.
    pub modifiers: MemberModifiers,
    /// Original-implementation trampoline; `None` marks the member abstract.
    pub body: Option<OriginalFn>,
}

impl MethodModel {
    /// A public, concrete member with the given body.
    pub fn new<F>(sig: MemberSig, body: F) -> Self
    where
        F: Fn(&mut (dyn Any + Send + Sync), &[Value]) -> Result<Value, CallError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            sig,
            visibility: Visibility::Public,
            modifiers: MemberModifiers::empty(),
            body: Some(Arc::new(body)),
        }
    }

    /// A typed convenience over [`MethodModel::new`] that downcasts the
    /// receiver before invoking the body.
    pub fn of<T, F>(sig: MemberSig, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut T, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::new(sig, move |target, args| {
            let typed = target
                .downcast_mut::<T>()
                .ok_or(CallError::TargetTypeMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
            body(typed, args)
        })
    }

    /// An abstract member (no body anywhere on the base chain).
    pub fn abstract_member(sig: MemberSig) -> Self {
        Self {
            sig,
            visibility: Visibility::Public,
            modifiers: MemberModifiers::ABSTRACT,
            body: None,
        }
    }

    /// Set the declared visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add declared modifiers.
    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }
}

impl fmt::Debug for MethodModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodModel")
            .field("sig", &self.sig)
            .field("visibility", &self.visibility)
            .field("modifiers", &self.modifiers)
            .field("abstract", &self.body.is_none())
            .finish()
    }
}
