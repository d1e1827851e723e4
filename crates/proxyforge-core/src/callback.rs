//! Callback strategy capabilities and kind determination.
//!
//! A callback is a pluggable behavior attached to one or more overridden
//! members. Five strategy capabilities are recognized:
//!
//! - [`AroundAdvice`]: full control before/after/instead of the original
//!   implementation, with a [`MethodProxy`] handle for proceeding.
//! - [`PassThrough`]: always calls the original implementation.
//! - [`FixedResult`]: returns a precomputed value; the original is never
//!   called.
//! - [`LazyDelegate`]: resolves a delegate object once per instance, then
//!   forwards members to it.
//! - [`ManualDispatch`]: a caller-supplied router keyed by signature.
//!
//! Concrete callback values implement [`Callback`] and override exactly one
//! of its `as_*` accessors; implementing zero or several makes the value's
//! strategy undeterminable and generation fails.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{CallError, GenerationError, MemberSig, Value};
use crate::runtime::{MethodProxy, ProxyInstance};

/// The strategy a callback slot dispatches through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Around-advice interception.
    AroundAdvice,
    /// Unconditional forwarding to the original implementation.
    PassThrough,
    /// Precomputed result, original never called.
    FixedResult,
    /// Once-per-instance delegate resolution, then forwarding.
    LazyDelegate,
    /// Caller-supplied routing keyed by signature.
    ManualDispatch,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallbackKind::AroundAdvice => "around-advice",
            CallbackKind::PassThrough => "pass-through",
            CallbackKind::FixedResult => "fixed-result",
            CallbackKind::LazyDelegate => "lazy-delegate",
            CallbackKind::ManualDispatch => "manual-dispatch",
        };
        write!(f, "{name}")
    }
}

/// Around-advice interception.
///
/// The interceptor runs instead of the original implementation and decides
/// whether to proceed through `proceed`, with which arguments, and what to
/// return.
pub trait AroundAdvice: Send + Sync {
    /// Intercept a member call.
    fn intercept(
        &self,
        instance: &ProxyInstance,
        member: &MemberSig,
        args: &[Value],
        proceed: &MethodProxy<'_>,
    ) -> Result<Value, CallError>;
}

/// Marker capability: members route straight to the original implementation.
pub trait PassThrough: Send + Sync {}

/// Precomputed-result capability: produces the value an overridden member
/// returns; the original implementation is never consulted.
pub trait FixedResult: Send + Sync {
    /// Produce the fixed value.
    fn fixed_value(&self) -> Result<Value, CallError>;
}

/// Lazy-delegate capability: resolves a substitute receiver object exactly
/// once per proxy instance; member calls forward to it afterwards.
pub trait LazyDelegate: Send + Sync {
    /// Resolve the delegate object.
    fn resolve(&self) -> Result<Box<dyn Any + Send + Sync>, CallError>;
}

/// Manual-dispatch capability: routes each call by member signature.
pub trait ManualDispatch: Send + Sync {
    /// Route a member call and produce its result.
    fn route(&self, member: &MemberSig, args: &[Value]) -> Result<Value, CallError>;
}

/// A pluggable interception behavior.
///
/// Implementations override exactly one `as_*` accessor to expose their
/// strategy capability; [`determine_kind`] rejects values exposing zero or
/// several.
pub trait Callback: Send + Sync + 'static {
    /// Expose the around-advice capability, if implemented.
    fn as_around(&self) -> Option<&dyn AroundAdvice> {
        None
    }

    /// Expose the pass-through capability, if implemented.
    fn as_pass_through(&self) -> Option<&dyn PassThrough> {
        None
    }

    /// Expose the fixed-result capability, if implemented.
    fn as_fixed(&self) -> Option<&dyn FixedResult> {
        None
    }

    /// Expose the lazy-delegate capability, if implemented.
    fn as_lazy(&self) -> Option<&dyn LazyDelegate> {
        None
    }

    /// Expose the manual-dispatch capability, if implemented.
    fn as_manual(&self) -> Option<&dyn ManualDispatch> {
        None
    }
}

impl core::fmt::Debug for dyn Callback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("dyn Callback")
    }
}

/// An ordered set of callback values, one per slot.
pub type CallbackSet = Vec<Arc<dyn Callback>>;

/// Determine the strategy kind of a concrete callback value.
///
/// A value must expose exactly one recognized capability; `index` is the
/// slot position used in error reporting.
pub fn determine_kind(cb: &dyn Callback, index: usize) -> Result<CallbackKind, GenerationError> {
    let mut found = None;
    let candidates = [
        (cb.as_around().is_some(), CallbackKind::AroundAdvice),
        (cb.as_pass_through().is_some(), CallbackKind::PassThrough),
        (cb.as_fixed().is_some(), CallbackKind::FixedResult),
        (cb.as_lazy().is_some(), CallbackKind::LazyDelegate),
        (cb.as_manual().is_some(), CallbackKind::ManualDispatch),
    ];
    for (implemented, kind) in candidates {
        if implemented {
            if found.is_some() {
                return Err(GenerationError::AmbiguousCallback { index });
            }
            found = Some(kind);
        }
    }
    found.ok_or(GenerationError::UnknownCallback { index })
}

/// Determine the strategy kinds of an ordered callback set.
pub fn determine_kinds(callbacks: &CallbackSet) -> Result<Vec<CallbackKind>, GenerationError> {
    callbacks
        .iter()
        .enumerate()
        .map(|(i, cb)| determine_kind(cb.as_ref(), i))
        .collect()
}

/// The stock pass-through callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct Forward;

impl PassThrough for Forward {}

impl Callback for Forward {
    fn as_pass_through(&self) -> Option<&dyn PassThrough> {
        Some(self)
    }
}
