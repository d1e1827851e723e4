//! Per-strategy dispatch emitters.
//!
//! Each recognized callback strategy owns the template for the method bodies
//! it emits. An emitter is invoked exactly once per generation with the full
//! group of members assigned to its strategy; it writes one trampoline per
//! member into the table, plus the original-implementation sibling where the
//! strategy proceeds through one.

use proxyforge_core::runtime::{MethodProxy, MethodThunk};
use proxyforge_core::{CallError, CallbackKind, GenerationError};

use crate::collect::CollectedMember;
use crate::emit::{EmitContext, TableBuilder};

/// A strategy's method-body emitter.
pub(crate) trait DispatchEmitter: Sync {
    /// Emit trampolines for every member in `group`.
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError>;
}

/// The emitter owning a strategy's body template.
pub(crate) fn emitter_for(kind: CallbackKind) -> &'static dyn DispatchEmitter {
    match kind {
        CallbackKind::AroundAdvice => &AroundAdviceEmitter,
        CallbackKind::PassThrough => &PassThroughEmitter,
        CallbackKind::FixedResult => &FixedResultEmitter,
        CallbackKind::LazyDelegate => &LazyDelegateEmitter,
        CallbackKind::ManualDispatch => &ManualDispatchEmitter,
    }
}

/// Around-advice: the interceptor runs with a proceed handle routed through
/// the original-implementation sibling.
struct AroundAdviceEmitter;

impl DispatchEmitter for AroundAdviceEmitter {
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError> {
        for member in group {
            let sig = member.info.sig.clone();
            let hash = sig.hash();
            let slot = ctx.slot(hash);
            if let Some(body) = &member.body {
                builder.declare_original(hash, body.clone());
            }
            let thunk: MethodThunk = Box::new(move |instance, args| {
                let cb = instance.callback_at(slot, sig.name())?;
                let advice = cb.as_around().ok_or(CallError::CallbackKindMismatch {
                    index: slot,
                    declared: CallbackKind::AroundAdvice,
                })?;
                let proceed = MethodProxy::new(instance, hash);
                advice.intercept(instance, &sig, args, &proceed)
            });
            builder.declare_override(ctx.finish_method(member, thunk));
        }
        Ok(())
    }
}

/// Pass-through: the override forwards straight to the original
/// implementation; the callback slot is never consulted on the hot path.
struct PassThroughEmitter;

impl DispatchEmitter for PassThroughEmitter {
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError> {
        for member in group {
            let hash = member.info.sig.hash();
            if let Some(body) = &member.body {
                builder.declare_original(hash, body.clone());
            }
            let thunk: MethodThunk =
                Box::new(move |instance, args| instance.call_original(hash, args));
            builder.declare_override(ctx.finish_method(member, thunk));
        }
        Ok(())
    }
}

/// Fixed-result: the callback produces the return value; the original is
/// never called.
struct FixedResultEmitter;

impl DispatchEmitter for FixedResultEmitter {
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError> {
        for member in group {
            let sig = member.info.sig.clone();
            let slot = ctx.slot(sig.hash());
            let thunk: MethodThunk = Box::new(move |instance, _args| {
                let cb = instance.callback_at(slot, sig.name())?;
                let fixed = cb.as_fixed().ok_or(CallError::CallbackKindMismatch {
                    index: slot,
                    declared: CallbackKind::FixedResult,
                })?;
                fixed.fixed_value()
            });
            builder.declare_override(ctx.finish_method(member, thunk));
        }
        Ok(())
    }
}

/// Lazy-delegate: the callback resolves a substitute receiver once per
/// instance; member calls run the original body against the delegate.
struct LazyDelegateEmitter;

impl DispatchEmitter for LazyDelegateEmitter {
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError> {
        for member in group {
            let sig = member.info.sig.clone();
            let slot = ctx.slot(sig.hash());
            let body = member.body.clone();
            let thunk: MethodThunk = Box::new(move |instance, args| {
                let cb = instance.callback_at(slot, sig.name())?;
                let lazy = cb.as_lazy().ok_or(CallError::CallbackKindMismatch {
                    index: slot,
                    declared: CallbackKind::LazyDelegate,
                })?;
                let original = body.as_ref().ok_or_else(|| CallError::AbstractOriginal {
                    member: sig.to_string(),
                })?;
                instance.with_lazy_delegate(slot, lazy, |delegate| original(delegate, args))
            });
            builder.declare_override(ctx.finish_method(member, thunk));
        }
        Ok(())
    }
}

/// Manual-dispatch: the caller-supplied router decides per call, keyed by
/// the member signature.
struct ManualDispatchEmitter;

impl DispatchEmitter for ManualDispatchEmitter {
    fn emit(
        &self,
        builder: &mut TableBuilder,
        ctx: &EmitContext,
        group: &[&CollectedMember],
    ) -> Result<(), GenerationError> {
        for member in group {
            let sig = member.info.sig.clone();
            let slot = ctx.slot(sig.hash());
            let thunk: MethodThunk = Box::new(move |instance, args| {
                let cb = instance.callback_at(slot, sig.name())?;
                let router = cb.as_manual().ok_or(CallError::CallbackKindMismatch {
                    index: slot,
                    declared: CallbackKind::ManualDispatch,
                })?;
                router.route(&sig, args)
            });
            builder.declare_override(ctx.finish_method(member, thunk));
        }
        Ok(())
    }
}
