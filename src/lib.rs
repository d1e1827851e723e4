//! Dynamic subclass/proxy generation over dispatch tables.
//!
//! Given a base type model, a set of capability interfaces, and a set of
//! interception callbacks, the engine synthesizes at run time a proxy class
//! that overrides every overridable member of the base, forwards each call
//! through a per-member-assigned callback strategy, and (optionally) exposes
//! a factory surface for swapping callbacks on live instances.
//!
//! Rather than emitting loadable code, generation builds a value-level
//! dispatch record: a table of trampolines keyed by member signature, chosen
//! per strategy at generation time. Generated classes are cached by
//! structural configuration key, so structurally identical requests share
//! one class.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use proxyforge::{
//!     AroundAdvice, CallError, ClassModel, CtorModel, MemberSig, MethodModel, MethodProxy,
//!     ProxyBuilder, ProxyInstance, Value, ValueKind,
//! };
//!
//! struct Doubling;
//!
//! impl AroundAdvice for Doubling {
//!     fn intercept(
//!         &self,
//!         _instance: &ProxyInstance,
//!         _member: &MemberSig,
//!         args: &[Value],
//!         proceed: &MethodProxy<'_>,
//!     ) -> Result<Value, CallError> {
//!         match proceed.invoke(args)? {
//!             Value::Int(n) => Ok(Value::Int(n * 2)),
//!             other => Ok(other),
//!         }
//!     }
//! }
//!
//! impl proxyforge::Callback for Doubling {
//!     fn as_around(&self) -> Option<&dyn AroundAdvice> {
//!         Some(self)
//!     }
//! }
//!
//! # fn main() -> Result<(), proxyforge::ProxyError> {
//! let model = Arc::new(
//!     ClassModel::new("demo.Answer", "demo", || Box::new(21i64))
//!         .with_method(MethodModel::of::<i64, _>(
//!             MemberSig::new("get", vec![], ValueKind::Int),
//!             |state, _| Ok(Value::Int(*state)),
//!         ))
//!         .with_constructor(CtorModel::no_arg()),
//! );
//! let instance = ProxyBuilder::proxy(model, Arc::new(Doubling))?;
//! assert_eq!(instance.invoke("get", &[])?, Value::Int(42));
//! # Ok(())
//! # }
//! ```

mod builder;
mod collect;
mod emit;

pub use builder::ProxyBuilder;
pub use collect::collect_methods;

pub use proxyforge_core::model::{
    AllocFn, ClassModel, CtorFn, CtorModel, InterfaceModel, MethodModel, OriginalFn, TypeRef,
};
pub use proxyforge_core::runtime::{
    CompiledMethod, DispatchTable, MethodProxy, MethodThunk, ProxyClass, ProxyClassSpec,
    ProxyInstance, ScopedRegistration, factory_capability_hash, is_proxy,
};
pub use proxyforge_core::{
    AllZero, AroundAdvice, CallError, Callback, CallbackFilter, CallbackKind, CallbackSet,
    ConfigError, FixedResult, Forward, GenerationError, LazyDelegate, ManualDispatch, MemberInfo,
    MemberModifiers, MemberSig, PassThrough, ProxyError, TypeHash, Value, ValueKind, Visibility,
    determine_kind, determine_kinds,
};
pub use proxyforge_registry::{GenerationCache, GenerationKey, filter_identity};
