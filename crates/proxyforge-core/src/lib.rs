//! Core types and runtime for the proxyforge engine.
//!
//! This crate holds everything a generated proxy needs at run time: the
//! identity hashing scheme, the dynamic [`Value`] representation, member
//! signatures and modifiers, the callback strategy capabilities, the type
//! models describing base classes and interfaces, and the runtime itself:
//! [`runtime::ProxyClass`], [`runtime::ProxyInstance`], lazy binding, and
//! the callback registries.
//!
//! The generator pipeline (configuration, member collection, dispatch
//! emission, caching) lives in the `proxyforge` facade crate and the
//! `proxyforge-registry` crate.

mod callback;
mod error;
mod member;
pub mod model;
pub mod runtime;
mod type_hash;
mod value;

pub use callback::{
    AroundAdvice, Callback, CallbackKind, CallbackSet, FixedResult, Forward, LazyDelegate,
    ManualDispatch, PassThrough, determine_kind, determine_kinds,
};
pub use error::{CallError, ConfigError, GenerationError, ProxyError};
pub use member::{AllZero, CallbackFilter, MemberInfo, MemberModifiers, MemberSig, Visibility};
pub use type_hash::TypeHash;
pub use value::{Value, ValueKind};
