//! Caller-supplied descriptions of base types and capability interfaces.
//!
//! A proxy is generated *over* a [`ClassModel`]: the model records the base
//! type's package, finality, ancestor chain, overridable members (each with
//! its statically compiled original-implementation trampoline), and visible
//! constructors. [`InterfaceModel`] describes a capability interface whose
//! members the generated type must expose publicly.

mod class;
mod ctor;
mod interface;
mod method;

pub use class::{AllocFn, ClassModel};
pub use ctor::{CtorFn, CtorModel};
pub use interface::InterfaceModel;
pub use method::{MethodModel, OriginalFn};

use std::sync::Arc;

/// A base-type reference: either a concrete class or an interface.
///
/// Extending an interface-shaped reference is routed to the interface list
/// rather than the superclass position.
#[derive(Clone)]
pub enum TypeRef {
    /// A concrete class model.
    Class(Arc<ClassModel>),
    /// An interface model.
    Interface(Arc<InterfaceModel>),
}

impl From<Arc<ClassModel>> for TypeRef {
    fn from(model: Arc<ClassModel>) -> Self {
        TypeRef::Class(model)
    }
}

impl From<Arc<InterfaceModel>> for TypeRef {
    fn from(model: Arc<InterfaceModel>) -> Self {
        TypeRef::Interface(model)
    }
}
