//! Interface model: a capability interface the generated type exposes.

use std::fmt;
use std::sync::Arc;

use crate::{MemberSig, TypeHash};

/// Description of a capability interface.
///
/// Interface members carry no implementation; generated overrides for
/// members that originate purely from an interface are forced public.
#[derive(Clone)]
pub struct InterfaceModel {
    name: String,
    type_hash: TypeHash,
    parents: Vec<Arc<InterfaceModel>>,
    methods: Vec<MemberSig>,
}

impl InterfaceModel {
    /// Create a model with the given qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self {
            name,
            type_hash,
            parents: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Add a parent interface.
    pub fn with_parent(mut self, parent: Arc<InterfaceModel>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Add a member signature.
    pub fn with_method(mut self, sig: MemberSig) -> Self {
        self.methods.push(sig);
        self
    }

    /// Qualified interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity hash.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Parent interfaces.
    pub fn parents(&self) -> &[Arc<InterfaceModel>] {
        &self.parents
    }

    /// Declared member signatures (not including parents).
    pub fn methods(&self) -> &[MemberSig] {
        &self.methods
    }
}

impl fmt::Debug for InterfaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceModel")
            .field("name", &self.name)
            .field("methods", &self.methods.len())
            .finish()
    }
}
