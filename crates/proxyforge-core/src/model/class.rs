//! Class model: the base type a proxy extends.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{TypeHash, model::CtorModel, model::MethodModel};

/// Allocates default receiver state for a new instance.
pub type AllocFn = fn() -> Box<dyn Any + Send + Sync>;

fn unit_alloc() -> Box<dyn Any + Send + Sync> {
    Box::new(())
}

/// Description of a base type: ancestry, members, constructors, finality.
///
/// Built once by the caller and shared via `Arc`; the generator never
/// mutates a model.
#[derive(Clone)]
pub struct ClassModel {
    name: String,
    package: String,
    type_hash: TypeHash,
    parent: Option<Arc<ClassModel>>,
    is_final: bool,
    allocate: AllocFn,
    methods: Vec<MethodModel>,
    constructors: Vec<CtorModel>,
}

impl ClassModel {
    /// Create a model with the given qualified name, package, and allocator.
    pub fn new(name: impl Into<String>, package: impl Into<String>, allocate: AllocFn) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self {
            name,
            package: package.into(),
            type_hash,
            parent: None,
            is_final: false,
            allocate,
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// A rootless stand-in base with unit state and a no-arg constructor,
    /// used when a proxy is generated over interfaces alone.
    pub fn object_root() -> Self {
        Self::new("Object", "", unit_alloc).with_constructor(CtorModel::no_arg())
    }

    /// Set the parent class.
    pub fn with_parent(mut self, parent: Arc<ClassModel>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Mark the type final (not extensible).
    pub fn sealed(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Add a member.
    pub fn with_method(mut self, method: MethodModel) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor.
    pub fn with_constructor(mut self, ctor: CtorModel) -> Self {
        self.constructors.push(ctor);
        self
    }

    /// Qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring package.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Identity hash.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Parent class, if any.
    pub fn parent(&self) -> Option<&Arc<ClassModel>> {
        self.parent.as_ref()
    }

    /// Whether the type is final.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// State allocator.
    pub fn allocator(&self) -> AllocFn {
        self.allocate
    }

    /// Declared members (not including ancestors).
    pub fn methods(&self) -> &[MethodModel] {
        &self.methods
    }

    /// Declared constructors.
    pub fn constructors(&self) -> &[CtorModel] {
        &self.constructors
    }
}

impl fmt::Debug for ClassModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassModel")
            .field("name", &self.name)
            .field("package", &self.package)
            .field("final", &self.is_final)
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}
