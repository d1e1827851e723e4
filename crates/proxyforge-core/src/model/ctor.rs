//! Constructor models: parameter kinds plus the initialization body.
//!
//! Construction is two-phase, matching how a subclass constructor actually
//! runs: the class allocator produces default receiver state first, then the
//! constructor body initializes it. The body receives the instance under
//! construction, so base-constructor code can call overridable members and
//! observe the construction-time interception rules.

use std::fmt;
use std::sync::Arc;

use crate::runtime::ProxyInstance;
use crate::{CallError, Value, ValueKind, Visibility};

/// A constructor body run against the instance under construction.
pub type CtorFn = Arc<dyn Fn(&ProxyInstance, &[Value]) -> Result<(), CallError> + Send + Sync>;

/// A visible base-type constructor.
#[derive(Clone)]
pub struct CtorModel {
    /// Declared parameter kinds.
    pub params: Vec<ValueKind>,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Initialization body.
    pub init: CtorFn,
}

impl CtorModel {
    /// A public constructor with the given parameter kinds and body.
    pub fn new<F>(params: Vec<ValueKind>, init: F) -> Self
    where
        F: Fn(&ProxyInstance, &[Value]) -> Result<(), CallError> + Send + Sync + 'static,
    {
        Self {
            params,
            visibility: Visibility::Public,
            init: Arc::new(init),
        }
    }

    /// A public no-arg constructor that leaves allocated state untouched.
    pub fn no_arg() -> Self {
        Self::new(Vec::new(), |_, _| Ok(()))
    }

    /// Set the declared visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether this constructor takes no arguments.
    pub fn is_no_arg(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether the supplied argument-kind list matches this constructor.
    pub fn matches(&self, arg_kinds: &[ValueKind]) -> bool {
        self.params == arg_kinds
    }
}

impl fmt::Debug for CtorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtorModel")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}
