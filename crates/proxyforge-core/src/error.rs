//! Unified error types for the proxy engine.
//!
//! Errors are split by phase, mirroring how a request moves through the
//! engine: configuration is checked first, generation builds the dispatch
//! table, and calls/binding run against finished instances.
//!
//! ```text
//! ProxyError (top-level wrapper)
//! ├── ConfigError     - rejected before any generation work
//! ├── GenerationError - raised while building a proxy class
//! └── CallError       - dispatch, binding, and factory-surface failures
//! ```
//!
//! Each phase-specific type can be handled directly, or converted into
//! `ProxyError` with `?` for unified handling.

use thiserror::Error;

use crate::CallbackKind;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised by configuration validation, before any generation work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An empty callback array was supplied.
    #[error("callback array cannot be empty")]
    EmptyCallbacks,

    /// Instantiation was requested but no concrete callbacks were set.
    #[error("callbacks are required")]
    CallbacksRequired,

    /// A class-only generation was requested together with concrete callbacks.
    #[error("class-only generation does not accept callbacks")]
    CallbacksNotAccepted,

    /// A class-only generation was requested without callback kinds.
    #[error("callback kinds are required")]
    KindsRequired,

    /// Callback and callback-kind arrays differ in length.
    #[error("lengths of callback and callback kind arrays must be the same ({callbacks} vs {kinds})")]
    LengthMismatch {
        /// Number of concrete callbacks supplied.
        callbacks: usize,
        /// Number of declared callback kinds.
        kinds: usize,
    },

    /// A concrete callback does not implement the kind declared at its slot.
    #[error("callback at slot {index} is {found}, not assignable to {declared}")]
    NotAssignable {
        /// Slot position.
        index: usize,
        /// Kind inferred from the concrete callback.
        found: CallbackKind,
        /// Kind declared for the slot.
        declared: CallbackKind,
    },

    /// More than one callback kind but no filter to route members.
    #[error("multiple callback kinds possible but no filter specified")]
    AmbiguousRouting,

    /// The base type is final and cannot be extended.
    #[error("cannot subclass final type '{name}'")]
    FinalSuperclass {
        /// The base type name.
        name: String,
    },

    /// The base type has no constructors visible to a generated subclass.
    #[error("no visible constructors in '{name}'")]
    NoVisibleConstructors {
        /// The base type name.
        name: String,
    },

    /// Constructor argument types and values differ in length.
    #[error("constructor argument types and values must be non-empty and of equal length")]
    ArgumentArityMismatch,
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Errors raised while a proxy class is being generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The filter returned a slot index outside the callback-kind range.
    #[error("filter returned slot {index} for '{member}' but only {slots} slot(s) exist")]
    FilterIndexOutOfRange {
        /// The member being classified.
        member: String,
        /// The out-of-range index.
        index: usize,
        /// Number of declared slots.
        slots: usize,
    },

    /// No recorded constructor matches the supplied argument types.
    #[error("constructor not found for argument kinds ({arity} supplied)")]
    NoMatchingConstructor {
        /// Number of argument types supplied.
        arity: usize,
    },

    /// Instantiation without arguments requires a no-arg base constructor.
    #[error("superclass '{name}' has no no-arg constructor but no arguments were given")]
    NoDefaultConstructor {
        /// The base type name.
        name: String,
    },

    /// A concrete callback implements no recognized strategy capability.
    #[error("callback at slot {index} implements no recognized strategy")]
    UnknownCallback {
        /// Slot position.
        index: usize,
    },

    /// A concrete callback implements more than one strategy capability.
    #[error("callback at slot {index} implements more than one strategy")]
    AmbiguousCallback {
        /// Slot position.
        index: usize,
    },

    /// The table-building backend failed; never silently swallowed.
    #[error("dispatch emission failed for '{member}': {detail}")]
    Emitter {
        /// The member whose thunk failed to build.
        member: String,
        /// Backend failure detail.
        detail: String,
    },
}

// ============================================================================
// Call / Binding Errors
// ============================================================================

/// Errors raised by dispatch, binding, and the factory surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// No member with this name accepts the supplied arguments.
    #[error("no member '{name}' accepting {arity} argument(s)")]
    UnknownMember {
        /// The requested member name.
        name: String,
        /// Number of arguments supplied.
        arity: usize,
    },

    /// The factory capability was disabled for this proxy class.
    #[error("factory capability is disabled for this class")]
    FactoryDisabled,

    /// Single-callback instantiation used on a class with multiple slots.
    #[error("more than one callback object required")]
    MoreThanOneCallback,

    /// An interception-requiring member was invoked with an empty slot.
    #[error("no callback bound for slot {index} invoked via '{member}'")]
    UnboundCallback {
        /// The member that required the slot.
        member: String,
        /// The empty slot.
        index: usize,
    },

    /// A callback's strategy does not match its declared slot kind.
    #[error("callback for slot {index} is not a {declared} callback")]
    CallbackKindMismatch {
        /// Slot position.
        index: usize,
        /// Declared slot kind.
        declared: CallbackKind,
    },

    /// A full slot-array replacement had the wrong length.
    #[error("expected {expected} callback(s), got {got}")]
    SlotCountMismatch {
        /// Declared slot count.
        expected: usize,
        /// Supplied callback count.
        got: usize,
    },

    /// The original implementation was requested for an abstract member.
    #[error("'{member}' has no original implementation")]
    AbstractOriginal {
        /// The abstract member.
        member: String,
    },

    /// The receiver state does not hold the expected native type.
    #[error("target type mismatch: expected {expected}")]
    TargetTypeMismatch {
        /// The expected native type name.
        expected: &'static str,
    },

    /// A delegate resolved by a lazy-delegate callback failed.
    #[error("lazy delegate resolution failed: {detail}")]
    DelegateResolution {
        /// Failure detail.
        detail: String,
    },

    /// An original implementation or interceptor reported a failure.
    #[error("{message}")]
    Target {
        /// The failure message.
        message: String,
    },
}

impl CallError {
    /// Convenience constructor for failures inside member bodies.
    pub fn target(message: impl Into<String>) -> Self {
        CallError::Target {
            message: message.into(),
        }
    }

    /// Convenience constructor for unknown-member failures.
    pub fn unknown_member(name: impl Into<String>, arity: usize) -> Self {
        CallError::UnknownMember {
            name: name.into(),
            arity,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for all proxy-engine operations.
///
/// Wraps the phase-specific errors; each variant uses `#[from]` so `?`
/// converts automatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProxyError {
    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A generation error.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A call, binding, or factory-surface error.
    #[error(transparent)]
    Call(#[from] CallError),
}

impl ProxyError {
    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, ProxyError::Config(_))
    }

    /// Check if this is a generation error.
    pub fn is_generation(&self) -> bool {
        matches!(self, ProxyError::Generation(_))
    }

    /// Check if this is a call error.
    pub fn is_call(&self) -> bool {
        matches!(self, ProxyError::Call(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::LengthMismatch {
            callbacks: 2,
            kinds: 3,
        };
        assert_eq!(
            format!("{err}"),
            "lengths of callback and callback kind arrays must be the same (2 vs 3)"
        );
    }

    #[test]
    fn generation_error_display() {
        let err = GenerationError::FilterIndexOutOfRange {
            member: "get()".to_string(),
            index: 4,
            slots: 2,
        };
        assert_eq!(
            format!("{err}"),
            "filter returned slot 4 for 'get()' but only 2 slot(s) exist"
        );
    }

    #[test]
    fn call_error_display() {
        let err = CallError::unknown_member("frobnicate", 2);
        assert_eq!(format!("{err}"), "no member 'frobnicate' accepting 2 argument(s)");
    }

    #[test]
    fn proxy_error_transparent_display() {
        let err: ProxyError = ConfigError::AmbiguousRouting.into();
        assert!(err.is_config());
        assert_eq!(
            format!("{err}"),
            "multiple callback kinds possible but no filter specified"
        );
    }

    #[test]
    fn proxy_error_discriminators() {
        let g: ProxyError = GenerationError::NoMatchingConstructor { arity: 3 }.into();
        assert!(g.is_generation());
        assert!(!g.is_config());
        let c: ProxyError = CallError::FactoryDisabled.into();
        assert!(c.is_call());
    }
}
