//! Member signatures, visibility, and modifier flags.
//!
//! A [`MemberSig`] identifies an overridable member by name and parameter
//! kinds; its hash is the key used by dispatch tables and
//! original-implementation trampolines. [`MemberInfo`] pairs a signature with
//! the origin modifiers the collector needs when deciding what is
//! overridable and how the override must be declared.

use std::fmt;

use bitflags::bitflags;

use crate::{TypeHash, Value, ValueKind};

bitflags! {
    /// Origin modifiers of a collected member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberModifiers: u8 {
        /// Declared static; never overridable.
        const STATIC = 1 << 0;
        /// Declared final; silently excluded from overriding.
        const FINAL = 1 << 1;
        /// No implementation on the base chain.
        const ABSTRACT = 1 << 2;
    }
}

/// Declared visibility of a member or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible everywhere.
    Public,
    /// Visible to subclasses.
    Protected,
    /// Visible within the declaring package only.
    Package,
    /// Never visible to generated subclasses.
    Private,
}

impl Visibility {
    /// Whether a member with this visibility can be seen from a generated
    /// subclass. Package visibility requires the subclass to live in the
    /// same package as the declaring type.
    pub fn visible_to_subclass(&self, same_package: bool) -> bool {
        match self {
            Visibility::Public | Visibility::Protected => true,
            Visibility::Package => same_package,
            Visibility::Private => false,
        }
    }
}

/// A member signature: name, parameter kinds, and return kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSig {
    name: String,
    params: Vec<ValueKind>,
    ret: ValueKind,
}

impl MemberSig {
    /// Create a new signature.
    pub fn new(name: impl Into<String>, params: Vec<ValueKind>, ret: ValueKind) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter kinds, in order.
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Declared return kind.
    pub fn ret(&self) -> ValueKind {
        self.ret
    }

    /// Identity hash of this signature (name + parameter kinds).
    ///
    /// The return kind does not participate, matching override semantics:
    /// a subclass override shares name and parameters with its original.
    pub fn hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(ValueKind::type_hash).collect();
        TypeHash::from_member(&self.name, &params)
    }

    /// Whether the supplied arguments match this signature's parameters.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(kind, arg)| arg.matches(kind))
    }
}

impl fmt::Display for MemberSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A collected member: signature plus origin modifiers.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// The member signature.
    pub sig: MemberSig,
    /// Declared visibility at the origin.
    pub visibility: Visibility,
    /// Origin modifiers.
    pub modifiers: MemberModifiers,
    /// Type the member was first collected from.
    pub declared_by: TypeHash,
}

impl MemberInfo {
    /// Whether the member has no implementation on the base chain.
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MemberModifiers::ABSTRACT)
    }
}

/// Maps each collected member to a callback slot index.
///
/// The contract is a pure function of `(member, full member list)`; it must
/// be deterministic for a fixed member list so that generation-key semantics
/// stay meaningful. Filter instances are compared by identity when keys are
/// built, never structurally.
pub trait CallbackFilter: Send + Sync {
    /// Return the callback slot index for `member`.
    fn accept(&self, member: &MemberInfo, all: &[MemberInfo]) -> usize;
}

/// Default filter used when exactly one callback slot exists: everything
/// routes to slot zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllZero;

impl CallbackFilter for AllZero {
    fn accept(&self, _member: &MemberInfo, _all: &[MemberInfo]) -> usize {
        0
    }
}
