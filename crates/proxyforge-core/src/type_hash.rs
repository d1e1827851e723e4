//! Deterministic hash-based identity for types, members, and constructors.
//!
//! This module provides [`TypeHash`], a 64-bit hash computed from names and
//! signatures. Unlike sequential IDs, hashes are stable across processes and
//! registration order, which lets generation keys compare type configurations
//! structurally and lets dispatch tables use a single map lookup.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a type, a
//! member, and a constructor sharing the same name never collide.
//!
//! # Examples
//!
//! ```
//! use proxyforge_core::TypeHash;
//!
//! let a = TypeHash::from_name("Account");
//! let b = TypeHash::from_name("Account");
//! assert_eq!(a, b);
//!
//! // Member hashes include parameter kinds, so overloads stay distinct.
//! let m1 = TypeHash::from_member("get", &[]);
//! let m2 = TypeHash::from_member("get", &[TypeHash::from_name("int")]);
//! assert_ne!(m1, m2);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Each entity domain gets its own seed constant so identical names in
/// different domains produce distinct hashes.
mod domain {
    /// Domain marker for type names.
    pub const TYPE: u64 = 0x8d6f_3b21_c45a_9e07;

    /// Domain marker for member signatures.
    pub const MEMBER: u64 = 0x51e2_a90c_7f38_d6b4;

    /// Domain marker for constructor signatures.
    pub const CONSTRUCTOR: u64 = 0xc793_04de_1a58_26f1;

    /// Per-position parameter mixing, cycled for long parameter lists.
    pub const PARAM: [u64; 8] = [
        0x9e37_79b9_7f4a_7c15,
        0xbf58_476d_1ce4_e5b9,
        0x94d0_49bb_1331_11eb,
        0xd6e8_feb8_6659_fd93,
        0xe703_7ed1_a0b4_28db,
        0xc6a4_a793_5bd1_e995,
        0x8648_dbbc_94d4_9b8d,
        0xa2b4_8b2c_69e0_d657,
    ];
}

/// A deterministic 64-bit hash identifying a type, member, or constructor.
///
/// The same input always produces the same hash, so hashes can be computed
/// before anything is registered and compared across generation requests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    pub fn from_name(name: &str) -> Self {
        TypeHash(xxh64(name.as_bytes(), domain::TYPE))
    }

    /// Hash of a member signature: name plus parameter kind hashes in order.
    ///
    /// Parameter position matters; `f(int, float)` and `f(float, int)` hash
    /// differently.
    pub fn from_member(name: &str, params: &[TypeHash]) -> Self {
        let mut h = xxh64(name.as_bytes(), domain::MEMBER);
        for (i, p) in params.iter().enumerate() {
            h ^= p.0.wrapping_mul(domain::PARAM[i % domain::PARAM.len()]);
            h = h.rotate_left(13);
        }
        TypeHash(h)
    }

    /// Hash of a constructor signature (parameter kinds only).
    pub fn from_constructor(params: &[TypeHash]) -> Self {
        let mut h = domain::CONSTRUCTOR;
        for (i, p) in params.iter().enumerate() {
            h ^= p.0.wrapping_mul(domain::PARAM[i % domain::PARAM.len()]);
            h = h.rotate_left(13);
        }
        TypeHash(h)
    }

    /// Whether this is the empty hash.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_is_deterministic() {
        assert_eq!(TypeHash::from_name("Account"), TypeHash::from_name("Account"));
        assert_ne!(TypeHash::from_name("Account"), TypeHash::from_name("Ledger"));
    }

    #[test]
    fn domains_do_not_collide() {
        let name = TypeHash::from_name("close");
        let member = TypeHash::from_member("close", &[]);
        assert_ne!(name, member);
    }

    #[test]
    fn parameter_order_matters() {
        let int = TypeHash::from_name("int");
        let float = TypeHash::from_name("float");
        let a = TypeHash::from_member("f", &[int, float]);
        let b = TypeHash::from_member("f", &[float, int]);
        assert_ne!(a, b);
    }

    #[test]
    fn constructor_hashes_by_arity() {
        let int = TypeHash::from_name("int");
        assert_ne!(
            TypeHash::from_constructor(&[]),
            TypeHash::from_constructor(&[int])
        );
    }
}
