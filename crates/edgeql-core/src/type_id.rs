//! Deterministic hash-based identities for schema types and paths.
//!
//! [`TypeId`] is computed from a type's fully qualified name, so a type can be
//! referred to before (or without) a catalog lookup. [`PathId`] is the
//! canonical fingerprint of a path expression: the root type followed by the
//! pointer names traversed from it. Two path expressions that denote the same
//! canonical path always produce equal fingerprints.
//!
//! Both use XXHash64 with domain-specific mixing constants so that a type
//! and a path never collide even when spelled the same.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

use crate::QualifiedName;

/// Mixing constants separating the hash domains.
pub mod hash_constants {
    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for path roots.
    pub const PATH_ROOT: u64 = 0x6a09e667f3bcc909;

    /// Domain marker for paths anchored on a non-path expression.
    pub const PATH_ANCHOR: u64 = 0x3c6ef372fe94f82b;

    /// Domain marker for outbound pointer steps.
    pub const PATH_STEP: u64 = 0xbb67ae8584caa73b;

    /// Multiplier applied before each step so that step order matters.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
}

/// Identity of a schema type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(pub u64);

impl TypeId {
    /// The type of an untyped empty set (`{}`) before a type hint applies.
    pub const EMPTY: TypeId = TypeId(0);

    /// Hash a fully qualified type name.
    ///
    /// ```
    /// use edgeql_core::TypeId;
    ///
    /// assert_eq!(TypeId::from_name("std::int"), TypeId::from_name("std::int"));
    /// assert_ne!(TypeId::from_name("std::int"), TypeId::from_name("std::str"));
    /// ```
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeId(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    #[inline]
    pub fn from_qualified(name: &QualifiedName) -> Self {
        Self::from_name(&name.to_string())
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({:#018x})", self.0)
    }
}

/// Well-known std type identities.
pub mod std_types {
    use super::TypeId;
    use xxhash_rust::const_xxh64::xxh64;

    const fn id(name: &str) -> TypeId {
        TypeId(super::hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    pub const BOOL: TypeId = id("std::bool");
    pub const INT: TypeId = id("std::int");
    pub const FLOAT: TypeId = id("std::float");
    pub const STR: TypeId = id("std::str");
    pub const UUID: TypeId = id("std::uuid");
    pub const DATETIME: TypeId = id("std::datetime");
    pub const OBJECT: TypeId = id("std::Object");
}

/// Canonical fingerprint of a path expression.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PathId(pub u64);

impl PathId {
    /// A path rooted at an object type, e.g. `test::Issue`.
    #[inline]
    pub fn root(type_id: TypeId) -> Self {
        PathId(hash_constants::PATH_ROOT ^ type_id.0)
    }

    /// A path anchored on an arbitrary expression set, identified by `anchor`.
    ///
    /// Used when a pointer is traversed from something that is not itself a
    /// path, such as a subquery.
    #[inline]
    pub fn anchored(anchor: u64) -> Self {
        PathId(hash_constants::PATH_ANCHOR ^ anchor.wrapping_mul(hash_constants::SEP))
    }

    /// Extend this path by one pointer step.
    ///
    /// Step order matters: `A.b.c` and `A.c.b` have different fingerprints.
    #[inline]
    pub fn extend(self, pointer: &str) -> Self {
        let step = hash_constants::PATH_STEP ^ xxh64(pointer.as_bytes(), 0);
        PathId(self.0.wrapping_mul(hash_constants::SEP).wrapping_add(step))
    }
}

impl fmt::Debug for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathId({:#018x})", self.0)
    }
}
