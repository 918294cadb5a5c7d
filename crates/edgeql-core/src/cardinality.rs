//! Cardinality of sets.
//!
//! Every expression denotes a set. Its [`Cardinality`] records a lower bound
//! (may the set be empty?) and an upper bound (may it hold more than one
//! element?). Clause constraints only care about the upper bound: a
//! *singleton* expression yields at most one value.

use std::fmt;

/// Lower/upper bounds on the number of elements in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Zero or one element.
    AtMostOne,
    /// Exactly one element.
    One,
    /// Zero or more elements.
    Many,
    /// One or more elements.
    AtLeastOne,
}

impl Cardinality {
    /// Build from bounds.
    pub fn from_bounds(required: bool, multi: bool) -> Self {
        match (required, multi) {
            (true, false) => Cardinality::One,
            (false, false) => Cardinality::AtMostOne,
            (true, true) => Cardinality::AtLeastOne,
            (false, true) => Cardinality::Many,
        }
    }

    /// Whether the set can never be empty.
    pub fn is_required(self) -> bool {
        matches!(self, Cardinality::One | Cardinality::AtLeastOne)
    }

    /// Whether the set may hold more than one element.
    pub fn is_multi(self) -> bool {
        matches!(self, Cardinality::Many | Cardinality::AtLeastOne)
    }

    /// Whether the set yields at most one value.
    pub fn is_singleton(self) -> bool {
        !self.is_multi()
    }

    /// Cardinality of an element-wise combination (cross product) of two sets.
    pub fn mul(self, other: Cardinality) -> Cardinality {
        Cardinality::from_bounds(
            self.is_required() && other.is_required(),
            self.is_multi() || other.is_multi(),
        )
    }

    /// Cardinality of the union of two sets.
    pub fn union(self, other: Cardinality) -> Cardinality {
        Cardinality::from_bounds(self.is_required() || other.is_required(), true)
    }

    /// Drop the lower bound, e.g. after filtering.
    pub fn optional(self) -> Cardinality {
        Cardinality::from_bounds(false, self.is_multi())
    }

    /// Cap the upper bound at one, e.g. after `LIMIT 1`.
    pub fn at_most_one(self) -> Cardinality {
        Cardinality::from_bounds(self.is_required(), false)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cardinality::AtMostOne => "at most one",
            Cardinality::One => "exactly one",
            Cardinality::Many => "many",
            Cardinality::AtLeastOne => "at least one",
        };
        f.write_str(s)
    }
}
