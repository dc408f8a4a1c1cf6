//! Source/sink endpoints and the two questions the planner asks about them.

use crate::fields::Fields;

/// A source, sink, or planner-inserted boundary endpoint.
///
/// The planner never performs I/O through a tap; it only reads the scheme,
/// the declared fields, and whether the tap can read back what it wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tap {
    pub scheme: String,
    pub identifier: String,
    pub fields: Fields,
    pub symmetrical: bool,
}

impl Tap {
    pub fn new(scheme: impl Into<String>, identifier: impl Into<String>, fields: Fields) -> Self {
        Self {
            scheme: scheme.into(),
            identifier: identifier.into(),
            fields,
            symmetrical: true,
        }
    }

    /// An intermediate tap. Its fields are filled in by field resolution.
    pub fn temporary(scheme: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::new(scheme, identifier, Fields::Unknown)
    }

    pub fn with_symmetrical(mut self, symmetrical: bool) -> Self {
        self.symmetrical = symmetrical;
        self
    }
}

/// Platform answers about taps, treated as opaque booleans by the rules.
pub trait TapRules {
    /// Can the tap be read back exactly as it was written?
    fn is_symmetrical(&self, tap: &Tap) -> bool;

    /// Can both taps be consumed by one physical unit of work?
    fn are_compatible(&self, a: &Tap, b: &Tap) -> bool;
}

/// Default rules: symmetry is declared on the tap, compatibility means equal schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeTapRules;

impl TapRules for SchemeTapRules {
    fn is_symmetrical(&self, tap: &Tap) -> bool {
        tap.symmetrical
    }

    fn are_compatible(&self, a: &Tap, b: &Tap) -> bool {
        a.scheme == b.scheme
    }
}

impl<T: TapRules + ?Sized> TapRules for &T {
    fn is_symmetrical(&self, tap: &Tap) -> bool {
        (*self).is_symmetrical(tap)
    }

    fn are_compatible(&self, a: &Tap, b: &Tap) -> bool {
        (*self).are_compatible(a, b)
    }
}
