//! Field sets carried by scopes.
//!
//! A field set is either `Unknown` (cannot be determined while planning, e.g.
//! behind a user-supplied joiner) or an ordered, duplicate-free list of names.
//! Position matters: two sets with the same names in a different order describe
//! different tuple layouts.

use std::fmt;

use indexmap::IndexSet;

/// Field names that appear more than once in a concatenation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate field names: {}", .0.join(", "))]
pub struct DuplicateFields(pub Vec<String>);

#[derive(Debug, Clone, Default)]
pub enum Fields {
    #[default]
    Unknown,
    Known(IndexSet<String>),
}

impl Fields {
    pub fn unknown() -> Self {
        Self::Unknown
    }

    /// The empty, known field set.
    pub fn none() -> Self {
        Self::Known(IndexSet::new())
    }

    /// Build a known set, silently dropping repeated names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Known(names.into_iter().map(Into::into).collect())
    }

    /// Build a known set, rejecting repeated names.
    pub fn try_from_names(names: Vec<String>) -> Result<Self, DuplicateFields> {
        let mut set = IndexSet::with_capacity(names.len());
        let mut dups = Vec::new();
        for name in names {
            if set.contains(&name) {
                if !dups.contains(&name) {
                    dups.push(name);
                }
            } else {
                set.insert(name);
            }
        }
        if dups.is_empty() {
            Ok(Self::Known(set))
        } else {
            Err(DuplicateFields(dups))
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn names(&self) -> Option<&IndexSet<String>> {
        match self {
            Self::Unknown => None,
            Self::Known(names) => Some(names),
        }
    }

    pub fn len(&self) -> Option<usize> {
        self.names().map(IndexSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().is_some_and(|n| n.contains(name))
    }

    /// Names of `selector` not present in `self`.
    ///
    /// Returns nothing when either side is unknown: absence cannot be proven.
    pub fn missing(&self, selector: &Fields) -> Vec<String> {
        match (self, selector) {
            (Self::Known(have), Self::Known(want)) => want
                .iter()
                .filter(|name| !have.contains(*name))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Concatenate two sets. Unknown is absorbing.
    pub fn append(&self, other: &Fields) -> Result<Fields, DuplicateFields> {
        match (self, other) {
            (Self::Known(left), Self::Known(right)) => {
                let dups: Vec<String> = right
                    .iter()
                    .filter(|name| left.contains(*name))
                    .cloned()
                    .collect();
                if !dups.is_empty() {
                    return Err(DuplicateFields(dups));
                }
                let mut joined = left.clone();
                joined.extend(right.iter().cloned());
                Ok(Self::Known(joined))
            }
            _ => Ok(Self::Unknown),
        }
    }

    /// Remove the names of `other` from `self`, keeping order.
    pub fn subtract(&self, other: &Fields) -> Fields {
        match (self, other) {
            (Self::Known(left), Self::Known(right)) => Self::Known(
                left.iter()
                    .filter(|name| !right.contains(*name))
                    .cloned()
                    .collect(),
            ),
            _ => Self::Unknown,
        }
    }

    /// Same names in the same positions. Unknown never matches.
    pub fn same_layout(&self, other: &Fields) -> bool {
        match (self, other) {
            (Self::Known(left), Self::Known(right)) => left.iter().eq(right.iter()),
            _ => false,
        }
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unknown, Self::Unknown) => true,
            _ => self.same_layout(other),
        }
    }
}

impl Eq for Fields {}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "[?]"),
            Self::Known(names) => {
                write!(f, "[")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}")?;
                }
                write!(f, "]")
            }
        }
    }
}
