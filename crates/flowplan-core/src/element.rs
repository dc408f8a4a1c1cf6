//! Element kinds of the logical graph.
//!
//! The set of kinds is closed: every rule matches on [`ElementKind`]
//! exhaustively, so adding a kind forces each rule to decide how to treat it.

use std::fmt;

use crate::fields::Fields;
use crate::tap::Tap;

/// The two sentinels bounding every traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    Head,
    Tail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationRole {
    #[default]
    Function,
    Filter,
    Aggregator,
    Buffer,
    Assertion,
}

/// Which fields an operation passes downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSelector {
    /// Only the declared result fields.
    #[default]
    Results,
    /// Incoming fields followed by the declared results.
    All,
    /// Incoming fields minus the arguments, followed by the declared results.
    Swap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub role: OperationRole,
    /// `None` selects every incoming field.
    pub arguments: Option<Fields>,
    pub declared: Fields,
    pub output: OutputSelector,
}

impl Operation {
    pub fn new(name: impl Into<String>, role: OperationRole, declared: Fields) -> Self {
        Self {
            name: name.into(),
            role,
            arguments: None,
            declared,
            output: OutputSelector::Results,
        }
    }

    pub fn function(name: impl Into<String>, declared: Fields) -> Self {
        Self::new(name, OperationRole::Function, declared)
    }

    pub fn filter(name: impl Into<String>) -> Self {
        Self::new(name, OperationRole::Filter, Fields::none())
    }

    pub fn aggregator(name: impl Into<String>, declared: Fields) -> Self {
        Self::new(name, OperationRole::Aggregator, declared)
    }

    pub fn buffer(name: impl Into<String>, declared: Fields) -> Self {
        Self::new(name, OperationRole::Buffer, declared)
    }

    pub fn assertion(name: impl Into<String>) -> Self {
        Self::new(name, OperationRole::Assertion, Fields::none())
    }

    pub fn with_arguments(mut self, arguments: Fields) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn with_output(mut self, output: OutputSelector) -> Self {
        self.output = output;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Joiner {
    #[default]
    Inner,
    Outer,
    Left,
    Right,
    /// A user-supplied join implementation, by name.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub keys: Fields,
    pub joiner: Joiner,
    pub declared: Option<Fields>,
}

impl Join {
    pub fn on(keys: Fields) -> Self {
        Self {
            keys,
            joiner: Joiner::Inner,
            declared: None,
        }
    }

    pub fn with_joiner(mut self, joiner: Joiner) -> Self {
        self.joiner = joiner;
        self
    }

    pub fn with_declared(mut self, declared: Fields) -> Self {
        self.declared = Some(declared);
        self
    }

    /// No declared output and a custom joiner: output fields are left to the joiner.
    pub fn defers_to_joiner(&self) -> bool {
        self.declared.is_none() && matches!(self.joiner, Joiner::Custom(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    GroupBy,
    CoGroup,
}

impl GroupKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::GroupBy => "group-by",
            Self::CoGroup => "co-group",
        }
    }
}

/// A grouping boundary. `GroupBy` ignores the joiner and declared fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub join: Join,
}

impl Group {
    pub fn group_by(keys: Fields) -> Self {
        Self {
            kind: GroupKind::GroupBy,
            join: Join::on(keys),
        }
    }

    pub fn co_group(join: Join) -> Self {
        Self {
            kind: GroupKind::CoGroup,
            join,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Extent(Extent),
    Source(Tap),
    Sink(Tap),
    /// Planner-inserted intermediate tap.
    Boundary(Tap),
    /// Named pass-through.
    Pipe,
    Each(Operation),
    Every(Operation),
    Merge,
    Group(Group),
    HashJoin(Join),
}

impl ElementKind {
    pub fn tap(&self) -> Option<&Tap> {
        match self {
            Self::Source(tap) | Self::Sink(tap) | Self::Boundary(tap) => Some(tap),
            _ => None,
        }
    }

    pub fn tap_mut(&mut self) -> Option<&mut Tap> {
        match self {
            Self::Source(tap) | Self::Sink(tap) | Self::Boundary(tap) => Some(tap),
            _ => None,
        }
    }

    pub fn is_extent(&self) -> bool {
        matches!(self, Self::Extent(_))
    }

    pub fn is_tap(&self) -> bool {
        self.tap().is_some()
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary(_))
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Elements doing per-tuple work inside a step: neither taps, groupings, nor extents.
    pub fn is_processing(&self) -> bool {
        match self {
            Self::Pipe | Self::Each(_) | Self::Every(_) | Self::Merge | Self::HashJoin(_) => true,
            Self::Extent(_) | Self::Source(_) | Self::Sink(_) | Self::Boundary(_) | Self::Group(_) => {
                false
            }
        }
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::Every(op) if op.role == OperationRole::Buffer)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Extent(Extent::Head) => "head",
            Self::Extent(Extent::Tail) => "tail",
            Self::Source(_) => "source",
            Self::Sink(_) => "sink",
            Self::Boundary(_) => "boundary",
            Self::Pipe => "pipe",
            Self::Each(_) => "each",
            Self::Every(_) => "every",
            Self::Merge => "merge",
            Self::Group(g) => g.kind.label(),
            Self::HashJoin(_) => "hash-join",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ElementKind::Extent(_) => write!(f, "{}", self.kind.label()),
            _ => write!(f, "{} `{}`", self.kind.label(), self.name),
        }
    }
}
