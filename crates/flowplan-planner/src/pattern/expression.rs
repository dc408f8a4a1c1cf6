//! Predicates over vertices and scopes of a pattern target.

use flowplan_core::{ElementId, ElementKind, Extent, GroupKind, Scope};

use super::PatternTarget;

/// A family of element kinds a predicate can test for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindClass {
    Extent,
    Head,
    Tail,
    Source,
    Sink,
    Boundary,
    /// Source, sink, or boundary.
    Tap,
    Pipe,
    Each,
    Every,
    Buffer,
    Merge,
    /// Group-by or co-group.
    Grouping,
    GroupBy,
    CoGroup,
    HashJoin,
    /// Per-tuple work: pipe, each, every, merge, hash join.
    Processing,
}

impl KindClass {
    pub fn admits(self, kind: &ElementKind) -> bool {
        match self {
            Self::Extent => kind.is_extent(),
            Self::Head => matches!(kind, ElementKind::Extent(Extent::Head)),
            Self::Tail => matches!(kind, ElementKind::Extent(Extent::Tail)),
            Self::Source => matches!(kind, ElementKind::Source(_)),
            Self::Sink => matches!(kind, ElementKind::Sink(_)),
            Self::Boundary => kind.is_boundary(),
            Self::Tap => kind.is_tap(),
            Self::Pipe => matches!(kind, ElementKind::Pipe),
            Self::Each => matches!(kind, ElementKind::Each(_)),
            Self::Every => matches!(kind, ElementKind::Every(_)),
            Self::Buffer => kind.is_buffer(),
            Self::Merge => matches!(kind, ElementKind::Merge),
            Self::Grouping => kind.is_grouping(),
            Self::GroupBy => matches!(kind, ElementKind::Group(g) if g.kind == GroupKind::GroupBy),
            Self::CoGroup => matches!(kind, ElementKind::Group(g) if g.kind == GroupKind::CoGroup),
            Self::HashJoin => matches!(kind, ElementKind::HashJoin(_)),
            Self::Processing => kind.is_processing(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Cmp {
    pub fn holds(self, value: usize, bound: usize) -> bool {
        match self {
            Self::Eq => value == bound,
            Self::Gt => value > bound,
            Self::Ge => value >= bound,
            Self::Lt => value < bound,
            Self::Le => value <= bound,
        }
    }
}

/// Vertex predicate.
///
/// On a contracted vertex a kind test holds only when every member element
/// passes it. Degree tests read the degrees of the target being matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementExpression {
    Any,
    Kind(KindClass),
    InDegree(Cmp, usize),
    OutDegree(Cmp, usize),
    Not(Box<ElementExpression>),
    All(Vec<ElementExpression>),
    AnyOf(Vec<ElementExpression>),
}

impl ElementExpression {
    pub fn kind(class: KindClass) -> Self {
        Self::Kind(class)
    }

    pub fn not_kind(class: KindClass) -> Self {
        Self::Not(Box::new(Self::Kind(class)))
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn and(self, other: ElementExpression) -> Self {
        match self {
            Self::All(mut all) => {
                all.push(other);
                Self::All(all)
            }
            this => Self::All(vec![this, other]),
        }
    }

    pub fn or(self, other: ElementExpression) -> Self {
        match self {
            Self::AnyOf(mut any) => {
                any.push(other);
                Self::AnyOf(any)
            }
            this => Self::AnyOf(vec![this, other]),
        }
    }

    pub fn matches<T: PatternTarget + ?Sized>(&self, target: &T, vertex: ElementId) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(class) => {
                let graph = target.element_graph();
                let members = target.members(vertex);
                !members.is_empty() && members.iter().all(|m| class.admits(graph.kind(*m)))
            }
            Self::InDegree(cmp, n) => cmp.holds(target.in_degree(vertex), *n),
            Self::OutDegree(cmp, n) => cmp.holds(target.out_degree(vertex), *n),
            Self::Not(inner) => !inner.matches(target, vertex),
            Self::All(all) => all.iter().all(|e| e.matches(target, vertex)),
            Self::AnyOf(any) => any.iter().any(|e| e.matches(target, vertex)),
        }
    }
}

/// Scope predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeExpression {
    #[default]
    Any,
    /// Input position zero.
    Streamed,
    /// Any input position after the first.
    Accumulated,
    Ordinal(u32),
}

impl ScopeExpression {
    pub fn matches(&self, scope: &Scope) -> bool {
        match self {
            Self::Any => true,
            Self::Streamed => scope.ordinal == 0,
            Self::Accumulated => scope.ordinal > 0,
            Self::Ordinal(n) => scope.ordinal == *n,
        }
    }
}
