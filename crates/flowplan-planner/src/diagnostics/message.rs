use flowplan_core::ElementId;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// A cycle or a disconnected element makes every later check meaningless, so
/// those come first; operator placement and tap contracts assume a sound shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // The graph cannot be traversed
    Cycle,
    NotOnPath,

    // Operators in places they cannot run
    EveryWithoutGrouping,
    BufferNotAlone,
    JoinArity,
    SplitAfterBoundary,

    // Tap contracts
    AsymmetricReadBack,

    // Planning still succeeds
    DeferredJoinFields,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DeferredJoinFields => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::EveryWithoutGrouping => Some("add a group_by or co_group in front of it"),
            Self::BufferNotAlone => Some("a buffer must be the only every after its grouping"),
            Self::SplitAfterBoundary => Some("move the split upstream of the boundary"),
            Self::DeferredJoinFields => {
                Some("declare the joiner's output fields to have them checked downstream")
            }
            _ => None,
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Cycle => "pipeline contains a cycle",
            Self::NotOnPath => "element does not lie on a path from a source to a sink",
            Self::EveryWithoutGrouping => "every must directly follow a grouping or another every",
            Self::BufferNotAlone => "buffer shares its grouping with another every",
            Self::JoinArity => "join needs at least two inputs",
            Self::SplitAfterBoundary => "split directly after a boundary cannot be scheduled",
            Self::AsymmetricReadBack => "sink is read back but cannot return what it wrote",
            Self::DeferredJoinFields => "join output fields are left to a custom joiner",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::JoinArity => "join needs at least two inputs, found {}".to_string(),
            Self::DeferredJoinFields => "join output fields are left to joiner `{}`".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) element: ElementId,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) element: ElementId,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, element: ElementId) -> Self {
        Self {
            kind,
            element,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}
