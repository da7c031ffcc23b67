use serde::{Deserialize, Serialize};

use crate::domain::feedback::AttributedItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPrefix {
    Fix,
    Feat,
    Refactor,
    #[default]
    None,
}

impl TaskPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fix => "fix",
            Self::Feat => "feat",
            Self::Refactor => "refactor",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fix" => Some(Self::Fix),
            "feat" => Some(Self::Feat),
            "refactor" => Some(Self::Refactor),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A task descriptor as typed by the user: `<fix:|feat:|refactor:> <text>`.
///
/// Immutable per cycle. An unrecognized or missing prefix parses to
/// `TaskPrefix::None` rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub prefix: TaskPrefix,
    pub description: String,
}

impl TaskDescriptor {
    pub fn new(prefix: TaskPrefix, description: impl Into<String>) -> Self {
        Self {
            prefix,
            description: description.into(),
        }
    }

    /// Parse the single positional argument of the command surface.
    ///
    /// Only a prefix immediately followed by a colon is recognized; anything
    /// else is treated as free text with no prefix.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Some((head, rest)) = trimmed.split_once(':') {
            if let Some(prefix) = TaskPrefix::parse(head.trim()) {
                return Self::new(prefix, rest.trim());
            }
        }
        Self::new(TaskPrefix::None, trimmed)
    }

    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        if self.description.trim().is_empty() {
            return Err(crate::error::CoreError::EmptyDescription);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FocusKind {
    Repair,
    Feature,
    Restructure,
    #[default]
    Generic,
}

impl FocusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repair => "repair",
            Self::Feature => "feature",
            Self::Restructure => "restructure",
            Self::Generic => "generic",
        }
    }

    /// Fixed prefix → focus lookup. Deterministic by specification.
    pub fn from_prefix(prefix: TaskPrefix) -> Self {
        match prefix {
            TaskPrefix::Fix => Self::Repair,
            TaskPrefix::Feat => Self::Feature,
            TaskPrefix::Refactor => Self::Restructure,
            TaskPrefix::None => Self::Generic,
        }
    }
}

/// Directs the implementer's emphasis and each reviewer's attention.
///
/// `carryover` holds the previous cycle's blockers on automatic loop-back;
/// it is empty on the first cycle and after a user-confirmed continuation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FocusProfile {
    pub kind: FocusKind,
    pub emphasis: Vec<String>,
    pub carryover: Vec<AttributedItem>,
}

impl FocusProfile {
    pub fn new(kind: FocusKind, emphasis: Vec<String>) -> Self {
        Self {
            kind,
            emphasis,
            carryover: Vec::new(),
        }
    }

    pub fn with_carryover(mut self, carryover: Vec<AttributedItem>) -> Self {
        self.carryover = carryover;
        self
    }

    pub fn has_carryover(&self) -> bool {
        !self.carryover.is_empty()
    }
}
