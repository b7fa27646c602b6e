// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The reporting category of a question.
///
/// Questions without a category (or with a blank one) fall into
/// `Uncategorized`, which is rendered with its own label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A named category such as "Opening" or "Pitch".
    Named(String),
    /// The bucket for questions without a category.
    Uncategorized,
}

impl Category {
    /// Display label of the `Uncategorized` bucket.
    pub const UNCATEGORIZED_LABEL: &'static str = "Uncategorized";

    /// Builds a category from a nullable column value.
    ///
    /// Names are trimmed; an empty name means `Uncategorized`.
    #[must_use]
    pub fn from_optional(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Uncategorized,
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Uncategorized => Self::UNCATEGORIZED_LABEL,
        }
    }

    /// Returns the storable value (`None` for `Uncategorized`).
    #[must_use]
    pub fn as_optional(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Uncategorized => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A reference to one answerable unit of a questionnaire version.
///
/// Exactly one of question or subitem is referenced. A question is answered
/// directly only when it has no subitems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitRef {
    /// A question answered directly.
    Question(i64),
    /// A subitem of a question.
    Subitem(i64),
}

impl UnitRef {
    /// Builds a unit reference from the two nullable answer columns.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one of the ids is present.
    pub fn from_columns(
        question_id: Option<i64>,
        subitem_id: Option<i64>,
    ) -> Result<Self, DomainError> {
        match (question_id, subitem_id) {
            (Some(id), None) => Ok(Self::Question(id)),
            (None, Some(id)) => Ok(Self::Subitem(id)),
            (q, s) => Err(DomainError::InvalidQuestionStructure(format!(
                "answer must reference exactly one unit (question={q:?}, subitem={s:?})"
            ))),
        }
    }

    /// The referenced question id, if this is a question unit.
    #[must_use]
    pub const fn question_id(&self) -> Option<i64> {
        match self {
            Self::Question(id) => Some(*id),
            Self::Subitem(_) => None,
        }
    }

    /// The referenced subitem id, if this is a subitem unit.
    #[must_use]
    pub const fn subitem_id(&self) -> Option<i64> {
        match self {
            Self::Question(_) => None,
            Self::Subitem(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for UnitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Question(id) => write!(f, "question {id}"),
            Self::Subitem(id) => write!(f, "subitem {id}"),
        }
    }
}

/// Lifecycle status of an audit.
///
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AuditStatus {
    /// Created and editable.
    #[default]
    Draft,
    /// Scored and locked.
    Completed,
}

impl FromStr for AuditStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidAuditStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AuditStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Completed => "COMPLETED",
        }
    }

    /// Checks whether a transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Draft, Self::Completed))
    }

    /// Whether answers and metadata may still change.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}
