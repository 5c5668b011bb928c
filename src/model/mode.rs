//! Search modes and their positional parameters.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::fields::SearchFieldSelection;
use super::option::Identity;

/// Kind of a parameter a search mode requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SearchParameterKind {
    /// The free-text search expression.
    Expression,
    /// The search field selection.
    SearchFields,
    /// The integer search distance.
    Distance,
    /// A parameter introduced by a third-party mode. The lookup engine
    /// cannot resolve it.
    Custom(String),
}

impl fmt::Display for SearchParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression => f.write_str("expression"),
            Self::SearchFields => f.write_str("search fields"),
            Self::Distance => f.write_str("distance"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// A resolved parameter value, passed positionally to [`Dictionary::search`](super::Dictionary::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchParameter {
    Expression(String),
    SearchFields(SearchFieldSelection),
    Distance(u32),
}

impl SearchParameter {
    pub fn as_expression(&self) -> Option<&str> {
        match self {
            Self::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_search_fields(&self) -> Option<&SearchFieldSelection> {
        match self {
            Self::SearchFields(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_distance(&self) -> Option<u32> {
        match self {
            Self::Distance(d) => Some(*d),
            _ => None,
        }
    }
}

/// A named search strategy and the ordered parameters it needs.
///
/// Modes are cheap to clone; two modes are the same mode when their ids match.
#[derive(Debug, Clone)]
pub struct SearchMode {
    inner: Arc<ModeInfo>,
}

#[derive(Debug)]
struct ModeInfo {
    id: String,
    description: String,
    parameters: Vec<SearchParameterKind>,
}

const EXPRESSION_PARAMETERS: [SearchParameterKind; 2] = [
    SearchParameterKind::Expression,
    SearchParameterKind::SearchFields,
];

impl SearchMode {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<SearchParameterKind>,
    ) -> Self {
        Self {
            inner: Arc::new(ModeInfo {
                id: id.into(),
                description: description.into(),
                parameters,
            }),
        }
    }

    /// Entries whose field equals the expression.
    pub fn exact() -> Self {
        Self::new("exact", "Exact match", EXPRESSION_PARAMETERS.to_vec())
    }

    /// Entries whose field starts with the expression.
    pub fn prefix() -> Self {
        Self::new("prefix", "Starts with", EXPRESSION_PARAMETERS.to_vec())
    }

    /// Entries whose field ends with the expression.
    pub fn suffix() -> Self {
        Self::new("suffix", "Ends with", EXPRESSION_PARAMETERS.to_vec())
    }

    /// Entries whose field contains the expression anywhere.
    pub fn any() -> Self {
        Self::new("any", "Contains", EXPRESSION_PARAMETERS.to_vec())
    }

    /// Entries within an edit distance of the expression.
    pub fn near() -> Self {
        Self::new(
            "near",
            "Similar spelling",
            vec![
                SearchParameterKind::Expression,
                SearchParameterKind::SearchFields,
                SearchParameterKind::Distance,
            ],
        )
    }

    /// The standard modes in menu order.
    pub fn standard() -> Vec<SearchMode> {
        vec![
            Self::exact(),
            Self::prefix(),
            Self::suffix(),
            Self::any(),
            Self::near(),
        ]
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn parameters(&self) -> &[SearchParameterKind] {
        &self.inner.parameters
    }

    pub fn requires(&self, kind: &SearchParameterKind) -> bool {
        self.inner.parameters.contains(kind)
    }
}

impl PartialEq for SearchMode {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for SearchMode {}

impl Identity for SearchMode {
    fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.id)
    }
}
