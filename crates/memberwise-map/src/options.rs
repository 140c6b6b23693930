//! Mapping policies.
//!
//! All option types are serde-friendly so a [`MappingOptions`] can be loaded
//! from configuration files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which unmapped members are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Every eligible source and target member must be mapped.
    #[default]
    Strict,
    /// Every eligible source member must be consumed.
    AllSourceMembers,
    /// Every eligible target member must be bound.
    AllTargetMembers,
    /// Unmapped members on either side are skipped silently.
    Relaxed,
}

impl MappingMode {
    pub fn requires_all_targets(self) -> bool {
        matches!(self, Self::Strict | Self::AllTargetMembers)
    }

    pub fn requires_all_sources(self) -> bool {
        matches!(self, Self::Strict | Self::AllSourceMembers)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::AllSourceMembers => "all source members",
            Self::AllTargetMembers => "all target members",
            Self::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a non-nullable source value enters a nullable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullableBehavior {
    /// The source type's default value becomes absent.
    #[default]
    DefaultMapsToNull,
    /// The default value is carried through as present.
    AssignDefaultAsIs,
    /// Pairing the two is a configuration error.
    Error,
}

/// Normalization applied to member names before pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameComparer {
    /// Exact, case-sensitive comparison.
    #[default]
    Ordinal,
    /// Case-insensitive comparison.
    IgnoreCase,
    /// Case-insensitive comparison ignoring separators (`_ - . / \`) and
    /// whitespace, so `first_name`, `First-Name` and `FirstName` all match.
    Normalized,
}

impl NameComparer {
    /// Key under which a name is indexed.
    pub fn normalize(self, name: &str) -> String {
        match self {
            Self::Ordinal => name.to_string(),
            Self::IgnoreCase => name.to_lowercase(),
            Self::Normalized => name
                .trim()
                .to_lowercase()
                .replace(['_', '-', '.', '/', '\\'], " ")
                .split_whitespace()
                .collect(),
        }
    }

    pub fn matches(self, left: &str, right: &str) -> bool {
        self.normalize(left) == self.normalize(right)
    }
}

/// The policies of one mapping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOptions {
    pub mode: MappingMode,
    pub name_comparer: NameComparer,
    pub nullable_behavior: NullableBehavior,
}

impl MappingOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: MappingMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_name_comparer(mut self, name_comparer: NameComparer) -> Self {
        self.name_comparer = name_comparer;
        self
    }

    #[must_use]
    pub fn with_nullable_behavior(mut self, nullable_behavior: NullableBehavior) -> Self {
        self.nullable_behavior = nullable_behavior;
        self
    }
}
