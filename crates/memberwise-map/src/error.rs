//! Error types for mapping configuration, compilation and execution.

use memberwise_model::{ModelError, ValueType};
use thiserror::Error;

/// Errors from building or running a mapping.
///
/// Every variant except [`MapError::ArgumentNull`] and
/// [`MapError::Transform`] is raised while validating or compiling, before
/// any transformation exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MapError {
    /// Two eligible members of one owner normalize to the same name.
    #[error("members '{first}' and '{second}' of {owner} both match name '{normalized}'")]
    AmbiguousMember {
        owner: String,
        first: String,
        second: String,
        /// Name both members normalize to under the active comparer.
        normalized: String,
    },

    /// A target member received no binding in a mode that requires one.
    #[error("target member '{member}' of {owner} is not mapped")]
    UnmappedTargetMember { owner: String, member: String },

    /// A source member is neither paired nor read by any override.
    #[error("source member '{member}' of {owner} is not mapped")]
    UnmappedSourceMember { owner: String, member: String },

    /// No coercion exists between the two member types.
    #[error(
        "cannot map {source_owner}.{source_member} ({source_type}) to \
         {target_owner}.{target_member} ({target_type})"
    )]
    IncompatibleMemberTypes {
        source_owner: String,
        source_member: String,
        source_type: ValueType,
        target_owner: String,
        target_member: String,
        target_type: ValueType,
    },

    /// A non-nullable source was paired with a nullable target while
    /// [`NullableBehavior::Error`](crate::NullableBehavior::Error) is active.
    #[error("nullable target member '{member}' of {owner} cannot receive non-nullable {source_type}")]
    NullableCoercion {
        owner: String,
        member: String,
        source_type: ValueType,
    },

    /// An override names a member the owner does not declare.
    #[error("{owner} has no member named '{member}'")]
    MemberNotFound { owner: String, member: String },

    /// A call expression received the wrong number of arguments.
    #[error("function '{function}' takes {expected} arguments, got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A required argument of `map` was absent.
    #[error("argument '{0}' must not be absent")]
    ArgumentNull(&'static str),

    /// A value could not be read, converted or written while mapping.
    #[error("failed to map target member '{member}' of {owner}: {cause}")]
    Transform {
        owner: String,
        member: String,
        #[source]
        cause: ModelError,
    },

    /// Member-level failure outside a transformation.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl MapError {
    /// Name of the offending member, if the error concerns one.
    pub fn member(&self) -> Option<&str> {
        match self {
            Self::AmbiguousMember { second, .. } => Some(second),
            Self::UnmappedTargetMember { member, .. }
            | Self::UnmappedSourceMember { member, .. }
            | Self::NullableCoercion { member, .. }
            | Self::MemberNotFound { member, .. }
            | Self::Transform { member, .. } => Some(member),
            Self::IncompatibleMemberTypes { target_member, .. } => Some(target_member),
            Self::Model(ModelError::UnsupportedOperation { member, .. }) => Some(member),
            Self::ArityMismatch { .. } | Self::ArgumentNull(_) | Self::Model(_) => None,
        }
    }

    /// Whether the error was raised before any transformation existed.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::ArgumentNull(_) | Self::Transform { .. })
    }
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use memberwise_model::Operation;

    use super::*;

    #[test]
    fn test_member_accessor() {
        let err = MapError::UnmappedTargetMember {
            owner: "Order".to_string(),
            member: "Total".to_string(),
        };
        assert_eq!(err.member(), Some("Total"));
        assert!(err.is_configuration_error());

        let err: MapError = ModelError::UnsupportedOperation {
            owner: "Order".to_string(),
            member: "Id".to_string(),
            operation: Operation::Write,
        }
        .into();
        assert_eq!(err.member(), Some("Id"));
        assert_eq!(err.to_string(), "member 'Id' of Order does not support write");
    }

    #[test]
    fn test_argument_null_is_per_call() {
        let err = MapError::ArgumentNull("source");
        assert!(!err.is_configuration_error());
        assert_eq!(err.member(), None);
    }
}
