//! Error types for the rewriting boundary

/// Errors raised by a [`UnitRewriter`](crate::UnitRewriter)
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Raw unit bytes could not be parsed
    #[error("malformed unit: {0}")]
    Malformed(String),

    /// Behavior does not belong to the unit being rewritten
    #[error("unknown behavior #{index} in {unit}")]
    UnknownBehavior {
        /// Unit name
        unit: String,
        /// Behavior index within the unit
        index: usize,
    },

    /// Snippet could not be compiled into the behavior
    #[error("cannot insert into {behavior}: {message}")]
    Insert {
        /// Behavior name
        behavior: String,
        /// Rewriter message
        message: String,
    },

    /// Unit could not be written back to bytes
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// Descriptor encoding error
    #[error("descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),
}

impl RewriteError {
    /// Create insertion error for behavior
    pub fn insert(behavior: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Insert {
            behavior: behavior.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_behavior_display() {
        let err = RewriteError::UnknownBehavior {
            unit: "acme.Widget".to_string(),
            index: 7,
        };
        assert_eq!(err.to_string(), "unknown behavior #7 in acme.Widget");
    }

    #[test]
    fn insert_display() {
        let err = RewriteError::insert("render", "no body");
        assert_eq!(err.to_string(), "cannot insert into render: no body");
    }

    #[test]
    fn descriptor_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RewriteError = json_err.into();
        assert!(matches!(err, RewriteError::Descriptor(_)));
    }
}
