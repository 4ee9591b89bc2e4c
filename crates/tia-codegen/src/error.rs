//! Error types for snippet generation

/// Errors generating a trace snippet
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// A context field the snippet needs is empty
    #[error("empty {0} in trace context")]
    EmptyField(&'static str),

    /// Generator-specific failure
    #[error("generator failed: {0}")]
    Generator(String),
}

impl CodegenError {
    /// Create generator failure
    pub fn generator(message: impl Into<String>) -> Self {
        Self::Generator(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            CodegenError::EmptyField("class name").to_string(),
            "empty class name in trace context"
        );
        assert_eq!(CodegenError::generator("boom").to_string(), "generator failed: boom");
    }
}
