use thiserror::Error;

/// Every failure a surface can report. All of them abort the operation that
/// raised them; the surface keeps its previous state.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The descriptor (or an update argument) is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A hard resource cap was hit while generating geometry.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A method was called in the wrong state or for the wrong mode.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The GPU collaborator rejected a request.
    #[error("Device error: {0}")]
    Device(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SurfaceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

pub type Result<T> = std::result::Result<T, SurfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = SurfaceError::config("num_u must be at least 2");
        assert_eq!(err.to_string(), "Configuration error: num_u must be at least 2");

        let err = SurfaceError::ResourceExhausted("cap".into());
        assert!(err.to_string().starts_with("Resource exhausted"));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(SurfaceError::config("x").is_configuration());
        assert!(SurfaceError::usage("x").is_usage());
        assert!(!SurfaceError::usage("x").is_configuration());
        assert!(SurfaceError::ResourceExhausted("x".into()).is_resource_exhausted());
    }
}
