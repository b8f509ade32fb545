//! Typed transport failures

/// Failure reported by the email service
///
/// Transports return these wrapped in `anyhow::Error`; callers that need to
/// branch on the kind use `err.downcast_ref::<TransportError>()`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("email not found: {0}")]
    NotFound(String),
    #[error("email service unavailable")]
    Unavailable,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("email service responded with status {0}")]
    Status(u16),
}

impl TransportError {
    /// Map an HTTP status code to a transport error
    pub fn from_status(status: u16, subject: &str) -> Self {
        match status {
            400 => TransportError::InvalidRequest(subject.to_string()),
            404 => TransportError::NotFound(subject.to_string()),
            503 => TransportError::Unavailable,
            other => TransportError::Status(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            TransportError::from_status(404, "abc"),
            TransportError::NotFound(id) if id == "abc"
        ));
        assert!(matches!(
            TransportError::from_status(503, "list"),
            TransportError::Unavailable
        ));
        assert!(matches!(
            TransportError::from_status(400, "list"),
            TransportError::InvalidRequest(_)
        ));
        assert!(matches!(
            TransportError::from_status(500, "list"),
            TransportError::Status(500)
        ));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = TransportError::Unavailable.into();
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::Unavailable)
        ));
    }
}
