/// Failure of a call to the REST API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the response body, or a generic
    /// `Request failed: <status>` when the body was empty
    #[error("{message}")]
    Request { status: u16, message: String },
    /// 401 response. The session token has already been cleared.
    #[error("{message}")]
    Unauthorized { message: String },
    /// A success response whose body was not the expected JSON
    #[error("could not parse response: {0}")]
    Parse(String),
    /// A request body that could not be encoded
    #[error("could not encode request: {0}")]
    Encode(String),
    /// The request never produced a response (DNS, refused, timeout)
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// HTTP status for errors that came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The user-facing message, or `fallback` when the error carries no text.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_displays_body_verbatim() {
        let err = ApiError::Request {
            status: 404,
            message: r#"{"detail":"Goal not found"}"#.into(),
        };
        assert_eq!(err.to_string(), r#"{"detail":"Goal not found"}"#);
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_is_a_401() {
        let err = ApiError::Unauthorized {
            message: "Could not validate credentials".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn message_or_falls_back_on_blank() {
        let err = ApiError::Request {
            status: 500,
            message: " ".into(),
        };
        assert_eq!(err.message_or("Failed to load tasks"), "Failed to load tasks");
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.message_or("x"), "network error: connection refused");
    }
}
