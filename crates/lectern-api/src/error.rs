//! Error types for the HTTP layer.

/// Errors that can occur while talking to the backend.
///
/// From the auth controller's point of view all of these mean "not
/// authenticated" — the distinction only matters to callers of the
/// schedule API, and to logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL (or a path joined onto it) is not a
    /// valid URL.
    #[error("invalid url: {0}")]
    Url(String),

    /// The request never produced a response: DNS, TLS, connection
    /// reset, client build failure.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status. The body is
    /// kept verbatim — backends put their error JSON there.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not parse as the expected type.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Schedule generation was still pending after the bounded retry
    /// loop was exhausted. This is the one failure meant to surface
    /// loudly in the UI, as an explicit notification.
    #[error("schedule generation still pending after {attempts} attempts")]
    GenerationTimeout { attempts: u32 },
}

impl ApiError {
    /// Returns `true` for responses the backend explicitly refused for
    /// credential reasons.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_rejection_only_for_401_and_403() {
        let unauthorized = ApiError::Status {
            status: 401,
            body: String::new(),
        };
        let forbidden = ApiError::Status {
            status: 403,
            body: String::new(),
        };
        let server_error = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        assert!(unauthorized.is_auth_rejection());
        assert!(forbidden.is_auth_rejection());
        assert!(!server_error.is_auth_rejection());
        assert!(
            !ApiError::GenerationTimeout { attempts: 15 }.is_auth_rejection()
        );
    }

    #[test]
    fn test_generation_timeout_message_names_attempts() {
        let err = ApiError::GenerationTimeout { attempts: 15 };
        assert!(err.to_string().contains("15 attempts"));
    }
}
