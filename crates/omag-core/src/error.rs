use thiserror::Error;
use uuid::Uuid;

/// Platform-wide error types for OMAG.
///
/// Every variant folds into one of the open-metadata exception classes reported back to
/// callers: invalid parameter, user not authorized, property server, or configuration.
#[derive(Error, Debug)]
pub enum OmagError {
    /// A caller-supplied parameter is missing or malformed.
    #[error("Invalid value for parameter {parameter}: {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A GUID does not identify a visible element.
    #[error("No element found for {parameter} {guid}")]
    ElementNotFound { parameter: String, guid: Uuid },

    /// The user is not permitted to issue this request.
    #[error("User {user_id} is not authorized: {message}")]
    UserNotAuthorized { user_id: String, message: String },

    /// The metadata repository failed or is unavailable.
    #[error("Property server error: {0}")]
    PropertyServer(String),

    /// The server configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The named server is not running on this platform.
    #[error("Server {0} is not active on this platform")]
    ServerNotActive(String),

    /// The named service is not running in the server.
    #[error("Service {service} is not active in server {server}")]
    ServiceNotActive { server: String, service: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// HTTP request failed (client side).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// An error reported by a remote platform, carried over from its FFDC response.
    #[error("{exception_class_name} ({http_code}): {message}")]
    Remote {
        http_code: u16,
        exception_class_name: String,
        parameter_name: Option<String>,
        message: String,
    },
}

impl OmagError {
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        OmagError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn not_found(parameter: impl Into<String>, guid: Uuid) -> Self {
        OmagError::ElementNotFound {
            parameter: parameter.into(),
            guid,
        }
    }

    pub fn not_authorized(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        OmagError::UserNotAuthorized {
            user_id: user_id.into(),
            message: message.into(),
        }
    }

    /// Name of the open-metadata exception this error is reported as.
    pub fn exception_class_name(&self) -> &'static str {
        match self {
            OmagError::InvalidParameter { .. }
            | OmagError::ElementNotFound { .. }
            | OmagError::ServerNotActive(_)
            | OmagError::ServiceNotActive { .. }
            | OmagError::SerializationError(_) => "InvalidParameterException",
            OmagError::UserNotAuthorized { .. } => "UserNotAuthorizedException",
            OmagError::Configuration(_) => "OMAGConfigurationErrorException",
            OmagError::PropertyServer(_)
            | OmagError::DatabaseError(_)
            | OmagError::HttpError(_)
            | OmagError::NetworkError(_)
            | OmagError::Timeout(_) => "PropertyServerException",
            OmagError::Remote {
                exception_class_name,
                ..
            } => match exception_class_name.as_str() {
                "InvalidParameterException" => "InvalidParameterException",
                "UserNotAuthorizedException" => "UserNotAuthorizedException",
                "OMAGConfigurationErrorException" => "OMAGConfigurationErrorException",
                _ => "PropertyServerException",
            },
        }
    }

    /// HTTP status code that accompanies the error.
    pub fn http_status(&self) -> u16 {
        match self {
            OmagError::InvalidParameter { .. } | OmagError::SerializationError(_) => 400,
            OmagError::Configuration(_) => 400,
            OmagError::UserNotAuthorized { .. } => 403,
            OmagError::ElementNotFound { .. }
            | OmagError::ServerNotActive(_)
            | OmagError::ServiceNotActive { .. } => 404,
            OmagError::Timeout(_) => 504,
            OmagError::PropertyServer(_)
            | OmagError::DatabaseError(_)
            | OmagError::HttpError(_)
            | OmagError::NetworkError(_) => 500,
            OmagError::Remote { http_code, .. } => *http_code,
        }
    }

    /// The offending parameter, when the error is about one.
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            OmagError::InvalidParameter { parameter, .. }
            | OmagError::ElementNotFound { parameter, .. } => Some(parameter),
            OmagError::ServerNotActive(_) | OmagError::ServiceNotActive { .. } => {
                Some("server_name")
            }
            OmagError::Remote { parameter_name, .. } => parameter_name.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_classes() {
        assert_eq!(
            OmagError::invalid_parameter("guid", "bad").exception_class_name(),
            "InvalidParameterException"
        );
        assert_eq!(
            OmagError::not_found("guid", Uuid::nil()).exception_class_name(),
            "InvalidParameterException"
        );
        assert_eq!(
            OmagError::not_authorized("bob", "no").exception_class_name(),
            "UserNotAuthorizedException"
        );
        assert_eq!(
            OmagError::DatabaseError("down".into()).exception_class_name(),
            "PropertyServerException"
        );
        assert_eq!(
            OmagError::Configuration("bad".into()).exception_class_name(),
            "OMAGConfigurationErrorException"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(OmagError::invalid_parameter("x", "y").http_status(), 400);
        assert_eq!(OmagError::not_found("x", Uuid::nil()).http_status(), 404);
        assert_eq!(OmagError::ServerNotActive("s".into()).http_status(), 404);
        assert_eq!(OmagError::not_authorized("u", "m").http_status(), 403);
        assert_eq!(OmagError::PropertyServer("p".into()).http_status(), 500);
        assert_eq!(OmagError::Timeout(30).http_status(), 504);
    }

    #[test]
    fn test_parameter_name() {
        assert_eq!(
            OmagError::invalid_parameter("page_size", "too big").parameter_name(),
            Some("page_size")
        );
        assert_eq!(
            OmagError::ServerNotActive("cocoMDS1".into()).parameter_name(),
            Some("server_name")
        );
        assert_eq!(OmagError::PropertyServer("x".into()).parameter_name(), None);
    }

    #[test]
    fn test_remote_error_keeps_ffdc_fields() {
        let err = OmagError::Remote {
            http_code: 403,
            exception_class_name: "UserNotAuthorizedException".into(),
            parameter_name: None,
            message: "User bob is not authorized".into(),
        };
        assert_eq!(err.http_status(), 403);
        assert_eq!(err.exception_class_name(), "UserNotAuthorizedException");

        let err = OmagError::Remote {
            http_code: 500,
            exception_class_name: "SomethingElse".into(),
            parameter_name: Some("guid".into()),
            message: "boom".into(),
        };
        assert_eq!(err.exception_class_name(), "PropertyServerException");
        assert_eq!(err.parameter_name(), Some("guid"));
    }
}
