use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use omag_core::OmagError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `OmagError`.
pub struct ApiError(pub OmagError);

impl From<OmagError> for ApiError {
    fn from(err: OmagError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(OmagError::invalid_parameter("request_body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(OmagError::invalid_parameter("query_string", rejection.body_text()))
    }
}

fn error_type(err: &OmagError) -> &'static str {
    match err {
        OmagError::InvalidParameter { .. } => "invalid_parameter",
        OmagError::ElementNotFound { .. } => "not_found",
        OmagError::UserNotAuthorized { .. } => "user_not_authorized",
        OmagError::PropertyServer(_) => "property_server_error",
        OmagError::Configuration(_) => "configuration_error",
        OmagError::ServerNotActive(_) => "server_not_active",
        OmagError::ServiceNotActive { .. } => "service_not_active",
        OmagError::SerializationError(_) => "serialization_error",
        OmagError::DatabaseError(_) => "database_error",
        OmagError::HttpError(_) | OmagError::NetworkError(_) | OmagError::Remote { .. } => {
            "remote_error"
        }
        OmagError::Timeout(_) => "timeout",
    }
}

fn action_description(err: &OmagError) -> &'static str {
    match err.exception_class_name() {
        "InvalidParameterException" => "Correct the request parameters and retry",
        "UserNotAuthorizedException" => "Ask an administrator to grant the user access",
        "OMAGConfigurationErrorException" => {
            "Correct the server configuration before retrying the request"
        }
        _ => "Check the platform log and the health of the metadata repository",
    }
}

impl ApiError {
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: error_type(&self.0).to_string(),
            message: self.0.to_string(),
            related_http_code: self.0.http_status(),
            exception_class_name: self.0.exception_class_name().to_string(),
            action_description: action_description(&self.0).to_string(),
            parameter_name: self.0.parameter_name().map(String::from),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        (status, axum::Json(self.to_error_response())).into_response()
    }
}
