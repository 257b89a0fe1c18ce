//! Response envelope and HTTP error mapping.
//!
//! Every JSON response has the shape `{"success", "message", "data"}`;
//! errors omit `data`.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::error;

/// The JSON envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` with `data`.
    pub fn ok(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// `201 Created` with `data`.
    pub fn created(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        data: T,
    ) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: true,
                message: message.into(),
                data: Some(data),
            }),
        )
    }
}

/// Handler return type.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Errors surfaced to clients.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// A failure the client cannot fix. `message` is returned; `source` is
    /// only logged.
    Internal {
        message: String,
        source: doorscan_core::Error,
    },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal { message, .. } => message,
        }
    }
}

impl From<doorscan_core::Error> for ApiError {
    fn from(err: doorscan_core::Error) -> Self {
        use doorscan_core::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            err @ Error::Database(_) => {
                if err.is_unique_violation() {
                    return ApiError::Conflict("Record already exists".to_string());
                }
                if err.is_foreign_key_violation() {
                    return ApiError::BadRequest("Referenced record does not exist".to_string());
                }
                if err.is_invalid_geometry() {
                    return ApiError::BadRequest("Invalid WKT geometry".to_string());
                }
                if err.is_coordinate_out_of_range() {
                    return ApiError::BadRequest(
                        "Geometry coordinates must be longitude [-180, 180] and latitude [-90, 90]"
                            .to_string(),
                    );
                }
                ApiError::Internal {
                    message: "Database operation failed".to_string(),
                    source: err,
                }
            }
            other => ApiError::Internal {
                message: "Internal server error".to_string(),
                source: other,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal { message, source } => {
                error!(error = %source, "{}", message);
                message
            }
            other => other.message().to_string(),
        };

        let body = Json(ApiResponse::<()> {
            success: false,
            message,
            data: None,
        });
        (status, body).into_response()
    }
}

/// Attach the operation-specific message returned on 5xx responses.
pub trait FailureMessage<T> {
    fn or_fail(self, message: &str) -> Result<T, ApiError>;
}

impl<T> FailureMessage<T> for doorscan_core::Result<T> {
    fn or_fail(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|err| match ApiError::from(err) {
            ApiError::Internal { source, .. } => ApiError::Internal {
                message: message.to_string(),
                source,
            },
            client_error => client_error,
        })
    }
}

/// `Json` whose rejections use the response envelope (400 instead of 415/422).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// `Query` whose rejections use the response envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
    }
}

/// `Path` whose rejections use the response envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorscan_core::Error;

    #[test]
    fn test_core_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(Error::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::InvalidInput("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::Conflict("x".into())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_driver_errors_are_hidden() {
        let err = ApiError::from(Error::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Database operation failed");
    }

    #[test]
    fn test_or_fail_replaces_only_server_messages() {
        let failed: doorscan_core::Result<()> = Err(Error::Database(sqlx::Error::PoolTimedOut));
        let err = failed.or_fail("Error retrieving buildings").unwrap_err();
        assert_eq!(err.message(), "Error retrieving buildings");

        let invalid: doorscan_core::Result<()> = Err(Error::InvalidInput("bad".into()));
        let err = invalid.or_fail("Error retrieving buildings").unwrap_err();
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn test_envelope_omits_missing_data() {
        let body = ApiResponse::<()> {
            success: false,
            message: "Building not found".into(),
            data: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": false, "message": "Building not found" })
        );
    }
}
