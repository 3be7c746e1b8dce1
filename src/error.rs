//! Error handling.

use axum::{
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

/// User insights server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum UserInsightsError {
    /// A record of the users file is not a JSON object
    #[error("user at index {index} is not an object")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Error encoding Prometheus metrics
    #[error("failed to encode metrics")]
    MetricsEncode(#[from] prometheus::Error),

    /// The users file does not contain an array
    #[error("the users file must contain an array of users")]
    NotAnArray,

    /// Error parsing the users file as JSON
    #[error("failed to parse the users file")]
    UsersFileParse(#[source] serde_json::Error),

    /// Error reading the users file
    #[error("failed to read the users file")]
    UsersFileRead(#[from] std::io::Error),
}

impl IntoResponse for UserInsightsError {
    /// Convert from a `UserInsightsError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Messages of the chain of sources of `error`, outermost first.
pub(crate) fn causes(error: &dyn Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut causes = causes(error);
        causes.dedup();
        let caused_by = if causes.is_empty() {
            None
        } else {
            Some(causes)
        };
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<UserInsightsError> for ErrorResponse {
    /// Convert from a `UserInsightsError` into an `ErrorResponse`.
    fn from(error: UserInsightsError) -> Self {
        let response = match &error {
            // Bad request
            UserInsightsError::InvalidRecord { .. } | UserInsightsError::NotAnArray => {
                Self::bad_request(&error)
            }

            // Internal server error
            UserInsightsError::MetricsEncode(_)
            | UserInsightsError::UsersFileParse(_)
            | UserInsightsError::UsersFileRead(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            for cause in causes(&error) {
                event!(Level::ERROR, "Caused by: {}", cause);
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hyper::HeaderMap;

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn test_user_insights_error(
        error: UserInsightsError,
        status: StatusCode,
        message: &str,
        caused_by: Option<Vec<&'static str>>,
    ) {
        let response = error.into_response();
        assert_eq!(status, response.status());
        let mut headers = HeaderMap::new();
        headers.insert(&header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert_eq!(headers, *response.headers());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message.to_string(), error_response.error.message);
        // Map Vec items from str to String
        let caused_by = caused_by.map(|cb| cb.iter().map(|s| s.to_string()).collect());
        assert_eq!(caused_by, error_response.error.caused_by);
    }

    #[tokio::test]
    async fn invalid_record_error() {
        let source = <serde_json::Error as serde::de::Error>::custom("expected a map");
        let error = UserInsightsError::InvalidRecord { index: 3, source };
        let message = "user at index 3 is not an object";
        let caused_by = Some(vec!["expected a map"]);
        test_user_insights_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[test]
    fn causes_outermost_first() {
        let source = <serde_json::Error as serde::de::Error>::custom("unexpected end");
        let error = UserInsightsError::UsersFileParse(source);
        assert_eq!(vec!["unexpected end".to_string()], causes(&error));
        assert!(causes(&UserInsightsError::NotAnArray).is_empty());
    }

    #[tokio::test]
    async fn not_an_array_error() {
        let error = UserInsightsError::NotAnArray;
        let message = "the users file must contain an array of users";
        test_user_insights_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn users_file_parse_error() {
        let source = <serde_json::Error as serde::de::Error>::custom("unexpected end");
        let error = UserInsightsError::UsersFileParse(source);
        let message = "failed to parse the users file";
        let caused_by = Some(vec!["unexpected end"]);
        test_user_insights_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, caused_by)
            .await;
    }

    #[tokio::test]
    async fn users_file_read_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = UserInsightsError::UsersFileRead(io_error);
        let message = "failed to read the users file";
        let caused_by = Some(vec!["no such file"]);
        test_user_insights_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, caused_by)
            .await;
    }
}
