use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use match_engine::InterestError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("The request did not identify the user making it.")]
    MissingRequester,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    Interest(#[from] InterestError),
}

impl ServerError {
    /// A stable, machine-readable code clients can branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Interest(e) => e.code(),
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) => "INVALID_REQUEST",
            Self::MissingRequester => "UNAUTHENTICATED",
            Self::InitializeError(_) | Self::IOError(_) | Self::Unspecified(_) => {
                "INTERNAL_ERROR"
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Interest(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::Interest(InterestError::Cooldown { retry_after }) => Some(json!({ "retry_after": retry_after })),
            Self::Interest(InterestError::DailyLimitExceeded { limit, resets_at }) => {
                Some(json!({ "limit": limit, "resets_at": resets_at }))
            },
            Self::Interest(InterestError::InsufficientCredit { required, available }) => {
                Some(json!({ "required": required, "available": available }))
            },
            _ => None,
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Interest(e) => match e {
                InterestError::SelfTarget => StatusCode::BAD_REQUEST,
                InterestError::NotCoMember(_) => StatusCode::FORBIDDEN,
                InterestError::Unauthorized => StatusCode::FORBIDDEN,
                InterestError::DuplicateInterest => StatusCode::CONFLICT,
                InterestError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
                InterestError::DailyLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                InterestError::InsufficientCredit { .. } => StatusCode::PAYMENT_REQUIRED,
                InterestError::ReversalWindowExpired { .. } => StatusCode::GONE,
                InterestError::NotFound(_) => StatusCode::NOT_FOUND,
                InterestError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                InterestError::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
                InterestError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            },
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::MissingRequester => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
            "retryable": self.is_retryable(),
        });
        if let (Some(details), Some(map)) = (self.details(), body.as_object_mut()) {
            map.insert("details".into(), details);
        }
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
