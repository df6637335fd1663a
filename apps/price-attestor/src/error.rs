use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::encoding::EncodingError;
use crate::price_source::PriceSourceError;
use crate::signer::SignerError;
use crate::verifier::{RegistryError, RejectionReason};

/// Errors that can occur while working with attestor
#[derive(Debug, Error)]
pub enum AttestorError {
    #[error("Feed identifier rejected: {0}")]
    EncodingOverflow(#[from] EncodingError),

    #[error("Price source error: {0}")]
    PriceSource(#[from] PriceSourceError),

    #[error("Failed to sign attestation due to: {0}")]
    SignerError(String),

    #[error("Signer initialization failed: {0}")]
    SignerInitError(#[from] SignerError),

    #[error("Attestation rejected: {0}")]
    Rejected(#[from] RejectionReason),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl AttestorError {
    /// HTTP status reported to API callers.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EncodingOverflow(_) => StatusCode::BAD_REQUEST,
            Self::PriceSource(PriceSourceError::StalePrice { .. })
            | Self::PriceSource(PriceSourceError::NegativePrice { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::PriceSource(PriceSourceError::FeedNotFound(_)) => StatusCode::NOT_FOUND,
            Self::PriceSource(_) => StatusCode::BAD_GATEWAY,
            Self::Rejected(RejectionReason::InvalidSignature) => StatusCode::UNAUTHORIZED,
            Self::Rejected(RejectionReason::StaleRegistryState) => StatusCode::CONFLICT,
            Self::Rejected(RejectionReason::Uninitialized) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SignerError(_) | Self::SignerInitError(_) | Self::Registry(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AttestorError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
