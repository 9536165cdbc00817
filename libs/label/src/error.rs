//! Label rendering errors.

use thiserror::Error;

/// Errors that can occur while rendering a label.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The label has no public id to print.
    #[error("public id cannot be empty")]
    EmptyPublicId,

    /// The QR payload could not be encoded.
    #[error("failed to encode QR code: {0}")]
    Qr(#[source] qrcode::types::QrError),
}
