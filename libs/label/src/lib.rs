//! # parcel-label
//!
//! Renders the small printable tag attached to a parcel: a 130×65 pt PDF
//! page with a caption, the arrival date, the public id and a QR code that
//! encodes the public id, framed by a dashed cutting outline.
//!
//! Output is byte-for-byte deterministic for the same input; no creation
//! timestamp is written into the document.

mod error;
mod qr;
mod render;

pub use error::LabelError;
pub use qr::QrMatrix;
pub use render::{render, Label, PAGE_HEIGHT, PAGE_WIDTH};
