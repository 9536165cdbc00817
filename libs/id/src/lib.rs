//! # parcel-id
//!
//! Public identifiers for parcel rows.
//!
//! ## Design Principles
//!
//! - Row ids are internal; clients only ever see the encoded public id
//! - Encoding is deterministic for a given salt, alphabet and minimum length
//! - Decoding is strict: anything that is not the exact encoding of a single
//!   integer decodes to `None`, never to a different id
//! - The codec is immutable once built and can be shared freely
//!
//! ## Format
//!
//! Public ids follow the Hashids v1 scheme, so ids issued by other Hashids
//! implementations with the same salt and settings decode here too.
//!
//! ```
//! use parcel_id::PublicIdCodec;
//!
//! let codec = PublicIdCodec::builder().salt("this is my salt").build()?;
//! let public_id = codec.encode(12345);
//! assert_eq!(codec.decode(&public_id), Some(12345));
//! # Ok::<(), parcel_id::CodecError>(())
//! ```

mod codec;
mod error;

pub use codec::{PublicIdCodec, PublicIdCodecBuilder, DEFAULT_ALPHABET, DEFAULT_MIN_LENGTH};
pub use error::CodecError;
