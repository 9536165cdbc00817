//! Parcel records and the payloads that create and change them.
//!
//! These are plain data; persistence lives behind [`crate::db::ParcelStore`].

use chrono::{DateTime, Utc};
use parcel_id::PublicIdCodec;

/// Internal row id of a parcel. Never exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParcelId(i64);

impl ParcelId {
    /// Creates a ParcelId from a row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying row id.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Decodes a public id.
    ///
    /// Returns `None` when the string is not a valid encoding, or when the
    /// decoded value does not fit a row id.
    pub fn from_public(codec: &PublicIdCodec, public_id: &str) -> Option<Self> {
        codec
            .decode(public_id)
            .and_then(|value| i64::try_from(value).ok())
            .map(Self)
    }

    /// Encodes this id for clients.
    pub fn to_public(self, codec: &PublicIdCodec) -> String {
        debug_assert!(self.0 >= 0, "row ids are never negative");
        codec.encode(self.0 as u64)
    }
}

impl std::fmt::Display for ParcelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParcelId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A stored parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parcel {
    pub id: ParcelId,
    pub arrived_at: DateTime<Utc>,
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

/// Fields of a parcel about to be created.
///
/// The arrival time is stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParcel {
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

/// A partial update. `Some` marks a field as present, whatever its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelPatch {
    pub name: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<i32>,
    pub post_code: Option<i32>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub handed_out: Option<bool>,
}

impl ParcelPatch {
    /// Returns true if no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the present fields to `parcel`.
    pub fn apply_to(self, parcel: &mut Parcel) {
        if let Some(name) = self.name {
            parcel.name = name;
        }
        if let Some(street) = self.street {
            parcel.street = street;
        }
        if let Some(street_number) = self.street_number {
            parcel.street_number = street_number;
        }
        if let Some(post_code) = self.post_code {
            parcel.post_code = post_code;
        }
        if let Some(region) = self.region {
            parcel.region = region;
        }
        if let Some(country) = self.country {
            parcel.country = country;
        }
        if let Some(handed_out) = self.handed_out {
            parcel.handed_out = handed_out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel() -> Parcel {
        Parcel {
            id: ParcelId::new(1),
            arrived_at: Utc::now(),
            name: "Box A".to_string(),
            street: "Main".to_string(),
            street_number: 1,
            post_code: 1000,
            region: "R".to_string(),
            country: "C".to_string(),
            handed_out: true,
        }
    }

    #[test]
    fn test_patch_applies_falsy_values() {
        let mut parcel = parcel();
        ParcelPatch {
            handed_out: Some(false),
            street_number: Some(0),
            ..Default::default()
        }
        .apply_to(&mut parcel);

        assert!(!parcel.handed_out);
        assert_eq!(parcel.street_number, 0);
        assert_eq!(parcel.post_code, 1000);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut parcel = parcel();
        let before = parcel.clone();
        let patch = ParcelPatch::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut parcel);
        assert_eq!(parcel, before);
    }

    #[test]
    fn test_public_id_roundtrip() {
        let codec = PublicIdCodec::new("test salt", 5);
        let id = ParcelId::new(42);
        let public_id = id.to_public(&codec);
        assert_eq!(ParcelId::from_public(&codec, &public_id), Some(id));
    }

    #[test]
    fn test_public_id_beyond_row_range() {
        let codec = PublicIdCodec::new("test salt", 5);
        let public_id = codec.encode(u64::MAX);
        assert_eq!(ParcelId::from_public(&codec, &public_id), None);
    }
}
