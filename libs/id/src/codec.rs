//! The public id codec.
//!
//! Construction splits the alphabet into three disjoint sets:
//! - the working alphabet, which carries the digits of the encoded number
//! - separators, which delimit numbers in multi-number hashes
//! - guards, which pad short hashes up to the minimum length
//!
//! Only single-number hashes are produced; a multi-number hash issued by
//! another implementation is rejected on decode.

use crate::CodecError;

/// Default alphabet: the 62 ASCII alphanumerics.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Default minimum length of an encoded id.
pub const DEFAULT_MIN_LENGTH: usize = 5;

const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";
const MIN_ALPHABET_LENGTH: usize = 16;

/// Builder for [`PublicIdCodec`].
#[derive(Debug, Clone)]
pub struct PublicIdCodecBuilder {
    salt: String,
    alphabet: String,
    min_length: usize,
}

impl Default for PublicIdCodecBuilder {
    fn default() -> Self {
        Self {
            salt: String::new(),
            alphabet: DEFAULT_ALPHABET.to_string(),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl PublicIdCodecBuilder {
    /// Sets the secret salt.
    #[must_use]
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Sets the minimum length of encoded ids.
    #[must_use]
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Replaces the default alphabet.
    #[must_use]
    pub fn alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// Validates the settings and builds the codec.
    pub fn build(self) -> Result<PublicIdCodec, CodecError> {
        let mut alphabet: Vec<char> = Vec::new();
        for c in self.alphabet.chars() {
            if !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }

        if alphabet.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort {
                min: MIN_ALPHABET_LENGTH,
                actual: alphabet.len(),
            });
        }
        if alphabet.iter().any(|c| c.is_whitespace()) {
            return Err(CodecError::AlphabetContainsWhitespace);
        }

        let salt: Vec<char> = self.salt.chars().collect();

        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|c| alphabet.contains(c))
            .collect();
        alphabet.retain(|c| !separators.contains(c));
        shuffle(&mut separators, &salt);

        // Keep the alphabet/separator ratio at or below 3.5.
        if separators.is_empty() || 2 * alphabet.len() > 7 * separators.len() {
            let wanted = (2 * alphabet.len()).div_ceil(7).max(2);
            if wanted > separators.len() {
                let missing = (wanted - separators.len()).min(alphabet.len());
                separators.extend(alphabet.drain(..missing));
            } else {
                separators.truncate(wanted);
            }
        }

        shuffle(&mut alphabet, &salt);

        let guard_count = alphabet.len().div_ceil(12);
        let guards: Vec<char> = if alphabet.len() < 3 {
            separators.drain(..guard_count.min(separators.len())).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(PublicIdCodec {
            salt,
            alphabet,
            separators,
            guards,
            min_length: self.min_length,
        })
    }
}

/// Encodes row ids into public ids and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIdCodec {
    salt: Vec<char>,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
    min_length: usize,
}

impl PublicIdCodec {
    /// Starts building a codec with the default alphabet and minimum length.
    pub fn builder() -> PublicIdCodecBuilder {
        PublicIdCodecBuilder::default()
    }

    /// Creates a codec with the given salt and minimum length.
    pub fn new(salt: impl Into<String>, min_length: usize) -> Self {
        // The default alphabet always satisfies the builder's checks.
        match Self::builder().salt(salt).min_length(min_length).build() {
            Ok(codec) => codec,
            Err(e) => unreachable!("default alphabet rejected: {e}"),
        }
    }

    /// Returns the configured minimum length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Encodes a row id.
    pub fn encode(&self, id: u64) -> String {
        let checksum = id % 100;
        let mut alphabet = self.alphabet.clone();

        let lottery = alphabet[index(checksum, alphabet.len())];
        let mut out = vec![lottery];

        let key = lottery_key(lottery, &self.salt, &alphabet);
        shuffle(&mut alphabet, &key);
        out.extend(to_alphabet(id, &alphabet));

        if out.len() < self.min_length {
            let guard = index(checksum + u64::from(out[0]), self.guards.len());
            out.insert(0, self.guards[guard]);

            if out.len() < self.min_length {
                let guard = index(checksum + u64::from(out[2]), self.guards.len());
                out.push(self.guards[guard]);
            }
        }

        let half = alphabet.len() / 2;
        while out.len() < self.min_length {
            let key = alphabet.clone();
            shuffle(&mut alphabet, &key);

            let mut padded = Vec::with_capacity(out.len() + alphabet.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&out);
            padded.extend_from_slice(&alphabet[..half]);
            out = padded;

            let excess = out.len().saturating_sub(self.min_length);
            if excess > 0 {
                let start = excess / 2;
                out = out[start..start + self.min_length].to_vec();
            }
        }

        out.into_iter().collect()
    }

    /// Decodes a public id.
    ///
    /// Returns `None` unless `public_id` is exactly what [`Self::encode`]
    /// produces for some id.
    pub fn decode(&self, public_id: &str) -> Option<u64> {
        let chars: Vec<char> = public_id.chars().collect();
        if chars.is_empty() || !chars.iter().all(|c| self.is_known(*c)) {
            return None;
        }

        let parts: Vec<&[char]> = chars.split(|c| self.guards.contains(c)).collect();
        let body = match parts.len() {
            2 | 3 => parts[1],
            _ => parts[0],
        };

        let (&lottery, digits) = body.split_first()?;
        if digits.iter().any(|c| self.separators.contains(c)) {
            return None;
        }

        let mut alphabet = self.alphabet.clone();
        let key = lottery_key(lottery, &self.salt, &alphabet);
        shuffle(&mut alphabet, &key);

        let id = from_alphabet(digits, &alphabet)?;
        (self.encode(id) == public_id).then_some(id)
    }

    fn is_known(&self, c: char) -> bool {
        self.alphabet.contains(&c) || self.separators.contains(&c) || self.guards.contains(&c)
    }
}

fn index(value: u64, len: usize) -> usize {
    (value % len as u64) as usize
}

/// Builds the per-number shuffle key: lottery, then salt, then alphabet,
/// cut to the alphabet length.
fn lottery_key(lottery: char, salt: &[char], alphabet: &[char]) -> Vec<char> {
    std::iter::once(lottery)
        .chain(salt.iter().copied())
        .chain(alphabet.iter().copied())
        .take(alphabet.len())
        .collect()
}

/// Deterministic salt-driven permutation.
fn shuffle(chars: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }

    let mut v = 0usize;
    let mut p = 0u64;
    for i in (1..chars.len()).rev() {
        v %= salt.len();
        let code = u64::from(salt[v]);
        p += code;
        let j = index(code + v as u64 + p, i);
        chars.swap(i, j);
        v += 1;
    }
}

fn to_alphabet(mut value: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet[index(value, alphabet.len())]);
        value /= base;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn from_alphabet(digits: &[char], alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    digits.iter().try_fold(0u64, |acc, c| {
        let digit = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn codec() -> PublicIdCodec {
        PublicIdCodec::new("this is my salt", DEFAULT_MIN_LENGTH)
    }

    #[test]
    fn test_matches_reference_encoding() {
        let codec = PublicIdCodec::new("this is my salt", 0);
        assert_eq!(codec.encode(12345), "NkK9");
        assert_eq!(codec.decode("NkK9"), Some(12345));
    }

    #[test]
    fn test_matches_reference_padding() {
        let codec = PublicIdCodec::new("this is my salt", 8);
        assert_eq!(codec.encode(1), "gB0NV05e");
        assert_eq!(codec.decode("gB0NV05e"), Some(1));
    }

    #[test]
    fn test_default_min_length() {
        let codec = codec();
        for id in [0, 1, 2, 9, 10, 99, 100] {
            assert!(codec.encode(id).chars().count() >= DEFAULT_MIN_LENGTH);
        }
    }

    #[test]
    fn test_output_is_alphanumeric() {
        let codec = codec();
        for id in 0..500 {
            let public_id = codec.encode(id);
            assert!(public_id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_distinct_ids_distinct_hashes() {
        let codec = codec();
        let hashes: std::collections::HashSet<_> = (0..2000).map(|id| codec.encode(id)).collect();
        assert_eq!(hashes.len(), 2000);
    }

    #[test]
    fn test_salt_changes_output() {
        let a = PublicIdCodec::new("salt one", DEFAULT_MIN_LENGTH);
        let b = PublicIdCodec::new("salt two", DEFAULT_MIN_LENGTH);
        assert_ne!(a.encode(42), b.encode(42));
        assert_ne!(b.decode(&a.encode(42)), Some(42));
    }

    #[test]
    fn test_max_value_roundtrip() {
        let codec = codec();
        assert_eq!(codec.decode(&codec.encode(u64::MAX)), Some(u64::MAX));
    }

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("!!!!!")]
    #[case("abc-def")]
    #[case("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz")]
    fn test_decode_rejects_garbage(#[case] input: &str) {
        assert_eq!(codec().decode(input), None);
    }

    #[test]
    fn test_decode_rejects_tampered_hash() {
        let codec = codec();
        let public_id = codec.encode(7);
        let mut chars: Vec<char> = public_id.chars().collect();
        let last = chars.len() - 1;
        chars.swap(0, last);
        let tampered: String = chars.into_iter().collect();
        if tampered != public_id {
            assert_ne!(codec.decode(&tampered), Some(7));
        }
    }

    #[test]
    fn test_decode_rejects_different_min_length() {
        let short = PublicIdCodec::new("this is my salt", 0);
        assert_eq!(codec().decode(&short.encode(12345)), None);
    }

    #[test]
    fn test_custom_alphabet() {
        let codec = PublicIdCodec::builder()
            .salt("pepper")
            .alphabet("0123456789abcdef")
            .build()
            .unwrap();
        let public_id = codec.encode(987_654_321);
        assert!(public_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(codec.decode(&public_id), Some(987_654_321));
    }

    #[test]
    fn test_alphabet_too_short() {
        let err = PublicIdCodec::builder()
            .alphabet("abcdefgh")
            .build()
            .unwrap_err();
        assert!(err.is_too_short());
    }

    #[test]
    fn test_alphabet_with_whitespace() {
        let err = PublicIdCodec::builder()
            .alphabet("abcdefghijklmnop qrstuvwxyz")
            .build()
            .unwrap_err();
        assert_eq!(err, CodecError::AlphabetContainsWhitespace);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(id in any::<u64>()) {
            let codec = codec();
            prop_assert_eq!(codec.decode(&codec.encode(id)), Some(id));
        }

        #[test]
        fn prop_min_length(id in any::<u64>(), min_length in 0usize..24) {
            let codec = PublicIdCodec::new("prop salt", min_length);
            prop_assert!(codec.encode(id).chars().count() >= min_length);
        }

        #[test]
        fn prop_decode_never_returns_wrong_id(input in "[a-zA-Z0-9]{1,12}") {
            let codec = codec();
            if let Some(id) = codec.decode(&input) {
                prop_assert_eq!(codec.encode(id), input);
            }
        }
    }
}
