//! Self-describing text encoding for stored password credentials:
//!
//! ```text
//! $argon2id$v=19$m=65536,t=4,p=4$<salt>$<hash>
//! ```
//!
//! Salt and hash use the standard base64 alphabet without padding. The string
//! is persisted by callers, so this layout must stay decodable forever.
//! Parsing is done here rather than with `argon2::PasswordHash` because the
//! exact six-field shape and version guard are stricter than PHC's, and salt
//! length must come from the decoded bytes without PHC's salt size limits.

use std::fmt::{self, Display};
use std::str::FromStr;

use argon2::Version;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use zeroize::Zeroize;

use super::error::CryptoError;
use super::params::{HashParameters, MAX_MEMORY_KIB};

pub const ALGORITHM_ID: &str = "argon2id";
pub const ARGON2_VERSION: u32 = Version::V0x13 as u32;

const FIELD_COUNT: usize = 6;

/// Decoded form of a stored credential. Salt and key lengths in `parameters`
/// always reflect the decoded byte lengths.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCredential {
    version: u32,
    parameters: HashParameters,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl EncodedCredential {
    pub(crate) fn new(parameters: HashParameters, salt: Vec<u8>, hash: Vec<u8>) -> Self {
        let parameters = HashParameters {
            salt_len: salt.len(),
            key_len: hash.len(),
            ..parameters
        };
        Self {
            version: ARGON2_VERSION,
            parameters,
            salt,
            hash,
        }
    }

    /// Parses a stored credential string.
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let fields: Vec<&str> = encoded.split('$').collect();
        if fields.len() != FIELD_COUNT {
            return Err(CryptoError::malformed(format!(
                "expected {FIELD_COUNT} '$'-separated fields, found {}",
                fields.len()
            )));
        }
        if !fields[0].is_empty() {
            return Err(CryptoError::malformed("missing leading '$'"));
        }
        if fields[1].is_empty() {
            return Err(CryptoError::malformed("empty algorithm field"));
        }
        if fields[1] != ALGORITHM_ID {
            return Err(CryptoError::UnsupportedAlgorithm(fields[1].to_string()));
        }

        let version = fields[2]
            .strip_prefix("v=")
            .and_then(parse_decimal)
            .ok_or_else(|| CryptoError::malformed("invalid version field"))?;
        if version != ARGON2_VERSION {
            return Err(CryptoError::UnsupportedVersion {
                found: version,
                expected: ARGON2_VERSION,
            });
        }

        let (memory_kib, iterations, parallelism) = parse_costs(fields[3])
            .ok_or_else(|| CryptoError::malformed("invalid parameter field"))?;
        if memory_kib > MAX_MEMORY_KIB {
            return Err(CryptoError::malformed(format!(
                "memory cost {memory_kib} KiB exceeds the supported maximum"
            )));
        }

        let salt = STANDARD_NO_PAD
            .decode(fields[4])
            .map_err(|e| CryptoError::malformed(format!("salt: {e}")))?;
        let hash = STANDARD_NO_PAD
            .decode(fields[5])
            .map_err(|e| CryptoError::malformed(format!("hash: {e}")))?;

        Ok(Self {
            version,
            parameters: HashParameters {
                memory_kib,
                iterations,
                parallelism,
                salt_len: salt.len(),
                key_len: hash.len(),
            },
            salt,
            hash,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn parameters(&self) -> &HashParameters {
        &self.parameters
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }
}

impl Display for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${ALGORITHM_ID}$v={}${}${}${}",
            self.version,
            self.parameters,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.hash),
        )
    }
}

impl FromStr for EncodedCredential {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

// Salt and hash stay out of debug output.
impl fmt::Debug for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedCredential")
            .field("version", &self.version)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Drop for EncodedCredential {
    fn drop(&mut self) {
        self.salt.zeroize();
        self.hash.zeroize();
    }
}

/// Parses `m=<int>,t=<int>,p=<int>` in that exact order.
fn parse_costs(field: &str) -> Option<(u32, u32, u32)> {
    let mut parts = field.split(',');
    let memory = parts.next()?.strip_prefix("m=").and_then(parse_decimal)?;
    let iterations = parts.next()?.strip_prefix("t=").and_then(parse_decimal)?;
    let parallelism = parts.next()?.strip_prefix("p=").and_then(parse_decimal)?;
    if parts.next().is_some() {
        return None;
    }
    Some((memory, iterations, parallelism))
}

/// Plain ASCII digits only; `u32::from_str` would also take a leading `+`.
fn parse_decimal(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "$argon2id$v=19$m=65536,t=4,p=4$c29tZXNhbHRzb21lc2FsdA$\
        Cp8ldpbCvK7vTmGzdZBETHG9uX9KMkOrCqvHhbQ8Wjs";

    #[test]
    fn decodes_wire_format() {
        let credential = EncodedCredential::decode(SAMPLE).expect("sample should decode");
        assert_eq!(credential.version(), 19);
        assert_eq!(credential.parameters().memory_kib, 65536);
        assert_eq!(credential.parameters().iterations, 4);
        assert_eq!(credential.parameters().parallelism, 4);
        assert_eq!(credential.salt(), b"somesaltsomesalt");
        assert_eq!(credential.parameters().salt_len, 16);
        assert_eq!(credential.parameters().key_len, 32);
        assert_eq!(credential.hash().len(), 32);
    }

    #[test]
    fn encodes_back_to_the_same_string() {
        let credential: EncodedCredential = SAMPLE.parse().expect("sample should decode");
        assert_eq!(credential.to_string(), SAMPLE);
    }

    #[test]
    fn lengths_follow_the_bytes_not_the_parameters() {
        let credential = EncodedCredential::new(
            HashParameters::default(),
            vec![1u8; 24],
            vec![2u8; 48],
        );
        assert_eq!(credential.parameters().salt_len, 24);
        assert_eq!(credential.parameters().key_len, 48);
    }

    #[test]
    fn rejects_wrong_field_counts() {
        for input in [
            "",
            "not-a-valid-hash",
            "$argon2id$v=19$m=65536,t=4,p=4$c29tZXNhbHQ",
            "$argon2id$v=19$m=65536,t=4,p=4$c29tZXNhbHQ$aGFzaA$extra",
        ] {
            let err = EncodedCredential::decode(input).unwrap_err();
            assert_eq!(err.reason(), "malformed-encoding", "{input:?}");
        }
    }

    #[test]
    fn rejects_missing_leading_delimiter() {
        let err = EncodedCredential::decode("x$argon2id$v=19$m=8,t=1,p=1$c29tZXNhbHQ$aGFzaA")
            .unwrap_err();
        assert_eq!(err.reason(), "malformed-encoding");
    }

    #[test]
    fn empty_algorithm_field_is_malformed() {
        for input in ["$$$$$", "$$v=19$m=64,t=1,p=1$c29tZXNhbHQ$aGFzaA"] {
            let err = EncodedCredential::decode(input).unwrap_err();
            assert_eq!(err.reason(), "malformed-encoding", "{input:?}");
            assert!(!err.is_unsupported());
        }
    }

    #[test]
    fn rejects_other_versions() {
        let altered = SAMPLE.replace("v=19", "v=16");
        let err = EncodedCredential::decode(&altered).unwrap_err();
        assert_eq!(err, CryptoError::UnsupportedVersion { found: 16, expected: 19 });
    }

    #[test]
    fn rejects_non_numeric_versions() {
        for version in ["v=", "v=abc", "v=+19", "version=19", "19"] {
            let altered = SAMPLE.replace("v=19", version);
            let err = EncodedCredential::decode(&altered).unwrap_err();
            assert_eq!(err.reason(), "malformed-encoding", "{version}");
        }
    }

    #[test]
    fn rejects_other_algorithms() {
        let altered = SAMPLE.replace("argon2id", "argon2i");
        let err = EncodedCredential::decode(&altered).unwrap_err();
        assert_eq!(err, CryptoError::UnsupportedAlgorithm("argon2i".to_string()));
    }

    #[test]
    fn rejects_malformed_cost_fields() {
        for costs in [
            "m=65536,t=4",
            "m=65536,t=4,p=4,k=1",
            "t=4,m=65536,p=4",
            "m=-1,t=4,p=4",
            "m=65536,t=four,p=4",
            "m=99999999999,t=4,p=4",
            "m=65536;t=4;p=4",
        ] {
            let altered = SAMPLE.replace("m=65536,t=4,p=4", costs);
            let err = EncodedCredential::decode(&altered).unwrap_err();
            assert_eq!(err.reason(), "malformed-encoding", "{costs}");
        }
    }

    #[test]
    fn rejects_oversized_memory_cost() {
        let costs = format!("m={},t=1,p=1", MAX_MEMORY_KIB + 1);
        let altered = SAMPLE.replace("m=65536,t=4,p=4", &costs);
        let err = EncodedCredential::decode(&altered).unwrap_err();
        assert_eq!(err.reason(), "malformed-encoding");
    }

    #[test]
    fn base64_decoding_is_strict() {
        let padded = SAMPLE.replace("c29tZXNhbHRzb21lc2FsdA", "c29tZXNhbHRzb21lc2FsdA==");
        let bad_char = SAMPLE.replace("c29tZXNhbHRzb21lc2FsdA", "c29tZXNhbHRzb21lc2Fsd!");
        // Non-canonical final symbol: trailing bits must be zero.
        let trailing = SAMPLE.replace("c29tZXNhbHRzb21lc2FsdA", "c29tZXNhbHRzb21lc2FsdB");
        for input in [padded, bad_char, trailing] {
            let err = EncodedCredential::decode(&input).unwrap_err();
            assert_eq!(err.reason(), "malformed-encoding", "{input}");
        }
    }

    #[test]
    fn debug_output_hides_key_material() {
        let credential = EncodedCredential::decode(SAMPLE).expect("sample should decode");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("salt:"));
        assert!(!rendered.contains("hash:"));
        assert!(rendered.contains("EncodedCredential"));
    }
}
