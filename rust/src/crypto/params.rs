//! Argon2id cost and shape parameters.
//!
//! New credentials are produced with whatever parameters the hasher was built
//! with (normally loaded from startup configuration). Verification never uses
//! these: it always recovers the parameters from the stored credential, so the
//! defaults can be raised without invalidating existing hashes.

use std::fmt::{self, Display};

use argon2::Params;
use serde::{Deserialize, Serialize};

use super::error::CryptoError;

/// 64 MiB of working memory per hash.
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 4;
pub const DEFAULT_PARALLELISM: u32 = 4;
pub const DEFAULT_SALT_LEN: usize = 16;
pub const DEFAULT_KEY_LEN: usize = 32;

/// Shortest salt the Argon2 primitive accepts.
pub const MIN_SALT_LEN: usize = 8;

/// Upper bound on the memory cost we are willing to allocate for a single
/// verification (4 GiB). Larger values in a stored credential are rejected
/// instead of aborting the process on allocation.
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashParameters {
    /// Working memory in KiB.
    #[serde(rename = "memoryCost")]
    pub memory_kib: u32,
    pub iterations: u32,
    /// Number of lanes.
    pub parallelism: u32,
    #[serde(rename = "saltLength")]
    pub salt_len: usize,
    #[serde(rename = "keyLength")]
    pub key_len: usize,
}

impl Default for HashParameters {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
            salt_len: DEFAULT_SALT_LEN,
            key_len: DEFAULT_KEY_LEN,
        }
    }
}

impl HashParameters {
    /// Checks that Argon2id can run with these parameters.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.salt_len < MIN_SALT_LEN {
            return Err(CryptoError::InvalidParameters(format!(
                "salt length {} is below the minimum of {MIN_SALT_LEN} bytes",
                self.salt_len
            )));
        }
        if self.memory_kib > MAX_MEMORY_KIB {
            return Err(CryptoError::InvalidParameters(format!(
                "memory cost {} KiB exceeds the maximum of {MAX_MEMORY_KIB} KiB",
                self.memory_kib
            )));
        }
        self.argon2_params()
            .map(|_| ())
            .map_err(|e| CryptoError::InvalidParameters(format!("{e}")))
    }

    pub(crate) fn argon2_params(&self) -> Result<Params, argon2::Error> {
        // Params::new multiplies the lane count before range-checking it.
        if self.parallelism > Params::MAX_P_COST {
            return Err(argon2::Error::ThreadsTooMany);
        }
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(self.key_len),
        )
    }
}

/// Renders the cost triple exactly as it appears in an encoded credential.
impl Display for HashParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={},t={},p={}",
            self.memory_kib, self.iterations, self.parallelism
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_profile() {
        let params = HashParameters::default();
        assert_eq!(params.memory_kib, 65536);
        assert_eq!(params.iterations, 4);
        assert_eq!(params.parallelism, 4);
        assert_eq!(params.salt_len, 16);
        assert_eq!(params.key_len, 32);
        params.validate().expect("defaults must be usable");
    }

    #[test]
    fn displays_cost_triple() {
        assert_eq!(HashParameters::default().to_string(), "m=65536,t=4,p=4");
    }

    #[test]
    fn rejects_unusable_parameters() {
        let base = HashParameters::default();
        let cases = [
            HashParameters { iterations: 0, ..base },
            HashParameters { parallelism: 0, ..base },
            HashParameters { memory_kib: 16, parallelism: 4, ..base },
            HashParameters { salt_len: 4, ..base },
            HashParameters { key_len: 2, ..base },
            HashParameters { memory_kib: MAX_MEMORY_KIB + 1, ..base },
            HashParameters { parallelism: u32::MAX, ..base },
        ];
        for params in cases {
            let err = params.validate().unwrap_err();
            assert_eq!(err.reason(), "invalid-parameters", "{params:?}");
        }
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let params: HashParameters =
            serde_json::from_str(r#"{"memoryCost": 19456, "iterations": 2}"#).unwrap();
        assert_eq!(params.memory_kib, 19456);
        assert_eq!(params.iterations, 2);
        assert_eq!(params.parallelism, DEFAULT_PARALLELISM);
        assert_eq!(params.salt_len, DEFAULT_SALT_LEN);
    }

    #[test]
    fn rejects_unknown_fields() {
        let parsed = serde_json::from_str::<HashParameters>(r#"{"memory": 1024}"#);
        assert!(parsed.is_err());
    }
}
