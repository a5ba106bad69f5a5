//! Password hashing helpers built around Argon2id.
//!
//! `hash_password` produces a self-describing credential string for storage,
//! `verify_password` checks a candidate against a stored string using the
//! parameters recorded in that string. Plaintext passwords and derived keys
//! are never logged.

use argon2::{Algorithm, Argon2, Version};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::encoding::EncodedCredential;
use super::error::CryptoError;
use super::params::HashParameters;

/// Argon2id hasher configured with the parameters used for *new* credentials.
///
/// Each call allocates `memory_kib` KiB of working memory, so callers should
/// bound how many hashes run at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialHasher {
    params: HashParameters,
}

impl CredentialHasher {
    pub fn new(params: HashParameters) -> Result<Self, CryptoError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &HashParameters {
        &self.params
    }

    /// Hashes `plaintext` under a fresh random salt and returns the encoded
    /// credential string.
    pub fn hash_password(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.hash_password_with_rng(&mut OsRng, plaintext)
    }

    pub(crate) fn hash_password_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        plaintext: &str,
    ) -> Result<String, CryptoError> {
        let mut salt = vec![0u8; self.params.salt_len];
        rng.try_fill_bytes(&mut salt).map_err(|e| {
            tracing::error!(error = %e, "secure random source failed");
            CryptoError::EntropyUnavailable
        })?;

        let hash = derive_key(plaintext.as_bytes(), &salt, &self.params)
            .map_err(|e| CryptoError::InvalidParameters(format!("{e}")))?;
        let credential = EncodedCredential::new(self.params, salt, hash.to_vec());

        tracing::debug!(params = %self.params, "hashed new credential");
        Ok(credential.to_string())
    }

    /// See [`verify_password`]. The hasher's own parameters play no part.
    pub fn verify_password(&self, plaintext: &str, encoded: &str) -> Result<bool, CryptoError> {
        verify_password(plaintext, encoded)
    }

    /// Login-path check that folds every failure into `false`.
    ///
    /// The reason is logged so operators can tell a corrupt row from a
    /// credential written by a foreign scheme, but callers only ever see a
    /// plain mismatch.
    pub fn authenticate(&self, plaintext: &str, encoded: &str) -> bool {
        match verify_password(plaintext, encoded) {
            Ok(matches) => matches,
            Err(err) if err.is_unsupported() => {
                tracing::warn!(reason = err.reason(), error = %err, "stored credential needs migration");
                false
            }
            Err(err) => {
                tracing::debug!(reason = err.reason(), error = %err, "stored credential rejected");
                false
            }
        }
    }

    /// True when `encoded` was produced with parameters other than this
    /// hasher's, meaning it should be replaced after the next successful login.
    pub fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError> {
        let credential = EncodedCredential::decode(encoded)?;
        Ok(*credential.parameters() != self.params)
    }
}

/// Hashes `plaintext` with the default parameters.
pub fn hash_password(plaintext: &str) -> Result<String, CryptoError> {
    CredentialHasher::default().hash_password(plaintext)
}

/// Verifies `plaintext` against a stored credential string.
///
/// Returns `Ok(false)` on a mismatch and an error when the string cannot be
/// decoded. Callers must present both outcomes to end users identically.
pub fn verify_password(plaintext: &str, encoded: &str) -> Result<bool, CryptoError> {
    let credential = EncodedCredential::decode(encoded)?;
    let candidate = derive_key(plaintext.as_bytes(), credential.salt(), credential.parameters())
        .map_err(|e| CryptoError::malformed(format!("stored parameters rejected: {e}")))?;
    Ok(constant_time_eq(&candidate, credential.hash()))
}

fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &HashParameters,
) -> Result<Zeroizing<Vec<u8>>, argon2::Error> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.argon2_params()?);
    let mut output = Zeroizing::new(vec![0u8; params.key_len]);
    argon2.hash_password_into(password, salt, &mut output)?;
    Ok(output)
}

/// Compares two byte strings without branching on their contents.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
