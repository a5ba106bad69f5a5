//! Password credential core for the todo service. Registration hashes a
//! plaintext password into a self-describing Argon2id string that the caller
//! stores; login verifies a candidate against that string in constant time.

pub mod config;
pub mod crypto;

pub use crypto::{hash_password, verify_password, CredentialHasher, CryptoError, HashParameters};
