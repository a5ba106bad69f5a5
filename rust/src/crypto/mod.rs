//! Password credential cryptography: Argon2id hashing, the encoded credential
//! format, and the errors both can produce.

pub mod encoding;
pub mod error;
pub mod params;
pub mod passwords;

pub use encoding::EncodedCredential;
pub use error::CryptoError;
pub use params::HashParameters;
pub use passwords::{hash_password, verify_password, CredentialHasher};
