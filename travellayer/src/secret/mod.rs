//! Encrypted credential handling for the map provider API key.
//!
//! The key is the only secret this system persists. It is encrypted with a
//! password derived from device facts (never stored, recomputed on load) and
//! kept under a fixed key in the key-value store. Acquisition is an
//! interactive flow: format validation, remote verification with a hard
//! timeout, then save.

mod acquire;
mod cipher;
mod store;

pub use acquire::{
    validate_format, AcquireError, AcquisitionFlow, CredentialPrompt, CredentialVerifier,
    HttpCredentialVerifier, VerificationAttempt, VERIFY_TIMEOUT,
};
pub use cipher::{decrypt, derive_key, encrypt, CryptoError, EncryptedRecord, PBKDF2_ITERATIONS};
pub use store::{device_password, CredentialStore, CREDENTIAL_KEY};
