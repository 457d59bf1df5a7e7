//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use travellayer::layer::LoadError;
use travellayer::secret::AcquireError;
use travellayer::storage::StorageError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to open the on-disk state store
    Storage(StorageError),
    /// Failed to create the HTTP client
    HttpClient(String),
    /// Failed to load a layer's data
    LayerLoad(LoadError),
    /// Credential setup did not complete
    Credential(AcquireError),
    /// Interactive prompt failed (broken terminal, interrupted)
    Prompt(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Credential(AcquireError::Rejected(_)) => {
                eprintln!();
                eprintln!("If your Google Maps API key keeps being rejected, make sure:");
                eprintln!("  1. Maps JavaScript API is enabled in Google Cloud Console");
                eprintln!("  2. Billing is enabled for your project");
                eprintln!("  3. The key has no referrer restrictions blocking this machine");
            }
            CliError::LayerLoad(LoadError::Network(_)) => {
                eprintln!();
                eprintln!("The data provider could not be reached. Check your connection");
                eprintln!("and the --base-url value.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Storage(e) => write!(f, "State store error: {}", e),
            CliError::HttpClient(msg) => write!(f, "Failed to create HTTP client: {}", msg),
            CliError::LayerLoad(e) => write!(f, "Failed to load layer: {}", e),
            CliError::Credential(e) => write!(f, "Credential setup failed: {}", e),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Storage(e)
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::LayerLoad(e)
    }
}
