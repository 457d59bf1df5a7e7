//! Interactive API key setup.
//!
//! Walks the user through acquiring a Google Maps API key: prompt, format
//! check, live verification against the provider, then encrypted storage in
//! the on-disk state store. All acquisition logic lives in the core library;
//! this module is only the dialoguer presentation layer.

use std::sync::Arc;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use travellayer::net::ReqwestClient;
use travellayer::secret::{
    AcquireError, AcquisitionFlow, CredentialPrompt, CredentialStore, HttpCredentialVerifier,
};
use travellayer::storage::FileStore;

use crate::error::CliError;

/// Prompt backed by a blocking dialoguer input.
struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    async fn request_key(&self, error: Option<&str>) -> Option<String> {
        let error = error.map(String::from);
        let answer = tokio::task::spawn_blocking(move || {
            if let Some(message) = &error {
                println!("{} {}", style("✗").red(), style(message).red());
            }
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Google Maps API key (leave empty to cancel)")
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(key)) if !key.trim().is_empty() => Some(key),
            // Empty input, interrupted terminal, or a panicked blocking task
            // all read as abandoning the flow.
            _ => None,
        }
    }
}

/// Run the interactive credential setup.
pub async fn run(store_path: &str, verify_url: &str) -> Result<(), CliError> {
    let theme = ColorfulTheme::default();

    println!();
    println!("{}", style("TravelLayer API Key Setup").bold().underlined());
    println!();
    println!("The map requires a Google Maps API key. The key is verified");
    println!("against the provider, then stored encrypted on this machine.");
    println!();

    let kv = Arc::new(FileStore::open(store_path)?);
    let credentials = CredentialStore::new(kv);

    if credentials.load().await.is_some() {
        let replace = Confirm::with_theme(&theme)
            .with_prompt("A working API key is already stored. Replace it?")
            .default(false)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))?;
        if !replace {
            println!("Keeping the existing key.");
            return Ok(());
        }
    }

    let client = ReqwestClient::new().map_err(|e| CliError::HttpClient(e.to_string()))?;
    let verifier = HttpCredentialVerifier::new(client, verify_url);
    let flow = AcquisitionFlow::new(TerminalPrompt, verifier, &credentials);

    match flow.run().await {
        Ok(_) => {
            println!();
            println!("{} API key verified and stored.", style("✓").green());
            Ok(())
        }
        Err(AcquireError::Cancelled) => {
            println!("Setup cancelled.");
            Ok(())
        }
        Err(e) => Err(CliError::Credential(e)),
    }
}
