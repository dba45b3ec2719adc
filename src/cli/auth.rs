//! Storing and removing the Gemini API key in the system keyring.

use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};

use crate::core::credentials::API_KEY_NAME;
use crate::core::keyring::KeyringSecretStore;
use tracing::info;

const KEY_PROMPT: &str = "Enter your Gemini API key: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError(String);

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for InputError {}

/// Empty input means "no".
pub fn parse_confirmation(input: &str) -> Result<Confirmation, InputError> {
    match input.trim().to_lowercase().as_str() {
        "" | "n" | "no" => Ok(Confirmation::No),
        "y" | "yes" => Ok(Confirmation::Yes),
        "c" | "cancel" => Ok(Confirmation::Cancel),
        other => Err(InputError(format!(
            "Invalid confirmation response: {other:?} (answer y, n or c)"
        ))),
    }
}

/// Trim a pasted key; whitespace-only input is rejected.
pub fn parse_api_key(input: &str) -> Result<String, InputError> {
    let key = input.trim();
    if key.is_empty() {
        return Err(InputError("API key cannot be empty".to_string()));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(InputError("API key cannot contain spaces".to_string()));
    }
    Ok(key.to_string())
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

pub fn run_auth() -> Result<(), Box<dyn Error>> {
    println!("🔐 Store your Gemini API key in the system keyring");
    println!("Get a key at https://aistudio.google.com/app/apikey");
    println!();

    let key = parse_api_key(&read_line(KEY_PROMPT)?)?;
    KeyringSecretStore::new().store_secret(API_KEY_NAME, &key)?;
    info!(key_len = key.len(), "API key stored in keyring");
    println!("✅ API key saved. It takes precedence over secrets files and the environment.");
    Ok(())
}

pub fn run_deauth(yes: bool) -> Result<(), Box<dyn Error>> {
    if !yes {
        let answer = read_line("Remove the stored Gemini API key? [y/N/c] ")?;
        match parse_confirmation(&answer)? {
            Confirmation::Yes => {}
            Confirmation::No | Confirmation::Cancel => {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    if KeyringSecretStore::new().delete_secret(API_KEY_NAME)? {
        info!("API key removed from keyring");
        println!("✅ Removed the API key from the system keyring");
    } else {
        println!("No API key was stored in the system keyring");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_defaults_to_no() {
        assert_eq!(parse_confirmation("").unwrap(), Confirmation::No);
        assert_eq!(parse_confirmation("  \n").unwrap(), Confirmation::No);
    }

    #[test]
    fn confirmation_accepts_short_and_long_forms() {
        assert_eq!(parse_confirmation("Y").unwrap(), Confirmation::Yes);
        assert_eq!(parse_confirmation("yes\n").unwrap(), Confirmation::Yes);
        assert_eq!(parse_confirmation("no").unwrap(), Confirmation::No);
        assert_eq!(parse_confirmation("cancel").unwrap(), Confirmation::Cancel);
        assert!(parse_confirmation("maybe").is_err());
    }

    #[test]
    fn api_key_is_trimmed_and_required() {
        assert_eq!(parse_api_key("  AIzaSyTest123\n").unwrap(), "AIzaSyTest123");
        assert_eq!(
            parse_api_key("   ").unwrap_err().to_string(),
            "API key cannot be empty"
        );
        assert!(parse_api_key("two words").is_err());
    }
}
