//! Interactive terminal prompts.

use zeroize::Zeroizing;

use crate::crypto::Passphrase;
use crate::errors::{LockifyError, Result};

/// User interaction the core needs: passphrases, yes/no questions and
/// key/value input.
pub trait PromptService: Send + Sync {
    /// Read a passphrase without echo.
    fn get_passphrase_input(&self, message: &str) -> Result<Passphrase>;

    fn get_confirmation(&self, message: &str, default: bool) -> Result<bool>;

    /// Ask for the value of `key`, hidden when `is_secret`.
    fn get_value_input(&self, key: &str, is_secret: bool) -> Result<Zeroizing<String>>;

    /// Ask for a key and then its value; the value is hidden when `is_secret`.
    fn get_user_input_for_key_and_value(
        &self,
        is_secret: bool,
    ) -> Result<(String, Zeroizing<String>)>;
}

/// `PromptService` on the controlling terminal via `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl PromptService for TerminalPrompt {
    fn get_passphrase_input(&self, message: &str) -> Result<Passphrase> {
        let input = dialoguer::Password::new()
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| LockifyError::PromptFailed(format!("passphrase prompt: {e}")))?;
        Ok(Passphrase::new(input))
    }

    fn get_confirmation(&self, message: &str, default: bool) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| LockifyError::PromptFailed(format!("confirmation prompt: {e}")))
    }

    fn get_value_input(&self, key: &str, is_secret: bool) -> Result<Zeroizing<String>> {
        let value = if is_secret {
            dialoguer::Password::new()
                .with_prompt(format!("Value for {key}"))
                .allow_empty_password(true)
                .interact()
        } else {
            dialoguer::Input::new()
                .with_prompt(format!("Value for {key}"))
                .allow_empty(true)
                .interact_text()
        }
        .map_err(|e| LockifyError::PromptFailed(format!("value prompt: {e}")))?;
        Ok(Zeroizing::new(value))
    }

    fn get_user_input_for_key_and_value(
        &self,
        is_secret: bool,
    ) -> Result<(String, Zeroizing<String>)> {
        let key: String = dialoguer::Input::new()
            .with_prompt("Key")
            .interact_text()
            .map_err(|e| LockifyError::PromptFailed(format!("key prompt: {e}")))?;
        let key = key.trim().to_string();

        let value = self.get_value_input(&key, is_secret)?;
        Ok((key, value))
    }
}
