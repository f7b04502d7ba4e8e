//! `lockify add`: add or update an entry in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::{output, Runtime};
use crate::errors::Result;
use crate::prompt::PromptService;

pub fn execute(rt: &Runtime, key: Option<&str>, value: Option<&str>, secret: bool) -> Result<()> {
    let given = match (key, value) {
        (Some(_), Some(v)) => {
            output::warning("Value provided on command line; it may appear in shell history.");
            Some(Zeroizing::new(v.to_string()))
        }
        (Some(_), None) if !io::stdin().is_terminal() => {
            let mut buf = Zeroizing::new(String::new());
            io::stdin().read_to_string(&mut buf)?;
            Some(Zeroizing::new(buf.trim_end().to_string()))
        }
        _ => None,
    };

    let (key, value) = read_entry(rt.prompt.as_ref(), key, given, secret)?;

    let existed = rt.app.add_entry(&rt.context(), &key, &value)?;
    let verb = if existed { "updated in" } else { "added to" };
    output::success(&format!("Entry '{key}' {verb} '{}' vault", rt.env));

    Ok(())
}

/// Fill in whatever the command line left out by asking `prompt`.
fn read_entry(
    prompt: &dyn PromptService,
    key: Option<&str>,
    value: Option<Zeroizing<String>>,
    secret: bool,
) -> Result<(String, Zeroizing<String>)> {
    match (key, value) {
        (Some(k), Some(v)) => Ok((k.to_string(), v)),
        (Some(k), None) => Ok((k.to_string(), prompt.get_value_input(k, secret)?)),
        (None, _) => prompt.get_user_input_for_key_and_value(secret),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::crypto::Passphrase;
    use crate::errors::LockifyError;

    /// Records every value/key-value request and answers with fixed text.
    #[derive(Default)]
    struct RecordingPrompt {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingPrompt {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PromptService for RecordingPrompt {
        fn get_passphrase_input(&self, _message: &str) -> Result<Passphrase> {
            Err(LockifyError::PromptFailed("not expected".into()))
        }

        fn get_confirmation(&self, _message: &str, default: bool) -> Result<bool> {
            Ok(default)
        }

        fn get_value_input(&self, key: &str, is_secret: bool) -> Result<Zeroizing<String>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("value:{key}:{is_secret}"));
            Ok(Zeroizing::new("typed".into()))
        }

        fn get_user_input_for_key_and_value(
            &self,
            is_secret: bool,
        ) -> Result<(String, Zeroizing<String>)> {
            self.calls.lock().unwrap().push(format!("pair:{is_secret}"));
            Ok(("PROMPTED".into(), Zeroizing::new("both".into())))
        }
    }

    #[test]
    fn key_without_value_asks_prompt_for_value() {
        let prompt = RecordingPrompt::default();
        let (key, value) = read_entry(&prompt, Some("API_KEY"), None, true).unwrap();
        assert_eq!(key, "API_KEY");
        assert_eq!(value.as_str(), "typed");
        assert_eq!(prompt.calls(), vec!["value:API_KEY:true"]);
    }

    #[test]
    fn secret_flag_reaches_value_prompt() {
        let prompt = RecordingPrompt::default();
        read_entry(&prompt, Some("HOST"), None, false).unwrap();
        assert_eq!(prompt.calls(), vec!["value:HOST:false"]);
    }

    #[test]
    fn missing_key_asks_for_both() {
        let prompt = RecordingPrompt::default();
        let (key, value) = read_entry(&prompt, None, None, true).unwrap();
        assert_eq!(key, "PROMPTED");
        assert_eq!(value.as_str(), "both");
        assert_eq!(prompt.calls(), vec!["pair:true"]);
    }

    #[test]
    fn given_value_skips_prompt() {
        let prompt = RecordingPrompt::default();
        let (key, value) =
            read_entry(&prompt, Some("DB"), Some(Zeroizing::new("x".into())), false).unwrap();
        assert_eq!(key, "DB");
        assert_eq!(value.as_str(), "x");
        assert!(prompt.calls().is_empty());
    }
}
