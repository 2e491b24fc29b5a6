// ABOUTME: Credential discovery with precedence chain
// ABOUTME: CLI flag → config file → env vars → interactive prompt

use crate::config::Settings;
use crate::{Error, Result};
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};

pub const EMAIL_VAR: &str = "LEANOTE_EMAIL";
pub const PASSWORD_VAR: &str = "LEANOTE_PASSWORD";

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn resolve_credentials(settings: &Settings) -> Result<Credentials> {
    let (email, password) = known_credentials(settings, |key| env::var(key).ok());

    if let (Some(email), Some(password)) = (&email, &password) {
        return Ok(Credentials {
            email: email.clone(),
            password: password.clone(),
        });
    }

    if !io::stdin().is_terminal() {
        return Err(Error::Auth(format!(
            "No credentials found. Provide --email/--password, a config file, or {}/{}",
            EMAIL_VAR, PASSWORD_VAR
        )));
    }

    let stdin = io::stdin();
    prompt_missing(email, password, &mut stdin.lock(), &mut io::stderr())
}

/// Settings already carry CLI overrides, so they win over the environment.
fn known_credentials(
    settings: &Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> (Option<String>, Option<String>) {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let email = non_empty(settings.email.clone()).or_else(|| non_empty(lookup(EMAIL_VAR)));
    let password =
        non_empty(settings.password.clone()).or_else(|| non_empty(lookup(PASSWORD_VAR)));
    (email, password)
}

fn prompt_missing<R: BufRead, W: Write>(
    email: Option<String>,
    password: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<Credentials> {
    let email = match email {
        Some(e) => e,
        None => prompt(input, output, "Leanote email: ")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt(input, output, "Leanote password: ")?,
    };
    Ok(Credentials { email, password })
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(Error::Auth(format!("{} cannot be empty", label.trim_end_matches(": "))));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn settings(email: Option<&str>, password: Option<&str>) -> Settings {
        Settings {
            email: email.map(Into::into),
            password: password.map(Into::into),
            ..Settings::default()
        }
    }

    #[test]
    fn test_settings_take_precedence_over_env() {
        let (email, password) = known_credentials(&settings(Some("cli@x.io"), None), |key| {
            Some(format!("env-{}", key))
        });
        assert_eq!(email.as_deref(), Some("cli@x.io"));
        assert_eq!(password.as_deref(), Some("env-LEANOTE_PASSWORD"));
    }

    #[test]
    fn test_empty_values_ignored() {
        let (email, password) = known_credentials(&settings(Some(""), None), |_| Some(String::new()));
        assert!(email.is_none());
        assert!(password.is_none());
    }

    #[test]
    fn test_resolve_with_full_settings() {
        let creds = resolve_credentials(&settings(Some("a@b.c"), Some("pw"))).unwrap();
        assert_eq!(creds.email, "a@b.c");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn test_prompt_fills_missing() {
        let mut input = Cursor::new("typed@x.io\n");
        let mut output = Vec::new();
        let creds = prompt_missing(None, Some("pw".into()), &mut input, &mut output).unwrap();

        assert_eq!(creds.email, "typed@x.io");
        assert_eq!(creds.password, "pw");
        assert_eq!(String::from_utf8(output).unwrap(), "Leanote email: ");
    }

    #[test]
    fn test_prompt_rejects_empty_answer() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let err = prompt_missing(Some("a@b.c".into()), None, &mut input, &mut output).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
