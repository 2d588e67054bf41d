//! Built command invocations and their display-safe rendering.

use std::fmt;
use std::path::Path;

use crate::config::{REDACTED_PLACEHOLDER, Secret};

/// One argument token. Secret tokens render as the placeholder everywhere
/// except [`Command::tokens`].
#[derive(Clone, PartialEq, Eq)]
pub struct Arg {
    value: String,
    secret: bool,
}

impl Arg {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret(value: &Secret) -> Self {
        Self {
            value: value.expose().to_string(),
            secret: true,
        }
    }

    pub const fn is_secret(&self) -> bool {
        self.secret
    }

    fn redacted(&self) -> &str {
        if self.secret {
            REDACTED_PLACEHOLDER
        } else {
            &self.value
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.redacted(), f)
    }
}

/// An external program invocation: program token plus ordered arguments.
///
/// `Debug` and `Display` are redacted so a command can be logged as is.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::plain(value));
        self
    }

    pub fn flag_value(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.arg(flag).arg(value)
    }

    pub fn secret_arg(&mut self, value: &Secret) -> &mut Self {
        self.args.push(Arg::secret(value));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The same invocation with the program token replaced by a resolved path.
    #[must_use]
    pub fn with_program(&self, program: &Path) -> Self {
        Self {
            program: program.to_string_lossy().into_owned(),
            args: self.args.clone(),
        }
    }

    /// Real argument values, secrets included. Only for handing to a process.
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().map(|a| a.value.clone()).collect()
    }

    /// Real tokens, program first, secrets included.
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.argv())
            .collect()
    }

    /// Tokens with every secret replaced by the placeholder.
    pub fn redacted_tokens(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.redacted().to_string()))
            .collect()
    }

    /// Single-line redacted rendering with shell-style quoting.
    pub fn display(&self) -> String {
        self.redacted_tokens()
            .iter()
            .map(|token| quote_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_secret(&self) -> bool {
        self.args.iter().any(Arg::is_secret)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish()
    }
}

fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || "&|<>()\"".contains(c));
    if needs_quotes {
        format!("\"{token}\"")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Command {
        let mut cmd = Command::new("sbstck-dl");
        cmd.arg("download")
            .flag_value("-o", "/home/me/My Posts")
            .flag_value("--cookie_val", "")
            .secret_arg(&Secret::new("abc123"));
        cmd
    }

    #[test]
    fn display_quotes_spaces_and_empty_tokens() {
        let shown = sample().display();
        assert_eq!(
            shown,
            "sbstck-dl download -o \"/home/me/My Posts\" --cookie_val \"\" ********"
        );
    }

    #[test]
    fn secret_only_visible_in_real_tokens() {
        let cmd = sample();
        assert!(cmd.tokens().contains(&"abc123".to_string()));
        assert!(!cmd.redacted_tokens().iter().any(|t| t.contains("abc123")));
        assert!(!format!("{cmd:?}").contains("abc123"));
        assert!(!cmd.to_string().contains("abc123"));
        assert!(cmd.has_secret());
    }

    #[test]
    fn with_program_keeps_arguments() {
        let resolved = sample().with_program(Path::new("/usr/local/bin/sbstck-dl"));
        assert_eq!(resolved.program(), "/usr/local/bin/sbstck-dl");
        assert_eq!(resolved.args().len(), sample().args().len());
    }
}
