//! Interactive prompting capability
//!
//! The pipeline depends on this trait rather than on stdin directly, so the
//! interactive surface stays outside the data path.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Ask a question and return the trimmed reply.
    fn ask(&self, question: &str) -> Result<String>;

    /// Ask a yes/no question; an empty reply takes the default.
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let reply = self.ask(&format!("{} {}", question, hint))?;
        Ok(parse_confirm(&reply, default))
    }
}

/// Prompter that writes questions to stderr and reads replies from stdin.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, question: &str) -> Result<String> {
        eprint!("{}: ", question);
        io::stderr().flush().ok();

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim().to_string())
    }
}

fn parse_confirm(reply: &str, default: bool) -> bool {
    match reply.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirm() {
        assert!(parse_confirm("y", false));
        assert!(parse_confirm("Yes", false));
        assert!(!parse_confirm("n", true));
        assert!(!parse_confirm("nope", true));
        assert!(parse_confirm("", true));
        assert!(!parse_confirm("", false));
    }

    struct Scripted(&'static str);

    impl Prompter for Scripted {
        fn ask(&self, _question: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_confirm_uses_reply() {
        assert!(Scripted("y").confirm("Fill the form?", false).unwrap());
        assert!(!Scripted("n").confirm("Fill the form?", true).unwrap());
        assert!(Scripted("").confirm("Fill the form?", true).unwrap());
    }
}
