//! Environment variable substitution for install options and pre-install commands.

use crate::error::SynthesisError;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches `${NAME}` or `$NAME`
static VARIABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap_or_else(|err| panic!("invalid variable reference pattern: {err}"))
});

/// Source of environment variable values
pub trait EnvReader {
    /// Value of the variable, or `None` when it is not set
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the environment of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvReader for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Replace every `$NAME` and `${NAME}` reference in `text` with its value.
///
/// Fails on the first variable that is not set; nothing is left unsubstituted.
pub fn substitute_env_vars(text: &str, env: &dyn EnvReader) -> Result<String, SynthesisError> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for captures in VARIABLE_REFERENCE.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let name = variable_name(&captures);
        let value = env
            .var(name)
            .ok_or_else(|| SynthesisError::MissingVariable(name.to_string()))?;
        result.push_str(&text[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

/// Replace both reference forms of a single named variable.
pub fn hardcode_environment_variable(
    name: &str,
    text: &str,
    env: &dyn EnvReader,
) -> Result<String, SynthesisError> {
    let value = env
        .var(name)
        .ok_or_else(|| SynthesisError::MissingVariable(name.to_string()))?;
    Ok(text
        .replace(&format!("${{{name}}}"), &value)
        .replace(&format!("${name}"), &value))
}

fn variable_name<'t>(captures: &Captures<'t>) -> &'t str {
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}
