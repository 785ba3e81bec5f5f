use std::{fmt, str::FromStr};

const ENV_VAR_PREFIX: char = '%';

/// A secret value that, in its raw CLI/env form, may be either the literal
/// value or an indirection of the form `%ENV_VAR_NAME` naming a different
/// environment variable to read it from.
///
/// This mirrors the sibling `configs` crate's `%VAR` convention for secrets
/// injected directly into the process environment by infrastructure tooling,
/// bypassing whatever file normally carries configuration (§12).
#[derive(Clone)]
pub struct Secret(String);

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("environment variable {0} referenced by %-indirection is not set")]
    MissingEnvVar(String),
}

impl FromStr for Secret {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(ENV_VAR_PREFIX) {
            Some(var_name) => std::env::var(var_name)
                .map(Secret)
                .map_err(|_| SecretError::MissingEnvVar(var_name.to_string())),
            None => Ok(Secret(s.to_string())),
        }
    }
}

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Redacts the value so it never ends up in a `Debug`-derived log line.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(REDACTED)")
    }
}
