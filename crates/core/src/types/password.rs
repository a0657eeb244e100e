//! Login password wrapper.

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

const GENERATED_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
const GENERATED_LENGTH: usize = 12;

/// A plaintext login password held as a secret.
///
/// The mock stores passwords in the clear the way the fixture data does, but
/// keeps them out of `Debug` output and tracing fields.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::from(password.into()))
    }

    /// Generate a random password for a newly created staff account.
    ///
    /// Ambiguous characters (`0`, `O`, `1`, `l`, `I`) are left out since the
    /// owner reads the password off the console and hands it over.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let password: String = (0..GENERATED_LENGTH)
            .filter_map(|_| {
                let idx = rng.random_range(0..GENERATED_CHARSET.len());
                GENERATED_CHARSET.get(idx).copied().map(char::from)
            })
            .collect();
        Self::new(password)
    }

    /// Exact comparison against a candidate.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.expose_secret() == candidate
    }

    /// Reveal the password. Only the CLI calls this, to show a freshly
    /// generated staff password once.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}
