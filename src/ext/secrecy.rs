//! Extensions to the `secrecy` crate. Specifically, to make secrets comparable.

use std::fmt::{Debug, Display};

use delegate::delegate;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// The literal to use in place of a redacted secret in debugging output.
pub const REDACTION_LITERAL: &str = "<REDACTED>";

/// [`Secret`], specialized to [`String`], with constant-time comparisons.
///
/// Key material read from the environment lives in this type so that it
/// cannot leak through `Debug` or `Display` formatting (and therefore
/// through tracing output or error reports).
///
/// Only implements `From<String>` because this type should take ownership of the secret.
/// It's not possible to "take ownership" of a `&str`, so it's not supported.
#[derive(Clone)]
pub struct ComparableSecretString(Secret<String>);

impl ComparableSecretString {
    delegate! {
        to self.0 {
            /// Expose the secret, viewing it as a standard string.
            pub fn expose_secret(&self) -> &str;
        }
    }
}

impl Debug for ComparableSecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("ComparableSecret({REDACTION_LITERAL})"))
    }
}

impl Display for ComparableSecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTION_LITERAL)
    }
}

impl PartialEq for ComparableSecretString {
    fn eq(&self, other: &Self) -> bool {
        let lhs = self.0.expose_secret().as_bytes();
        let rhs = other.0.expose_secret().as_bytes();
        ConstantTimeEq::ct_eq(lhs, rhs).into()
    }
}

impl Eq for ComparableSecretString {}

impl From<String> for ComparableSecretString {
    fn from(value: String) -> Self {
        let secret = Secret::new(value);
        Self(secret)
    }
}
