//! Tests for repokey.
//!
//! The binary-level tests run the real binary against a stub `ssh` placed
//! ahead of the real one on `PATH`; they never open network connections.
//! The resolver tests exercise the key-selection policy hermetically through
//! an explicit lookup root and environment accessor.

automod::dir!("tests/it");
