//! The library module for repokey.
//!
//! repokey is intended to be used in binary form only,
//! and this library may exhibit breaking changes in any release.
//!
//! The intent for this library is to keep the key-selection policy testable
//! separately from the binary's process plumbing.

#![deny(clippy::unwrap_used)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod ext;
pub mod identity;
pub mod key;
pub mod launch;
pub mod remote;
