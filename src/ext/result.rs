//! Extensions to `Result`.

/// Wrap anything into `Ok`.
/// This is especially useful when performing long chains or when otherwise wrapping
/// would result in many nested parenthesis (which can be hard to read).
///
/// The intention with this trait is to more ergonomically wrap a chain into an `Ok` value, e.g. instead of
/// ```
/// # enum Error {}
/// fn some_fallible_function(input: &str) -> Result<String, Error> {
///   Ok(input.to_string().to_uppercase())
/// }
/// ```
///
/// One can instead write:
/// ```
/// # use repokey::ext::result::WrapOk;
/// # enum Error {}
/// fn some_fallible_function(input: &str) -> Result<String, Error> {
///   input.to_string().to_uppercase().wrap_ok()
/// }
/// ```
pub trait WrapOk<T, E> {
    /// Wrap self in an `Ok`, returning the `Ok` variant
    /// of a result inferred by the destination type.
    fn wrap_ok(self) -> Result<T, E>;
}

impl<T, E> WrapOk<T, E> for T {
    fn wrap_ok(self) -> Result<T, E> {
        Ok(self)
    }
}
