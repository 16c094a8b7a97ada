use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::Error;
use crate::error::Result;

/// Draws a fresh 64-bit table seed from the operating system's random number
/// generator.
///
/// Every map constructed without an explicit seed calls this, so no two maps
/// share a seed by construction.
///
/// # Errors
///
/// Returns [`Error::Entropy`] if the operating system generator fails.
///
/// # Examples
///
/// ```rust
/// let a = linear_hash::random_seed().unwrap();
/// let b = linear_hash::random_seed().unwrap();
/// assert_ne!(a, b);
/// ```
pub fn random_seed() -> Result<u64> {
    OsRng.try_next_u64().map_err(|err| {
        log::debug!("failed to draw table seed: {err}");
        Error::Entropy
    })
}
