//! Utility functions for the tdnav crate

use rand::{SeedableRng, rngs::StdRng};

/// Seeded generator when a seed is given, otherwise one seeded from the
/// thread-local generator.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Independent seed for a named sub-stream of a seeded run.
///
/// # Examples
///
/// ```
/// use tdnav::utils::derive_seed;
///
/// assert_eq!(derive_seed(Some(7), 1), derive_seed(Some(7), 1));
/// assert_ne!(derive_seed(Some(7), 1), derive_seed(Some(7), 2));
/// assert_eq!(derive_seed(None, 1), None);
/// ```
pub fn derive_seed(seed: Option<u64>, stream: u64) -> Option<u64> {
    // splitmix64 finaliser
    seed.map(|seed| {
        let mut z = seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    })
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
