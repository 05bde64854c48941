use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Valid range for the payload salt
pub const SALT_RANGE: RangeInclusive<u32> = 1..=99_999_999;

/// Supplies the per-build salt.
///
/// The salt only diversifies payload bytes between issuances; it is not a secret.
/// Implementations must return a value inside [`SALT_RANGE`].
pub trait SaltSource: Send + Sync {
    fn next_salt(&self) -> u32;
}

impl<S: SaltSource + ?Sized> SaltSource for Arc<S> {
    fn next_salt(&self) -> u32 {
        (**self).next_salt()
    }
}

/// Draws a fresh salt from the thread-local RNG on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSalt;

impl SaltSource for RandomSalt {
    fn next_salt(&self) -> u32 {
        rand::thread_rng().gen_range(SALT_RANGE)
    }
}

/// Always returns the same salt. Intended for reproducible tokens in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSalt(pub u32);

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_salt_stays_in_range() {
        let source = RandomSalt;
        for _ in 0..1000 {
            assert!(SALT_RANGE.contains(&source.next_salt()));
        }
    }

    #[test]
    fn test_random_salt_is_rerolled() {
        let source = RandomSalt;
        let first = source.next_salt();
        // 1 in 10^8 chance per draw of repeating; 8 draws all equal is negligible
        assert!((0..8).any(|_| source.next_salt() != first));
    }

    #[test]
    fn test_shared_source_delegates() {
        let shared: Arc<dyn SaltSource> = Arc::new(FixedSalt(12));
        assert_eq!(shared.next_salt(), 12);
        assert_eq!(Arc::clone(&shared).next_salt(), 12);
    }
}
