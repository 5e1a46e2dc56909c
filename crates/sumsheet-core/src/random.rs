//! Uniform integer sampling on top of a 32-bit word source.
//!
//! Production code draws from the operating system CSPRNG through
//! [`SecureRandom`]. There is deliberately no statistical PRNG fallback:
//! when the OS source is missing, construction fails.

use crate::error::{SheetError, SheetResult};

pub trait RandomSource {
    /// Next uniformly distributed 32-bit word.
    fn next_u32(&mut self) -> SheetResult<u32>;

    /// Uniform integer in `[min, max]`, mapped from a 32-bit word by
    /// floor-scaling: `min + floor(u / 2^32 * span)`.
    fn random_int(&mut self, min: i64, max: i64) -> SheetResult<i64> {
        if min > max {
            return Err(SheetError::InvalidSettings(format!(
                "random range minimum {min} is greater than maximum {max}"
            )));
        }
        let span = (max as i128) - (min as i128) + 1;
        let word = self.next_u32()? as i128;
        Ok((min as i128 + ((word * span) >> 32)) as i64)
    }

    /// Uniform integer in `[min, max]` excluding zero, or `None` when the
    /// range has no non-zero value.
    fn random_non_zero_int(&mut self, min: i64, max: i64) -> SheetResult<Option<i64>> {
        if min > max {
            return Err(SheetError::InvalidSettings(format!(
                "random range minimum {min} is greater than maximum {max}"
            )));
        }
        let has_zero = min <= 0 && max >= 0;
        if !has_zero {
            return self.random_int(min, max).map(Some);
        }
        if min == 0 && max == 0 {
            return Ok(None);
        }
        // Draw over the range shrunk by one, then step over zero.
        let value = self.random_int(min, max - 1)?;
        Ok(Some(if value >= 0 { value + 1 } else { value }))
    }
}

/// Operating-system CSPRNG.
#[derive(Debug)]
pub struct SecureRandom {
    _private: (),
}

impl SecureRandom {
    /// Probes the OS source once so a missing CSPRNG is reported up front.
    pub fn new() -> SheetResult<Self> {
        let mut probe = [0u8; 4];
        getrandom::getrandom(&mut probe)
            .map_err(|e| SheetError::RandomUnavailable(e.to_string()))?;
        Ok(Self { _private: () })
    }
}

impl RandomSource for SecureRandom {
    fn next_u32(&mut self) -> SheetResult<u32> {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf)
            .map_err(|e| SheetError::RandomUnavailable(e.to_string()))?;
        Ok(u32::from_le_bytes(buf))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, Seeded};
    use super::*;

    #[test]
    fn test_random_int_extremes_map_to_bounds() {
        let mut rng = Scripted::new(vec![0, u32::MAX]);
        assert_eq!(rng.random_int(-5, 5).unwrap(), -5);
        assert_eq!(rng.random_int(-5, 5).unwrap(), 5);
    }

    #[test]
    fn test_random_int_single_value() {
        let mut rng = Seeded::new(7);
        for _ in 0..100 {
            assert_eq!(rng.random_int(42, 42).unwrap(), 42);
        }
    }

    #[test]
    fn test_random_int_stays_in_range() {
        let mut rng = Seeded::new(1);
        for _ in 0..10_000 {
            let v = rng.random_int(-3, 12).unwrap();
            assert!((-3..=12).contains(&v));
        }
    }

    #[test]
    fn test_random_int_is_roughly_uniform() {
        let mut rng = Seeded::new(99);
        let mut counts = [0usize; 10];
        let draws = 100_000;
        for _ in 0..draws {
            let v = rng.random_int(0, 9).unwrap();
            counts[v as usize] += 1;
        }
        let expected = draws / 10;
        for count in counts {
            assert!(
                count > expected * 9 / 10 && count < expected * 11 / 10,
                "bucket count {count} too far from {expected}"
            );
        }
    }

    #[test]
    fn test_random_int_rejects_inverted_range() {
        let mut rng = Seeded::new(3);
        assert!(rng.random_int(2, 1).is_err());
    }

    #[test]
    fn test_random_non_zero_int_only_zero() {
        let mut rng = Seeded::new(3);
        assert_eq!(rng.random_non_zero_int(0, 0).unwrap(), None);
    }

    #[test]
    fn test_random_non_zero_int_never_zero() {
        let mut rng = Seeded::new(11);
        let mut seen_neg = false;
        let mut seen_pos = false;
        for _ in 0..5_000 {
            let v = rng.random_non_zero_int(-2, 2).unwrap().unwrap();
            assert_ne!(v, 0);
            assert!((-2..=2).contains(&v));
            seen_neg |= v < 0;
            seen_pos |= v > 0;
        }
        assert!(seen_neg && seen_pos);
    }

    #[test]
    fn test_random_non_zero_int_zero_at_edge() {
        let mut rng = Scripted::new(vec![0, u32::MAX]);
        assert_eq!(rng.random_non_zero_int(0, 3).unwrap(), Some(1));
        assert_eq!(rng.random_non_zero_int(0, 3).unwrap(), Some(3));

        let mut rng = Scripted::new(vec![0, u32::MAX]);
        assert_eq!(rng.random_non_zero_int(-4, 0).unwrap(), Some(-4));
        assert_eq!(rng.random_non_zero_int(-4, 0).unwrap(), Some(-1));
    }

    #[test]
    fn test_secure_random_draws_in_range() {
        let mut rng = SecureRandom::new().unwrap();
        for _ in 0..1_000 {
            let v = rng.random_int(1, 6).unwrap();
            assert!((1..=6).contains(&v));
        }
    }
}
