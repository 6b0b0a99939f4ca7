use crate::constants::{DEFAULT_LEADING_ZEROES, HASH_HEX_SIZE};
use crate::error::ConfigError;

/// Mining difficulty, expressed as the number of leading `'0'` hex characters
/// a block hash must start with.
///
/// Hashes are truncated to one character more than the difficulty, so a
/// collision has to match one character past the mandated zeroes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
    leading_zeroes: usize,
}

impl Difficulty {
    pub const MAX_LEADING_ZEROES: usize = HASH_HEX_SIZE - 1;

    pub fn new(leading_zeroes: usize) -> Result<Self, ConfigError> {
        if leading_zeroes == 0 || leading_zeroes > Self::MAX_LEADING_ZEROES {
            return Err(ConfigError::DifficultyOutOfRange {
                got: leading_zeroes,
                max: Self::MAX_LEADING_ZEROES,
            });
        }
        Ok(Self { leading_zeroes })
    }

    pub fn leading_zeroes(&self) -> usize {
        self.leading_zeroes
    }

    pub fn hash_length(&self) -> usize {
        self.leading_zeroes + 1
    }

    /// True when the first `leading_zeroes` characters of `hash` are all `'0'`.
    pub fn is_met_by(&self, hash: &str) -> bool {
        hash.len() >= self.leading_zeroes
            && hash.bytes().take(self.leading_zeroes).all(|b| b == b'0')
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            leading_zeroes: DEFAULT_LEADING_ZEROES,
        }
    }
}

/// Bounds on a brute-force proof search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// First proof value tried.
    pub start: u64,
    /// Stop after this many candidates; `None` searches until a match.
    pub max_attempts: Option<u64>,
    /// Split the proof range across the rayon thread pool.
    pub parallel: bool,
}

impl SearchLimits {
    pub fn capped(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::default()
        }
    }

    /// Exclusive upper end of the proof range.
    pub(crate) fn end(&self) -> u64 {
        match self.max_attempts {
            Some(n) => self.start.saturating_add(n),
            None => u64::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_bounds() {
        assert!(Difficulty::new(0).is_err());
        assert!(Difficulty::new(64).is_err());
        assert_eq!(Difficulty::new(63).unwrap().hash_length(), 64);
        assert_eq!(Difficulty::default().leading_zeroes(), 5);
        assert_eq!(Difficulty::default().hash_length(), 6);
    }

    #[test]
    fn difficulty_predicate() {
        let d = Difficulty::new(2).unwrap();
        assert!(d.is_met_by("003"));
        assert!(d.is_met_by("00"));
        assert!(!d.is_met_by("030"));
        assert!(!d.is_met_by("0"));
    }

    #[test]
    fn capped_limits_end() {
        let limits = SearchLimits {
            start: 10,
            ..SearchLimits::capped(5)
        };
        assert_eq!(limits.end(), 15);
        assert_eq!(SearchLimits::default().end(), u64::MAX);
    }
}
