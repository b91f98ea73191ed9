use sha2::{Digest, Sha256};

/// Length of an analysis id in hex characters.
pub const ANALYSIS_ID_LEN: usize = 64;

/// Digest of the requested name, `n`, `steps` and the run's start time.
///
/// The start time makes every run unique, so repeating a request with the
/// same parameters yields a new id.
pub fn analysis_id(algo: &str, n: usize, steps: usize, start_time_micros: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(algo.as_bytes());
    hasher.update(n.to_string().as_bytes());
    hasher.update(steps.to_string().as_bytes());
    hasher.update(start_time_micros.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn is_well_formed(id: &str) -> bool {
    id.len() == ANALYSIS_ID_LEN && id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic_hex() {
        let a = analysis_id("linear", 10, 2, 1_700_000_000_000_000);
        let b = analysis_id("linear", 10, 2, 1_700_000_000_000_000);
        assert_eq!(a, b);
        assert!(is_well_formed(&a));
    }

    #[test]
    fn test_id_changes_with_any_input() {
        let base = analysis_id("linear", 10, 2, 42);
        assert_ne!(base, analysis_id("Linear", 10, 2, 42));
        assert_ne!(base, analysis_id("linear", 11, 2, 42));
        assert_ne!(base, analysis_id("linear", 10, 3, 42));
        assert_ne!(base, analysis_id("linear", 10, 2, 43));
    }

    #[test]
    fn test_well_formed_rejects_other_strings() {
        assert!(!is_well_formed("abc"));
        assert!(!is_well_formed(&"G".repeat(ANALYSIS_ID_LEN)));
    }
}
