//! Centralized validation and helper functions.

/// Default maximum number of path records any single node may accumulate
/// while scoring one module
pub const DEFAULT_MAX_PATHS: usize = 1_000_000;

/// Maximum number of samples accepted from one input file
pub const MAX_SAMPLES: usize = 10_000_000;

/// Compute the MD5 digest of a definition string as lowercase hex.
///
/// # Examples
///
/// ```
/// use kegg_completeness::utils::validation::definition_digest;
///
/// assert_eq!(definition_digest("K1 K2").len(), 32);
/// assert_ne!(definition_digest("K1 K2"), definition_digest("K1,K2"));
/// ```
#[must_use]
pub fn definition_digest(definition: &str) -> String {
    let digest = md5::compute(definition.as_bytes());
    format!("{digest:x}")
}

/// Validate that a string is a valid MD5 checksum (32 hex characters).
#[must_use]
pub fn is_valid_md5(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Check whether a node may take another path record.
///
/// Call this with the current count BEFORE adding a record.
/// Returns an error message if adding would exceed `limit`, None if safe to add.
#[must_use]
pub fn check_path_limit(count: usize, limit: usize) -> Option<String> {
    if count >= limit {
        Some(format!(
            "Too many paths: adding another would exceed maximum of {limit}"
        ))
    } else {
        None
    }
}

/// Check if adding another sample would exceed the maximum allowed.
#[must_use]
pub fn check_sample_limit(count: usize) -> Option<String> {
    if count >= MAX_SAMPLES {
        Some(format!(
            "Too many samples: adding another would exceed maximum of {MAX_SAMPLES}"
        ))
    } else {
        None
    }
}

/// Is `s` usable as a module identifier (non-empty, no whitespace or colon)?
#[must_use]
pub fn is_valid_module_id(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_digest_is_md5_hex() {
        let digest = definition_digest("K00001");
        assert!(is_valid_md5(&digest));
        assert_eq!(digest, definition_digest("K00001"));
        assert_eq!(definition_digest(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_is_valid_md5() {
        assert!(is_valid_md5("6aef897c3d6ff0c78aff06ac189178dd"));
        assert!(!is_valid_md5("not-an-md5"));
        assert!(!is_valid_md5("6aef897c3d6ff0c78aff06ac189178d"));
    }

    #[test]
    fn test_check_path_limit() {
        assert!(check_path_limit(0, 10).is_none());
        assert!(check_path_limit(9, 10).is_none());
        assert!(check_path_limit(10, 10).is_some());
        assert!(check_path_limit(11, 10).unwrap().contains("10"));
    }

    #[test]
    fn test_check_sample_limit() {
        assert!(check_sample_limit(0).is_none());
        assert!(check_sample_limit(MAX_SAMPLES).is_some());
    }

    #[test]
    fn test_is_valid_module_id() {
        assert!(is_valid_module_id("M00001"));
        assert!(!is_valid_module_id(""));
        assert!(!is_valid_module_id("M 1"));
        assert!(!is_valid_module_id("M1:x"));
    }
}
