//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// `hustle 0.1.0 (abc1234, 2026-01-01)`, printed by the simulator banner.
pub fn version_string() -> String {
    format!(
        "hustle {} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_COMMIT,
        BUILD_DATE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_commit_format() {
        // 7-char short hash, or "unknown" outside a git checkout
        assert!(BUILD_COMMIT == "unknown" || BUILD_COMMIT.len() == 7);
    }

    #[test]
    fn test_build_date_format() {
        // YYYY-MM-DD
        assert!(BUILD_DATE.len() == 10 || BUILD_DATE == "unknown");
    }

    #[test]
    fn test_version_string_mentions_commit() {
        let version = version_string();
        assert!(version.starts_with("hustle "));
        assert!(version.contains(BUILD_COMMIT));
    }
}
