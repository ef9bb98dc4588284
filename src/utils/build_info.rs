/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildMetadata {
    pub fn summary(&self) -> String {
        format!(
            "monthly_ledger {} ({} {}, built {})",
            self.version, self.git_hash, self.profile, self.timestamp
        )
    }
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("MONTHLY_LEDGER_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("MONTHLY_LEDGER_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("MONTHLY_LEDGER_BUILD_PROFILE").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_the_package_version() {
        let info = current();
        assert!(info.summary().starts_with(&format!("monthly_ledger {}", env!("CARGO_PKG_VERSION"))));
    }
}
