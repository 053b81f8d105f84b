use semver::Version;

/// crate version, suffixed with the git sha when the build knows it.
pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    match semver {
        Ok(semver) => {
            // vergen falls back to this marker when git isn't available at build time.
            if env!("VERGEN_GIT_SHA") == "VERGEN_IDEMPOTENT_OUTPUT" {
                semver.to_string()
            } else {
                format!("{} ({})", semver, env!("VERGEN_GIT_SHA"))
            }
        }
        Err(e) => {
            tracing::warn!(err = ?e, "couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown.");
            String::from("0.0.0-unknown")
        }
    }
}

/// rustc version the binary was built with.
pub fn get_rust_version() -> String {
    rustc_version_runtime::version().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_starts_with_crate_version() {
        assert!(get_version().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
