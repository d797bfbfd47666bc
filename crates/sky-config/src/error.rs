//! Errors raised while loading or checking skyline settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML layer or a `SKYLINE_*` variable could not be read into [`crate::SkyConfig`].
    #[error("failed to load skyline config: {0}")]
    Figment(#[from] figment::Error),

    /// The command needs a section the user never filled in, e.g. `session`
    /// without a handle or app password.
    #[error(
        "[{section}] is not set; add it to .skyline/config.toml or export SKYLINE_{}__*",
        .section.to_uppercase()
    )]
    NotConfigured { section: String },

    #[error("bad value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_points_at_env_prefix() {
        let err = ConfigError::NotConfigured {
            section: "session".into(),
        };
        let message = err.to_string();
        assert!(message.contains("[session]"), "{message}");
        assert!(message.contains("SKYLINE_SESSION__*"), "{message}");
    }
}
