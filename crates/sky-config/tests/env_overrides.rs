//! Environment variables layered over TOML and defaults.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use sky_config::SkyConfig;

#[test]
fn env_var_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("SKYLINE_SESSION__HANDLE", "from-env.bsky.social");

        jail.create_file(
            "config.toml",
            r#"
[session]
handle = "from-toml.bsky.social"
app_password = "toml-password"
"#,
        )?;

        let config: SkyConfig = Figment::from(Serialized::defaults(SkyConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("SKYLINE_").split("__"))
            .extract()?;

        // Env should win over TOML
        assert_eq!(config.session.handle, "from-env.bsky.social");
        // TOML value not overridden by env should remain
        assert_eq!(config.session.app_password, "toml-password");
        Ok(())
    });
}

#[test]
fn env_var_overrides_default() {
    Jail::expect_with(|jail| {
        jail.set_env("SKYLINE_SERVER__URL", "http://localhost:2583");

        let config: SkyConfig = Figment::from(Serialized::defaults(SkyConfig::default()))
            .merge(Env::prefixed("SKYLINE_").split("__"))
            .extract()?;

        assert_eq!(config.server.url, "http://localhost:2583");
        Ok(())
    });
}

/// Typo'd env var keys are silently ignored: figment doesn't know
/// "handel" should be "handle".
#[test]
fn typo_env_var_silently_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("SKYLINE_SESSION__HANDEL", "typo.bsky.social");

        let config: SkyConfig = Figment::from(Serialized::defaults(SkyConfig::default()))
            .merge(Env::prefixed("SKYLINE_").split("__"))
            .extract()?;

        assert!(
            config.session.handle.is_empty(),
            "typo'd env var should be silently ignored by figment"
        );
        Ok(())
    });
}

/// Numeric refresh settings parse from their string env values.
#[test]
fn full_env_provider_chain() {
    Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());
        jail.set_env("SKYLINE_SERVER__URL", "https://pds.jail.test");
        jail.set_env("SKYLINE_SESSION__HANDLE", "jail.test");
        jail.set_env("SKYLINE_SESSION__APP_PASSWORD", "jail-pass");
        jail.set_env("SKYLINE_REFRESH__ASYNC_THRESHOLD_SECS", "900");
        jail.set_env("SKYLINE_REFRESH__SYNC_THRESHOLD_SECS", "30");
        jail.set_env("SKYLINE_REFRESH__POLL_INTERVAL_MS", "2500");

        let config = SkyConfig::load().expect("config loads");

        assert_eq!(config.server.url, "https://pds.jail.test");
        assert_eq!(config.session.handle, "jail.test");
        assert!(config.session.is_configured());
        assert_eq!(config.refresh.async_threshold_secs, 900);
        assert_eq!(config.refresh.sync_threshold_secs, 30);
        assert_eq!(config.refresh.poll_interval().as_millis(), 2500);
        Ok(())
    });
}
