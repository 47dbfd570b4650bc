//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use voice_concierge_core::ContinuityKeys;

use crate::constants::{agent, navigation, ring, session};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub agent: AgentSettings,

    /// Ring cue synthesis
    #[serde(default)]
    pub ring: RingSettings,

    /// Session lifecycle timing and opening lines
    #[serde(default)]
    pub session: SessionSettings,

    /// Built-in `navigate_to_menu` tool
    #[serde(default)]
    pub navigation: NavigationSettings,

    /// Storage keys for the cross-page flags
    #[serde(default)]
    pub continuity: ContinuitySettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Agent used when the page does not supply its own
    #[serde(default = "default_agent_id")]
    pub default_agent_id: String,
}

fn default_agent_id() -> String {
    agent::DEFAULT_AGENT_ID.to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            default_agent_id: default_agent_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingSettings {
    /// Play the ring cue before connecting
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_peak_gain")]
    pub peak_gain: f32,

    /// When the completion signal fires, measured from cue start
    #[serde(default = "default_completion_ms")]
    pub completion_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_sample_rate() -> u32 {
    ring::SAMPLE_RATE
}

fn default_peak_gain() -> f32 {
    ring::PEAK_GAIN
}

fn default_completion_ms() -> u64 {
    ring::COMPLETION_MS
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: default_sample_rate(),
            peak_gain: default_peak_gain(),
            completion_ms: default_completion_ms(),
        }
    }
}

impl RingSettings {
    pub fn completion(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_error_revert_ms")]
    pub error_revert_ms: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// IANA zone for greetings and `get_current_time`
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Follows the greeting on a user-initiated start
    #[serde(default = "default_introduction_line")]
    pub introduction_line: String,

    /// Opening line when resuming after navigation
    #[serde(default = "default_handoff_line")]
    pub handoff_line: String,

    /// Override the agent's first message with a time-of-day greeting
    #[serde(default = "default_true")]
    pub greet_on_start: bool,
}

fn default_error_revert_ms() -> u64 {
    session::ERROR_REVERT_MS
}

fn default_settle_delay_ms() -> u64 {
    session::SETTLE_DELAY_MS
}

fn default_timezone() -> String {
    session::TIMEZONE.to_string()
}

fn default_introduction_line() -> String {
    session::INTRODUCTION_LINE.to_string()
}

fn default_handoff_line() -> String {
    session::HANDOFF_LINE.to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            error_revert_ms: default_error_revert_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            timezone: default_timezone(),
            introduction_line: default_introduction_line(),
            handoff_line: default_handoff_line(),
            greet_on_start: true,
        }
    }
}

impl SessionSettings {
    pub fn error_revert(&self) -> Duration {
        Duration::from_millis(self.error_revert_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSettings {
    /// Redirect target
    #[serde(default = "default_menu_path")]
    pub menu_path: String,

    /// Case-insensitive path substring identifying the menu page
    #[serde(default = "default_menu_marker")]
    pub menu_marker: String,

    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,

    #[serde(default = "default_already_here_message")]
    pub already_here_message: String,

    #[serde(default = "default_navigating_message")]
    pub navigating_message: String,

    #[serde(default = "default_unavailable_message")]
    pub unavailable_message: String,
}

fn default_menu_path() -> String {
    navigation::MENU_PATH.to_string()
}

fn default_menu_marker() -> String {
    navigation::MENU_MARKER.to_string()
}

fn default_redirect_delay_ms() -> u64 {
    navigation::REDIRECT_DELAY_MS
}

fn default_already_here_message() -> String {
    navigation::ALREADY_HERE_MESSAGE.to_string()
}

fn default_navigating_message() -> String {
    navigation::NAVIGATING_MESSAGE.to_string()
}

fn default_unavailable_message() -> String {
    navigation::UNAVAILABLE_MESSAGE.to_string()
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            menu_path: default_menu_path(),
            menu_marker: default_menu_marker(),
            redirect_delay_ms: default_redirect_delay_ms(),
            already_here_message: default_already_here_message(),
            navigating_message: default_navigating_message(),
            unavailable_message: default_unavailable_message(),
        }
    }
}

impl NavigationSettings {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Whether `path` is the menu page
    pub fn is_menu_path(&self, path: &str) -> bool {
        path.to_lowercase()
            .contains(&self.menu_marker.to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuitySettings {
    #[serde(default = "default_return_key")]
    pub return_key: String,

    #[serde(default = "default_autostart_key")]
    pub autostart_key: String,
}

fn default_return_key() -> String {
    ContinuityKeys::default().return_key
}

fn default_autostart_key() -> String {
    ContinuityKeys::default().autostart_key
}

impl Default for ContinuitySettings {
    fn default() -> Self {
        Self {
            return_key: default_return_key(),
            autostart_key: default_autostart_key(),
        }
    }
}

impl ContinuitySettings {
    pub fn keys(&self) -> ContinuityKeys {
        ContinuityKeys {
            return_key: self.return_key.clone(),
            autostart_key: self.autostart_key.clone(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.default_agent_id.trim().is_empty() {
            return Err(ConfigError::invalid(
                "agent.default_agent_id",
                "Must not be empty",
            ));
        }

        self.validate_ring()?;
        self.validate_session()?;
        self.validate_navigation()?;
        self.validate_continuity()?;

        Ok(())
    }

    fn validate_ring(&self) -> Result<(), ConfigError> {
        let r = &self.ring;

        if !(ring::MIN_SAMPLE_RATE..=ring::MAX_SAMPLE_RATE).contains(&r.sample_rate) {
            return Err(ConfigError::invalid(
                "ring.sample_rate",
                format!(
                    "Must be between {} and {} Hz, got {}",
                    ring::MIN_SAMPLE_RATE,
                    ring::MAX_SAMPLE_RATE,
                    r.sample_rate
                ),
            ));
        }

        if !(r.peak_gain > 0.0 && r.peak_gain <= 1.0) {
            return Err(ConfigError::invalid(
                "ring.peak_gain",
                format!("Must be in (0.0, 1.0], got {}", r.peak_gain),
            ));
        }

        // The completion signal must not fire before the last ramp ends
        if !(ring::LAST_RAMP_END_MS..=ring::MAX_COMPLETION_MS).contains(&r.completion_ms) {
            return Err(ConfigError::invalid(
                "ring.completion_ms",
                format!(
                    "Must be between {} and {}, got {}",
                    ring::LAST_RAMP_END_MS,
                    ring::MAX_COMPLETION_MS,
                    r.completion_ms
                ),
            ));
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        let tz = &self.session.timezone;
        if tz.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::invalid(
                "session.timezone",
                format!("Unknown IANA time zone: {}", tz),
            ));
        }

        if self.session.error_revert_ms == 0 {
            return Err(ConfigError::invalid(
                "session.error_revert_ms",
                "Must be greater than zero",
            ));
        }

        Ok(())
    }

    fn validate_navigation(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;

        if nav.redirect_delay_ms == 0 {
            return Err(ConfigError::invalid(
                "navigation.redirect_delay_ms",
                "Must be greater than zero so the agent can finish speaking",
            ));
        }

        if nav.menu_path.trim().is_empty() {
            return Err(ConfigError::invalid("navigation.menu_path", "Must not be empty"));
        }

        if nav.menu_marker.trim().is_empty() {
            return Err(ConfigError::invalid(
                "navigation.menu_marker",
                "Must not be empty",
            ));
        }

        Ok(())
    }

    fn validate_continuity(&self) -> Result<(), ConfigError> {
        let c = &self.continuity;

        if c.return_key.is_empty() || c.autostart_key.is_empty() {
            return Err(ConfigError::invalid("continuity", "Keys must not be empty"));
        }

        if c.return_key == c.autostart_key {
            return Err(ConfigError::invalid(
                "continuity.autostart_key",
                "Must differ from continuity.return_key",
            ));
        }

        Ok(())
    }
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOICE_CONCIERGE prefix)
/// 2. config/{env}.* (if env specified)
/// 3. config/default.*
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(dir.join("default")).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        dir = %dir.display(),
        env = env.unwrap_or("default"),
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.ring.sample_rate, 44_100);
        assert_eq!(settings.ring.completion_ms, 2_500);
        assert_eq!(settings.session.error_revert(), Duration::from_secs(3));
        assert_eq!(settings.navigation.redirect_delay_ms, 2_600);
        assert_eq!(settings.session.timezone, "Europe/London");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_ring_validation() {
        let mut settings = Settings::default();
        settings.ring.completion_ms = 2_000; // before the last ramp ends
        assert!(settings.validate().is_err());

        settings.ring.completion_ms = 2_500;
        settings.ring.peak_gain = 0.0;
        assert!(settings.validate().is_err());

        settings.ring.peak_gain = 0.22;
        settings.ring.sample_rate = 1_000;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_timezone_validation() {
        let mut settings = Settings::default();
        settings.session.timezone = "Europe/Atlantis".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("session.timezone"));
    }

    #[test]
    fn test_continuity_keys_must_differ() {
        let mut settings = Settings::default();
        settings.continuity.autostart_key = settings.continuity.return_key.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_redirect_delay_rejected() {
        let mut settings = Settings::default();
        settings.navigation.redirect_delay_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_menu_path_match() {
        let nav = NavigationSettings::default();
        assert!(nav.is_menu_path("/Catering.html"));
        assert!(nav.is_menu_path("/site/catering.html"));
        assert!(!nav.is_menu_path("/index.html"));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[session]\nsettle_delay_ms = 650\n[ring]\nsample_rate = 48000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[agent]\ndefault_agent_id = \"agent_staging\"\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.session.settle_delay_ms, 650);
        assert_eq!(settings.ring.sample_rate, 48_000);
        assert_eq!(settings.agent.default_agent_id, "agent_staging");
        // Untouched sections keep defaults
        assert_eq!(settings.navigation.menu_path, "catering.html");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[ring]\npeak_gain = 2.0\n").unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_missing_dir_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("absent"), None).unwrap();
        assert_eq!(settings.continuity.keys(), ContinuityKeys::default());
    }

    #[test]
    fn test_settings_round_trip_toml() {
        let text = toml::to_string(&Settings::default()).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.session.handoff_line, Settings::default().session.handoff_line);
    }
}
