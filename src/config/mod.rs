use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pacing and wording of the simulated voice agent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    pub agent_name: String,
    pub company: String,
    /// Dialing until the line connects.
    pub dial_delay_secs: u64,
    /// Connected until the first scripted line.
    pub answer_delay_secs: u64,
    /// Interval of the elapsed-duration counter.
    pub tick_secs: u64,
    /// Pause between a completed call and the next auto-dial.
    pub auto_dial_delay_secs: u64,
    pub queue_limit: usize,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            agent_name: "Emma".to_string(),
            company: "VillaLux".to_string(),
            dial_delay_secs: 3,
            answer_delay_secs: 2,
            tick_secs: 1,
            auto_dial_delay_secs: 5,
            queue_limit: 5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BookingSettings {
    pub service_fee_rate: f64,
    pub tax_rate: f64,
    pub default_guests: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            service_fee_rate: 0.10,
            tax_rate: 0.08,
            default_guests: 2,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
}

/// Top-level villalux config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct VillaluxConfig {
    pub data: DataSettings,
    pub voice: VoiceSettings,
    pub booking: BookingSettings,
}

impl VillaluxConfig {
    /// Load config from ~/.villalux/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(VillaluxConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: VillaluxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the voice agent cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.voice.tick_secs == 0 {
            bail!("[voice] tick_secs must be at least 1");
        }
        Ok(())
    }

    /// Render the effective config as TOML.
    pub fn display(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }
}

/// Resolve the dataset file: CLI flag > env var > config `[data] path`.
/// `None` means the built-in mock dataset.
pub fn resolve_data_path(
    cli_flag: Option<&Path>,
    env_var_name: &str,
    config: &VillaluxConfig,
) -> Option<PathBuf> {
    // 1. CLI flag
    if let Some(path) = cli_flag {
        if !path.as_os_str().is_empty() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Environment variable
    if let Ok(val) = std::env::var(env_var_name) {
        if !val.is_empty() {
            return Some(PathBuf::from(val));
        }
    }

    // 3. Config file
    config.data.path.clone()
}

/// Path to the config file: ~/.villalux/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".villalux").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.villalux/config.toml
# Dataset resolution order: --data flag > VILLALUX_DATA env var > [data] path > built-in mock data

[data]
# path = "/path/to/dataset.json"   # .json, .yaml/.yml or .toml

[voice]
# agent_name = "Emma"
# company = "VillaLux"
# dial_delay_secs = 3
# answer_delay_secs = 2
# tick_secs = 1
# auto_dial_delay_secs = 5
# queue_limit = 5

[booking]
# service_fee_rate = 0.10
# tax_rate = 0.08
# default_guests = 2
"#
}

/// Create the default config file at `path` if it doesn't already exist.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, default_config_template())
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(true)
}
