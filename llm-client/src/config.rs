use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{LlmError, Result};
use crate::providers::ProviderKind;

/// Preset used when nothing else is configured, and as the fallback when the
/// configured default names a provider this library cannot reach.
pub const FALLBACK_PRESET: &str = "gemini";

/// Presets available without a config file: (name, provider, model).
const BUILTIN_PRESETS: &[(&str, &str, &str)] = &[
    ("gemini", "gemini", "gemini-1.5-pro-latest"),
    ("gemini-flash", "gemini", "gemini-1.5-flash-latest"),
    ("anthropic-sonnet", "anthropic", "claude-3-5-sonnet-latest"),
];

/// Contents of `~/.config/cli-programs/llm.toml`.
///
/// The file is shared with other tools, so it may name presets and providers
/// that have no client here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "fallback_preset_name")]
    pub default_preset: String,

    /// Program name -> preset name
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider name -> credentials and endpoint
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn fallback_preset_name() -> String {
    FALLBACK_PRESET.to_string()
}

/// A named provider/model pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPreset {
    /// gemini or anthropic
    pub provider: String,
    pub model: String,
}

impl ModelPreset {
    fn builtin(name: &str) -> Option<Self> {
        BUILTIN_PRESETS
            .iter()
            .find(|(preset, _, _)| *preset == name)
            .map(|(_, provider, model)| Self {
                provider: provider.to_string(),
                model: model.to_string(),
            })
    }

    /// Whether a client exists for this preset's provider
    pub fn is_supported(&self) -> bool {
        self.provider.parse::<ProviderKind>().is_ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Takes precedence over the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// The preset a program ends up using.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetChoice {
    pub name: String,
    pub preset: ModelPreset,
    /// The configured default that was skipped because its provider is
    /// unsupported
    pub replaced: Option<String>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| LlmError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("llm.toml"))
    }

    /// Read the config file, or the built-in presets if there is none.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&std::fs::read_to_string(&path)?)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Look up a preset from the file, then among the built-ins.
    pub fn get_preset(&self, name: &str) -> Result<ModelPreset> {
        self.presets
            .get(name)
            .cloned()
            .or_else(|| ModelPreset::builtin(name))
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// The program's own default, else `default_preset`.
    pub fn get_default_for_program(&self, program: &str) -> &str {
        self.defaults
            .get(program)
            .map(String::as_str)
            .unwrap_or(&self.default_preset)
    }

    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Pick the preset for `program`.
    ///
    /// An explicitly requested preset must exist and use a supported
    /// provider. A configured default with an unsupported provider is
    /// replaced by [`FALLBACK_PRESET`] and reported in
    /// [`PresetChoice::replaced`].
    pub fn choose_preset(&self, program: &str, requested: Option<&str>) -> Result<PresetChoice> {
        if let Some(name) = requested {
            let preset = self.get_preset(name)?;
            if !preset.is_supported() {
                return Err(LlmError::ConfigError(format!(
                    "Preset '{}' uses unsupported provider '{}'",
                    name, preset.provider
                )));
            }
            return Ok(PresetChoice {
                name: name.to_string(),
                preset,
                replaced: None,
            });
        }

        let name = self.get_default_for_program(program);
        match self.get_preset(name) {
            Ok(preset) if preset.is_supported() => Ok(PresetChoice {
                name: name.to_string(),
                preset,
                replaced: None,
            }),
            _ => Ok(PresetChoice {
                name: FALLBACK_PRESET.to_string(),
                preset: self.get_preset(FALLBACK_PRESET)?,
                replaced: Some(name.to_string()),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let presets = BUILTIN_PRESETS
            .iter()
            .filter_map(|(name, _, _)| Some((name.to_string(), ModelPreset::builtin(name)?)))
            .collect();

        Self {
            default_preset: fallback_preset_name(),
            defaults: HashMap::new(),
            presets,
            providers: HashMap::new(),
        }
    }
}
