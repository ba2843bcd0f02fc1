use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 1.0);
pub const TOP_P_RANGE: (f32, f32) = (0.0, 1.0);
pub const TOP_K_RANGE: (u32, u32) = (1, 40);
pub const MAX_OUTPUT_TOKENS_RANGE: (u32, u32) = (50, 8192);

/// Sampling parameters sent with every request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(deserialize_with = "lenient_u32")]
    pub top_k: u32,
    pub top_p: f32,
    #[serde(deserialize_with = "lenient_u32")]
    pub max_output_tokens: u32,
}

/// Accept any JSON number for an integer field; `clamped` brings it into range
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, u32::MAX as f64) as u32)
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

impl GenerationConfig {
    /// Force every field into its allowed range
    pub fn clamped(self) -> Self {
        let temperature = if self.temperature.is_nan() {
            Self::default().temperature
        } else {
            self.temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
        };
        let top_p = if self.top_p.is_nan() {
            Self::default().top_p
        } else {
            self.top_p.clamp(TOP_P_RANGE.0, TOP_P_RANGE.1)
        };

        Self {
            temperature,
            top_k: self.top_k.clamp(TOP_K_RANGE.0, TOP_K_RANGE.1),
            top_p,
            max_output_tokens: self
                .max_output_tokens
                .clamp(MAX_OUTPUT_TOKENS_RANGE.0, MAX_OUTPUT_TOKENS_RANGE.1),
        }
    }

    /// Move one field by `steps` slider increments, staying in range
    pub fn adjust(self, field: SettingsField, steps: i32) -> Self {
        let mut next = self;
        match field {
            SettingsField::Temperature => {
                next.temperature = round_to_step(self.temperature + 0.1 * steps as f32, 0.1);
            }
            SettingsField::TopP => {
                next.top_p = round_to_step(self.top_p + 0.05 * steps as f32, 0.05);
            }
            SettingsField::TopK => {
                next.top_k = (self.top_k as i64 + steps as i64).max(0) as u32;
            }
            SettingsField::MaxOutputTokens => {
                next.max_output_tokens = (self.max_output_tokens as i64 + 50 * steps as i64).max(0) as u32;
            }
        }
        next.clamped()
    }

    pub fn temperature_label(&self) -> &'static str {
        if self.temperature == 0.0 {
            "More focused"
        } else if self.temperature >= 1.0 {
            "More creative"
        } else {
            "Balanced"
        }
    }

    pub fn top_p_label(&self) -> &'static str {
        if self.top_p <= 0.5 {
            "More precise"
        } else if self.top_p >= 0.9 {
            "More varied"
        } else {
            "Balanced"
        }
    }
}

// Keeps repeated float steps from drifting (0.1 * 3 != 0.3)
fn round_to_step(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

/// A slider in the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Temperature,
    TopP,
    TopK,
    MaxOutputTokens,
}

impl SettingsField {
    pub fn all() -> [SettingsField; 4] {
        [
            SettingsField::Temperature,
            SettingsField::TopP,
            SettingsField::TopK,
            SettingsField::MaxOutputTokens,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SettingsField::Temperature => "Temperature",
            SettingsField::TopP => "Top P",
            SettingsField::TopK => "Top K",
            SettingsField::MaxOutputTokens => "Max Tokens",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            SettingsField::Temperature => {
                "Controls the randomness of the output. Higher values produce more creative results."
            }
            SettingsField::TopP => {
                "Controls diversity by considering the most likely tokens. Lower values make output more focused."
            }
            SettingsField::TopK => "Limits token selection to the top K most likely tokens.",
            SettingsField::MaxOutputTokens => "Maximum number of tokens in the generated response.",
        }
    }

    /// Current value formatted the way the slider shows it
    pub fn format_value(&self, config: &GenerationConfig) -> String {
        match self {
            SettingsField::Temperature => format!("{:.1}", config.temperature),
            SettingsField::TopP => format!("{:.2}", config.top_p),
            SettingsField::TopK => config.top_k.to_string(),
            SettingsField::MaxOutputTokens => config.max_output_tokens.to_string(),
        }
    }

    /// Position of the current value within the field's range, 0.0..=1.0
    pub fn ratio(&self, config: &GenerationConfig) -> f64 {
        let (value, min, max) = match self {
            SettingsField::Temperature => (config.temperature as f64, TEMPERATURE_RANGE.0 as f64, TEMPERATURE_RANGE.1 as f64),
            SettingsField::TopP => (config.top_p as f64, TOP_P_RANGE.0 as f64, TOP_P_RANGE.1 as f64),
            SettingsField::TopK => (config.top_k as f64, TOP_K_RANGE.0 as f64, TOP_K_RANGE.1 as f64),
            SettingsField::MaxOutputTokens => (
                config.max_output_tokens as f64,
                MAX_OUTPUT_TOKENS_RANGE.0 as f64,
                MAX_OUTPUT_TOKENS_RANGE.1 as f64,
            ),
        };
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

/// Preferences persisted between runs
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(rename = "gemini-api-key", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "selected-ai-role", default, skip_serializing_if = "Option::is_none")]
    pub selected_role: Option<String>,
    #[serde(rename = "gemini-generation-config", default)]
    pub generation: GenerationConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&config_content)?;
        config.generation = config.generation.clamped();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("rolechat").join("config.json"))
    }
}
