//! Persisted user preferences and the screen gate derived from them.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use crate::config::{Config, GenerationConfig};
use crate::roles::{find_role, AIRole};

/// Which screen the user should be looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    NeedsApiKey,
    NeedsRole,
    Chat(&'static AIRole),
}

/// API key, selected role and generation config, saved on every change
pub struct Preferences {
    config: Config,
    path: PathBuf,
}

impl Preferences {
    /// Load from the default location under the user's config directory
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(Config::default_path()?))
    }

    /// An unreadable or malformed file falls back to defaults; the next
    /// change overwrites it.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = Config::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
            Config::new()
        });
        tracing::info!(path = %path.display(), has_key = config.api_key.is_some(), "preferences loaded");
        Self { config, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn selected_role(&self) -> Option<&'static AIRole> {
        self.config.selected_role.as_deref().and_then(find_role)
    }

    pub fn generation_config(&self) -> GenerationConfig {
        self.config.generation
    }

    pub fn gate(&self) -> Gate {
        if self.api_key().is_none() {
            return Gate::NeedsApiKey;
        }
        match self.selected_role() {
            Some(role) => Gate::Chat(role),
            None => Gate::NeedsRole,
        }
    }

    /// Store a trimmed key. Blank keys are ignored.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }
        self.config.api_key = Some(key.to_string());
        self.save()
    }

    /// Sign out: forget the key and the selected role together
    pub fn clear_api_key(&mut self) -> Result<()> {
        self.config.api_key = None;
        self.config.selected_role = None;
        self.save()
    }

    pub fn select_role(&mut self, role_id: &str) -> Result<()> {
        let role = find_role(role_id).ok_or_else(|| anyhow!("Unknown role: {}", role_id))?;
        self.config.selected_role = Some(role.id.to_string());
        self.save()
    }

    pub fn clear_role(&mut self) -> Result<()> {
        self.config.selected_role = None;
        self.save()
    }

    pub fn set_generation_config(&mut self, config: GenerationConfig) -> Result<()> {
        self.config.generation = config.clamped();
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.config.save_to(&self.path).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save preferences");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs_in(dir: &tempfile::TempDir) -> Preferences {
        Preferences::load_from(dir.path().join("config.json"))
    }

    #[test]
    fn test_fresh_preferences_need_key() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        assert_eq!(prefs.gate(), Gate::NeedsApiKey);
        assert_eq!(prefs.generation_config(), GenerationConfig::default());
    }

    #[test]
    fn test_gate_progression() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = prefs_in(&dir);

        prefs.set_api_key("  secret  ").unwrap();
        assert_eq!(prefs.api_key(), Some("secret"));
        assert_eq!(prefs.gate(), Gate::NeedsRole);

        prefs.select_role("doctor").unwrap();
        assert!(matches!(prefs.gate(), Gate::Chat(role) if role.id == "doctor"));

        prefs.clear_role().unwrap();
        assert_eq!(prefs.gate(), Gate::NeedsRole);
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = prefs_in(&dir);
        prefs.set_api_key("   ").unwrap();
        assert_eq!(prefs.api_key(), None);
    }

    #[test]
    fn test_clearing_key_clears_role() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = prefs_in(&dir);
        prefs.set_api_key("secret").unwrap();
        prefs.select_role("book-advisor").unwrap();

        prefs.clear_api_key().unwrap();
        assert!(prefs.selected_role().is_none());
        assert_eq!(prefs.gate(), Gate::NeedsApiKey);

        // Still cleared after a restart
        let reloaded = prefs_in(&dir);
        assert!(reloaded.api_key().is_none());
        assert!(reloaded.selected_role().is_none());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = prefs_in(&dir);
        assert!(prefs.select_role("astrologer").is_err());
        assert!(prefs.selected_role().is_none());
    }

    #[test]
    fn test_stale_role_id_acts_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"gemini-api-key": "k", "selected-ai-role": "retired-role"}"#).unwrap();

        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.gate(), Gate::NeedsRole);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut prefs = Preferences::load_from(&path);
        assert_eq!(prefs.gate(), Gate::NeedsApiKey);
        assert_eq!(prefs.generation_config(), GenerationConfig::default());

        // The next change replaces the broken file
        prefs.set_api_key("secret").unwrap();
        assert_eq!(Preferences::load_from(&path).api_key(), Some("secret"));
    }

    #[test]
    fn test_generation_config_persists_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = prefs_in(&dir);
        prefs
            .set_generation_config(GenerationConfig { top_k: 99, ..GenerationConfig::default() })
            .unwrap();
        assert_eq!(prefs.generation_config().top_k, 40);

        let reloaded = prefs_in(&dir);
        assert_eq!(reloaded.generation_config().top_k, 40);
    }
}
