use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WINDOW: i64 = 10;
/// Fenêtre de l'ancienne variante de la stratégie.
pub const LEGACY_WINDOW: i64 = 7;
pub const MAX_WINDOW: i64 = 366;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Écart maximal (jours) entre 1re/2e puis 2e/3e apparition.
    pub window: i64,
    /// Pourcentage du jour à partir duquel un candidat est "haute" probabilité.
    pub high_threshold: u32,
    pub medium_threshold: u32,
    /// Borne haute du nombre de candidats actifs pour les statistiques par tranche.
    pub max_candidates: usize,
    pub history_limit: Option<usize>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            high_threshold: 11,
            medium_threshold: 6,
            max_candidates: 6,
            history_limit: None,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window < 1 || self.window > MAX_WINDOW {
            bail!("Fenêtre invalide : {} (entre 1 et {} jours)", self.window, MAX_WINDOW);
        }
        if self.medium_threshold > self.high_threshold {
            bail!(
                "Seuils incohérents : moyen={} > haut={}",
                self.medium_threshold,
                self.high_threshold
            );
        }
        if self.max_candidates == 0 {
            bail!("max_candidates doit être au moins 1");
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {:?}", path))?;
        let config: StrategyConfig = serde_json::from_str(&json)
            .with_context(|| format!("JSON invalide dans {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.window, 10);
        assert_eq!(config.high_threshold, 11);
        assert_eq!(config.medium_threshold, 6);
        assert_eq!(config.max_candidates, 6);
        assert!(config.history_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = StrategyConfig { window: 0, ..Default::default() };
        assert!(zero.validate().is_err());

        let huge = StrategyConfig { window: i64::MAX, ..Default::default() };
        assert!(huge.validate().is_err());
        let above = StrategyConfig { window: MAX_WINDOW + 1, ..Default::default() };
        assert!(above.validate().is_err());
        let cap = StrategyConfig { window: MAX_WINDOW, ..Default::default() };
        assert!(cap.validate().is_ok());

        let inverted = StrategyConfig { high_threshold: 5, medium_threshold: 8, ..Default::default() };
        assert!(inverted.validate().is_err());

        let no_candidates = StrategyConfig { max_candidates: 0, ..Default::default() };
        assert!(no_candidates.validate().is_err());

        let legacy = StrategyConfig { window: LEGACY_WINDOW, ..Default::default() };
        assert!(legacy.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StrategyConfig = serde_json::from_str(r#"{"window": 7}"#).unwrap();
        assert_eq!(config.window, 7);
        assert_eq!(config.high_threshold, 11);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("loteria-config-{}.json", std::process::id()));
        let config = StrategyConfig { window: 7, history_limit: Some(20), ..Default::default() };
        config.save(&path).unwrap();
        let restored = StrategyConfig::load(&path).unwrap();
        assert_eq!(restored, config);
        std::fs::remove_file(&path).unwrap();
    }
}
