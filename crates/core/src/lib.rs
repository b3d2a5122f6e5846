pub mod domain;
pub mod engine;
pub mod error;
pub mod source;

pub mod config {
    use crate::engine::features::POPULARITY_CAP;
    use crate::engine::instruments::{AffinityWeights, CHANGE_WEIGHT, SECTOR_WEIGHT};
    use crate::error::{check_weight, EngineError};
    use anyhow::Context;
    use std::str::FromStr;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub snapshot_path: Option<String>,
        pub snapshot_url: Option<String>,
        pub snapshot_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                snapshot_path: non_empty_var("SNAPSHOT_PATH"),
                snapshot_url: non_empty_var("SNAPSHOT_URL"),
                snapshot_api_key: non_empty_var("SNAPSHOT_API_KEY"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_snapshot_path(&self) -> anyhow::Result<&str> {
            self.snapshot_path
                .as_deref()
                .context("SNAPSHOT_PATH is required")
        }

        pub fn require_snapshot_url(&self) -> anyhow::Result<&str> {
            self.snapshot_url
                .as_deref()
                .context("SNAPSHOT_URL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    /// Tuning constants for the scorers. Defaults reproduce the production
    /// weighting; every field can be overridden with a `RECO_*` variable.
    #[derive(Debug, Clone, PartialEq)]
    pub struct EngineConfig {
        pub popularity_cap: f64,
        pub instrument_sector_weight: f64,
        pub instrument_change_weight: f64,
        pub content_weight: f64,
        pub collaborative_weight: f64,
        pub default_limit: usize,
        pub trending_window_hours: f64,
        pub normalize_by_present_weight: bool,
    }

    impl Default for EngineConfig {
        fn default() -> Self {
            Self {
                popularity_cap: POPULARITY_CAP,
                instrument_sector_weight: SECTOR_WEIGHT,
                instrument_change_weight: CHANGE_WEIGHT,
                content_weight: 0.4,
                collaborative_weight: 0.6,
                default_limit: 10,
                trending_window_hours: 24.0,
                normalize_by_present_weight: false,
            }
        }
    }

    impl EngineConfig {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds a config from an arbitrary key lookup. Unset keys keep their
        /// default; set but unparsable keys are an error.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let d = Self::default();
            let config = Self {
                popularity_cap: parse_or(&lookup, "RECO_POPULARITY_CAP", d.popularity_cap)?,
                instrument_sector_weight: parse_or(
                    &lookup,
                    "RECO_INSTRUMENT_SECTOR_WEIGHT",
                    d.instrument_sector_weight,
                )?,
                instrument_change_weight: parse_or(
                    &lookup,
                    "RECO_INSTRUMENT_CHANGE_WEIGHT",
                    d.instrument_change_weight,
                )?,
                content_weight: parse_or(&lookup, "RECO_CONTENT_WEIGHT", d.content_weight)?,
                collaborative_weight: parse_or(
                    &lookup,
                    "RECO_COLLABORATIVE_WEIGHT",
                    d.collaborative_weight,
                )?,
                default_limit: parse_or(&lookup, "RECO_DEFAULT_LIMIT", d.default_limit)?,
                trending_window_hours: parse_or(
                    &lookup,
                    "RECO_TRENDING_WINDOW_HOURS",
                    d.trending_window_hours,
                )?,
                normalize_by_present_weight: parse_or(
                    &lookup,
                    "RECO_NORMALIZE_BY_PRESENT_WEIGHT",
                    d.normalize_by_present_weight,
                )?,
            };
            config.validate()?;
            Ok(config)
        }

        pub fn validate(&self) -> Result<(), EngineError> {
            if !(self.popularity_cap.is_finite() && self.popularity_cap > 0.0) {
                return Err(EngineError::InvalidPopularityCap(self.popularity_cap));
            }
            if !(self.trending_window_hours.is_finite() && self.trending_window_hours > 0.0) {
                return Err(EngineError::InvalidWindow(self.trending_window_hours));
            }
            check_weight("content_weight", self.content_weight)?;
            check_weight("collaborative_weight", self.collaborative_weight)?;
            // Change percent is signed, but the weights themselves must not be.
            check_weight("instrument_sector_weight", self.instrument_sector_weight)?;
            check_weight("instrument_change_weight", self.instrument_change_weight)?;
            Ok(())
        }

        pub fn affinity_weights(&self) -> AffinityWeights {
            AffinityWeights {
                sector: self.instrument_sector_weight,
                change: self.instrument_change_weight,
            }
        }
    }

    fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key).filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} is not valid: {raw}")),
            None => Ok(default),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            move |key: &str| map.get(key).cloned()
        }

        #[test]
        fn defaults_when_unset() {
            let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
            assert_eq!(config, EngineConfig::default());
            assert_eq!(config.popularity_cap, 1000.0);
            assert_eq!(config.affinity_weights(), AffinityWeights::default());
        }

        #[test]
        fn overrides_from_lookup() {
            let config = EngineConfig::from_lookup(lookup(&[
                ("RECO_POPULARITY_CAP", "500"),
                ("RECO_DEFAULT_LIMIT", " 20 "),
                ("RECO_NORMALIZE_BY_PRESENT_WEIGHT", "true"),
            ]))
            .unwrap();
            assert_eq!(config.popularity_cap, 500.0);
            assert_eq!(config.default_limit, 20);
            assert!(config.normalize_by_present_weight);
        }

        #[test]
        fn rejects_unparsable_and_invalid_values() {
            assert!(EngineConfig::from_lookup(lookup(&[("RECO_DEFAULT_LIMIT", "ten")])).is_err());
            assert!(EngineConfig::from_lookup(lookup(&[("RECO_POPULARITY_CAP", "0")])).is_err());
            assert!(EngineConfig::from_lookup(lookup(&[("RECO_CONTENT_WEIGHT", "-1")])).is_err());
            assert!(
                EngineConfig::from_lookup(lookup(&[("RECO_TRENDING_WINDOW_HOURS", "inf")]))
                    .is_err()
            );
        }
    }
}
