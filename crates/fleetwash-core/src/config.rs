//! Engine configuration
//!
//! Every constant table the calculator consults lives here so a deployment can
//! override it from TOML. `EngineConfig::default()` is complete on its own; a
//! file only needs the sections it changes.

use crate::constants::{cache, pricing};
use crate::error::{FleetwashError, Result};
use fleetwash_types::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "FLEETWASH_CONFIG_PATH";
/// File consulted when the environment variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "fleetwash.toml";

/// Fallback calibration and price for one region
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RegionalFallback {
    pub region: Region,
    pub calibration_rate: f64,
    pub price_per_litre: f64,
}

/// Fixed rate and price for customers whose name contains `keyword`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BrandOverride {
    pub keyword: String,
    pub calibration_rate: f64,
    pub price_per_litre: f64,
}

/// Whole-word keywords that place a site in a region
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RegionKeywords {
    pub region: Region,
    pub keywords: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    /// Region used when nothing else matches
    pub baseline: Region,
    /// Exact site name to region table; keys are compared trimmed and lower-cased
    pub sites: BTreeMap<String, Region>,
    /// Keyword heuristics, checked in order
    pub keywords: Vec<RegionKeywords>,
    pub fallback: Vec<RegionalFallback>,
    /// Checked before the regional row, in order
    pub brand_overrides: Vec<BrandOverride>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Tank product type that wins calibration conflicts
    pub primary_product_type: String,
    pub min_price_per_litre: f64,
    pub max_price_per_litre: f64,
    /// Brand keywords in priority order
    pub brand_keywords: Vec<String>,
    /// Name fragments identifying a generic wash chemical, in priority order
    pub generic_product_patterns: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AggregationConfig {
    /// Memoized scan results kept by the aggregator; 0 disables memoization
    pub cache_capacity: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub regions: RegionConfig,
    pub pricing: PricingConfig,
    pub aggregation: AggregationConfig,
}

impl Default for RegionConfig {
    fn default() -> Self {
        let fallback = [
            (Region::Nsw, 5.0, 3.85),
            (Region::Vic, 5.0, 3.95),
            (Region::Qld, 5.5, 4.10),
            (Region::Wa, 4.5, 4.45),
            (Region::Sa, 5.0, 4.05),
            (Region::Tas, 4.5, 4.25),
            (Region::Nz, 5.0, 4.60),
        ]
        .into_iter()
        .map(|(region, calibration_rate, price_per_litre)| RegionalFallback {
            region,
            calibration_rate,
            price_per_litre,
        })
        .collect();

        let keywords = [
            (Region::Nz, &["new zealand", "nz", "auckland", "wellington", "christchurch"][..]),
            (Region::Wa, &["western australia", "wa", "perth", "pilbara", "kalgoorlie"][..]),
            (Region::Sa, &["south australia", "sa", "adelaide"][..]),
            (Region::Tas, &["tasmania", "tas", "hobart", "launceston"][..]),
            (Region::Qld, &["queensland", "qld", "brisbane", "gold coast", "townsville"][..]),
            (Region::Vic, &["victoria", "vic", "melbourne", "geelong", "ballarat"][..]),
            (Region::Nsw, &["new south wales", "nsw", "sydney", "newcastle", "wollongong"][..]),
        ]
        .into_iter()
        .map(|(region, words)| RegionKeywords {
            region,
            keywords: words.iter().map(|w| w.to_string()).collect(),
        })
        .collect();

        let sites = [
            ("penrith plant", Region::Nsw),
            ("eastern creek batching", Region::Nsw),
            ("laverton north", Region::Vic),
            ("pinkenba wharf", Region::Qld),
            ("welshpool depot", Region::Wa),
            ("wingfield yard", Region::Sa),
            ("east tamaki", Region::Nz),
        ]
        .into_iter()
        .map(|(name, region)| (name.to_string(), region))
        .collect();

        Self {
            baseline: Region::Nsw,
            sites,
            keywords,
            fallback,
            brand_overrides: vec![
                BrandOverride {
                    keyword: "summit".to_string(),
                    calibration_rate: 6.0,
                    price_per_litre: 3.40,
                },
                BrandOverride {
                    keyword: "keystone".to_string(),
                    calibration_rate: 4.0,
                    price_per_litre: 3.60,
                },
            ],
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            primary_product_type: pricing::PRIMARY_PRODUCT_TYPE.to_string(),
            min_price_per_litre: pricing::MIN_PLAUSIBLE_PRICE_PER_LITRE,
            max_price_per_litre: pricing::MAX_PLAUSIBLE_PRICE_PER_LITRE,
            brand_keywords: vec![
                "summit".to_string(),
                "keystone".to_string(),
                "ridgeline".to_string(),
            ],
            generic_product_patterns: vec![
                "concrete remover".to_string(),
                "residue remover".to_string(),
                "conc".to_string(),
            ],
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { cache_capacity: cache::DEFAULT_COST_CACHE_CAPACITY }
    }
}

impl EngineConfig {
    /// Load configuration from the file named by `FLEETWASH_CONFIG_PATH`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, with the same missing-file rule as [`Self::load`].
    pub fn load_from(path: &str) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)?;
                info!(path, "Loaded engine configuration");
                Ok(config)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Configuration file '{}' not found. Using default configuration.", path);
                Ok(Self::default())
            }
            Err(err) => Err(FleetwashError::Io {
                path: path.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the calculator relies on.
    pub fn validate(&self) -> Result<()> {
        for row in &self.regions.fallback {
            check_positive(row.calibration_rate, "regions.fallback.calibration_rate")?;
            check_positive(row.price_per_litre, "regions.fallback.price_per_litre")?;
        }
        if self.fallback_for(self.regions.baseline).is_none() {
            return Err(FleetwashError::configuration(
                format!("baseline region {} has no fallback row", self.regions.baseline),
                "regions.baseline",
            ));
        }
        for row in &self.regions.brand_overrides {
            if row.keyword.trim().is_empty() {
                return Err(FleetwashError::configuration(
                    "brand override keyword is empty",
                    "regions.brand_overrides.keyword",
                ));
            }
            check_positive(row.calibration_rate, "regions.brand_overrides.calibration_rate")?;
            check_positive(row.price_per_litre, "regions.brand_overrides.price_per_litre")?;
        }

        check_positive(self.pricing.min_price_per_litre, "pricing.min_price_per_litre")?;
        check_positive(self.pricing.max_price_per_litre, "pricing.max_price_per_litre")?;
        if self.pricing.max_price_per_litre < self.pricing.min_price_per_litre {
            return Err(FleetwashError::configuration(
                "price band is inverted",
                "pricing.max_price_per_litre",
            ));
        }
        if self.pricing.primary_product_type.trim().is_empty() {
            return Err(FleetwashError::configuration(
                "primary product type is empty",
                "pricing.primary_product_type",
            ));
        }
        Ok(())
    }

    /// Fallback row for `region`, if configured.
    pub fn fallback_for(&self, region: Region) -> Option<&RegionalFallback> {
        self.regions.fallback.iter().find(|row| row.region == region)
    }
}

fn check_positive(value: f64, setting: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        let message = format!("{setting} must be a positive number, got {value}");
        Err(FleetwashError::configuration(message, setting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        for region in Region::ALL {
            assert!(config.fallback_for(region).is_some(), "missing fallback for {region}");
        }
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [pricing]
            brand_keywords = ["ridgeline"]

            [aggregation]
            cache_capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.pricing.brand_keywords, vec!["ridgeline".to_string()]);
        assert_eq!(config.pricing.min_price_per_litre, 0.50);
        assert_eq!(config.aggregation.cache_capacity, 16);
        assert_eq!(config.regions, RegionConfig::default());
    }

    #[test]
    fn test_region_tables_parse_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [regions]
            baseline = "VIC"

            [regions.sites]
            "Dandenong South" = "VIC"

            [[regions.fallback]]
            region = "VIC"
            calibration_rate = 4.8
            price_per_litre = 3.99
            "#,
        )
        .unwrap();
        assert_eq!(config.regions.baseline, Region::Vic);
        assert_eq!(config.regions.sites.get("Dandenong South"), Some(&Region::Vic));
        assert_eq!(config.regions.fallback.len(), 1);
    }

    #[test]
    fn test_rejects_non_positive_fallback() {
        let mut config = EngineConfig::default();
        config.regions.fallback[0].price_per_litre = 0.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.setting(), Some("regions.fallback.price_per_litre"));
    }

    #[test]
    fn test_rejects_inverted_price_band() {
        let mut config = EngineConfig::default();
        config.pricing.min_price_per_litre = 25.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.setting(), Some("pricing.max_price_per_litre"));
    }

    #[test]
    fn test_rejects_baseline_without_fallback() {
        let mut config = EngineConfig::default();
        config.regions.fallback.retain(|row| row.region != Region::Nsw);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = EngineConfig::load_from("/nonexistent/fleetwash.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = EngineConfig::from_toml_str("[pricing\nmin = ").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }
}
