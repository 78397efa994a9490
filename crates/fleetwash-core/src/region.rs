//! Region and regional fallback resolution.

use crate::config::EngineConfig;
use crate::error::{FleetwashError, Result};
use fleetwash_types::Region;
use std::collections::HashMap;

/// Normalized form used for site-name keys: trimmed and lower-cased.
pub fn normalize_site_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lower-cased alphanumeric words of `text`.
fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Calibration rate and price used when no catalog data applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPricing {
    pub calibration_rate: f64,
    pub price_per_litre: f64,
}

/// Resolves regions and fallback pricing from a validated [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct RegionResolver {
    baseline: Region,
    sites: HashMap<String, Region>,
    /// Each keyword split into words, matched as a contiguous word sequence
    keywords: Vec<(Region, Vec<Vec<String>>)>,
    fallback: HashMap<Region, FallbackPricing>,
    baseline_fallback: FallbackPricing,
    brand_overrides: Vec<(String, FallbackPricing)>,
}

impl RegionResolver {
    /// Fails when `config` does not pass [`EngineConfig::validate`].
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let config = &config.regions;

        let sites = config
            .sites
            .iter()
            .map(|(name, region)| (normalize_site_name(name), *region))
            .collect();

        let keywords = config
            .keywords
            .iter()
            .map(|entry| {
                let phrases = entry
                    .keywords
                    .iter()
                    .map(|k| words(k))
                    .filter(|p| !p.is_empty())
                    .collect();
                (entry.region, phrases)
            })
            .collect();

        let fallback: HashMap<Region, FallbackPricing> = config
            .fallback
            .iter()
            .map(|row| {
                let pricing = FallbackPricing {
                    calibration_rate: row.calibration_rate,
                    price_per_litre: row.price_per_litre,
                };
                (row.region, pricing)
            })
            .collect();

        let brand_overrides = config
            .brand_overrides
            .iter()
            .map(|row| {
                let pricing = FallbackPricing {
                    calibration_rate: row.calibration_rate,
                    price_per_litre: row.price_per_litre,
                };
                (row.keyword.trim().to_lowercase(), pricing)
            })
            .collect();

        let baseline_fallback = fallback.get(&config.baseline).copied().ok_or_else(|| {
            FleetwashError::configuration(
                format!("baseline region {} has no fallback row", config.baseline),
                "regions.baseline",
            )
        })?;

        Ok(Self {
            baseline: config.baseline,
            sites,
            keywords,
            fallback,
            baseline_fallback,
            brand_overrides,
        })
    }

    pub fn baseline(&self) -> Region {
        self.baseline
    }

    /// Exact site table first, then keyword heuristics over site and customer
    /// name, then the baseline region.
    pub fn resolve(&self, site_name: &str, customer_name: &str) -> Region {
        if let Some(region) = self.sites.get(&normalize_site_name(site_name)) {
            return *region;
        }

        let haystack = words(&format!("{site_name} {customer_name}"));
        for (region, phrases) in &self.keywords {
            if phrases.iter().any(|phrase| contains_phrase(&haystack, phrase)) {
                return *region;
            }
        }

        self.baseline
    }

    /// Brand override for the customer if one applies, else the region's row,
    /// else the baseline row.
    pub fn fallback(&self, region: Region, customer_name: &str) -> FallbackPricing {
        let customer = customer_name.to_lowercase();
        let brand = self
            .brand_overrides
            .iter()
            .find(|(keyword, _)| !keyword.is_empty() && customer.contains(keyword.as_str()));
        if let Some((_, pricing)) = brand {
            return *pricing;
        }

        self.fallback.get(&region).copied().unwrap_or(self.baseline_fallback)
    }
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    haystack.windows(phrase.len()).any(|window| window == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn resolver() -> RegionResolver {
        RegionResolver::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_exact_site_table_wins_over_keywords() {
        // "Laverton North" is mapped to VIC even though the customer says Perth.
        assert_eq!(resolver().resolve("Laverton North", "Perth Haulage"), Region::Vic);
    }

    #[test]
    fn test_exact_site_lookup_ignores_case_and_whitespace() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("  PINKENBA Wharf ", "acme"), Region::Qld);
        assert_eq!(resolver.resolve("pinkenba wharf", "  ACME   "), Region::Qld);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("North Perth Yard", "Acme"), Region::Wa);
        assert_eq!(resolver.resolve("Gold Coast Batching", "Acme"), Region::Qld);
        // "washington" must not trigger WA and "sand" must not trigger SA.
        assert_eq!(resolver.resolve("Washington Sand Pit", "Acme"), Region::Nsw);
    }

    #[test]
    fn test_customer_name_contributes_keywords() {
        assert_eq!(resolver().resolve("Depot 4", "Auckland Readymix"), Region::Nz);
    }

    #[test]
    fn test_unknown_names_fall_back_to_baseline() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("", ""), Region::Nsw);
        assert_eq!(resolver.baseline(), Region::Nsw);
    }

    #[test]
    fn test_brand_override_beats_region() {
        let resolver = resolver();
        let pricing = resolver.fallback(Region::Qld, "SUMMIT Concrete Pty Ltd");
        assert_eq!(pricing, FallbackPricing { calibration_rate: 6.0, price_per_litre: 3.40 });
        let pricing = resolver.fallback(Region::Qld, "Acme Concrete");
        assert_eq!(pricing, FallbackPricing { calibration_rate: 5.5, price_per_litre: 4.10 });
    }

    #[test]
    fn test_missing_region_row_uses_baseline_row() {
        let mut config = EngineConfig::default();
        config.regions.fallback.retain(|row| row.region != Region::Tas);
        let resolver = RegionResolver::new(&config).unwrap();
        let pricing = resolver.fallback(Region::Tas, "Acme");
        assert_eq!(pricing, FallbackPricing { calibration_rate: 5.0, price_per_litre: 3.85 });
    }

    #[test]
    fn test_unvalidated_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.regions.fallback[0].price_per_litre = 0.0;
        let err = RegionResolver::new(&config).unwrap_err();
        assert_eq!(err.setting(), Some("regions.fallback.price_per_litre"));

        let mut config = EngineConfig::default();
        config.regions.fallback.retain(|row| row.region != Region::Nsw);
        assert!(RegionResolver::new(&config).is_err());
    }
}
