//! Measured calibration and catalog price lookup.
//!
//! Calibration rows are keyed twice, by exact device serial and by normalized
//! site name. When two rows share a key the primary product type wins over any
//! other type; otherwise the first row seen is kept.

use crate::config::PricingConfig;
use crate::region::normalize_site_name;
use fleetwash_types::{ChemicalProduct, TankConfiguration};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, instrument};

/// Calibration data kept for one device or site.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    /// Litres per 60 seconds, always strictly positive
    pub calibration_rate: f64,
    pub product_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct PricingIndex {
    by_device_serial: HashMap<String, CalibrationEntry>,
    by_site_name: HashMap<String, CalibrationEntry>,
    chemical_products: Vec<ChemicalProduct>,
    matcher: ProductMatcher,
}

impl PricingIndex {
    /// Build the calibration maps and the price-band filtered product list.
    #[instrument(skip_all, fields(tanks = tanks.len(), products = products.len()))]
    pub fn build(
        tanks: &[TankConfiguration],
        products: &[ChemicalProduct],
        config: &PricingConfig,
    ) -> Self {
        let primary = config.primary_product_type.trim();
        let mut by_device_serial = HashMap::new();
        let mut by_site_name = HashMap::new();
        let mut skipped_tanks = 0usize;

        for tank in tanks {
            let rate = match tank.calibration_rate() {
                Some(rate) if tank.active => rate,
                _ => {
                    skipped_tanks += 1;
                    continue;
                }
            };
            let entry = CalibrationEntry {
                calibration_rate: rate,
                product_type: tank.product_type.trim().to_string(),
            };

            if !tank.device_serial.is_empty() {
                upsert(&mut by_device_serial, tank.device_serial.clone(), entry.clone(), primary);
            }
            let site_key = normalize_site_name(&tank.site_name);
            if !site_key.is_empty() {
                upsert(&mut by_site_name, site_key, entry, primary);
            }
        }

        let chemical_products: Vec<ChemicalProduct> = products
            .iter()
            .filter(|p| p.active && in_band(p.price_per_litre(), config))
            .cloned()
            .collect();

        debug!(
            devices = by_device_serial.len(),
            sites = by_site_name.len(),
            skipped_tanks,
            chemical_products = chemical_products.len(),
            "Built pricing index"
        );

        Self {
            by_device_serial,
            by_site_name,
            chemical_products,
            matcher: ProductMatcher::new(config),
        }
    }

    pub fn by_device_serial(&self, device_serial: &str) -> Option<&CalibrationEntry> {
        if device_serial.is_empty() {
            return None;
        }
        self.by_device_serial.get(device_serial)
    }

    pub fn by_site_name(&self, site_name: &str) -> Option<&CalibrationEntry> {
        self.by_site_name.get(&normalize_site_name(site_name))
    }

    /// Catalog rows that passed the active and price-band filters
    pub fn chemical_products(&self) -> &[ChemicalProduct] {
        &self.chemical_products
    }

    /// Catalog price for the customer, or `None` when the regional default applies.
    pub fn resolve_price(&self, customer_name: &str) -> Option<f64> {
        self.matcher.resolve_price(&self.chemical_products, customer_name)
    }
}

fn is_primary(product_type: &str, primary: &str) -> bool {
    product_type.eq_ignore_ascii_case(primary)
}

fn upsert(
    map: &mut HashMap<String, CalibrationEntry>,
    key: String,
    incoming: CalibrationEntry,
    primary: &str,
) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(incoming);
        }
        Entry::Occupied(mut slot) => {
            let replaces = is_primary(&incoming.product_type, primary)
                && !is_primary(&slot.get().product_type, primary);
            if replaces {
                slot.insert(incoming);
            }
        }
    }
}

fn in_band(price: f64, config: &PricingConfig) -> bool {
    price.is_finite() && price >= config.min_price_per_litre && price <= config.max_price_per_litre
}

/// Brand keyword and generic name matching over a product list.
#[derive(Debug, Clone, Default)]
pub struct ProductMatcher {
    brand_keywords: Vec<String>,
    generic_patterns: Vec<String>,
}

impl ProductMatcher {
    pub fn new(config: &PricingConfig) -> Self {
        let normalize = |items: &[String]| -> Vec<String> {
            items.iter().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()).collect()
        };
        Self {
            brand_keywords: normalize(&config.brand_keywords),
            generic_patterns: normalize(&config.generic_product_patterns),
        }
    }

    /// Brand keywords in priority order, then generic non-brand products.
    pub fn resolve_price(&self, products: &[ChemicalProduct], customer_name: &str) -> Option<f64> {
        let customer = customer_name.to_lowercase();
        let names: Vec<String> = products.iter().map(|p| p.name.to_lowercase()).collect();

        for keyword in &self.brand_keywords {
            if !customer.contains(keyword.as_str()) {
                continue;
            }
            if let Some(i) = names.iter().position(|name| name.contains(keyword.as_str())) {
                return Some(products[i].price_per_litre());
            }
        }

        for pattern in &self.generic_patterns {
            let generic = names.iter().position(|name| {
                name.contains(pattern.as_str())
                    && !self.brand_keywords.iter().any(|k| name.contains(k.as_str()))
            });
            if let Some(i) = generic {
                return Some(products[i].price_per_litre());
            }
        }

        None
    }
}
