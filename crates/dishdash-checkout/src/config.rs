//! # Checkout Configuration
//!
//! Deployment settings for checkout pricing.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DISHDASH_USAGE_LIMIT_ZERO=exhausted                                │
//! │     DISHDASH_DELIVERY_FEE=20000                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dishdash/checkout.toml (Linux)                           │
//! │     ~/Library/Application Support/com.dishdash.dishdash/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [pricing]
//! placeholder_price = 50000     # minor units, used when no price is known
//! currency_code = "DZD"
//! usage_limit_zero = "unlimited" # unlimited | exhausted
//! default_delivery_fee = 0
//!
//! [cache]
//! activity_ttl_secs = 60
//!
//! [limits]
//! max_cart_entries = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use dishdash_core::{
    AssemblerOptions, Money, UsageLimitPolicy, DEFAULT_PLACEHOLDER_PRICE, MAX_CART_ENTRIES,
};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Pricing Settings
// =============================================================================

/// Money-related settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Unit price used when neither the saved line, the variant nor the menu
    /// carries one (minor units).
    #[serde(default = "default_placeholder_price")]
    pub placeholder_price: i64,

    /// ISO 4217 code prices are expressed in.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// How a promotion's `usage_limit` of zero is read.
    #[serde(default)]
    pub usage_limit_zero: UsageLimitPolicy,

    /// Delivery fee quoted when the caller supplies none (minor units).
    #[serde(default)]
    pub default_delivery_fee: i64,
}

fn default_placeholder_price() -> i64 {
    DEFAULT_PLACEHOLDER_PRICE.cents()
}

fn default_currency_code() -> String {
    "DZD".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            placeholder_price: default_placeholder_price(),
            currency_code: default_currency_code(),
            usage_limit_zero: UsageLimitPolicy::default(),
            default_delivery_fee: 0,
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

/// Promotion activity cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long an activity answer is reused (seconds). 0 disables caching.
    #[serde(default = "default_activity_ttl")]
    pub activity_ttl_secs: u64,
}

fn default_activity_ttl() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            activity_ttl_secs: default_activity_ttl(),
        }
    }
}

// =============================================================================
// Limits
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Maximum cart entries a single checkout may produce.
    #[serde(default = "default_max_cart_entries")]
    pub max_cart_entries: usize,
}

fn default_max_cart_entries() -> usize {
    MAX_CART_ENTRIES
}

impl Default for LimitSettings {
    fn default() -> Self {
        LimitSettings {
            max_cart_entries: default_max_cart_entries(),
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub limits: LimitSettings,
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.pricing.placeholder_price <= 0 {
            return Err(CheckoutError::InvalidConfig(
                "placeholder_price must be greater than 0".into(),
            ));
        }

        if self.pricing.default_delivery_fee < 0 {
            return Err(CheckoutError::InvalidConfig(
                "default_delivery_fee cannot be negative".into(),
            ));
        }

        let code = &self.pricing.currency_code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CheckoutError::InvalidConfig(format!(
                "currency_code must be three uppercase letters, got: {}",
                code
            )));
        }

        if self.limits.max_cart_entries == 0 {
            return Err(CheckoutError::InvalidConfig(
                "max_cart_entries must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `DISHDASH_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(price) = lookup("DISHDASH_PLACEHOLDER_PRICE") {
            match price.parse::<i64>() {
                Ok(p) => self.pricing.placeholder_price = p,
                Err(_) => warn!(value = %price, "Ignoring invalid DISHDASH_PLACEHOLDER_PRICE"),
            }
        }

        if let Some(code) = lookup("DISHDASH_CURRENCY") {
            self.pricing.currency_code = code.trim().to_uppercase();
        }

        if let Some(policy) = lookup("DISHDASH_USAGE_LIMIT_ZERO") {
            match policy.trim().to_lowercase().as_str() {
                "unlimited" | "zero_is_unlimited" => {
                    self.pricing.usage_limit_zero = UsageLimitPolicy::ZeroIsUnlimited
                }
                "exhausted" | "zero_is_exhausted" => {
                    self.pricing.usage_limit_zero = UsageLimitPolicy::ZeroIsExhausted
                }
                _ => warn!(value = %policy, "Unknown usage limit policy in environment"),
            }
            debug!(policy = ?self.pricing.usage_limit_zero, "Usage limit policy from environment");
        }

        if let Some(fee) = lookup("DISHDASH_DELIVERY_FEE") {
            match fee.parse::<i64>() {
                Ok(f) => self.pricing.default_delivery_fee = f,
                Err(_) => warn!(value = %fee, "Ignoring invalid DISHDASH_DELIVERY_FEE"),
            }
        }

        if let Some(ttl) = lookup("DISHDASH_ACTIVITY_TTL_SECS") {
            if let Ok(t) = ttl.parse::<u64>() {
                debug!(ttl_secs = t, "Overriding activity TTL from environment");
                self.cache.activity_ttl_secs = t;
            }
        }

        if let Some(max) = lookup("DISHDASH_MAX_CART_ENTRIES") {
            if let Ok(m) = max.parse::<usize>() {
                self.limits.max_cart_entries = m;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "dishdash", "dishdash")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn placeholder_price(&self) -> Money {
        Money::from_cents(self.pricing.placeholder_price)
    }

    pub fn default_delivery_fee(&self) -> Money {
        Money::from_cents(self.pricing.default_delivery_fee)
    }

    pub fn usage_limit_policy(&self) -> UsageLimitPolicy {
        self.pricing.usage_limit_zero
    }

    /// Activity cache TTL. Values beyond chrono's range saturate.
    pub fn activity_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.cache.activity_ttl_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }

    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            placeholder_price: self.placeholder_price(),
            max_cart_entries: self.limits.max_cart_entries,
        }
    }
}
