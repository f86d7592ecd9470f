//! Ecosystem configuration
//!
//! Everything genesis needs in one serde tree, loadable from TOML.
//! Every section defaults to the launch parameters, so `Default` alone
//! produces a working deployment.

use crate::registry::CollaboratorRegistry;
use arbor_core::constants::ONE_ARBR;
use arbor_core::{Amount, ArborError, Result};
use arbor_farm::farm::DEFAULT_REWARDS_DURATION;
use arbor_ledger::{TaxConfig, UnroutedShare};
use arbor_license::ActivationSplit;
use serde::{Deserialize, Serialize};

/// Token section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Display name
    #[serde(default = "default_token_name")]
    pub name: String,

    /// Ticker symbol (also keys the token book)
    #[serde(default = "default_token_symbol")]
    pub symbol: String,

    /// Supply minted to the owner at genesis, in whole tokens
    /// (TOML integers cap at 64 bits; base units are derived)
    #[serde(default = "default_genesis_supply")]
    pub genesis_supply: u64,

    /// Transfer-tax channels
    #[serde(default)]
    pub tax: TaxConfig,

    /// Routing policy for shares with no configured recipient
    #[serde(default)]
    pub unrouted: UnroutedShare,
}

impl TokenSettings {
    /// Genesis supply in base units
    pub fn genesis_supply_units(&self) -> Amount {
        self.genesis_supply as Amount * ONE_ARBR
    }
}

fn default_token_name() -> String {
    arbor_core::constants::TOKEN_NAME.to_string()
}

fn default_token_symbol() -> String {
    arbor_core::constants::TOKEN_SYMBOL.to_string()
}

fn default_genesis_supply() -> u64 {
    1_000_000_000
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            name: default_token_name(),
            symbol: default_token_symbol(),
            genesis_supply: default_genesis_supply(),
            tax: TaxConfig::default(),
            unrouted: UnroutedShare::default(),
        }
    }
}

/// Collateral asset symbols
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "default_stable_symbol")]
    pub stable_symbol: String,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_lp_symbol")]
    pub lp_symbol: String,
}

fn default_stable_symbol() -> String {
    "AUSD".to_string()
}

fn default_native_symbol() -> String {
    "NATIVE".to_string()
}

fn default_lp_symbol() -> String {
    "ARBR-AUSD-LP".to_string()
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            stable_symbol: default_stable_symbol(),
            native_symbol: default_native_symbol(),
            lp_symbol: default_lp_symbol(),
        }
    }
}

/// Farm section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FarmSettings {
    /// Reward period length in seconds
    #[serde(default = "default_rewards_duration")]
    pub rewards_duration: u64,
}

fn default_rewards_duration() -> u64 {
    DEFAULT_REWARDS_DURATION
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            rewards_duration: default_rewards_duration(),
        }
    }
}

/// License section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LicenseSettings {
    /// Activation fee split; the remainder backs the treasury
    #[serde(default)]
    pub split: ActivationSplit,

    /// LP fraction withheld on liquidation (bps)
    #[serde(default = "default_liquidation_penalty")]
    pub liquidation_penalty_bps: u16,

    /// Flat extension fee in native coin base units
    #[serde(default = "default_extension_fee")]
    pub extension_fee: u64,
}

impl LicenseSettings {
    /// Extension fee as an [`Amount`]
    pub fn extension_fee_units(&self) -> Amount {
        self.extension_fee as Amount
    }
}

fn default_liquidation_penalty() -> u16 {
    1_000
}

fn default_extension_fee() -> u64 {
    10_000_000_000_000_000 // 0.01 native coin
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            split: ActivationSplit::default(),
            liquidation_penalty_bps: default_liquidation_penalty(),
            extension_fee: default_extension_fee(),
        }
    }
}

/// Complete ecosystem configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EcosystemConfig {
    #[serde(default)]
    pub token: TokenSettings,

    #[serde(default)]
    pub assets: AssetSettings,

    #[serde(default)]
    pub accounts: CollaboratorRegistry,

    #[serde(default)]
    pub farm: FarmSettings,

    #[serde(default)]
    pub license: LicenseSettings,
}

impl EcosystemConfig {
    /// Parse a TOML configuration file
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ArborError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation
    pub fn validate(&self) -> Result<()> {
        self.accounts.validate()?;
        self.token.tax.validate()?;
        self.license.split.validate()?;
        if self.farm.rewards_duration == 0 {
            return Err(ArborError::Config("farm.rewards_duration is zero".into()));
        }
        if self.token.genesis_supply == 0 {
            return Err(ArborError::Config("token.genesis_supply is zero".into()));
        }
        Ok(())
    }
}
