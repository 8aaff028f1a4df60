// =============================================================================
// Supported assets: display name to CoinGecko coin id
// =============================================================================

use serde::Serialize;

use crate::error::{AdviserError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    /// Name the user types.
    pub name: &'static str,
    /// CoinGecko coin id used in API paths and listing URLs.
    pub id: &'static str,
}

pub const SUPPORTED_ASSETS: &[Asset] = &[
    Asset { name: "bitcoin", id: "bitcoin" },
    Asset { name: "ethereum", id: "ethereum" },
    Asset { name: "ripple", id: "ripple" },
    Asset { name: "litecoin", id: "litecoin" },
    Asset { name: "cardano", id: "cardano" },
    Asset { name: "polkadot", id: "polkadot" },
    Asset { name: "binancecoin", id: "binancecoin" },
    Asset { name: "dogecoin", id: "dogecoin" },
    Asset { name: "solana", id: "solana" },
    Asset { name: "chainlink", id: "chainlink" },
];

impl Asset {
    /// Name with a leading capital, for headers and chart titles.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Look up a supported asset by name, ignoring case and surrounding space.
pub fn resolve_asset(name: &str) -> Result<Asset> {
    let wanted = name.trim().to_lowercase();
    SUPPORTED_ASSETS
        .iter()
        .copied()
        .find(|a| a.name == wanted)
        .ok_or_else(|| {
            AdviserError::invalid_input(format!(
                "unknown asset '{}' (supported: {})",
                name.trim(),
                SUPPORTED_ASSETS
                    .iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}
