pub mod assets;
pub mod coingecko;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::PriceSeries;

pub use assets::{resolve_asset, Asset, SUPPORTED_ASSETS};
pub use coingecko::CoinGeckoClient;

/// Anything that can supply a daily price history for an asset.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch `days` of daily USD prices for `asset`, oldest first.
    async fn fetch_daily_prices(&self, asset: &Asset, days: u32) -> Result<PriceSeries>;
}
