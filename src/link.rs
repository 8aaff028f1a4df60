// =============================================================================
// Marketplace link: open an asset's public listing page
// =============================================================================
//
// Opening the page is the whole "buy" action. No order is placed and no
// account is touched.
// =============================================================================

use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::market_data::Asset;

const LISTING_BASE_URL: &str = "https://www.coingecko.com/en/coins";

/// Public CoinGecko listing page for `asset`.
pub fn marketplace_url(asset: &Asset) -> String {
    format!("{LISTING_BASE_URL}/{}", asset.id)
}

pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Hands the URL to the desktop's default browser.
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let mut cmd = Self::command(url);
        let status = cmd
            .status()
            .with_context(|| format!("failed to launch browser for {url}"))?;
        if !status.success() {
            bail!("browser launcher exited with {status} for {url}");
        }
        info!(url, "marketplace page opened");
        Ok(())
    }
}

/// Prints the URL instead of launching anything (headless hosts, scripts).
pub struct PrintOnly;

impl LinkOpener for PrintOnly {
    fn open(&self, url: &str) -> Result<()> {
        println!("{url}");
        info!(url, "marketplace link printed");
        Ok(())
    }
}
