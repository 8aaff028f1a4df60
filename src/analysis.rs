// =============================================================================
// Analyzer: one analysis request from asset name to advice
// =============================================================================
//
// resolve asset -> fetch daily prices -> indicator pipeline -> advice
//
// Every request gets its own id and its own output. Nothing is cached or
// shared between requests apart from the immutable pipeline config and the
// market-data source.
// =============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::advice::{derive_advice, Advice};
use crate::error::{AdviserError, Result};
use crate::market_data::{resolve_asset, Asset, MarketDataSource};
use crate::pipeline::{IndicatorPipeline, PipelineConfig};
use crate::types::{IndicatorRow, PriceSeries};

/// Everything produced by one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub asset: Asset,
    pub days: u32,
    pub generated_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub rows: Vec<IndicatorRow>,
    pub advice: Vec<Advice>,
}

impl AnalysisReport {
    /// Rows paired with their advice, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = (&IndicatorRow, &Advice)> {
        self.rows.iter().zip(self.advice.iter())
    }

    /// Advice for the most recent day.
    pub fn latest(&self) -> Option<(&IndicatorRow, &Advice)> {
        self.entries().last()
    }

    /// Number of buy and sell transitions in the report.
    pub fn action_count(&self) -> usize {
        self.advice.iter().filter(|a| a.is_action()).count()
    }
}

pub struct Analyzer {
    source: Arc<dyn MarketDataSource>,
    pipeline: IndicatorPipeline,
}

impl Analyzer {
    pub fn new(source: Arc<dyn MarketDataSource>, config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            source,
            pipeline: IndicatorPipeline::new(config)?,
        })
    }

    /// Resolve `asset_name`, fetch `days` of history and analyse it.
    #[instrument(skip(self), name = "analyzer::analyze")]
    pub async fn analyze(&self, asset_name: &str, days: u32) -> Result<AnalysisReport> {
        let asset = resolve_asset(asset_name)?;
        if days == 0 {
            return Err(AdviserError::invalid_input("lookback must be at least 1 day"));
        }

        let series = self.source.fetch_daily_prices(&asset, days).await?;
        debug!(
            samples = series.len(),
            last_day = %series.last().day(),
            last_price = series.last().price,
            "price history fetched"
        );
        Ok(self.analyze_series(asset, days, &series))
    }

    /// Run the pipeline over an already-fetched series.
    pub fn analyze_series(&self, asset: Asset, days: u32, series: &PriceSeries) -> AnalysisReport {
        let rows = self.pipeline.run(series);
        let advice = derive_advice(&rows, self.pipeline.rsi_bounds());

        let report = AnalysisReport {
            request_id: Uuid::new_v4(),
            asset,
            days,
            generated_at: Utc::now(),
            config: self.pipeline.config().clone(),
            rows,
            advice,
        };

        info!(
            request_id = %report.request_id,
            asset = %report.asset,
            days,
            rows = report.rows.len(),
            actions = report.action_count(),
            policy = %report.config.policy,
            "analysis complete"
        );

        report
    }
}
