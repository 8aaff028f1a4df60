// =============================================================================
// Chart rendering: panel/series/annotation document
// =============================================================================
//
// The renderer does not draw pixels. It lays an analysis out as a chart
// document any plotting front-end can consume:
//
//   panel "price" : price, short/long moving averages, Bollinger Bands,
//                   buy/sell/wait annotations
//   panel "rsi"   : RSI with oversold / overbought guide lines
//   panel "macd"  : MACD and its signal line (optional)
//
// Documents are written as JSON using the same tmp + rename pattern as the
// config file so a reader never sees a half-written chart.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::advice::Advice;
use crate::analysis::AnalysisReport;
use crate::types::IndicatorRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideLine {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Buy,
    Sell,
    Wait,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub date: NaiveDate,
    pub price: f64,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub guides: Vec<GuideLine>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDocument {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub panels: Vec<Panel>,
}

impl ChartDocument {
    pub fn from_report(report: &AnalysisReport, show_macd: bool) -> Self {
        let dates: Vec<NaiveDate> = report.rows.iter().map(|r| r.day()).collect();
        let column = |f: fn(&IndicatorRow) -> Option<f64>| -> Vec<Option<f64>> {
            report.rows.iter().map(f).collect()
        };

        let annotations = report
            .entries()
            .filter_map(|(row, advice)| {
                let kind = match advice {
                    Advice::Buy { .. } => AnnotationKind::Buy,
                    Advice::Sell { .. } => AnnotationKind::Sell,
                    Advice::RsiLow { .. } | Advice::RsiHigh { .. } => AnnotationKind::Wait,
                    Advice::Wait { .. } => return None,
                };
                Some(Annotation {
                    date: row.day(),
                    price: row.price,
                    kind,
                })
            })
            .collect();

        let mut panels = vec![
            Panel {
                title: format!(
                    "{} price with moving averages and Bollinger Bands",
                    report.asset.display_name()
                ),
                y_label: "Price (USD)".to_string(),
                series: vec![
                    series("Price", "blue", column(|r| Some(r.price))),
                    series("Short moving average", "red", column(|r| r.short_mavg)),
                    series("Long moving average", "green", column(|r| r.long_mavg)),
                    series("Upper Bollinger Band", "orange", column(|r| r.upper_band)),
                    series("Middle Bollinger Band", "purple", column(|r| r.middle_band)),
                    series("Lower Bollinger Band", "orange", column(|r| r.lower_band)),
                ],
                guides: Vec::new(),
                annotations,
            },
            Panel {
                title: "Relative Strength Index (RSI)".to_string(),
                y_label: "RSI".to_string(),
                series: vec![series("RSI", "magenta", column(|r| r.rsi))],
                guides: vec![
                    GuideLine {
                        label: "oversold".to_string(),
                        value: report.config.rsi_oversold,
                    },
                    GuideLine {
                        label: "overbought".to_string(),
                        value: report.config.rsi_overbought,
                    },
                ],
                annotations: Vec::new(),
            },
        ];

        if show_macd {
            panels.push(Panel {
                title: "MACD".to_string(),
                y_label: "MACD".to_string(),
                series: vec![
                    series("MACD", "black", column(|r| Some(r.macd))),
                    series("Signal line", "red", column(|r| Some(r.macd_signal))),
                ],
                guides: vec![GuideLine {
                    label: "zero".to_string(),
                    value: 0.0,
                }],
                annotations: Vec::new(),
            });
        }

        Self {
            title: format!("{} ({} days)", report.asset.display_name(), report.days),
            dates,
            panels,
        }
    }
}

fn series(label: &str, color: &'static str, values: Vec<Option<f64>>) -> Series {
    Series {
        label: label.to_string(),
        color,
        values,
    }
}

pub trait Renderer {
    /// Render `report` and return where the output went.
    fn render(&self, report: &AnalysisReport) -> Result<PathBuf>;
}

/// Writes `<dir>/<asset>_<YYYYMMDD>.chart.json`.
pub struct JsonChartRenderer {
    dir: PathBuf,
    show_macd: bool,
}

impl JsonChartRenderer {
    pub fn new(dir: impl Into<PathBuf>, show_macd: bool) -> Self {
        Self {
            dir: dir.into(),
            show_macd,
        }
    }

    pub fn output_path(&self, report: &AnalysisReport) -> PathBuf {
        let stamp = report
            .latest()
            .map(|(row, _)| row.day())
            .unwrap_or_else(|| report.generated_at.date_naive());
        self.dir.join(format!(
            "{}_{}.chart.json",
            report.asset.id,
            stamp.format("%Y%m%d")
        ))
    }
}

impl Renderer for JsonChartRenderer {
    fn render(&self, report: &AnalysisReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create chart dir {}", self.dir.display()))?;

        let doc = ChartDocument::from_report(report, self.show_macd);
        let content =
            serde_json::to_string_pretty(&doc).context("failed to serialise chart document")?;

        let path = self.output_path(report);
        write_atomic(&path, &content)?;

        info!(
            path = %path.display(),
            panels = doc.panels.len(),
            request_id = %report.request_id,
            "chart written"
        );
        Ok(path)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write tmp chart to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename tmp chart to {}", path.display()))?;
    Ok(())
}
