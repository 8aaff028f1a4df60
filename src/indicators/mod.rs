// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator primitives. Every function returns a
// vector aligned index-for-index with its input; windowed indicators yield
// `None` through their warm-up rows so callers must handle short histories.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
