pub mod config;
pub mod error;
pub mod plot;
pub mod series;
pub mod style;
pub mod timing;

/// Number of spectra searched per benchmark run, used to normalize runtimes.
pub const DEFAULT_NUM_SPECTRA: f64 = 100.0;
