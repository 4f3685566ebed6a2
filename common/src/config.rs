use std::{fs::read_to_string, path::Path};

use eyre::{Result, WrapErr, bail};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_NUM_SPECTRA, style::LineStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub name: String,
    pub settings: Settings,
    pub series: Vec<SeriesConfig>,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Window labels, used verbatim in file names and parsed for the x axis
    pub windows: Vec<String>,
    pub num_spectra: f64,
    /// Output files, the format follows the extension
    pub outputs: Vec<String>,
    /// Treat a timing file without a `real` line as an error
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesConfig {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub legend: LegendPosition,
    pub font_size: u32,
    /// Width and height, in pixels for raster output and points for EPS
    pub size: (u32, u32),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    UpperLeft,
    UpperMiddle,
    UpperRight,
    MiddleLeft,
    MiddleMiddle,
    MiddleRight,
    LowerLeft,
    LowerMiddle,
    #[default]
    LowerRight,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "indexing-yeast-windows".to_owned(),
            settings: Settings::default(),
            series: vec![
                SeriesConfig::new("crux", "Crux (w/ index)", "k--o"),
                SeriesConfig::new("crux.no", "Crux (w/o index)", "k-o"),
                SeriesConfig::new("sequest", "Sequest (w/ index)", "m--s"),
                SeriesConfig::new("sequest.no", "Sequest (w/o) index", "m-s"),
            ],
            chart: ChartConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            windows: vec!["0.1".to_owned(), "1".to_owned(), "3".to_owned()],
            num_spectra: DEFAULT_NUM_SPECTRA,
            outputs: vec![
                "indexing-yeast-windows.eps".to_owned(),
                "indexing-yeast-windows.png".to_owned(),
            ],
            strict: false,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            x_label: "Mass window (Da)".to_owned(),
            y_label: "Runtime per spectrum (s)".to_owned(),
            x_range: (0.05, 5.0),
            y_range: (0.001, 50.0),
            legend: LegendPosition::default(),
            font_size: 20,
            size: (800, 600),
        }
    }
}

impl SeriesConfig {
    pub fn new(name: &str, label: &str, style: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            style: style.to_owned(),
        }
    }
}

impl Config {
    /// Loads a config file, TOML when the extension says so and YAML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let data = read_to_string(path).wrap_err(format!("Read config {}", path.display()))?;
        let config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&data).wrap_err("Parse toml config")?,
            _ => serde_yml::from_str(&data).wrap_err("Parse yaml config")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let settings = &self.settings;
        if settings.windows.is_empty() {
            bail!("No windows configured");
        }
        if self.series.is_empty() {
            bail!("No series configured");
        }
        if settings.outputs.is_empty() {
            bail!("No outputs configured");
        }
        if !settings.num_spectra.is_finite() || settings.num_spectra <= 0.0 {
            bail!("num_spectra must be positive, got {}", settings.num_spectra);
        }
        for (axis, (lo, hi)) in [("x", self.chart.x_range), ("y", self.chart.y_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
                bail!("Invalid log {axis} range {lo}..{hi}");
            }
        }
        if self.chart.size.0 == 0 || self.chart.size.1 == 0 {
            bail!("Chart size must be non-zero");
        }
        for series in &self.series {
            series
                .style
                .parse::<LineStyle>()
                .wrap_err(format!("Style of series {}", series.name))?;
        }
        Ok(())
    }
}
