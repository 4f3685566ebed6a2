use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::{Config, SeriesConfig},
    error::TimingError,
    timing::{TimeParser, timing_file_path},
};

/// One line of the chart: normalized runtime against window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub label: String,
    pub style: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(config: &SeriesConfig) -> Self {
        Self {
            name: config.name.clone(),
            label: config.label.clone(),
            style: config.style.clone(),
            points: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    #[cfg(test)]
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }
}

pub fn parse_window(window: &str) -> Result<f64, TimingError> {
    window
        .trim()
        .parse::<f64>()
        .map_err(|source| TimingError::InvalidWindow {
            window: window.to_owned(),
            source,
        })
}

/// Reads the timing files of every configured series, in window order.
pub fn collect_series(data_path: &Path, config: &Config) -> Result<Vec<Series>, TimingError> {
    let parser = TimeParser::new()?;
    let settings = &config.settings;
    let windows = settings
        .windows
        .iter()
        .map(|w| Ok((w.as_str(), parse_window(w)?)))
        .collect::<Result<Vec<_>, TimingError>>()?;

    let mut all = Vec::with_capacity(config.series.len());
    for series_config in &config.series {
        let mut series = Series::new(series_config);
        for &(label, window) in &windows {
            let path = timing_file_path(data_path, label, &series.name);
            let records = parser.read_file(&path)?;
            if records.is_empty() {
                if settings.strict {
                    return Err(TimingError::NoRealLine { path });
                }
                warn!("No real time in {}, skipping window {label}", path.display());
            }
            series.points.extend(
                records
                    .iter()
                    .map(|r| (window, r.normalized(settings.num_spectra))),
            );
        }
        debug!("Series {} has {} points", series.name, series.points.len());
        all.push(series);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_timing(dir: &TempDir, window: &str, name: &str, body: &str) {
        fs::write(dir.path().join(format!("{window}.{name}.time")), body).unwrap();
    }

    fn single_series_config(name: &str) -> Config {
        Config {
            series: vec![SeriesConfig::new(name, name, "k-o")],
            ..Config::default()
        }
    }

    #[test]
    fn one_point_per_window_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_timing(&dir, "0.1", "crux", "real\t0m1.500s\n");
        write_timing(&dir, "1", "crux", "real\t0m10.000s\n");
        write_timing(&dir, "3", "crux", "real\t1m2.000s\n");

        let series = collect_series(dir.path(), &single_series_config("crux")).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].xs(), vec![0.1, 1.0, 3.0]);
        assert_eq!(series[0].ys(), vec![1.5 / 100.0, 10.0 / 100.0, 62.0 / 100.0]);
    }

    #[test]
    fn file_without_real_line_adds_no_point() {
        let dir = tempfile::tempdir().unwrap();
        write_timing(&dir, "0.1", "crux", "real\t0m1.000s\n");
        write_timing(&dir, "1", "crux", "user\t0m1.000s\nsys\t0m0.000s\n");
        write_timing(&dir, "3", "crux", "real\t0m3.000s\n");

        let series = collect_series(dir.path(), &single_series_config("crux")).unwrap();
        assert_eq!(series[0].xs(), vec![0.1, 3.0]);
    }

    #[test]
    fn strict_mode_rejects_file_without_real_line() {
        let dir = tempfile::tempdir().unwrap();
        write_timing(&dir, "0.1", "crux", "real\t0m1.000s\n");
        write_timing(&dir, "1", "crux", "\n");
        write_timing(&dir, "3", "crux", "real\t0m3.000s\n");

        let mut config = single_series_config("crux");
        config.settings.strict = true;
        let err = collect_series(dir.path(), &config).unwrap_err();
        assert!(matches!(err, TimingError::NoRealLine { .. }));
    }

    #[test]
    fn missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write_timing(&dir, "0.1", "crux", "real\t0m1.000s\n");

        let err = collect_series(dir.path(), &single_series_config("crux")).unwrap_err();
        match err {
            TimingError::Open { path, .. } => assert!(path.ends_with("1.crux.time")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = single_series_config("crux");
        config.settings.windows = vec!["wide".to_owned()];
        let err = collect_series(dir.path(), &config).unwrap_err();
        assert!(matches!(err, TimingError::InvalidWindow { .. }));
    }

    #[test]
    fn collects_all_default_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        for series in &config.series {
            for window in &config.settings.windows {
                write_timing(&dir, window, &series.name, "real\t0m5.000s\n");
            }
        }

        let series = collect_series(dir.path(), &config).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series[3].label, "Sequest (w/o) index");
        for s in &series {
            assert_eq!(s.points.len(), config.settings.windows.len());
            assert!(s.ys().iter().all(|&y| y == 5.0 / 100.0));
        }
    }
}
