use std::path::{Path, PathBuf};

use common::{
    config::Config,
    plot::Plot,
    series::collect_series,
    timing::timing_file_name,
};
use eyre::{Result, WrapErr};
use plot_common::render_loglog;
use tracing::{debug, info, warn};

/// Runtime per spectrum against mass window, one line per search engine
/// configuration.
#[derive(Debug, Default, Clone)]
pub struct IndexingWindows;

impl Plot for IndexingWindows {
    fn name(&self) -> &'static str {
        "indexing-windows"
    }

    fn required_files(&self, config: &Config) -> Vec<PathBuf> {
        config
            .series
            .iter()
            .flat_map(|series| {
                config
                    .settings
                    .windows
                    .iter()
                    .map(|window| PathBuf::from(timing_file_name(window, &series.name)))
            })
            .collect()
    }

    fn plot(&self, data_path: &Path, plot_path: &Path, config: &Config) -> Result<Vec<PathBuf>> {
        let series = collect_series(data_path, config)
            .wrap_err(format!("Load timings from {}", data_path.display()))?;
        if series.iter().all(|s| s.points.is_empty()) {
            warn!("No timing data found in {}, plotting empty axes", data_path.display());
        }
        debug!("Loaded {} series", series.len());

        let mut written = Vec::with_capacity(config.settings.outputs.len());
        for output in &config.settings.outputs {
            let path = render_loglog(&plot_path.join(output), &series, &config.chart)
                .wrap_err(format!("Render {output}"))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
