use core::fmt::Debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::config::Config;

pub trait Plot: Debug {
    /// Name of the plot, for identification
    fn name(&self) -> &'static str;
    /// The input files this plot reads, relative to the data path
    fn required_files(&self, config: &Config) -> Vec<PathBuf>;
    /// Plots the data
    ///
    /// Arguments:
    /// * `data_path` - The directory holding the timing files
    /// * `plot_path` - The directory the figures are written to
    /// * `config` - Parsed configuration
    ///
    /// Returns the files written.
    fn plot(&self, data_path: &Path, plot_path: &Path, config: &Config) -> Result<Vec<PathBuf>>;
}

pub fn ensure_plot_dirs(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        if !dir.exists() {
            fs::create_dir_all(dir).wrap_err(format!("Create plot dir {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Runs every plot in turn and collects the written files.
pub fn plot(
    plots: &[Box<dyn Plot>],
    data_path: &Path,
    plot_path: &Path,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    if plots.is_empty() {
        debug!("No plots");
        return Ok(Vec::new());
    }

    ensure_plot_dirs(&[plot_path.to_path_buf()])?;
    let mut written = Vec::new();
    for plot in plots {
        debug!("Running plot {}", plot.name());
        written.extend(
            plot.plot(data_path, plot_path, config)
                .wrap_err(format!("Plot {}", plot.name()))?,
        );
    }
    Ok(written)
}

/// Required files of every plot, without duplicates, in first-seen order.
pub fn required_files(plots: &[Box<dyn Plot>], config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for file in plots.iter().flat_map(|p| p.required_files(config)) {
        if !files.contains(&file) {
            files.push(file);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Touch(&'static str);

    impl Plot for Touch {
        fn name(&self) -> &'static str {
            self.0
        }

        fn required_files(&self, _config: &Config) -> Vec<PathBuf> {
            vec![PathBuf::from("shared.time"), PathBuf::from(format!("{}.time", self.0))]
        }

        fn plot(&self, _data: &Path, plot_path: &Path, _config: &Config) -> Result<Vec<PathBuf>> {
            let out = plot_path.join(format!("{}.out", self.0));
            fs::write(&out, "x")?;
            Ok(vec![out])
        }
    }

    #[test]
    fn runs_plots_into_created_dir() {
        let dir = tempfile::tempdir().unwrap();
        let plot_path = dir.path().join("nested").join("plots");
        let plots: Vec<Box<dyn Plot>> = vec![Box::new(Touch("a")), Box::new(Touch("b"))];

        let written = plot(&plots, dir.path(), &plot_path, &Config::default()).unwrap();
        assert_eq!(written, vec![plot_path.join("a.out"), plot_path.join("b.out")]);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn merges_required_files() {
        let plots: Vec<Box<dyn Plot>> = vec![Box::new(Touch("a")), Box::new(Touch("b"))];
        assert_eq!(
            required_files(&plots, &Config::default()),
            vec![
                PathBuf::from("shared.time"),
                PathBuf::from("a.time"),
                PathBuf::from("b.time")
            ]
        );
    }
}
