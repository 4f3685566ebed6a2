use std::path::PathBuf;

pub mod chart;
pub mod eps;
pub mod glyph;

pub use chart::{OutputFormat, render_loglog};

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("Unsupported output format for {}, expected eps, ps, svg, png, bmp or jpg", .0.display())]
    UnsupportedFormat(PathBuf),
}
