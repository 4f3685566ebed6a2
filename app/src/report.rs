use std::io::Write;

use clap::ValueEnum;
use common::series::Series;
use eyre::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    series: &'a str,
    label: &'a str,
    window: f64,
    seconds_per_spectrum: f64,
}

fn rows(series: &[Series]) -> impl Iterator<Item = Row<'_>> {
    series.iter().flat_map(|s| {
        s.points.iter().map(move |&(window, seconds)| Row {
            series: &s.name,
            label: &s.label,
            window,
            seconds_per_spectrum: seconds,
        })
    })
}

pub fn write_summary<W: Write>(series: &[Series], format: SummaryFormat, mut out: W) -> Result<()> {
    match format {
        SummaryFormat::Table => {
            let name_width = series
                .iter()
                .map(|s| s.name.len())
                .max()
                .unwrap_or(0)
                .max("series".len());
            writeln!(out, "{:<name_width$}  {:>8}  {:>12}", "series", "window", "s/spectrum")?;
            for row in rows(series) {
                writeln!(
                    out,
                    "{:<name_width$}  {:>8}  {:>12.6}",
                    row.series, row.window, row.seconds_per_spectrum
                )?;
            }
        }
        SummaryFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in rows(series) {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        SummaryFormat::Json => {
            serde_json::to_writer_pretty(&mut out, series)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
