use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use regex::Regex;
use tracing::debug;

use crate::error::{MalformedLine, TimingError};

/// Wall clock duration taken from a `real` line of `time` output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRecord {
    pub minutes: f64,
    pub seconds: f64,
}

impl TimingRecord {
    pub fn total_seconds(&self) -> f64 {
        self.seconds + 60.0 * self.minutes
    }

    /// Runtime per unit of work, ie. seconds per spectrum.
    pub fn normalized(&self, units: f64) -> f64 {
        self.total_seconds() / units
    }
}

/// Timing files are named `<window>.<name>.time`.
pub fn timing_file_name(window: &str, name: &str) -> String {
    format!("{window}.{name}.time")
}

pub fn timing_file_path(data_path: &Path, window: &str, name: &str) -> PathBuf {
    data_path.join(timing_file_name(window, name))
}

#[derive(Debug, Clone)]
pub struct TimeParser {
    real: Regex,
}

impl TimeParser {
    pub fn new() -> Result<Self, TimingError> {
        Ok(Self {
            real: Regex::new(r"^real\s+([0-9]*\.?[0-9]+)m([0-9]*\.?[0-9]+)s")?,
        })
    }

    /// Returns `Ok(None)` for lines that do not start with `real`.
    pub fn parse_line(&self, line: &str) -> Result<Option<TimingRecord>, MalformedLine> {
        if !line.starts_with("real") {
            return Ok(None);
        }
        let malformed = || MalformedLine(line.to_owned());
        let caps = self.real.captures(line).ok_or_else(malformed)?;
        let minutes = caps[1].parse::<f64>().map_err(|_| malformed())?;
        let seconds = caps[2].parse::<f64>().map_err(|_| malformed())?;
        Ok(Some(TimingRecord { minutes, seconds }))
    }

    /// Every `real` record of a timing file, in line order.
    pub fn read_file(&self, path: &Path) -> Result<Vec<TimingRecord>, TimingError> {
        let file = File::open(path).map_err(|source| TimingError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| TimingError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            match self.parse_line(&line) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(MalformedLine(line)) => {
                    return Err(TimingError::MalformedReal {
                        path: path.to_path_buf(),
                        line_no: idx + 1,
                        line,
                    });
                }
            }
        }
        debug!("Read {} real records from {}", records.len(), path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn parse(line: &str) -> Result<Option<TimingRecord>, MalformedLine> {
        TimeParser::new().unwrap().parse_line(line)
    }

    #[test]
    fn parses_seconds_only() {
        let record = parse("real  0m1.500s").unwrap().unwrap();
        assert_eq!(record.total_seconds(), 1.5);
    }

    #[test]
    fn parses_minutes() {
        let record = parse("real  1m2.000s").unwrap().unwrap();
        assert_eq!(record.total_seconds(), 62.0);
    }

    #[test]
    fn parses_tab_separated_time_output() {
        let record = parse("real\t12m3.25s").unwrap().unwrap();
        assert_eq!(record.minutes, 12.0);
        assert_eq!(record.seconds, 3.25);
        assert_eq!(record.total_seconds(), 723.25);
    }

    #[test]
    fn normalizes_by_units() {
        let record = parse("real  1m23.450s").unwrap().unwrap();
        assert_eq!(record.normalized(100.0), (23.45 + 60.0) / 100.0);
    }

    #[test]
    fn ignores_other_lines() {
        assert_eq!(parse("user\t0m1.200s"), Ok(None));
        assert_eq!(parse("sys\t0m0.010s"), Ok(None));
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("  real 0m1.0s"), Ok(None));
    }

    #[test]
    fn rejects_malformed_real_line() {
        assert_eq!(
            parse("real 1.5"),
            Err(MalformedLine("real 1.5".to_owned()))
        );
        assert!(parse("real").is_err());
        assert!(parse("realtime 0m1s").is_err());
    }

    #[test]
    fn reads_every_real_line_of_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.crux.time");
        fs::write(
            &path,
            "searching\nreal\t0m2.000s\nuser\t0m1.900s\nsys\t0m0.100s\nreal\t0m4.000s\n",
        )
        .unwrap();

        let records = TimeParser::new().unwrap().read_file(&path).unwrap();
        let totals = records.iter().map(|r| r.total_seconds()).collect::<Vec<_>>();
        assert_eq!(totals, vec![2.0, 4.0]);
    }

    #[test]
    fn reports_line_of_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3.sequest.time");
        fs::write(&path, "user 0m1.0s\nreal garbage\n").unwrap();

        let err = TimeParser::new().unwrap().read_file(&path).unwrap_err();
        match err {
            TimingError::MalformedReal { line_no, line, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(line, "real garbage");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TimeParser::new()
            .unwrap()
            .read_file(&dir.path().join("0.1.crux.time"))
            .unwrap_err();
        assert!(matches!(err, TimingError::Open { .. }));
    }

    #[test]
    fn builds_file_names_from_window_and_name() {
        assert_eq!(timing_file_name("0.1", "crux.no"), "0.1.crux.no.time");
        assert_eq!(
            timing_file_path(Path::new("runs"), "3", "sequest"),
            Path::new("runs").join("3.sequest.time")
        );
    }
}
