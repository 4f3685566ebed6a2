use std::{io, num::ParseFloatError, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimingError {
    #[error("Could not open timing file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not read timing file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed real time at {}:{line_no}: {line:?}", path.display())]
    MalformedReal {
        path: PathBuf,
        line_no: usize,
        line: String,
    },
    #[error("No real time found in {}", path.display())]
    NoRealLine { path: PathBuf },
    #[error("Invalid window label {window:?}")]
    InvalidWindow {
        window: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("Compile real time pattern")]
    Pattern(#[from] regex::Error),
}

/// A `real` line that does not hold a `<minutes>m<seconds>s` duration.
#[derive(Debug, Error, PartialEq)]
#[error("expected <minutes>m<seconds>s in {0:?}")]
pub struct MalformedLine(pub String);

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("Unrecognized character {found:?} in style {style:?}")]
    Unrecognized { style: String, found: char },
    #[error("Style {style:?} sets more than one {what}")]
    Duplicate { style: String, what: &'static str },
}
