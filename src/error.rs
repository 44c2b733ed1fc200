use thiserror::Error;

/// Failures of the load, clean, and save steps
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("no column contains {needle:?}; columns: {columns:?}")]
    ColumnNotFound { needle: String, columns: Vec<String> },
    #[error("could not detect the {what} column; columns: {columns:?}")]
    ColumnNotDetected {
        what: &'static str,
        columns: Vec<String>,
    },
    #[error("not enough valid samples to plot: found {found}, need at least {needed}")]
    NotEnoughSamples { found: usize, needed: usize },
    #[error("invalid start time {0:?}, expected HH:MM")]
    InvalidStartTime(String),
    #[error("invalid value {value:?} for --{arg}")]
    InvalidArgument { arg: &'static str, value: String },
    #[error("unsupported image format {0:?}, use png, jpg, bmp or svg")]
    UnsupportedFormat(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
