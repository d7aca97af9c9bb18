use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("input file {} does not exist", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("header row invalid: {message}")]
    InvalidHeader { message: String },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("data row {line_index} invalid: {message}")]
    DataRow { line_index: usize, message: String },

    #[error("delimiter {0:?} is not an ASCII character")]
    InvalidDelimiter(char),

    #[error("failed to build trip table: {message}")]
    Frame { message: String },
}
