use crate::field::Field;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template is missing the `{column}` column")]
    MissingColumn { column: &'static str },

    #[error("Template is missing the `{field}` row")]
    MissingField { field: Field },

    #[error("Invalid count for `{field}`: {value:?}")]
    InvalidCount { field: Field, value: String },

    #[error("Malformed exclusion reasons for `{field}`: {message}")]
    MalformedExclusions { field: Field, message: String },

    #[error("Template lists {count} tooltips; at most {max} are supported")]
    TooManyTooltips { count: usize, max: usize },

    #[error("Required count `{field}` is missing")]
    RequiredCountMissing { field: Field },

    #[error("Invalid option `{name}`: {message}")]
    InvalidOption { name: &'static str, message: String },

    #[error("Invalid config: {message}")]
    Config { message: String },
}
