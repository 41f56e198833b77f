use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No database connection")]
    NoConnection,

    #[error("Invalid value: {0:?}")]
    InvalidValue(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid filter (expected COLUMN=TERM): {0}")]
    InvalidFilter(String),

    #[error("No transaction at position {0}")]
    NoSuchPosition(usize),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
