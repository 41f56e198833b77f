pub mod add;
pub mod dashboard;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::TransactionType;

#[derive(Parser)]
#[command(
    name = "budgetbook",
    about = "Personal budget ledger: entry form, searchable register and monthly chart."
)]
pub struct Cli {
    /// Database file to use instead of <data_dir>/budget.db
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Debit,
    Credit,
}

impl From<TypeArg> for TransactionType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Debit => TransactionType::Debit,
            TypeArg::Credit => TransactionType::Credit,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the database.
    Init {
        /// Directory for budget.db and the log file
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record a transaction without opening the interface.
    Add {
        /// Amount, without currency sign
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        /// Date (default: today, YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type", value_enum, default_value = "debit")]
        kind: TypeArg,
        #[arg(long, default_value = "")]
        supplier: String,
        #[arg(long, default_value = "Cash")]
        funds: String,
        /// Top-level category (credits always go to Income)
        #[arg(long, default_value = "General Expenses")]
        category: String,
        #[arg(long, default_value = "")]
        subcategory: String,
        #[arg(long, default_value = "N/A")]
        subsubcategory: String,
    },
    /// Print the register, newest first, with the signed total.
    List {
        /// Column filter COLUMN=TERM (case-insensitive substring); repeatable
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,
    },
    /// Delete the transaction at a position of the newest-first register.
    Delete {
        /// 1-based position as shown by `list`
        position: usize,
    },
    /// Write the (filtered) register to a CSV file.
    Export {
        /// Output CSV path
        file: PathBuf,
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,
    },
    /// Show the database location and row count.
    Status,
}
