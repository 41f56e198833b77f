mod chart;
mod cli;
mod db;
mod error;
mod filter;
mod fmt;
mod form;
mod grid;
mod ledger;
mod logging;
mod models;
mod settings;
mod taxonomy;
mod tui;

use std::path::Path;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    let db_path = settings::resolve_db_path(cli.db.as_deref(), &settings);

    let log_dir = db_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    logging::init(log_dir, &settings.log_level);

    let result = match cli.command {
        None => cli::dashboard::run(&db_path),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Add {
            value,
            date,
            kind,
            supplier,
            funds,
            category,
            subcategory,
            subsubcategory,
        }) => cli::add::run(
            &db_path,
            cli::add::AddArgs {
                value,
                date,
                kind: kind.into(),
                supplier,
                funds,
                category,
                subcategory,
                subsubcategory,
            },
        ),
        Some(Commands::List { filters }) => cli::list::run(&db_path, &filters),
        Some(Commands::Delete { position }) => cli::delete::run(&db_path, position),
        Some(Commands::Export { file, filters }) => cli::export::run(&db_path, &file, &filters),
        Some(Commands::Status) => cli::status::run(&db_path),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
