use std::path::Path;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::ledger;
use crate::settings::load_settings;

pub fn run(db_path: &Path) -> Result<()> {
    let settings = load_settings();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Log level:  {}", settings.log_level);

    if db_path.exists() {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        println!();
        println!("Transactions:  {}", ledger::count(&conn)?);
    } else {
        println!();
        println!("Database not found. Run `budgetbook init` to set up.");
    }

    Ok(())
}
