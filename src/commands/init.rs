use crate::args::InitArgs;
use crate::commands::Out;
use crate::model::DateOrder;
use crate::{Config, Result, SourceConfig};
use anyhow::{bail, Context};
use std::path::Path;

/// Creates the data directory and an initial `config.json` file pointing at the Google sheet or
/// CSV file given in `args`.
///
/// # Arguments
/// - `cashflow_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/cashflow`
/// - `args` - Where the transactions are and how to read their dates.
///
/// # Errors
/// - Returns an error if neither a sheet URL nor a CSV file is given.
/// - Returns an error if any file operations fail.
pub async fn init(cashflow_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let source = match (args.sheet_url(), args.csv()) {
        (Some(url), None) => SourceConfig::GoogleSheet {
            sheet_url: url.to_string(),
            sheet_name: args.sheet_name().map(str::to_string),
        },
        (None, Some(path)) => SourceConfig::Csv {
            path: path.to_path_buf(),
        },
        _ => bail!("Provide either --sheet-url or --csv"),
    };
    let date_order = if args.month_first() {
        DateOrder::MonthFirst
    } else {
        DateOrder::DayFirst
    };

    let config = Config::create(cashflow_home, source, date_order)
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Successfully created the cashflow config at {}",
        config.config_path().display()
    )
    .into())
}
