//! These structs provide the CLI interface for the cashflow CLI.

use crate::pipeline::TypeFilter;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// cashflow: A command-line dashboard for household cash flow.
///
/// The purpose of this program is to read your transactions from a Google sheet, a CSV file or
/// the configuration file itself, filter them by date range and type, and summarize them by
/// category and type.
///
/// The sheet needs four columns: date, category, type and amount. Portuguese headers (data,
/// categoria, tipo, valor) are understood too. A Google sheet must be shared with "Anyone with
/// the link" since no credentials are used.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Pass either the URL of your Google sheet with
    /// --sheet-url, or the path to a CSV file with --csv. By default the configuration lives in
    /// $HOME/cashflow, use --cashflow-home to put it somewhere else.
    Init(InitArgs),
    /// List the transaction types that can be passed to `report --type`.
    Types,
    /// List the months that have transactions.
    Periods,
    /// Filter the transactions and print the totals by category and type.
    Report(ReportArgs),
    /// Print the investment holdings listed in the configuration file and their yield by date.
    Investments(InvestmentsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter documentation.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the cashflow configuration is held. Defaults to ~/cashflow
    #[arg(long, env = "CASHFLOW_HOME", default_value_t = default_cashflow_home())]
    cashflow_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cashflow_home: PathBuf) -> Self {
        Self {
            log_level,
            cashflow_home: cashflow_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashflow_home(&self) -> &DisplayPath {
        &self.cashflow_home
    }
}

/// (Not shown): Args for the `cashflow init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
    sheet_url: Option<String>,

    /// The tab of the Google sheet to read. The first tab is read if this is not given.
    #[arg(long, requires = "sheet_url")]
    sheet_name: Option<String>,

    /// The path to a CSV file holding your transactions.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Read dates like 03/02/2025 as March 2nd instead of February 3rd.
    #[arg(long)]
    month_first: bool,
}

impl InitArgs {
    pub fn new(
        sheet_url: Option<String>,
        sheet_name: Option<String>,
        csv: Option<PathBuf>,
        month_first: bool,
    ) -> Self {
        Self {
            sheet_url,
            sheet_name,
            csv,
            month_first,
        }
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }

    pub fn month_first(&self) -> bool {
        self.month_first
    }
}

/// The format of the `report` and `investments` output.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Markdown tables.
    #[default]
    Table,
    /// The whole report as JSON.
    Json,
    /// One CSV line per category and type, or per holding.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `cashflow report` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    /// The first date to include, e.g. 01/03/2025, 2025-03-01 or 03/2025. Defaults to the date of
    /// the earliest transaction.
    #[arg(long, conflicts_with = "month")]
    from: Option<String>,

    /// The last date to include. A month like 03/2025 includes the whole month. Defaults to the
    /// date of the latest transaction.
    #[arg(long, conflicts_with = "month")]
    to: Option<String>,

    /// Report a single month, e.g. 03/2025.
    #[arg(long)]
    month: Option<String>,

    /// Only include transactions of this type. Use `both` for all types.
    #[arg(long = "type", default_value_t = TypeFilter::Both)]
    types: TypeFilter,

    /// The output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// With `--format csv`, write the filtered transactions instead of the totals by category and
    /// type.
    #[arg(long)]
    rows: bool,
}

impl ReportArgs {
    pub fn new(
        from: Option<String>,
        to: Option<String>,
        month: Option<String>,
        types: TypeFilter,
        format: OutputFormat,
    ) -> Self {
        Self {
            from,
            to,
            month,
            types,
            format,
            rows: false,
        }
    }

    /// Selects the transactions, rather than the totals, for CSV output.
    pub fn with_rows(mut self, rows: bool) -> Self {
        self.rows = rows;
        self
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn types(&self) -> &TypeFilter {
        &self.types
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn rows(&self) -> bool {
        self.rows
    }
}

/// (Not shown): Args for the `cashflow investments` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InvestmentsArgs {
    /// The output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl InvestmentsArgs {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_cashflow_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashflow"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashflow-home or CASHFLOW_HOME instead of relying on the \
                default cashflow home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("cashflow")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
