//! Data sources. Each one produces a `RawTable` whose header has been checked, leaving date and
//! amount validation to the pipeline.

mod csv_file;
mod inline;
mod sheet;
mod test_source;

use crate::model::RawTable;
use crate::{Config, Result, SourceConfig};
use serde::{Deserialize, Serialize};

pub(crate) use csv_file::CsvFileSource;
pub(crate) use inline::InlineSource;
pub(crate) use sheet::GoogleSheetSource;
pub(crate) use test_source::TestSource;

/// When this environment variable is set to a non-empty value, every command reads the seeded
/// test data instead of the configured source.
pub const TEST_MODE_ENV: &str = "CASHFLOW_IN_TEST_MODE";

/// Whether the configured source or the built-in test data is used.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Live,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.trim().is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// Something that can produce the transaction table.
#[async_trait::async_trait]
pub(crate) trait Source: Send {
    /// A short, human-readable description used in log messages.
    fn describe(&self) -> String;

    /// Reads the whole table.
    ///
    /// # Errors
    /// - The source cannot be reached or read.
    /// - The data is not valid CSV, a required column is missing, or a row is longer than the
    ///   header row.
    async fn fetch(&mut self) -> Result<RawTable>;
}

/// Creates the source described by `config`, or the test source when `mode` is `Mode::Test`.
pub(crate) fn source(config: &Config, mode: Mode) -> Result<Box<dyn Source>> {
    if mode == Mode::Test {
        return Ok(Box::new(TestSource::default()));
    }
    let source: Box<dyn Source> = match config.source() {
        SourceConfig::GoogleSheet { sheet_name, .. } => {
            let id = config
                .spreadsheet_id()
                .ok_or_else(|| anyhow::anyhow!("No spreadsheet ID in the configuration"))?;
            Box::new(GoogleSheetSource::new(id, sheet_name.as_deref())?)
        }
        SourceConfig::Csv { path } => Box::new(CsvFileSource::new(config.resolve_path(path))),
        SourceConfig::Inline { rows } => Box::new(InlineSource::new(rows.clone())),
    };
    Ok(source)
}
