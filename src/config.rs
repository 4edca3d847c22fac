//! Configuration file handling.
//!
//! The configuration file is stored at `$CASHFLOW_HOME/config.json`. It says where transactions
//! come from (a Google sheet, a CSV file, or rows written directly into the file) and how
//! ambiguous dates should be read. It may also list investment holdings.

use crate::investments::Investment;
use crate::model::{Amount, DateOrder, DateValue, RawRow};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cashflow";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CASHFLOW_HOME` and from there it loads `$CASHFLOW_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: Option<String>,
}

impl Config {
    /// Creates the home directory, if needed, and writes an initial `config.json` to it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/cashflow`
    /// - `source` - Where transactions are read from.
    /// - `date_order` - How to read dates like `03/02/2025`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    /// - Returns an error if a Google sheet URL does not contain a spreadsheet ID.
    pub async fn create(
        dir: impl Into<PathBuf>,
        source: SourceConfig,
        date_order: DateOrder,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashflow home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let spreadsheet_id = source.spreadsheet_id()?;
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            date_order,
            source,
            investments: Vec::new(),
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that `home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The cashflow home directory is missing. Run 'cashflow init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let spreadsheet_id = config_file.source.spreadsheet_id()?;

        Ok(Self {
            root,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn source(&self) -> &SourceConfig {
        &self.config_file.source
    }

    pub fn date_order(&self) -> DateOrder {
        self.config_file.date_order
    }

    pub fn investments(&self) -> &[Investment] {
        &self.config_file.investments
    }

    /// The spreadsheet ID, if the source is a Google sheet.
    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    /// Returns `p` if it is absolute, otherwise resolves it against the home directory.
    pub fn resolve_path(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Where transactions come from.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A Google sheet shared by link. Read through its CSV export, so no credentials are needed.
    GoogleSheet {
        sheet_url: String,
        /// The tab to read. The first tab is read when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sheet_name: Option<String>,
    },
    /// A CSV file, relative to the home directory or absolute.
    Csv { path: PathBuf },
    /// Rows written directly into the config file.
    Inline { rows: Vec<InlineRow> },
}

impl SourceConfig {
    fn spreadsheet_id(&self) -> Result<Option<String>> {
        match self {
            SourceConfig::GoogleSheet { sheet_url, .. } => {
                let id = extract_spreadsheet_id(sheet_url)
                    .context("Failed to extract spreadsheet ID from sheet URL")?;
                Ok(Some(id.to_string()))
            }
            SourceConfig::Csv { .. } | SourceConfig::Inline { .. } => Ok(None),
        }
    }
}

/// A transaction written directly into the config file. `amount` may be a JSON number or text.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct InlineRow {
    pub date: DateValue,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Amount,
}

impl From<&InlineRow> for RawRow {
    fn from(row: &InlineRow) -> Self {
        RawRow::new(
            row.date.clone(),
            row.category.clone(),
            row.kind.clone(),
            row.amount,
        )
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashflow",
///   "config_version": 1,
///   "date_order": "day_first",
///   "source": {
///     "kind": "google_sheet",
///     "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///     "sheet_name": "Transações"
///   },
///   "investments": [
///     {
///       "institution": "Nubank",
///       "invested": "R$ 1.000,00",
///       "yield_date": "02/03/2025",
///       "yield_amount": "R$ 10,96",
///       "asset": "CDI",
///       "type": "Renda Fixa",
///       "rate": 13.15
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashflow"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// How to read dates like `03/02/2025`
    #[serde(default)]
    date_order: DateOrder,

    source: SourceConfig,

    /// Investment holdings, shown by `cashflow investments`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    investments: Vec<Investment>,
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or belongs to another application.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g., "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    // URL format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...
    // or: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID?foo=bar
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id_part = parts[i + 1];
            let id = id_part
                .split(['?', '#'])
                .next()
                .unwrap_or(id_part);
            if !id.is_empty() {
                return Ok(id);
            }
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    const SHEET_URL: &str =
        "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";

    fn sheet_source() -> SourceConfig {
        SourceConfig::GoogleSheet {
            sheet_url: SHEET_URL.to_string(),
            sheet_name: Some("Página1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("cashflow_home");

        let config = Config::create(&home_dir, sheet_source(), DateOrder::MonthFirst)
            .await
            .unwrap();
        assert_eq!(
            Some("7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"),
            config.spreadsheet_id()
        );
        assert!(config.config_path().is_file());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.source(), &sheet_source());
        assert_eq!(loaded.date_order(), DateOrder::MonthFirst);
        assert_eq!(loaded.root(), config.root());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("cashflow init"));
    }

    #[tokio::test]
    async fn test_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "tiller",
            "config_version": 1,
            "source": { "kind": "csv", "path": "data.csv" }
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_load_inline_rows_with_defaults() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "cashflow",
            "config_version": 1,
            "source": {
                "kind": "inline",
                "rows": [
                    { "date": "03/2025", "category": "Aluguel", "type": "Saída", "amount": 1200 },
                    {
                        "date": "2025-03-05",
                        "category": "Salário",
                        "type": "Entrada",
                        "amount": "R$ 3.500,00"
                    }
                ]
            }
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.date_order(), DateOrder::DayFirst);
        assert_eq!(config.spreadsheet_id(), None);
        let SourceConfig::Inline { rows } = config.source() else {
            panic!("expected inline rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, DateValue::Text("03/2025".into()));
        assert!(matches!(rows[1].date, DateValue::Date(_)));
        assert_eq!(rows[1].amount.value(), Decimal::from(3500));
        assert!(config.investments().is_empty());
    }

    #[tokio::test]
    async fn test_load_investments() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "cashflow",
            "config_version": 1,
            "source": { "kind": "csv", "path": "data.csv" },
            "investments": [
                {
                    "institution": "Nubank",
                    "invested": "R$ 1.000,00",
                    "yield_date": "02/03/2025",
                    "yield_amount": "R$ 10,96",
                    "asset": "CDI",
                    "type": "Renda Fixa",
                    "rate": 13.15
                }
            ]
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        let investments = config.investments();
        assert_eq!(investments.len(), 1);
        assert_eq!(investments[0].asset, "CDI");
        assert_eq!(investments[0].yield_amount.value(), Decimal::new(1096, 2));
        assert!(investments[0].rate.is_some());
    }

    #[tokio::test]
    async fn test_created_config_has_no_investments_key() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), sheet_source(), DateOrder::DayFirst)
            .await
            .unwrap();
        let text = std::fs::read_to_string(config.config_path()).unwrap();
        assert!(!text.contains("investments"));
    }

    #[tokio::test]
    async fn test_bad_sheet_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = SourceConfig::GoogleSheet {
            sheet_url: "https://example.com/invalid".to_string(),
            sheet_name: None,
        };
        assert!(Config::create(dir.path(), source, DateOrder::DayFirst)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_resolve_path() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(
            dir.path(),
            SourceConfig::Csv {
                path: PathBuf::from("data.csv"),
            },
            DateOrder::DayFirst,
        )
        .await
        .unwrap();
        assert_eq!(
            config.resolve_path(Path::new("data.csv")),
            config.root().join("data.csv")
        );
        assert_eq!(
            config.resolve_path(Path::new("/tmp/x.csv")),
            PathBuf::from("/tmp/x.csv")
        );
    }

    #[test]
    fn test_serialization_omits_missing_sheet_name() {
        let source = SourceConfig::GoogleSheet {
            sheet_url: SHEET_URL.to_string(),
            sheet_name: None,
        };
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains(r#""kind":"google_sheet""#));
        assert!(!json.contains("sheet_name"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        let id = extract_spreadsheet_id(SHEET_URL).unwrap();
        assert_eq!(id, "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL");

        let url = "https://docs.google.com/spreadsheets/d/ABC123?foo=bar";
        assert_eq!(extract_spreadsheet_id(url).unwrap(), "ABC123");

        let url = "https://docs.google.com/spreadsheets/d/ABC123#gid=0";
        assert_eq!(extract_spreadsheet_id(url).unwrap(), "ABC123");

        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert!(extract_spreadsheet_id("").is_err());
    }
}
