use crate::api::Source;
use crate::model::RawTable;
use crate::{utils, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

/// Reads transactions from a CSV file on disk. The first record must be the header row.
pub(crate) struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source for CsvFileSource {
    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }

    async fn fetch(&mut self) -> Result<RawTable> {
        debug!("Reading {}", self.path.display());
        let text = utils::read(&self.path).await?;
        // Spreadsheet programs like to start their CSV exports with a byte order mark.
        let text = text.trim_start_matches('\u{feff}');
        RawTable::parse_csv(text)
            .with_context(|| format!("Unable to parse the CSV file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_with_bom_and_aliases() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extrato.csv");
        let data = "\u{feff}Data,Categoria,Tipo,Valor\n\
                    05/03/2025,Aluguel,Saída,\"R$ 1.200,00\"\n\
                    06/03/2025,Salário,Entrada,3500\n";
        utils::write(&path, data).await.unwrap();

        let table = CsvFileSource::new(&path).fetch().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].category, "Aluguel");
        assert_eq!(table.rows()[1].kind, "Entrada");
    }

    #[tokio::test]
    async fn test_missing_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        utils::write(&path, "Date,Category,Amount\n2025-01-01,Rent,10\n")
            .await
            .unwrap();
        let err = CsvFileSource::new(&path).fetch().await.unwrap_err();
        assert!(format!("{err:#}").contains("missing required columns"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut source = CsvFileSource::new(dir.path().join("nope.csv"));
        assert!(source.fetch().await.is_err());
        assert!(source.describe().contains("nope.csv"));
    }
}
