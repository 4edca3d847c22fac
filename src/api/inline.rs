use crate::api::Source;
use crate::config::InlineRow;
use crate::model::{RawRow, RawTable};
use crate::Result;

/// Serves the rows written directly into `config.json`.
pub(crate) struct InlineSource {
    rows: Vec<InlineRow>,
}

impl InlineSource {
    pub(crate) fn new(rows: Vec<InlineRow>) -> Self {
        Self { rows }
    }
}

#[async_trait::async_trait]
impl Source for InlineSource {
    fn describe(&self) -> String {
        format!("{} rows from the configuration file", self.rows.len())
    }

    async fn fetch(&mut self) -> Result<RawTable> {
        Ok(RawTable::from_rows(self.rows.iter().map(RawRow::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AmountValue, DateValue};
    use std::str::FromStr;

    #[tokio::test]
    async fn test_fetch_keeps_order_and_values() {
        let rows = vec![
            InlineRow {
                date: DateValue::from("01/2025"),
                category: "Rent".into(),
                kind: "Outflow".into(),
                amount: FromStr::from_str("1000").unwrap(),
            },
            InlineRow {
                date: DateValue::from("01/2025"),
                category: "Salary".into(),
                kind: "Inflow".into(),
                amount: FromStr::from_str("3000").unwrap(),
            },
        ];
        let table = InlineSource::new(rows).fetch().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].category, "Salary");
        assert!(matches!(table.rows()[0].amount, AmountValue::Amount(_)));
    }
}
