use crate::model::date::DateValue;
use crate::model::mapping::{Column, Mapping};
use crate::model::Amount;
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An amount cell as it arrives from a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountValue {
    Amount(Amount),
    Text(String),
}

impl AmountValue {
    pub fn resolve(&self) -> Option<Amount> {
        match self {
            AmountValue::Amount(a) => Some(*a),
            AmountValue::Text(s) => Amount::from_str(s).ok(),
        }
    }
}

impl From<Amount> for AmountValue {
    fn from(value: Amount) -> Self {
        AmountValue::Amount(value)
    }
}

impl From<&str> for AmountValue {
    fn from(value: &str) -> Self {
        AmountValue::Text(value.to_string())
    }
}

/// A row as delivered by a data source, before dates and amounts have been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub date: DateValue,
    pub category: String,
    pub kind: String,
    pub amount: AmountValue,
}

impl RawRow {
    pub fn new(
        date: impl Into<DateValue>,
        category: impl Into<String>,
        kind: impl Into<String>,
        amount: impl Into<AmountValue>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            kind: kind.into(),
            amount: amount.into(),
        }
    }
}

/// The table handed over by a data source. Its header has already been checked for the required
/// columns, but the cells have not been validated.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Parses sheet data where the first row holds the headers.
    ///
    /// # Errors
    /// - The data is empty, so there is no header row.
    /// - A required column is absent from the header row.
    /// - A row has more cells than there are headers.
    pub fn parse<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data.into_iter();
        let mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row)?,
            None => bail!("An empty data set cannot be parsed into a transaction table"),
        };
        let len = mapping.len();

        let mut parsed = Vec::new();
        for (row_ix, row) in rows.enumerate() {
            let values: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                continue; // Skip empty rows
            }
            if values.len() > len {
                bail!(
                    "A row longer than the headers list was encountered at row {}",
                    row_ix + 2
                );
            }
            // Sheets leave off trailing empty cells.
            let cell = |column: Column| -> String {
                values
                    .get(mapping.index(column))
                    .cloned()
                    .unwrap_or_default()
            };
            parsed.push(RawRow {
                date: DateValue::Text(cell(Column::Date)),
                category: cell(Column::Category),
                kind: cell(Column::Type),
                amount: AmountValue::Text(cell(Column::Amount)),
            });
        }
        Ok(Self { rows: parsed })
    }

    /// Parses CSV text where the first record holds the headers.
    pub fn parse_csv(csv_data: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (ix, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Unable to read CSV record {}", ix + 1))?;
            rows.push(record.iter().map(|field| field.to_string()).collect());
        }
        Self::parse(rows)
    }

    pub fn from_rows(rows: impl IntoIterator<Item = RawRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The direction of cash flow that a transaction type label stands for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Inflow,
    Outflow,
    Other,
}

serde_plain::derive_display_from_serialize!(Flow);
serde_plain::derive_fromstr_from_deserialize!(Flow);

impl Flow {
    pub fn classify(kind: &str) -> Flow {
        match kind.trim().to_lowercase().as_str() {
            "receita" | "entrada" | "income" | "inflow" | "credit" => Flow::Inflow,
            "despesa" | "saída" | "saida" | "expense" | "outflow" | "debit" => Flow::Outflow,
            _ => Flow::Other,
        }
    }
}

/// A validated transaction with a real calendar date.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    category: String,
    #[serde(rename = "type")]
    kind: String,
    amount: Amount,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        kind: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            kind: kind.into(),
            amount,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The transaction type label, e.g. `Receita` or `Despesa`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn flow(&self) -> Flow {
        Flow::classify(&self.kind)
    }
}

/// An ordered table of validated transactions.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions {
    data: Vec<Transaction>,
}

impl Transactions {
    pub fn new(data: Vec<Transaction>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[Transaction] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The sum of all amounts.
    pub fn total(&self) -> Amount {
        self.data.iter().map(|t| &t.amount).sum()
    }

    /// The earliest and latest dates in the table, or `None` if it is empty.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.data.iter().map(|t| t.date).min()?;
        let max = self.data.iter().map(|t| t.date).max()?;
        Some((min, max))
    }
}

impl FromIterator<Transaction> for Transactions {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
