use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The columns every transaction table must provide.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Category,
    Type,
    Amount,
}

serde_plain::derive_display_from_serialize!(Column);
serde_plain::derive_fromstr_from_deserialize!(Column);

impl Column {
    pub const ALL: [Column; 4] = [Column::Date, Column::Category, Column::Type, Column::Amount];

    /// Header names, lowercased, that are understood to mean this column. The Portuguese names
    /// are the ones used by the spreadsheets this tool was first written against.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Date => &["date", "data"],
            Column::Category => &[
                "category",
                "categoria",
                "operação",
                "operacao",
                "descrição",
                "descricao",
            ],
            Column::Type => &["type", "tipo"],
            Column::Amount => &["amount", "valor", "value"],
        }
    }

    fn from_header(header: &str) -> Option<Column> {
        let key = header.trim().to_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.aliases().contains(&key.as_str()))
    }
}

/// Resolves the header row of a sheet to the positions of the required columns. Headers that are
/// not recognized are allowed and ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<String>,
    column_map: HashMap<Column, usize>,
}

impl Mapping {
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        let mut column_map = HashMap::new();

        for (idx, header) in headers.iter().enumerate() {
            let Some(column) = Column::from_header(header) else {
                continue;
            };
            if let Some(previous) = column_map.insert(column, idx) {
                return Err(MappingError(format!(
                    "Both '{}' and '{header}' map to the '{column}' column",
                    headers[previous]
                )));
            }
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| !column_map.contains_key(*c))
            .map(|c| format!("'{c}' (one of: {})", c.aliases().join(", ")))
            .collect();
        if !missing.is_empty() {
            return Err(MappingError(format!(
                "The table is missing required columns {}. Found headers: {:?}",
                missing.join(", "),
                headers
            )));
        }

        Ok(Self {
            headers,
            column_map,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The position of `column` in a row.
    pub fn index(&self, column: Column) -> usize {
        // `new` guarantees every column is present.
        self.column_map.get(&column).copied().unwrap_or_default()
    }
}
