use crate::model::date::{end_of_month, format_date};
use crate::model::{DateOrder, Transaction, Transactions};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The label of the sentinel that selects every transaction type.
pub const BOTH: &str = "both";

/// Selects transactions by their type label.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    /// No filtering by type.
    #[default]
    Both,
    /// Only transactions whose type is exactly this label.
    Only(String),
}

impl TypeFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TypeFilter::Both => true,
            TypeFilter::Only(kind) => transaction.kind() == kind,
        }
    }
}

impl Display for TypeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::Both => f.write_str(BOTH),
            TypeFilter::Only(kind) => f.write_str(kind),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Infallible;

    /// `both` and `ambos`, in any case, select everything. Any other text is a type label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(BOTH) || trimmed.eq_ignore_ascii_case("ambos") {
            Ok(TypeFilter::Both)
        } else {
            Ok(TypeFilter::Only(trimmed.to_string()))
        }
    }
}

impl Serialize for TypeFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An inclusive range of calendar dates. It is not validated on construction: an inverted range
/// simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The whole calendar month that `date` falls in.
    pub fn month(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        Self::new(start, end_of_month(date))
    }

    /// The range from the earliest to the latest transaction, or `None` if there are none.
    pub fn full(table: &Transactions) -> Option<Self> {
        table
            .date_bounds()
            .map(|(start, end)| Self::new(start, end))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Formats the range for a message, e.g. `01/12/2024 - 31/12/2024`.
    pub fn display(&self, order: DateOrder) -> String {
        format!(
            "{} - {}",
            format_date(self.start, order),
            format_date(self.end, order)
        )
    }
}

/// Why a filter produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// There were no transactions to filter in the first place.
    EmptyTable,
    /// The start of the range is after its end.
    InvertedRange,
    /// A date selector delivered something other than a start and an end.
    IncompleteRange,
    /// Nothing fell inside the range with the selected type.
    NoMatchingRows,
}

serde_plain::derive_display_from_serialize!(EmptyReason);

/// The result of `filter`. An empty result is reported explicitly so that callers can explain it
/// instead of drawing empty charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Rows(Transactions),
    Empty {
        /// The range that was asked for. Absent only when no date was selected at all.
        range: Option<DateRange>,
        reason: EmptyReason,
    },
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::Empty { .. })
    }

    pub fn rows(&self) -> Option<&Transactions> {
        match self {
            FilterOutcome::Rows(rows) => Some(rows),
            FilterOutcome::Empty { .. } => None,
        }
    }
}

/// The type filters a user can choose from: the `Both` sentinel, then each distinct type in the
/// order it first appears.
pub fn available_types(table: &Transactions) -> Vec<TypeFilter> {
    let mut seen = HashSet::new();
    let mut types = vec![TypeFilter::Both];
    for t in table {
        if seen.insert(t.kind()) {
            types.push(TypeFilter::Only(t.kind().to_string()));
        }
    }
    types
}

/// Keeps the transactions dated within `range` (inclusive) and, unless `types` is `Both`, of the
/// selected type. Row order is preserved.
pub fn filter(table: &Transactions, range: DateRange, types: &TypeFilter) -> FilterOutcome {
    let empty = |reason| FilterOutcome::Empty {
        range: Some(range),
        reason,
    };
    if range.is_inverted() {
        return empty(EmptyReason::InvertedRange);
    }
    if table.is_empty() {
        return empty(EmptyReason::EmptyTable);
    }

    let rows: Transactions = table
        .iter()
        .filter(|t| range.contains(t.date()))
        .filter(|t| types.matches(t))
        .cloned()
        .collect();

    if rows.is_empty() {
        empty(EmptyReason::NoMatchingRows)
    } else {
        FilterOutcome::Rows(rows)
    }
}

/// Like `filter`, for the raw output of a two-date picker, which holds a single date while the
/// user is still choosing the end of the range.
pub fn filter_picked(
    table: &Transactions,
    picked: &[NaiveDate],
    types: &TypeFilter,
) -> FilterOutcome {
    match picked {
        [start, end] => filter(table, DateRange::new(*start, *end), types),
        [only] => FilterOutcome::Empty {
            range: Some(DateRange::new(*only, *only)),
            reason: EmptyReason::IncompleteRange,
        },
        _ => FilterOutcome::Empty {
            range: None,
            reason: EmptyReason::IncompleteRange,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use std::str::FromStr;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(date: NaiveDate, category: &str, kind: &str, amount: &str) -> Transaction {
        Transaction::new(date, category, kind, Amount::from_str(amount).unwrap())
    }

    fn sample() -> Transactions {
        Transactions::new(vec![
            tx(ymd(2025, 1, 1), "Rent", "Outflow", "1000"),
            tx(ymd(2025, 1, 1), "Salary", "Inflow", "3000"),
            tx(ymd(2025, 2, 1), "Rent", "Outflow", "1000"),
        ])
    }

    #[test]
    fn test_single_month_both_types() {
        let range = DateRange::month(ymd(2025, 1, 1));
        let outcome = filter(&sample(), range, &TypeFilter::Both);
        assert_eq!(outcome.rows().unwrap().len(), 2);
    }

    #[test]
    fn test_type_filter_full_range() {
        let table = sample();
        let range = DateRange::full(&table).unwrap();
        let outcome = filter(&table, range, &TypeFilter::Only("Outflow".into()));
        let rows = outcome.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.total().value(), Amount::from_str("2000").unwrap().value());
    }

    #[test]
    fn test_full_range_returns_everything() {
        let table = sample();
        let outcome = filter(&table, DateRange::full(&table).unwrap(), &TypeFilter::Both);
        assert_eq!(outcome.rows(), Some(&table));
    }

    #[test]
    fn test_range_before_data_echoes_range() {
        let range = DateRange::month(ymd(2024, 12, 1));
        let outcome = filter(&sample(), range, &TypeFilter::Both);
        assert_eq!(
            outcome,
            FilterOutcome::Empty {
                range: Some(range),
                reason: EmptyReason::NoMatchingRows
            }
        );
        assert_eq!(
            range.display(DateOrder::DayFirst),
            "01/12/2024 - 31/12/2024"
        );
    }

    #[test]
    fn test_inclusive_bounds() {
        let table = sample();
        let range = DateRange::new(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert_eq!(filter(&table, range, &TypeFilter::Both).rows().unwrap().len(), 3);
    }

    #[test]
    fn test_shrinking_range_never_grows() {
        let table = sample();
        let mut previous = usize::MAX;
        for end_day in [28, 1] {
            let range = DateRange::new(ymd(2025, 1, 1), ymd(2025, 2, end_day));
            let count = filter(&table, range, &TypeFilter::Both)
                .rows()
                .map(Transactions::len)
                .unwrap_or(0);
            assert!(count <= previous);
            previous = count;
        }
        let range = DateRange::new(ymd(2025, 1, 2), ymd(2025, 1, 31));
        assert!(filter(&table, range, &TypeFilter::Both).is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        let range = DateRange::new(ymd(2025, 2, 1), ymd(2025, 1, 1));
        let outcome = filter(&sample(), range, &TypeFilter::Both);
        assert_eq!(
            outcome,
            FilterOutcome::Empty {
                range: Some(range),
                reason: EmptyReason::InvertedRange
            }
        );
    }

    #[test]
    fn test_stale_type_is_empty() {
        let table = sample();
        let outcome = filter(
            &table,
            DateRange::full(&table).unwrap(),
            &TypeFilter::Only("Receita".into()),
        );
        assert!(matches!(
            outcome,
            FilterOutcome::Empty {
                reason: EmptyReason::NoMatchingRows,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_table() {
        let range = DateRange::month(ymd(2025, 1, 1));
        let outcome = filter(&Transactions::default(), range, &TypeFilter::Both);
        assert!(matches!(
            outcome,
            FilterOutcome::Empty {
                reason: EmptyReason::EmptyTable,
                ..
            }
        ));
    }

    #[test]
    fn test_preserves_source_order() {
        let table = Transactions::new(vec![
            tx(ymd(2025, 3, 9), "C", "Saída", "1"),
            tx(ymd(2025, 3, 1), "A", "Saída", "1"),
            tx(ymd(2025, 3, 5), "B", "Saída", "1"),
        ]);
        let outcome = filter(&table, DateRange::full(&table).unwrap(), &TypeFilter::Both);
        let order: Vec<&str> = outcome.rows().unwrap().iter().map(|t| t.category()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_picked_single_date() {
        let d = ymd(2025, 1, 1);
        let outcome = filter_picked(&sample(), &[d], &TypeFilter::Both);
        assert_eq!(
            outcome,
            FilterOutcome::Empty {
                range: Some(DateRange::new(d, d)),
                reason: EmptyReason::IncompleteRange
            }
        );
        let outcome = filter_picked(&sample(), &[d, ymd(2025, 1, 31)], &TypeFilter::Both);
        assert_eq!(outcome.rows().unwrap().len(), 2);
    }

    #[test]
    fn test_available_types() {
        let types = available_types(&sample());
        assert_eq!(
            types,
            vec![
                TypeFilter::Both,
                TypeFilter::Only("Outflow".into()),
                TypeFilter::Only("Inflow".into())
            ]
        );
        assert_eq!(available_types(&Transactions::default()), vec![TypeFilter::Both]);
    }

    #[test]
    fn test_type_filter_from_str() {
        assert_eq!(TypeFilter::from_str("Ambos").unwrap(), TypeFilter::Both);
        assert_eq!(TypeFilter::from_str("BOTH").unwrap(), TypeFilter::Both);
        assert_eq!(
            TypeFilter::from_str(" Despesa ").unwrap(),
            TypeFilter::Only("Despesa".into())
        );
        assert_eq!(TypeFilter::Both.to_string(), "both");
    }
}
