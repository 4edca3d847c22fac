use crate::model::{Amount, DateOrder, RawTable, Transaction, Transactions};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{trace, warn};

/// The largest magnitude an amount may have, 10^15. Sums of up to 10^13 such amounts stay within
/// `Decimal::MAX`, so aggregation cannot overflow.
fn amount_limit() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Counts of the rows that `normalize` left out, by reason.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dropped {
    pub bad_date: usize,
    pub bad_amount: usize,
    /// Amounts larger than any household ledger holds, most likely a pasted account number.
    pub out_of_range: usize,
}

impl Dropped {
    pub fn total(&self) -> usize {
        self.bad_date + self.bad_amount + self.out_of_range
    }
}

/// Whether `amount` is small enough to be summed with others without overflowing.
pub(crate) fn in_range(amount: Amount) -> bool {
    amount.value().abs() <= amount_limit()
}

/// The result of `normalize`: the valid transactions, in their original order, and what was left
/// out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub transactions: Transactions,
    pub dropped: Dropped,
}

/// Parses the dates and amounts of `raw`.
///
/// A row whose date or amount cannot be understood is left out rather than failing the whole
/// table. The number of such rows is reported in `Normalized::dropped` and logged.
pub fn normalize(raw: &RawTable, order: DateOrder) -> Normalized {
    let mut dropped = Dropped::default();
    let mut transactions = Vec::with_capacity(raw.len());

    for (ix, row) in raw.rows().iter().enumerate() {
        let Some(date) = row.date.resolve(order) else {
            trace!("Dropping row {ix}: unparseable date {:?}", row.date);
            dropped.bad_date += 1;
            continue;
        };
        let Some(amount) = row.amount.resolve() else {
            trace!("Dropping row {ix}: unparseable amount {:?}", row.amount);
            dropped.bad_amount += 1;
            continue;
        };
        if !in_range(amount) {
            trace!("Dropping row {ix}: amount {} is out of range", amount.value());
            dropped.out_of_range += 1;
            continue;
        }
        // Hand-kept sheets pick up stray spaces, which would split groups and type filters.
        transactions.push(Transaction::new(
            date,
            row.category.trim(),
            row.kind.trim(),
            amount,
        ));
    }

    if dropped.total() > 0 {
        warn!(
            "Ignored {} of {} rows ({} with an unreadable date, {} with an unreadable amount, {} \
            with an amount out of range)",
            dropped.total(),
            raw.len(),
            dropped.bad_date,
            dropped.bad_amount,
            dropped.out_of_range
        );
    }

    Normalized {
        transactions: Transactions::new(transactions),
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRow;
    use chrono::NaiveDate;

    #[test]
    fn test_unparseable_date_drops_exactly_one_row() {
        let raw = RawTable::from_rows([
            RawRow::new("01/2025", "Rent", "Outflow", "1000"),
            RawRow::new("N/A", "Rent", "Outflow", "1000"),
            RawRow::new("02/2025", "Rent", "Outflow", "1000"),
        ]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        assert_eq!(normalized.transactions.len(), raw.len() - 1);
        assert_eq!(normalized.dropped.bad_date, 1);
        assert_eq!(normalized.dropped.bad_amount, 0);
    }

    #[test]
    fn test_unparseable_amount_is_dropped() {
        let raw = RawTable::from_rows([
            RawRow::new("2025-01-03", "Extra", "Entrada", "abc"),
            RawRow::new("2025-01-04", "Extra", "Entrada", "R$ 10,00"),
        ]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        assert_eq!(normalized.transactions.len(), 1);
        assert_eq!(normalized.dropped.bad_amount, 1);
    }

    #[test]
    fn test_preserves_order_and_typed_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let raw = RawTable::from_rows([
            RawRow::new("10/03/2025", "B", "Saída", "1"),
            RawRow::new(d, "A", "Saída", "2"),
        ]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        let categories: Vec<&str> = normalized
            .transactions
            .iter()
            .map(|t| t.category())
            .collect();
        assert_eq!(categories, vec!["B", "A"]);
        assert_eq!(normalized.transactions.data()[1].date(), d);
    }

    #[test]
    fn test_labels_are_trimmed() {
        let raw = RawTable::from_rows([
            RawRow::new("05/01/2025", " Aluguel", "Saída ", "1200"),
            RawRow::new("05/02/2025", "Aluguel", "Saída", "1200"),
        ]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        for t in &normalized.transactions {
            assert_eq!(t.category(), "Aluguel");
            assert_eq!(t.kind(), "Saída");
        }
    }

    #[test]
    fn test_out_of_range_amount_is_dropped() {
        let raw = RawTable::from_rows([
            RawRow::new("2025-01-01", "Erro", "Entrada", "79228162514264337593543950335"),
            RawRow::new("2025-01-02", "Salário", "Entrada", "1000000000000000"),
            RawRow::new("2025-01-03", "Salário", "Entrada", "-1000000000000000.01"),
        ]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        assert_eq!(normalized.transactions.len(), 1);
        assert_eq!(normalized.dropped.out_of_range, 2);
        assert_eq!(normalized.dropped.total(), 2);
    }

    #[test]
    fn test_empty_table() {
        let normalized = normalize(&RawTable::default(), DateOrder::DayFirst);
        assert!(normalized.transactions.is_empty());
        assert_eq!(normalized.dropped.total(), 0);
    }

    #[test]
    fn test_everything_dropped() {
        let raw = RawTable::from_rows([RawRow::new("soon", "x", "y", "1")]);
        let normalized = normalize(&raw, DateOrder::DayFirst);
        assert!(normalized.transactions.is_empty());
        assert_eq!(normalized.dropped.total(), 1);
    }
}
