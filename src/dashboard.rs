//! A dashboard session: the normalized table for one run, and the reports computed from it for
//! each selection.

use crate::model::date::{end_of_month, format_date, parse_date};
use crate::model::{DateOrder, Precision, RawTable, Transactions};
use crate::pipeline::{
    aggregate, available_types, filter, filter_picked, normalize, Aggregates, DateRange, Dropped,
    EmptyReason, FilterOutcome, Normalized, TypeFilter,
};
use crate::Result;
use anyhow::bail;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// What the user has selected. A `range` of `None` means the whole dataset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    pub range: Option<DateRange>,
    pub types: TypeFilter,
}

/// The outcome of one selection, ready to be handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Rows {
        range: DateRange,
        types: TypeFilter,
        rows: Transactions,
        aggregates: Aggregates,
        dropped: Dropped,
    },
    Empty {
        range: Option<DateRange>,
        types: TypeFilter,
        reason: EmptyReason,
        dropped: Dropped,
    },
}

impl Report {
    pub fn is_empty(&self) -> bool {
        matches!(self, Report::Empty { .. })
    }

    /// A one-line summary for the user. For an empty report it explains why there is nothing to
    /// show.
    pub fn message(&self, order: DateOrder) -> String {
        match self {
            Report::Rows {
                range,
                rows,
                aggregates,
                ..
            } => format!(
                "{} transactions from {} to {}, totalling {}",
                rows.len(),
                format_date(range.start(), order),
                format_date(range.end(), order),
                aggregates.grand_total
            ),
            Report::Empty {
                range,
                types,
                reason,
                ..
            } => match (reason, range) {
                (EmptyReason::EmptyTable, _) => {
                    "There are no transactions with a readable date to show".to_string()
                }
                (EmptyReason::IncompleteRange, Some(range)) => format!(
                    "Only {} was selected, select an end date too",
                    format_date(range.start(), order)
                ),
                (_, None) => "Select both a start date and an end date".to_string(),
                (EmptyReason::InvertedRange, Some(range)) => format!(
                    "The start date {} is after the end date {}",
                    format_date(range.start(), order),
                    format_date(range.end(), order)
                ),
                (EmptyReason::NoMatchingRows, Some(range)) => {
                    let kind = match types {
                        TypeFilter::Both => String::new(),
                        TypeFilter::Only(kind) => format!(" of type '{kind}'"),
                    };
                    format!(
                        "No transactions{kind} found from {} to {}",
                        format_date(range.start(), order),
                        format_date(range.end(), order)
                    )
                }
            },
        }
    }
}

/// Holds the normalized transactions for a run. Normalization happens once, in `new`; every
/// report is then computed from scratch.
#[derive(Debug, Clone)]
pub struct Dashboard {
    order: DateOrder,
    normalized: Normalized,
}

impl Dashboard {
    pub fn new(raw: &RawTable, order: DateOrder) -> Self {
        let normalized = normalize(raw, order);
        debug!(
            "Loaded {} transactions ({} rows dropped)",
            normalized.transactions.len(),
            normalized.dropped.total()
        );
        Self { order, normalized }
    }

    pub fn date_order(&self) -> DateOrder {
        self.order
    }

    pub fn transactions(&self) -> &Transactions {
        &self.normalized.transactions
    }

    pub fn dropped(&self) -> Dropped {
        self.normalized.dropped
    }

    /// The choices for the type selector, starting with the `Both` sentinel.
    pub fn available_types(&self) -> Vec<TypeFilter> {
        available_types(self.transactions())
    }

    /// The range a date selector starts out with: the first to the last date of the whole
    /// dataset, regardless of any type selection.
    pub fn default_range(&self) -> Option<DateRange> {
        DateRange::full(self.transactions())
    }

    /// The first day of every month that has a transaction, ascending.
    pub fn periods(&self) -> Vec<NaiveDate> {
        let months: BTreeSet<NaiveDate> = self
            .transactions()
            .iter()
            .filter_map(|t| t.date().with_day(1))
            .collect();
        months.into_iter().collect()
    }

    /// Turns user-entered bounds into a range.
    ///
    /// - `month` (e.g. `03/2025`) selects that whole month and cannot be combined with `from` or
    ///   `to`.
    /// - A month-precision `to` runs to the end of that month.
    /// - A missing bound is taken from `default_range`. If the dataset is empty and a bound is
    ///   missing, the result is `None`.
    ///
    /// # Errors
    /// Returns an error if a bound is not a date or `month` is combined with another bound.
    pub fn resolve_range(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        month: Option<&str>,
    ) -> Result<Option<DateRange>> {
        if let Some(month) = month {
            if from.is_some() || to.is_some() {
                bail!("A month cannot be combined with a start or end date");
            }
            let (date, _) = self.parse_bound(month)?;
            return Ok(Some(DateRange::month(date)));
        }

        let default = self.default_range();
        let start = match from {
            Some(s) => Some(self.parse_bound(s)?.0),
            None => default.map(|r| r.start()),
        };
        let end = match to {
            Some(s) => Some(match self.parse_bound(s)? {
                (date, Precision::Month) => end_of_month(date),
                (date, Precision::Day) => date,
            }),
            None => default.map(|r| r.end()),
        };
        Ok(start.zip(end).map(|(start, end)| DateRange::new(start, end)))
    }

    fn parse_bound(&self, s: &str) -> Result<(NaiveDate, Precision)> {
        match parse_date(s, self.order) {
            Some(parsed) => Ok(parsed),
            None => bail!(
                "'{s}' is not a date. Use {}, YYYY-MM-DD or MM/YYYY",
                match self.order {
                    DateOrder::DayFirst => "DD/MM/YYYY",
                    DateOrder::MonthFirst => "MM/DD/YYYY",
                }
            ),
        }
    }

    /// Filters and aggregates the transactions for `selection`.
    pub fn report(&self, selection: &Selection) -> Report {
        debug!(
            "Computing report for {:?} and type '{}'",
            selection.range, selection.types
        );
        let Some(range) = selection.range.or_else(|| self.default_range()) else {
            return self.empty(None, &selection.types, EmptyReason::EmptyTable);
        };
        let outcome = filter(self.transactions(), range, &selection.types);
        self.finish(range, &selection.types, outcome)
    }

    /// Like `report`, for the raw dates of a two-date picker.
    pub fn report_picked(&self, picked: &[NaiveDate], types: &TypeFilter) -> Report {
        let outcome = filter_picked(self.transactions(), picked, types);
        match picked {
            [start, end] => self.finish(DateRange::new(*start, *end), types, outcome),
            _ => self.finish_empty(outcome, types),
        }
    }

    fn finish(&self, range: DateRange, types: &TypeFilter, outcome: FilterOutcome) -> Report {
        match outcome {
            FilterOutcome::Rows(rows) => {
                let aggregates = aggregate(&rows);
                Report::Rows {
                    range,
                    types: types.clone(),
                    rows,
                    aggregates,
                    dropped: self.dropped(),
                }
            }
            empty => self.finish_empty(empty, types),
        }
    }

    fn finish_empty(&self, outcome: FilterOutcome, types: &TypeFilter) -> Report {
        match outcome {
            FilterOutcome::Empty { range, reason } => self.empty(range, types, reason),
            // filter_picked only yields rows for a complete range, handled by `finish`.
            FilterOutcome::Rows(_) => self.empty(None, types, EmptyReason::IncompleteRange),
        }
    }

    fn empty(&self, range: Option<DateRange>, types: &TypeFilter, reason: EmptyReason) -> Report {
        debug!("Empty report: {reason}");
        Report::Empty {
            range,
            types: types.clone(),
            reason,
            dropped: self.dropped(),
        }
    }
}
