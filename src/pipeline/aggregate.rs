use crate::model::{Amount, Flow, Transaction, Transactions};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// The sum of one `(category, type)` pair. These are the bars of the bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTypeTotal {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub total: Amount,
    pub count: usize,
}

/// The sum of one transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotal {
    #[serde(rename = "type")]
    pub kind: String,
    pub total: Amount,
    pub count: usize,
}

/// The sum of one category, split by type for colouring. These are the slices of the pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
    pub by_type: Vec<TypeTotal>,
}

impl CategoryTotal {
    /// This category's fraction of `grand_total`, or `None` when the grand total is zero.
    pub fn share(&self, grand_total: Amount) -> Option<Decimal> {
        self.total.value().checked_div(grand_total.value())
    }
}

/// Totals by direction of cash flow. The direction comes from the type label, not the sign of the
/// amount, so `net` counts inflows as positive and outflows as negative whichever way the sheet
/// records them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FlowTotals {
    pub inflow: Amount,
    pub outflow: Amount,
    pub other: Amount,
    pub net: Amount,
}

/// Everything the chart views need from a filtered table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub by_category_type: Vec<CategoryTypeTotal>,
    pub by_category: Vec<CategoryTotal>,
    pub by_type: Vec<TypeTotal>,
    pub flows: FlowTotals,
    pub grand_total: Amount,
    pub count: usize,
}

/// Groups `filtered` by `(category, type)`, by category and by type, summing amounts.
///
/// Groups appear in the order their first transaction does. Every grouping sums exactly to
/// `grand_total`, the sum of all amounts in `filtered`.
pub fn aggregate(filtered: &Transactions) -> Aggregates {
    let by_category_type = group_by(filtered, |t| (t.category(), t.kind()))
        .into_iter()
        .map(|((category, kind), rows)| CategoryTypeTotal {
            category: category.to_string(),
            kind: kind.to_string(),
            total: sum(&rows),
            count: rows.len(),
        })
        .collect();

    let by_category = group_by(filtered, |t| t.category())
        .into_iter()
        .map(|(category, rows)| CategoryTotal {
            category: category.to_string(),
            total: sum(&rows),
            by_type: type_totals(rows.iter().copied()),
        })
        .collect();

    Aggregates {
        by_category_type,
        by_category,
        by_type: type_totals(filtered.iter()),
        flows: flow_totals(filtered),
        grand_total: filtered.total(),
        count: filtered.len(),
    }
}

fn type_totals<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> Vec<TypeTotal> {
    group_by(rows, |t| t.kind())
        .into_iter()
        .map(|(kind, rows)| TypeTotal {
            kind: kind.to_string(),
            total: sum(&rows),
            count: rows.len(),
        })
        .collect()
}

fn flow_totals(rows: &Transactions) -> FlowTotals {
    let mut totals = FlowTotals::default();
    for t in rows {
        let amount = t.amount();
        match t.flow() {
            Flow::Inflow => {
                totals.inflow += amount;
                totals.net += Amount::new(amount.value().abs());
            }
            Flow::Outflow => {
                totals.outflow += amount;
                totals.net += Amount::new(-amount.value().abs());
            }
            Flow::Other => {
                totals.other += amount;
                totals.net += amount;
            }
        }
    }
    totals
}

fn sum(rows: &[&Transaction]) -> Amount {
    let amounts: Vec<Amount> = rows.iter().map(|t| t.amount()).collect();
    amounts.iter().sum()
}

/// Groups `rows` by `key`, keeping groups in order of first appearance.
fn group_by<'a, K, F>(
    rows: impl IntoIterator<Item = &'a Transaction>,
    key: F,
) -> Vec<(K, Vec<&'a Transaction>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a Transaction) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a Transaction>)> = Vec::new();
    for row in rows {
        let k = key(row);
        match index.get(&k) {
            Some(&ix) => groups[ix].1.push(row),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![row]));
            }
        }
    }
    groups
}
