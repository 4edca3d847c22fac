//! Investment holdings listed in `config.json`, and the yield they produced on each date.

use crate::model::{Amount, DateOrder, DateValue};
use crate::pipeline::in_range;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One holding as written in the configuration file. Amounts and the rate may be JSON numbers or
/// text such as `"R$ 1.000,00"`. The Portuguese names used by the sheet columns are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Investment {
    #[serde(alias = "instituicao", alias = "instituição")]
    pub institution: String,

    #[serde(alias = "valor_investido")]
    pub invested: Amount,

    /// The date the yield was credited.
    #[serde(alias = "data_do_rendimento")]
    pub yield_date: DateValue,

    #[serde(alias = "valor_do_rendimento")]
    pub yield_amount: Amount,

    /// What is held, e.g. `CDI`.
    #[serde(alias = "ativo")]
    pub asset: String,

    /// The kind of investment, e.g. `Renda Fixa`.
    #[serde(rename = "type", alias = "tipo")]
    pub kind: String,

    /// The current annual rate, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "taxa_atual")]
    pub rate: Option<Amount>,
}

/// An `Investment` whose yield date has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub institution: String,
    pub invested: Amount,
    pub yield_date: NaiveDate,
    pub yield_amount: Amount,
    pub asset: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateYield {
    pub date: NaiveDate,
    pub total: Amount,
}

/// The investments panel: every holding, the yield credited on each date, and the totals.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    /// In the order they are listed in the configuration file.
    pub holdings: Vec<Holding>,
    /// Earliest date first.
    pub yields: Vec<DateYield>,
    pub total_invested: Amount,
    pub total_yield: Amount,
    /// Holdings left out because of an unreadable yield date or an out of range amount.
    pub dropped: usize,
}

impl Portfolio {
    /// Resolves the yield dates of `investments` and totals them. Like transactions, a holding
    /// that cannot be read is skipped and counted rather than failing the whole list.
    pub fn new(investments: &[Investment], order: DateOrder) -> Self {
        let mut dropped = 0;
        let mut holdings = Vec::with_capacity(investments.len());
        for inv in investments {
            let Some(yield_date) = inv.yield_date.resolve(order) else {
                warn!(
                    "Skipping the {} holding at {}: the yield date cannot be read",
                    inv.asset, inv.institution
                );
                dropped += 1;
                continue;
            };
            if !in_range(inv.invested) || !in_range(inv.yield_amount) {
                warn!(
                    "Skipping the {} holding at {}: the amount is too large",
                    inv.asset, inv.institution
                );
                dropped += 1;
                continue;
            }
            holdings.push(Holding {
                institution: inv.institution.trim().to_string(),
                invested: inv.invested,
                yield_date,
                yield_amount: inv.yield_amount,
                asset: inv.asset.trim().to_string(),
                kind: inv.kind.trim().to_string(),
                rate: inv.rate,
            });
        }

        let mut by_date: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
        for h in &holdings {
            by_date
                .entry(h.yield_date)
                .and_modify(|total| *total += h.yield_amount)
                .or_insert(h.yield_amount);
        }
        let yields = by_date
            .into_iter()
            .map(|(date, total)| DateYield { date, total })
            .collect();

        Self {
            total_invested: holdings.iter().map(|h| &h.invested).sum(),
            total_yield: holdings.iter().map(|h| &h.yield_amount).sum(),
            holdings,
            yields,
            dropped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
