//! Turns a `Report` or a `Portfolio` into text for the terminal: markdown tables, CSV or JSON.

use crate::args::OutputFormat;
use crate::dashboard::Report;
use crate::investments::Portfolio;
use crate::model::date::format_date;
use crate::model::{DateOrder, Transactions};
use crate::pipeline::Aggregates;
use crate::Result;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// A report in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    /// The whole report as a JSON value.
    Json(serde_json::Value),
    /// Markdown tables as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => write!(f, "Rendered::Json({:?})", v),
            Rendered::Table(s) => write!(f, "Rendered::Table({} chars)", s.len()),
            Rendered::Csv(s) => write!(f, "Rendered::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rendered::Table(s) => write!(f, "{}", s),
            Rendered::Csv(s) => write!(f, "{}", s),
        }
    }
}

pub fn render(report: &Report, format: OutputFormat, order: DateOrder) -> Result<Rendered> {
    match format {
        OutputFormat::Json => Ok(Rendered::Json(
            serde_json::to_value(report).context("Unable to serialize the report")?,
        )),
        OutputFormat::Table => Ok(Rendered::Table(tables(report, order))),
        OutputFormat::Csv => Ok(Rendered::Csv(csv(report)?)),
    }
}

/// Writes the filtered transactions, rather than the totals, as CSV. An empty report has only the
/// header record.
pub fn rows_csv(report: &Report) -> Result<Rendered> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "category", "type", "amount"])
        .context("Unable to write CSV header")?;
    if let Report::Rows { rows, .. } = report {
        for t in rows {
            let date = t.date().to_string();
            let amount = t.amount().value().to_string();
            wtr.write_record([date.as_str(), t.category(), t.kind(), amount.as_str()])
                .context("Unable to write CSV record")?;
        }
    }
    finish_csv(wtr).map(Rendered::Csv)
}

pub fn render_portfolio(
    portfolio: &Portfolio,
    format: OutputFormat,
    order: DateOrder,
) -> Result<Rendered> {
    match format {
        OutputFormat::Json => Ok(Rendered::Json(
            serde_json::to_value(portfolio).context("Unable to serialize the investments")?,
        )),
        OutputFormat::Table => Ok(Rendered::Table(portfolio_tables(portfolio, order))),
        OutputFormat::Csv => Ok(Rendered::Csv(portfolio_csv(portfolio)?)),
    }
}

fn portfolio_tables(portfolio: &Portfolio, order: DateOrder) -> String {
    let holdings = portfolio
        .holdings
        .iter()
        .map(|h| {
            vec![
                h.institution.clone(),
                h.invested.to_string(),
                format_date(h.yield_date, order),
                h.yield_amount.to_string(),
                h.asset.clone(),
                h.kind.clone(),
                h.rate.map(|r| format!("{r}%")).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect::<Vec<_>>();
    let yields = portfolio
        .yields
        .iter()
        .map(|y| vec![format_date(y.date, order), y.total.to_string()])
        .collect::<Vec<_>>();
    let totals = vec![
        portfolio.total_invested.to_string(),
        portfolio.total_yield.to_string(),
    ];

    let mut out = "# Investments\n\n".to_string();
    out.push_str(&section(
        "Holdings",
        &["Institution", "Invested", "Yield date", "Yield", "Asset", "Type", "Rate"],
        holdings,
    ));
    out.push('\n');
    out.push_str(&section("Yield by date", &["Date", "Yield"], yields));
    out.push('\n');
    out.push_str(&section("Total", &["Invested", "Yield"], vec![totals]));
    out
}

/// One record per holding, with bare decimal amounts and ISO dates.
fn portfolio_csv(portfolio: &Portfolio) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let header = ["institution", "invested", "yield_date", "yield", "asset", "type", "rate"];
    wtr.write_record(header).context("Unable to write CSV header")?;
    for h in &portfolio.holdings {
        let invested = h.invested.value().to_string();
        let date = h.yield_date.to_string();
        let yielded = h.yield_amount.value().to_string();
        let rate = h.rate.map(|r| r.value().to_string()).unwrap_or_default();
        let record = [
            h.institution.as_str(),
            invested.as_str(),
            date.as_str(),
            yielded.as_str(),
            h.asset.as_str(),
            h.kind.as_str(),
            rate.as_str(),
        ];
        wtr.write_record(record).context("Unable to write CSV record")?;
    }
    finish_csv(wtr)
}

fn tables(report: &Report, order: DateOrder) -> String {
    let Report::Rows {
        range,
        rows,
        aggregates,
        ..
    } = report
    else {
        return format!("{}\n", report.message(order));
    };

    let mut out = format!(
        "# {} to {}\n\n",
        format_date(range.start(), order),
        format_date(range.end(), order)
    );
    out.push_str(&by_category_type(aggregates));
    out.push('\n');
    out.push_str(&by_category(aggregates));
    out.push('\n');
    out.push_str(&by_type(aggregates));
    out.push('\n');
    out.push_str(&flows(aggregates));
    out.push('\n');
    out.push_str(&transactions(rows, order));
    out
}

fn transactions(rows: &Transactions, order: DateOrder) -> String {
    let rows = rows
        .iter()
        .map(|t| {
            vec![
                format_date(t.date(), order),
                t.category().to_string(),
                t.kind().to_string(),
                t.amount().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    section("Transactions", &["Date", "Category", "Type", "Amount"], rows)
}

fn by_category_type(agg: &Aggregates) -> String {
    let rows = agg
        .by_category_type
        .iter()
        .map(|g| {
            vec![
                g.category.clone(),
                g.kind.clone(),
                g.total.to_string(),
                g.count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    section(
        "By category and type",
        &["Category", "Type", "Total", "Count"],
        rows,
    )
}

fn by_category(agg: &Aggregates) -> String {
    let rows = agg
        .by_category
        .iter()
        .map(|g| {
            let split = g
                .by_type
                .iter()
                .map(|t| format!("{}: {}", t.kind, t.total))
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                g.category.clone(),
                g.total.to_string(),
                percent(g.share(agg.grand_total)),
                split,
            ]
        })
        .collect::<Vec<_>>();
    section(
        "By category",
        &["Category", "Total", "Share", "By type"],
        rows,
    )
}

fn by_type(agg: &Aggregates) -> String {
    let rows = agg
        .by_type
        .iter()
        .map(|t| vec![t.kind.clone(), t.total.to_string(), t.count.to_string()])
        .collect::<Vec<_>>();
    section("By type", &["Type", "Total", "Count"], rows)
}

fn flows(agg: &Aggregates) -> String {
    let f = &agg.flows;
    let row = vec![
        f.inflow.to_string(),
        f.outflow.to_string(),
        f.other.to_string(),
        f.net.to_string(),
        agg.grand_total.to_string(),
    ];
    section(
        "Cash flow",
        &["Inflow", "Outflow", "Other", "Net", "Total"],
        vec![row],
    )
}

fn percent(share: Option<Decimal>) -> String {
    match share {
        Some(share) => format!("{}%", (share * Decimal::ONE_HUNDRED).round_dp(1)),
        None => "-".to_string(),
    }
}

fn section(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = format!("## {title}\n\n");
    out.push_str(&markdown_row(headers.iter().map(|h| h.to_string())));
    out.push_str(&markdown_row(headers.iter().map(|_| "---".to_string())));
    for row in rows {
        out.push_str(&markdown_row(row));
    }
    out
}

fn markdown_row(cells: impl IntoIterator<Item = String>) -> String {
    let cells: Vec<String> = cells.into_iter().map(|c| c.replace('|', "\\|")).collect();
    format!("| {} |\n", cells.join(" | "))
}

/// One record per `(category, type)` pair. An empty report has only the header record.
fn csv(report: &Report) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["category", "type", "total", "count"])
        .context("Unable to write CSV header")?;
    if let Report::Rows { aggregates, .. } = report {
        for g in &aggregates.by_category_type {
            let total = g.total.value().to_string();
            let count = g.count.to_string();
            let record = [g.category.as_str(), g.kind.as_str(), total.as_str(), count.as_str()];
            wtr.write_record(record).context("Unable to write CSV record")?;
        }
    }
    finish_csv(wtr)
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("Unable to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
