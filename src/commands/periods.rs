use crate::api::Mode;
use crate::commands::{load_dashboard, Out};
use crate::model::date::format_month;
use crate::{Config, Result};

/// Lists the months, as `MM/YYYY`, that have at least one transaction. Any of them can be passed
/// to `report --month`.
pub async fn periods(config: &Config, mode: Mode) -> Result<Out<Vec<String>>> {
    let dashboard = load_dashboard(config, mode).await?;
    let months: Vec<String> = dashboard.periods().into_iter().map(format_month).collect();
    if months.is_empty() {
        return Ok(Out::new("There are no transactions with a readable date", months));
    }
    Ok(Out::new(format!("Months: {}", months.join(", ")), months))
}
