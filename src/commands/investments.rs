use crate::args::InvestmentsArgs;
use crate::commands::Out;
use crate::investments::Portfolio;
use crate::render::{render_portfolio, Rendered};
use crate::{Config, Result};
use tracing::warn;

/// Summarizes the investment holdings listed in `config.json`: the holdings themselves, the
/// yield on each date and the totals.
///
/// Holdings are not read from the transaction source, so this never touches the network.
pub fn investments(config: &Config, args: &InvestmentsArgs) -> Result<Out<Rendered>> {
    let portfolio = Portfolio::new(config.investments(), config.date_order());
    let skipped = match portfolio.dropped {
        0 => String::new(),
        n => format!(", {n} skipped"),
    };
    if portfolio.is_empty() {
        let message = format!(
            "There are no investments in {}{skipped}. List them under \"investments\"",
            config.config_path().display()
        );
        warn!("{message}");
        return Ok(Out::new_message(message));
    }

    let message = format!(
        "{} investments, {} invested, {} total yield{skipped}",
        portfolio.holdings.len(),
        portfolio.total_invested,
        portfolio.total_yield
    );
    let rendered = render_portfolio(&portfolio, args.format(), config.date_order())?;
    Ok(Out::new(message, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OutputFormat;
    use crate::test::TestEnv;
    use tempfile::TempDir;

    async fn config_with(investments: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let json = format!(
            r#"{{
                "app_name": "cashflow",
                "config_version": 1,
                "source": {{ "kind": "csv", "path": "data.csv" }},
                "investments": {investments}
            }}"#
        );
        std::fs::write(dir.path().join("config.json"), json).unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn test_investments_table() {
        let (_dir, config) = config_with(
            r#"[
                {
                    "instituição": "Nubank",
                    "valor_investido": "R$ 1.000,00",
                    "data_do_rendimento": "02/03/2025",
                    "valor_do_rendimento": "R$ 10,96",
                    "ativo": "CDI",
                    "tipo": "Renda Fixa",
                    "taxa_atual": 13.15
                },
                {
                    "institution": "Nubank",
                    "invested": "R$ 1.000,00",
                    "yield_date": "N/A",
                    "yield_amount": "R$ 1,00",
                    "asset": "CDI",
                    "type": "Renda Fixa"
                }
            ]"#,
        )
        .await;
        let out = investments(&config, &InvestmentsArgs::default()).unwrap();
        assert_eq!(
            out.message(),
            "1 investments, R$1.000,00 invested, R$10,96 total yield, 1 skipped"
        );
        let text = out.structure().unwrap().to_string();
        assert!(text.contains("## Yield by date"));
        assert!(text.contains("| 02/03/2025 | R$10,96 |"));
    }

    #[tokio::test]
    async fn test_investments_as_json() {
        let (_dir, config) = config_with(
            r#"[{
                "institution": "Inter",
                "invested": 500,
                "yield_date": "2025-04-01",
                "yield_amount": "4.50",
                "asset": "CDB",
                "type": "Renda Fixa"
            }]"#,
        )
        .await;
        let args = InvestmentsArgs::new(OutputFormat::Json);
        let out = investments(&config, &args).unwrap();
        let Some(Rendered::Json(value)) = out.structure() else {
            panic!("expected json");
        };
        assert_eq!(value["total_invested"], "500");
        assert_eq!(value["total_yield"], "4.50");
        assert_eq!(value["dropped"], 0);
    }

    #[tokio::test]
    async fn test_no_investments() {
        let env = TestEnv::new().await;
        let out = investments(env.config(), &InvestmentsArgs::default()).unwrap();
        assert!(out.message().starts_with("There are no investments in "));
        assert!(out.structure().is_none());
    }
}
