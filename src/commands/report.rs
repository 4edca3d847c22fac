use crate::api::Mode;
use crate::args::{OutputFormat, ReportArgs};
use crate::commands::{load_dashboard, Out};
use crate::dashboard::Selection;
use crate::render::{render, rows_csv, Rendered};
use crate::{Config, Result};
use tracing::warn;

/// Filters the transactions by the range and type in `args` and renders the totals, or the rows
/// themselves with `--rows`.
///
/// An empty selection is not an error: the message says why nothing matched and the rendered
/// output carries the same explanation.
///
/// # Errors
/// - The source cannot be read.
/// - `--from`, `--to` or `--month` is not a date.
pub async fn report(config: &Config, mode: Mode, args: &ReportArgs) -> Result<Out<Rendered>> {
    let dashboard = load_dashboard(config, mode).await?;
    let range = dashboard.resolve_range(args.from(), args.to(), args.month())?;
    let selection = Selection {
        range,
        types: args.types().clone(),
    };
    let report = dashboard.report(&selection);
    let message = report.message(dashboard.date_order());
    if report.is_empty() {
        warn!("{message}");
    }
    let rendered = match args.format() {
        OutputFormat::Csv if args.rows() => rows_csv(&report)?,
        format => render(&report, format, dashboard.date_order())?,
    };
    Ok(Out::new(message, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TypeFilter;
    use crate::test::TestEnv;

    fn args(
        from: Option<&str>,
        to: Option<&str>,
        month: Option<&str>,
        types: TypeFilter,
        format: OutputFormat,
    ) -> ReportArgs {
        ReportArgs::new(
            from.map(str::to_string),
            to.map(str::to_string),
            month.map(str::to_string),
            types,
            format,
        )
    }

    #[tokio::test]
    async fn test_report_whole_dataset() {
        let env = TestEnv::new().await;
        let out = report(env.config(), Mode::Test, &ReportArgs::default())
            .await
            .unwrap();
        assert!(out
            .message()
            .starts_with("13 transactions from 05/01/2025 to 21/03/2025"));
        let rendered = out.structure().unwrap().to_string();
        assert!(rendered.contains("## By category and type"));
    }

    #[tokio::test]
    async fn test_report_month_and_type_as_json() {
        let env = TestEnv::new().await;
        let a = args(
            None,
            None,
            Some("02/2025"),
            TypeFilter::Only("Saída".into()),
            OutputFormat::Json,
        );
        let out = report(env.config(), Mode::Test, &a).await.unwrap();
        let Some(Rendered::Json(value)) = out.structure() else {
            panic!("expected json");
        };
        assert_eq!(value["status"], "rows");
        assert_eq!(value["aggregates"]["count"], 3);
        assert_eq!(value["aggregates"]["grand_total"], "1812.00");
        assert_eq!(value["dropped"]["bad_date"], 1);
    }

    #[tokio::test]
    async fn test_report_empty_range() {
        let env = TestEnv::new().await;
        let a = args(
            Some("01/12/2024"),
            Some("12/2024"),
            None,
            TypeFilter::Both,
            OutputFormat::Csv,
        );
        let out = report(env.config(), Mode::Test, &a).await.unwrap();
        assert_eq!(
            out.message(),
            "No transactions found from 01/12/2024 to 31/12/2024"
        );
        assert_eq!(
            out.structure().unwrap().to_string(),
            "category,type,total,count\n"
        );
    }

    #[tokio::test]
    async fn test_report_bad_date_is_an_error() {
        let env = TestEnv::new().await;
        let a = args(
            Some("someday"),
            None,
            None,
            TypeFilter::Both,
            OutputFormat::Table,
        );
        let err = report(env.config(), Mode::Test, &a).await.unwrap_err();
        assert!(err.to_string().contains("'someday' is not a date"));
    }

    #[tokio::test]
    async fn test_report_from_csv_source() {
        let env = TestEnv::with_csv(
            "Date,Category,Type,Amount\n\
             01/01/2025,Rent,Outflow,1000\n\
             01/01/2025,Salary,Inflow,3000\n\
             N/A,Rent,Outflow,1000\n",
        )
        .await;
        let a = args(None, None, None, TypeFilter::Both, OutputFormat::Csv);
        let out = report(env.config(), Mode::Live, &a).await.unwrap();
        let text = out.structure().unwrap().to_string();
        assert_eq!(
            text,
            "category,type,total,count\nRent,Outflow,1000,1\nSalary,Inflow,3000,1\n"
        );

        let a = args(None, Some("01/2025"), None, TypeFilter::Both, OutputFormat::Csv);
        let out = report(env.config(), Mode::Live, &a.with_rows(true))
            .await
            .unwrap();
        let text = out.structure().unwrap().to_string();
        assert_eq!(
            text,
            "date,category,type,amount\n\
             2025-01-01,Rent,Outflow,1000\n\
             2025-01-01,Salary,Inflow,3000\n"
        );
    }
}
