use crate::api::Mode;
use crate::commands::{load_dashboard, Out};
use crate::pipeline::TypeFilter;
use crate::{Config, Result};

/// Lists the values accepted by `report --type`: `both`, then every type label in the order it
/// first appears in the data.
pub async fn types(config: &Config, mode: Mode) -> Result<Out<Vec<TypeFilter>>> {
    let dashboard = load_dashboard(config, mode).await?;
    let types = dashboard.available_types();
    let listed = types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Out::new(format!("Transaction types: {listed}"), types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_types_from_test_data() {
        let env = TestEnv::new().await;
        let out = types(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), "Transaction types: both, Saída, Entrada");
        assert_eq!(out.structure().unwrap().len(), 3);
    }
}
