//! Implements the `Source` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a network connection.

use crate::api::Source;
use crate::model::RawTable;
use crate::Result;
use anyhow::Context;

/// A `Source` that serves CSV text held in memory. By default it is seeded with a few months of
/// household transactions, including a couple of rows the pipeline has to drop.
pub(crate) struct TestSource {
    data: String,
}

impl TestSource {
    pub(crate) fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl Default for TestSource {
    fn default() -> Self {
        Self::new(SEED_DATA)
    }
}

#[async_trait::async_trait]
impl Source for TestSource {
    fn describe(&self) -> String {
        "built-in test data".to_string()
    }

    async fn fetch(&mut self) -> Result<RawTable> {
        RawTable::parse_csv(&self.data).context("Unable to parse the test data")
    }
}

/// Seed transaction data.
pub(crate) const SEED_DATA: &str = r##"Data,Categoria,Tipo,Valor
05/01/2025,Aluguel,Saída,"R$ 1.200,00"
05/01/2025,Salário,Entrada,"R$ 3.500,00"
10/01/2025,Internet,Saída,"R$ 99,90"
18/01/2025,Extra,Entrada,"R$ 150,50"
22/01/2025,Mercado,Saída,"R$ 640,35"
05/02/2025,Aluguel,Saída,"R$ 1.200,00"
05/02/2025,Salário,Entrada,"R$ 3.500,00"
10/02/2025,Internet,Saída,"R$ 99,90"
14/02/2025,Mercado,Saída,"R$ 512,10"
N/A,Extra,Entrada,"R$ 80,00"
05/03/2025,Aluguel,Saída,"R$ 1.200,00"
05/03/2025,Salário,Entrada,"R$ 3.500,00"
10/03/2025,Internet,Saída,"R$ 99,90"
21/03/2025,Extra,Entrada,"R$ 200,00"
28/03/2025,Mercado,Saída,a definir
"##;
