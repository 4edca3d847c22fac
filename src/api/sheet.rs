//! Implements the `Source` trait by downloading the CSV export of a Google sheet that is shared by
//! link. No credentials are involved, so a private sheet cannot be read this way.

use crate::api::Source;
use crate::model::RawTable;
use crate::Result;
use anyhow::{bail, Context};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};
use url::Url;

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d/";

pub(crate) struct GoogleSheetSource {
    url: Url,
    client: reqwest::Client,
}

impl GoogleSheetSource {
    pub(crate) fn new(spreadsheet_id: &str, sheet_name: Option<&str>) -> Result<Self> {
        let url = export_url(spreadsheet_id, sheet_name)?;
        let client = reqwest::Client::builder()
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { url, client })
    }
}

#[async_trait::async_trait]
impl Source for GoogleSheetSource {
    fn describe(&self) -> String {
        format!("Google sheet {}", self.url)
    }

    async fn fetch(&mut self) -> Result<RawTable> {
        debug!("Downloading {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to download {}", self.url))?
            .error_for_status()
            .context("The sheet could not be downloaded")?;

        // A sheet that is not shared by link answers with the HTML sign-in page.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/html"))
            .unwrap_or(false);
        if is_html {
            bail!("The sheet did not return CSV data. Make sure it is shared with 'Anyone with the link'")
        }

        let text = response
            .text()
            .await
            .context("Unable to read the sheet data")?;
        trace!("Received {} bytes", text.len());
        RawTable::parse_csv(&text).context("Unable to parse the sheet data")
    }
}

/// The CSV export URL for a spreadsheet: the named tab through the visualization endpoint, or the
/// first tab through the plain export.
fn export_url(spreadsheet_id: &str, sheet_name: Option<&str>) -> Result<Url> {
    let base = Url::parse(SHEETS_BASE_URL).context("Invalid base URL")?;
    let mut url = match sheet_name {
        Some(_) => base.join(&format!("{spreadsheet_id}/gviz/tq")),
        None => base.join(&format!("{spreadsheet_id}/export")),
    }
    .with_context(|| format!("Invalid spreadsheet ID '{spreadsheet_id}'"))?;

    match sheet_name {
        Some(name) => {
            url.query_pairs_mut()
                .append_pair("tqx", "out:csv")
                .append_pair("sheet", name);
        }
        None => {
            url.query_pairs_mut().append_pair("format", "csv");
        }
    }
    Ok(url)
}
