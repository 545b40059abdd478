use anyhow::Result;

use super::CovergenClient;
use crate::application::services::batch_import::ImportSummary;

pub struct ImportsClient<'a> {
    client: &'a CovergenClient,
}

impl<'a> ImportsClient<'a> {
    pub fn new(client: &'a CovergenClient) -> Self {
        Self { client }
    }

    /// Upload a ZIP archive of cover images for batch import.
    pub async fn upload(&self, archive: Vec<u8>) -> Result<ImportSummary> {
        let url = self.client.endpoint("api/v1/import")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .body(archive)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
