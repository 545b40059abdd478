use anyhow::Result;

use super::CovergenClient;
use crate::domain::ids::ProjectId;
use crate::domain::listing::Page;
use crate::domain::projects::ProjectWithVersionCount;

pub struct ProjectsClient<'a> {
    client: &'a CovergenClient,
}

impl<'a> ProjectsClient<'a> {
    pub fn new(client: &'a CovergenClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<u32>,
    ) -> Result<Page<ProjectWithVersionCount>> {
        let mut url = self.client.endpoint("api/v1/projects")?;
        if let Some(term) = search {
            url.query_pairs_mut().append_pair("search", term);
        }
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn delete(&self, id: ProjectId) -> Result<()> {
        let url = self.client.endpoint(&format!("api/v1/projects/{id}"))?;
        let response = self
            .client
            .request(reqwest::Method::DELETE, url)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.client.response_error(response).await)
        }
    }
}
