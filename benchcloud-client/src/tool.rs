//! Tool version endpoint

use reqwest::StatusCode;
use reqwest::header::ACCEPT;

use crate::CloudClient;
use crate::error::Result;

impl CloudClient {
    /// Resolves a branch and a possibly symbolic revision (e.g. `HEAD`)
    /// to the concrete revision the service will use
    pub async fn resolve_tool_version(&self, branch: &str, revision: &str) -> Result<String> {
        let url = format!("{}tool/version", self.base_url());
        let response = self
            .client
            .get(&url)
            .query(&[("svnBranch", branch), ("revision", revision)])
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        let response = Self::expect_status(response, &[StatusCode::OK]).await?;
        Ok(response.text().await?.trim().to_string())
    }
}
