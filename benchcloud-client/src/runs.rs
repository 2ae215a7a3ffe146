//! Run-related API endpoints

use async_trait::async_trait;
use benchcloud_core::domain::state::RunState;
use benchcloud_core::dto::submission::RunSubmission;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{CloudClient, RunService};

/// URL-encodes form parameters and deflate-compresses the result
pub fn encode_body(params: &[(&str, String)]) -> Result<Vec<u8>> {
    let form = serde_urlencoded::to_string(params)
        .map_err(|e| ClientError::Malformed(format!("Failed to encode parameters: {}", e)))?;

    let compress = || -> std::io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(form.as_bytes())?;
        encoder.finish()
    };

    compress().map_err(|e| ClientError::Malformed(format!("Failed to compress parameters: {}", e)))
}

#[async_trait]
impl RunService for CloudClient {
    async fn submit_run(&self, submission: &RunSubmission) -> Result<String> {
        let url = format!("{}runs/", self.base_url());
        let body = encode_body(&submission.form_params())?;

        debug!(
            "Submitting run {} ({} bytes compressed)",
            submission.run_identifier,
            body.len()
        );

        let response = self
            .authorized(self.client.post(&url))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(CONTENT_ENCODING, "deflate")
            .header(ACCEPT, "text/plain")
            .body(body)
            .send()
            .await?;

        let response = Self::expect_status(response, &[StatusCode::OK]).await?;
        let run_id = response.text().await?.trim().to_string();

        if run_id.is_empty() {
            return Err(ClientError::Malformed(
                "Service accepted the run but returned no identifier".to_string(),
            ));
        }

        Ok(run_id)
    }

    async fn run_state(&self, run_id: &str) -> Result<RunState> {
        let url = format!("{}runs/{}/state", self.base_url(), run_id);
        let response = self
            .authorized(self.client.get(&url))
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        let response = Self::expect_status(response, &[StatusCode::OK]).await?;
        Ok(RunState::parse(&response.text().await?))
    }

    async fn run_result(&self, run_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}runs/{}/result", self.base_url(), run_id);
        let response = self
            .authorized(self.client.get(&url))
            .header(ACCEPT, "application/zip")
            .send()
            .await?;

        let response = Self::expect_status(response, &[StatusCode::OK]).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn stop_run(&self, run_id: &str) -> Result<()> {
        let url = format!("{}runs/{}", self.base_url(), run_id);
        let response = self.authorized(self.client.delete(&url)).send().await?;

        Self::expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn test_encode_body_is_compressed_form() {
        let params = vec![
            ("programText", "int main() { return 0; }".to_string()),
            ("option", "statistics.print=true".to_string()),
            ("option", "analysis.machineModel=Linux64".to_string()),
        ];

        let body = encode_body(&params).unwrap();

        let mut form = String::new();
        ZlibDecoder::new(body.as_slice())
            .read_to_string(&mut form)
            .unwrap();

        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(&form).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].1, "int main() { return 0; }");
        assert_eq!(decoded[2].0, "option");
        assert_eq!(decoded[2].1, "analysis.machineModel=Linux64");
    }
}
