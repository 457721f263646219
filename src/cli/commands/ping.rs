use std::time::Duration;

use serde_json::Value;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    match client.get(&url).timeout(Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            output_success(output_format, &format!("{} is up", base_url), Some(body))
        }
        Ok(response) => {
            output_error(output_format, &format!("{} responded with {}", base_url, response.status()))?;
            anyhow::bail!("server unhealthy")
        }
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", base_url, e))?;
            anyhow::bail!("server unreachable")
        }
    }
}
