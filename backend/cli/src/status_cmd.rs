//! `ambassador status`: query a running server.

use std::time::Duration;

use anyhow::Result;

use ambassador_config::AmbassadorConfig;

use crate::terminal_output::note_error;

pub async fn run(config: &AmbassadorConfig) -> Result<()> {
    let url = health_url(config);
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
    match client.get(&url).send().await {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(e) => note_error(&format!("AI Ambassador is not reachable at {url}: {e}")),
    }
    Ok(())
}

/// A wildcard bind address is queried over loopback.
fn health_url(config: &AmbassadorConfig) -> String {
    let host = match config.gateway.bind.as_str() {
        "0.0.0.0" | "::" | "" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{}/api/health", config.gateway.port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_bind_uses_loopback() {
        let mut config = AmbassadorConfig::default();
        assert_eq!(health_url(&config), "http://127.0.0.1:5000/api/health");
        config.gateway.bind = "10.0.0.5".into();
        config.gateway.port = 8080;
        assert_eq!(health_url(&config), "http://10.0.0.5:8080/api/health");
    }
}
