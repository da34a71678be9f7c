//! Check Command
//!
//! Probe every configured provider with its health check.
//!
//! Usage:
//!   clubguide check

use crate::cli::ui::Output;
use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::types::{GuideError, Result};

pub async fn run(config: &Config) -> Result<()> {
    let output = Output::new();
    let orchestrator = Orchestrator::from_config(config)?;
    let chain = orchestrator.chain();

    if chain.is_empty() {
        output.error("No provider has credentials (set OPENAI_API_KEY or OPENROUTER_API_KEY)");
        return Err(GuideError::NoProviders);
    }

    output.section("Providers");
    let report = chain.health_report().await;
    for (descriptor, (id, healthy)) in chain.providers().iter().zip(&report) {
        let line = format!(
            "{} ({}, timeout {}s)",
            id,
            descriptor.provider.model(),
            descriptor.timeout.as_secs()
        );
        if *healthy {
            output.success(&line);
        } else {
            output.error(&line);
        }
    }

    println!();
    match report.iter().filter(|(_, healthy)| *healthy).count() {
        0 => output.warning("No provider is reachable; questions will receive the fallback answer"),
        n if n == report.len() => output.success("All providers reachable"),
        n => output.info(&format!("{} of {} providers reachable", n, report.len())),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_check_hits_models_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.providers.primary.api_base = format!("{}/v1", server.uri());
        config.providers.primary.api_key = Some("test-key".to_string());
        config.providers.secondary.enabled = false;
        config.telemetry.enabled = false;

        run(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_without_providers() {
        let mut config = Config::default();
        config.providers.primary.enabled = false;
        config.providers.secondary.enabled = false;

        assert!(matches!(run(&config).await, Err(GuideError::NoProviders)));
    }
}
