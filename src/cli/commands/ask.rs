//! Ask Command
//!
//! Run one question through the full pipeline from the terminal.
//!
//! Usage:
//!   clubguide ask "I like robotics" [-f json]

use chrono::Utc;
use serde_json::json;
use std::time::Duration;

use crate::cli::ui::Output;
use crate::config::Config;
use crate::orchestrator::{AnsweredReply, Orchestrator, Reply};
use crate::telemetry::wait_for_delivery;
use crate::types::{Result, SessionId};

/// Grace period on top of the telemetry timeout before the process exits
const DELIVERY_GRACE: Duration = Duration::from_secs(1);

pub async fn run(config: &Config, question: &str, format: &str) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let reply = orchestrator
        .handle(&SessionId::generate(), Some(question), Utc::now())
        .await?;

    let answered = match reply {
        Reply::Answered(answered) => answered,
        // A fresh session is never throttled
        Reply::Throttled { retry_after } => {
            Output::new().warning(&format!("Throttled, retry in {:?}", retry_after));
            return Ok(());
        }
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary(&answered))?);
    } else {
        print_text(&answered);
    }

    if let Some(handle) = answered.telemetry
        && !wait_for_delivery(handle, config.telemetry.timeout() + DELIVERY_GRACE).await
    {
        Output::new().warning("Telemetry delivery did not finish before exit");
    }

    Ok(())
}

fn summary(answered: &AnsweredReply) -> serde_json::Value {
    let attempts: Vec<_> = answered
        .attempts
        .iter()
        .map(|attempt| {
            json!({
                "provider": attempt.provider_id,
                "succeeded": attempt.succeeded(),
                "duration_ms": attempt.duration_ms,
                "error": attempt.failure().map(|err| err.to_string()),
            })
        })
        .collect();

    json!({
        "response": answered.answer.text,
        "source": answered.answer.source,
        "rank": answered.rank,
        "attempts": attempts,
    })
}

fn print_text(answered: &AnsweredReply) {
    let output = Output::new();

    output.section("Answer");
    println!("{}", answered.answer.text);

    output.section("Details");
    output.field("Source", answered.answer.source.as_str());
    output.field("Rank", &answered.rank.to_string());

    if !answered.attempts.is_empty() {
        println!();
        for attempt in &answered.attempts {
            output.attempt(attempt);
        }
    }

    if answered.answer.source.is_fallback() {
        println!();
        output.warning("Every provider failed; the fallback answer was returned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AiAnswer, AttemptOutcome, ErrorCategory, LlmError, ProviderAttempt, Rank};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_with_failure() -> AnsweredReply {
        AnsweredReply {
            answer: AiAnswer::from_provider("2. 物理研究部", "openrouter"),
            rank: Rank::new(2).unwrap(),
            attempts: vec![
                ProviderAttempt {
                    provider_id: "openai".to_string(),
                    outcome: AttemptOutcome::Failure(LlmError::new(
                        ErrorCategory::RateLimit,
                        "slow down",
                    )),
                    duration_ms: 12,
                },
                ProviderAttempt {
                    provider_id: "openrouter".to_string(),
                    outcome: AttemptOutcome::Success("2. 物理研究部".to_string()),
                    duration_ms: 40,
                },
            ],
            telemetry: None,
        }
    }

    #[test]
    fn test_summary_shape() {
        let value = summary(&reply_with_failure());
        assert_eq!(value["source"], "openrouter");
        assert_eq!(value["rank"], 2);
        assert_eq!(value["attempts"][0]["succeeded"], false);
        assert!(value["attempts"][0]["error"].as_str().unwrap().contains("slow down"));
        assert_eq!(value["attempts"][1]["error"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_ask_against_mock_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "1. 物理研究部"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.providers.primary.api_base = format!("{}/v1", server.uri());
        config.providers.primary.api_key = Some("test-key".to_string());
        config.providers.secondary.enabled = false;
        config.telemetry.enabled = false;

        run(&config, "I like robotics", "json").await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_without_providers_fails() {
        let mut config = Config::default();
        config.providers.primary.enabled = false;
        config.providers.secondary.enabled = false;
        config.telemetry.enabled = false;

        let err = run(&config, "hello", "text").await.unwrap_err();
        assert_eq!(err.http_status(), 503);
    }
}
