//! Scripted agents for `--demo`.
//!
//! Each agent waits a moment, asks one question through the gate, and logs
//! how the exchange ended.

use std::time::Duration;

use admiral_gate::{AdmiralQuestion, AskContext, QuestionGate};
use tracing::{info, warn};

struct Script {
    delay: Duration,
    timeout: Option<Duration>,
    question: AdmiralQuestion,
}

fn scripts() -> Vec<Script> {
    vec![
        Script {
            delay: Duration::from_secs(1),
            timeout: None,
            question: AdmiralQuestion::with_generated_id(
                "Which cache backend should the API use?",
            )
            .agent("agent-7")
            .mission("M-42")
            .context("api/cache.rs")
            .options(["Redis", "SQLite", "In-process LRU"])
            .build(),
        },
        Script {
            delay: Duration::from_secs(3),
            timeout: None,
            question: AdmiralQuestion::with_generated_id(
                "What should the new migration be called?",
            )
            .agent("agent-3")
            .mission("M-42")
            .allow_free_text(true)
            .allow_broadcast(true)
            .build(),
        },
        Script {
            delay: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(45)),
            question: AdmiralQuestion::with_generated_id(
                "Tests are flaky on CI. Retry or skip the suite?",
            )
            .agent("agent-2")
            .mission("M-43")
            .options(["retry", "skip"])
            .build(),
        },
    ]
}

/// Spawn every scripted agent and wait for all of them.
pub async fn run(gate: QuestionGate) {
    let mut agents = Vec::new();
    for script in scripts() {
        let gate = gate.clone();
        agents.push(tokio::spawn(async move {
            tokio::time::sleep(script.delay).await;

            let ctx = match script.timeout {
                Some(timeout) => AskContext::with_timeout(timeout),
                None => AskContext::background(),
            };
            let agent = script.question.agent_id.clone();
            let question_id = script.question.id.clone();

            match gate.ask(ctx, script.question).await {
                Ok(answer) => info!(
                    agent = %agent,
                    question_id = %question_id,
                    answer = %answer.summary(),
                    "Demo agent resumed"
                ),
                Err(e) => warn!(
                    agent = %agent,
                    question_id = %question_id,
                    error = %e,
                    "Demo agent gave up"
                ),
            }
        }));
    }

    for agent in agents {
        if let Err(e) = agent.await {
            warn!("Demo agent task failed: {}", e);
        }
    }
}
