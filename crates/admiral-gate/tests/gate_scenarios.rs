//! Cross-task scenarios for the question gate.
//!
//! These run on the multi-threaded runtime so askers and the answering side
//! really race.

use std::time::Duration;

use admiral_gate::{
    AdmiralAnswer, AdmiralQuestion, AnswerResponse, AskContext, GateError, QuestionGate,
};
use futures_util::StreamExt;

fn question(id: &str) -> AdmiralQuestion {
    AdmiralQuestion::builder(id, "Which cache backend should the service use?")
        .agent("agent-7")
        .mission("M-42")
        .options(["Redis", "SQLite"])
        .build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_redis_scenario() {
    let gate = QuestionGate::new(8);
    let mut questions = gate.take_questions().expect("stream");

    let asker = gate.clone();
    let worker =
        tokio::spawn(async move { asker.ask(AskContext::background(), question("Q-1")).await });

    let asked = questions.next().await.expect("question");
    assert_eq!(asked.id, "Q-1");
    gate.submit_answer(AdmiralAnswer::selected("Q-1", "Redis"))
        .expect("accepted");

    let answer = worker.await.expect("join").expect("answer");
    assert_eq!(answer.response, AnswerResponse::Selected("Redis".into()));

    let history = gate.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, asked);
    assert_eq!(history[0].answer, answer);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_answer_reaches_its_own_asker() {
    let gate = QuestionGate::new(4);
    let mut questions = gate.take_questions().expect("stream");

    let mut workers = Vec::new();
    for i in 0..20 {
        let asker = gate.clone();
        workers.push(tokio::spawn(async move {
            let id = format!("Q-{i}");
            let answer = asker
                .ask(AskContext::background(), question(&id))
                .await
                .expect("answer");
            (id, answer)
        }));
    }

    for n in 0..20 {
        let asked = questions.next().await.expect("question");
        let option = if n % 2 == 0 { "Redis" } else { "SQLite" };
        gate.submit_answer(AdmiralAnswer::selected(&asked.id, option))
            .expect("accepted");
    }

    for worker in workers {
        let (id, answer) = worker.await.expect("join");
        assert_eq!(answer.question_id, id);
    }
    assert_eq!(gate.history().len(), 20);
    assert_eq!(gate.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_submit_and_cancel_resolve_once() {
    for round in 0..50 {
        let gate = QuestionGate::new(2);
        let id = format!("Q-race-{round}");
        let (ctx, cancel) = AskContext::cancellable();

        let asker = gate.clone();
        let ask_id = id.clone();
        let worker = tokio::spawn(async move { asker.ask(ctx, question(&ask_id)).await });
        while !gate.is_pending(&id) {
            tokio::task::yield_now().await;
        }

        let submitter = gate.clone();
        let submit_id = id.clone();
        let submit = tokio::spawn(async move {
            submitter.submit_answer(AdmiralAnswer::selected(submit_id, "Redis"))
        });
        cancel.cancel();

        let submitted = submit.await.expect("join");
        let asked = worker.await.expect("join");

        match (submitted, asked) {
            (Ok(()), Ok(answer)) => {
                assert_eq!(answer.question_id, id);
                assert_eq!(gate.history().len(), 1);
            }
            (Err(e), Err(GateError::Cancelled { .. })) => {
                assert!(e.is_not_found());
                assert!(gate.history().is_empty());
            }
            (submitted, asked) => panic!("inconsistent outcome: {submitted:?} / {asked:?}"),
        }
        assert!(!gate.is_pending(&id));
    }
}

#[tokio::test]
async fn test_full_mailbox_applies_backpressure() {
    let gate = QuestionGate::new(1);

    let first = gate.clone();
    let first =
        tokio::spawn(async move { first.ask(AskContext::background(), question("Q-first")).await });

    let (ctx, cancel) = AskContext::cancellable();
    let second = gate.clone();
    let second = tokio::spawn(async move { second.ask(ctx, question("Q-second")).await });

    while !(gate.is_pending("Q-first") && gate.is_pending("Q-second")) {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!second.is_finished());

    cancel.cancel();
    let err = second.await.expect("join").unwrap_err();
    assert!(err.is_cancellation());

    let mut questions = gate.take_questions().expect("stream");
    assert_eq!(questions.try_next().map(|q| q.id), Some("Q-first".to_string()));
    assert!(questions.try_next().is_none());

    gate.submit_answer(AdmiralAnswer::skip("Q-first")).expect("accepted");
    assert!(first.await.expect("join").expect("answer").is_skip());
}

#[tokio::test]
async fn test_stream_impl_skips_retracted_questions() {
    let gate = QuestionGate::new(4);
    let mut questions = gate.take_questions().expect("stream");

    let (ctx, cancel) = AskContext::cancellable();
    let gone = gate.clone();
    let gone = tokio::spawn(async move { gone.ask(ctx, question("Q-gone")).await });
    while !gate.is_pending("Q-gone") {
        tokio::task::yield_now().await;
    }
    cancel.cancel();
    assert!(gone.await.expect("join").is_err());

    let kept = gate.clone();
    let kept =
        tokio::spawn(async move { kept.ask(AskContext::background(), question("Q-kept")).await });

    let next = StreamExt::next(&mut questions).await.expect("question");
    assert_eq!(next.id, "Q-kept");

    gate.submit_answer(AdmiralAnswer::selected("Q-kept", "SQLite"))
        .expect("accepted");
    assert!(kept.await.expect("join").is_ok());
}

#[tokio::test]
async fn test_reused_id_after_completion() {
    let gate = QuestionGate::new(4);
    let mut questions = gate.take_questions().expect("stream");

    for option in ["Redis", "SQLite"] {
        let asker = gate.clone();
        let worker =
            tokio::spawn(async move { asker.ask(AskContext::background(), question("Q-1")).await });
        let asked = questions.next().await.expect("question");
        gate.submit_answer(AdmiralAnswer::selected(&asked.id, option))
            .expect("accepted");
        let answer = worker.await.expect("join").expect("answer");
        assert_eq!(answer.response, AnswerResponse::Selected(option.into()));
    }

    let history = gate.history();
    assert_eq!(history.len(), 2);
    assert!(history[0].answered_at <= history[1].answered_at);
}
