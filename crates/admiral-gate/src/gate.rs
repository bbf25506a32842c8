//! The question gate: a bounded mailbox of questions for the UI plus one
//! single-delivery reply slot per pending question.
//!
//! ## Protocol
//!
//! 1. An agent calls [`QuestionGate::ask`]. The exchange is registered in the
//!    pending map, takes one of the gate's mailbox slots, and is queued. With
//!    every slot taken the asker waits, subject to its [`AskContext`].
//! 2. The UI drains the mailbox through its [`QuestionStream`] and shows the
//!    question. Draining frees the slot but does not resolve anything.
//! 3. The UI calls [`QuestionGate::submit_answer`]. The answer is validated
//!    against the question, sent on the exchange's oneshot, and recorded in
//!    the history. All of that happens under the pending-map lock.
//! 4. If the asker's context ends first, the asker removes its own entry. An
//!    asker that finds its entry already gone knows the answer is sitting in
//!    its oneshot, so each question resolves exactly once.
//!
//! Each registration gets a sequence number. Mailbox items and retraction
//! carry it, so a question id reused after an earlier exchange ended never
//! touches the newer exchange. A slot belongs to its exchange, so a question
//! retracted before the UI reads it gives its slot back straight away.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, Stream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use admiral_core::config::DEFAULT_GATE_CAPACITY;

use crate::context::{AskContext, ContextDone};
use crate::error::{GateError, Result};
use crate::types::{AdmiralAnswer, AdmiralQuestion, HistoryEntry};
use crate::validation::validate_answer;

/// Gate construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Questions that may sit unconsumed before `ask` waits. Minimum 1.
    pub capacity: usize,
    /// Deadline applied to contexts that carry none.
    pub default_timeout: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_GATE_CAPACITY,
            default_timeout: None,
        }
    }
}

impl GateConfig {
    /// Set the mailbox capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the default question timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

/// A question waiting in the mailbox, tagged with its registration.
#[derive(Debug)]
struct Queued {
    seq: u64,
    question: AdmiralQuestion,
}

/// Bookkeeping for one asked-but-unresolved question.
#[derive(Debug)]
struct PendingExchange {
    seq: u64,
    question: AdmiralQuestion,
    reply: oneshot::Sender<AdmiralAnswer>,
    /// Held from enqueue until the UI reads the question
    slot: Option<OwnedSemaphorePermit>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct GateState {
    pending: HashMap<String, PendingExchange>,
    history: Vec<HistoryEntry>,
    next_seq: u64,
    shut_down: bool,
}

#[derive(Debug)]
struct Inner {
    config: GateConfig,
    slots: Arc<Semaphore>,
    mailbox_tx: mpsc::UnboundedSender<Queued>,
    mailbox_rx: Mutex<Option<mpsc::UnboundedReceiver<Queued>>>,
    state: Mutex<GateState>,
    shutdown_tx: watch::Sender<bool>,
}

/// Rendezvous point between asking agents and the operator UI.
///
/// Cheap to clone; all clones share one gate.
#[derive(Debug, Clone)]
pub struct QuestionGate {
    inner: Arc<Inner>,
}

impl Default for QuestionGate {
    fn default() -> Self {
        Self::with_config(GateConfig::default())
    }
}

impl QuestionGate {
    /// Create a gate with the given mailbox capacity.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(GateConfig::default().with_capacity(capacity))
    }

    /// Create a gate from a full config.
    pub fn with_config(config: GateConfig) -> Self {
        let config = GateConfig {
            capacity: config.capacity.max(1),
            ..config
        };
        let slots = Arc::new(Semaphore::new(config.capacity));
        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);

        debug!(
            capacity = config.capacity,
            default_timeout_secs = config.default_timeout.map(|t| t.as_secs()),
            "question gate created"
        );

        Self {
            inner: Arc::new(Inner {
                config,
                slots,
                mailbox_tx,
                mailbox_rx: Mutex::new(Some(mailbox_rx)),
                state: Mutex::new(GateState::default()),
                shutdown_tx,
            }),
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }

    /// Ask the operator a question and wait for the answer.
    ///
    /// Returns the validated answer, or:
    /// - [`GateError::Cancelled`] / [`GateError::DeadlineExceeded`] when `ctx`
    ///   ends first; the question is retracted
    /// - [`GateError::Shutdown`] when the gate shuts down
    /// - [`GateError::DuplicateQuestion`] when the id is already pending
    ///
    /// Dropping the returned future also retracts the question.
    pub async fn ask(&self, ctx: AskContext, question: AdmiralQuestion) -> Result<AdmiralAnswer> {
        let ctx = ctx.or_default_timeout(self.inner.config.default_timeout);
        let question_id = question.id.clone();

        let (seq, mut reply_rx) = self.inner.register(question.clone())?;
        let _retract = RetractOnDrop {
            inner: &self.inner,
            question_id: &question_id,
            seq,
        };

        debug!(
            question_id = %question_id,
            agent_id = %question.agent_id,
            mission_id = %question.mission_id,
            "question asked"
        );

        if let Some(done) = ctx.check() {
            return self.inner.finish_early(&question_id, seq, done, &mut reply_rx);
        }

        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();

        tokio::select! {
            biased;
            done = ctx.done() => {
                return self.inner.finish_early(&question_id, seq, done, &mut reply_rx);
            }
            _ = wait_for_shutdown(&mut shutdown_rx) => return Err(GateError::Shutdown),
            slot = Arc::clone(&self.inner.slots).acquire_owned() => {
                let slot = slot.map_err(|_| GateError::Shutdown)?;
                self.inner.enqueue(&question_id, seq, question, slot)?;
            }
        }

        tokio::select! {
            biased;
            reply = &mut reply_rx => reply.map_err(|_| GateError::Shutdown),
            done = ctx.done() => self.inner.finish_early(&question_id, seq, done, &mut reply_rx),
        }
    }

    /// Take the UI-side stream of pending questions.
    ///
    /// There is exactly one consumer; later calls return `None`.
    pub fn take_questions(&self) -> Option<QuestionStream> {
        let rx = lock(&self.inner.mailbox_rx).take()?;
        let mut signal_rx = self.inner.shutdown_tx.subscribe();
        Some(QuestionStream {
            rx,
            shutdown_rx: self.inner.shutdown_tx.subscribe(),
            shutdown_signal: Box::pin(async move { wait_for_shutdown(&mut signal_rx).await }),
            inner: Arc::clone(&self.inner),
        })
    }

    /// Deliver an answer to the agent waiting on it.
    ///
    /// Fails with [`GateError::NotFound`] when nothing is waiting on that id
    /// and with [`GateError::Validation`] when the answer breaks the
    /// question's rules. A rejected answer leaves the question pending.
    pub fn submit_answer(&self, answer: AdmiralAnswer) -> Result<()> {
        let mut state = self.inner.lock_state();

        let exchange = match state.pending.entry(answer.question_id.clone()) {
            Entry::Occupied(entry) => {
                if let Err(e) = validate_answer(&entry.get().question, &answer) {
                    info!(question_id = %answer.question_id, reason = %e, "answer rejected");
                    return Err(e.into());
                }
                entry.remove()
            }
            Entry::Vacant(_) => {
                warn!(question_id = %answer.question_id, "answer for unknown question");
                return Err(GateError::not_found(&answer.question_id));
            }
        };

        let PendingExchange {
            question,
            reply,
            created_at,
            ..
        } = exchange;

        if reply.send(answer.clone()).is_err() {
            // Asker dropped its future between registering and now
            debug!(question_id = %answer.question_id, "asker went away before delivery");
            return Err(GateError::not_found(&answer.question_id));
        }

        info!(
            question_id = %answer.question_id,
            agent_id = %question.agent_id,
            answer = %answer.summary(),
            "question answered"
        );

        state.history.push(HistoryEntry {
            question,
            answer,
            asked_at: created_at,
            answered_at: Utc::now(),
        });

        Ok(())
    }

    /// Completed exchanges, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock_state().history.clone()
    }

    /// Questions still waiting for an answer, oldest first.
    pub fn pending(&self) -> Vec<AdmiralQuestion> {
        let state = self.inner.lock_state();
        let mut exchanges: Vec<&PendingExchange> = state.pending.values().collect();
        exchanges.sort_by_key(|exchange| exchange.seq);
        exchanges.into_iter().map(|e| e.question.clone()).collect()
    }

    /// Number of questions waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// Whether a question with this id is waiting for an answer.
    pub fn is_pending(&self, question_id: &str) -> bool {
        self.inner.lock_state().pending.contains_key(question_id)
    }

    /// Shut the gate down.
    ///
    /// Every waiting `ask` returns [`GateError::Shutdown`], as does every
    /// later one. Idempotent.
    pub fn shutdown(&self) {
        let drained = {
            let mut state = self.inner.lock_state();
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            std::mem::take(&mut state.pending)
        };
        self.inner.slots.close();
        self.inner.shutdown_tx.send_replace(true);

        info!(outstanding = drained.len(), "question gate shut down");
        // Dropping the reply senders wakes the waiting askers
        drop(drained);
    }

    /// Whether [`QuestionGate::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock_state().shut_down
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        lock(&self.state)
    }

    fn register(
        &self,
        question: AdmiralQuestion,
    ) -> Result<(u64, oneshot::Receiver<AdmiralAnswer>)> {
        let mut state = self.lock_state();
        if state.shut_down {
            return Err(GateError::Shutdown);
        }
        if state.pending.contains_key(&question.id) {
            return Err(GateError::DuplicateQuestion {
                question_id: question.id,
            });
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        let (reply, reply_rx) = oneshot::channel();
        state.pending.insert(
            question.id.clone(),
            PendingExchange {
                seq,
                question,
                reply,
                slot: None,
                created_at: Utc::now(),
            },
        );
        Ok((seq, reply_rx))
    }

    /// Hand a slot to the exchange and queue its question.
    ///
    /// An exchange that ended while waiting for the slot is not queued and
    /// the slot goes straight back.
    fn enqueue(
        &self,
        question_id: &str,
        seq: u64,
        question: AdmiralQuestion,
        slot: OwnedSemaphorePermit,
    ) -> Result<()> {
        let mut state = self.lock_state();
        match state.pending.get_mut(question_id) {
            Some(exchange) if exchange.seq == seq => exchange.slot = Some(slot),
            _ => return Ok(()),
        }
        if self.mailbox_tx.send(Queued { seq, question }).is_err() {
            warn!(question_id = %question_id, "question mailbox closed");
            return Err(GateError::Shutdown);
        }
        Ok(())
    }

    /// Remove the exchange if it is still the one registered as `seq`.
    fn retract(&self, question_id: &str, seq: u64) -> bool {
        let mut state = self.lock_state();
        match state.pending.get(question_id) {
            Some(exchange) if exchange.seq == seq => {
                state.pending.remove(question_id);
                true
            }
            _ => false,
        }
    }

    /// Free the slot of a question the UI just read.
    ///
    /// False when the exchange already ended.
    fn mark_delivered(&self, question_id: &str, seq: u64) -> bool {
        match self.lock_state().pending.get_mut(question_id) {
            Some(exchange) if exchange.seq == seq => {
                exchange.slot = None;
                true
            }
            _ => false,
        }
    }

    /// Resolve an `ask` whose context ended.
    fn finish_early(
        &self,
        question_id: &str,
        seq: u64,
        done: ContextDone,
        reply_rx: &mut oneshot::Receiver<AdmiralAnswer>,
    ) -> Result<AdmiralAnswer> {
        if !self.retract(question_id, seq) {
            // Entry already gone: either answered (reply is waiting) or shut down
            return reply_rx.try_recv().map_err(|_| GateError::Shutdown);
        }

        let question_id = question_id.to_string();
        match done {
            ContextDone::Cancelled => {
                info!(question_id = %question_id, "question cancelled by asker");
                Err(GateError::Cancelled { question_id })
            }
            ContextDone::DeadlineExceeded => {
                info!(question_id = %question_id, "question timed out");
                Err(GateError::DeadlineExceeded { question_id })
            }
        }
    }
}

/// Removes the exchange when an `ask` future is dropped mid-wait.
struct RetractOnDrop<'a> {
    inner: &'a Inner,
    question_id: &'a str,
    seq: u64,
}

impl Drop for RetractOnDrop<'_> {
    fn drop(&mut self) {
        if self.inner.retract(self.question_id, self.seq) {
            debug!(question_id = %self.question_id, "question retracted");
        }
    }
}

/// UI-side consumer of asked questions, in arrival order.
///
/// Questions whose asker has already given up are skipped.
pub struct QuestionStream {
    rx: mpsc::UnboundedReceiver<Queued>,
    shutdown_rx: watch::Receiver<bool>,
    /// Wakes `poll_next` on shutdown; never polled after completing
    shutdown_signal: BoxFuture<'static, ()>,
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QuestionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionStream")
            .field("shut_down", &*self.shutdown_rx.borrow())
            .finish_non_exhaustive()
    }
}

impl QuestionStream {
    /// Wait for the next pending question. `None` once the gate shuts down.
    pub async fn next(&mut self) -> Option<AdmiralQuestion> {
        loop {
            if *self.shutdown_rx.borrow() {
                return None;
            }
            let queued = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut self.shutdown_rx) => return None,
                queued = self.rx.recv() => queued?,
            };
            if let Some(question) = self.accept(queued) {
                return Some(question);
            }
        }
    }

    /// Take the next pending question without waiting.
    ///
    /// Suited to a synchronous render loop.
    pub fn try_next(&mut self) -> Option<AdmiralQuestion> {
        if *self.shutdown_rx.borrow() {
            return None;
        }
        while let Ok(queued) = self.rx.try_recv() {
            if let Some(question) = self.accept(queued) {
                return Some(question);
            }
        }
        None
    }

    /// Drain every question that is ready now.
    pub fn drain_ready(&mut self) -> Vec<AdmiralQuestion> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    fn accept(&self, queued: Queued) -> Option<AdmiralQuestion> {
        if self.inner.mark_delivered(&queued.question.id, queued.seq) {
            Some(queued.question)
        } else {
            debug!(question_id = %queued.question.id, "skipping retracted question");
            None
        }
    }
}

impl Stream for QuestionStream {
    type Item = AdmiralQuestion;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            // shut_down is set before the signal fires
            let shut_down = this.inner.lock_state().shut_down;
            if shut_down || this.shutdown_signal.poll_unpin(cx).is_ready() {
                return Poll::Ready(None);
            }
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(queued)) => {
                    if let Some(question) = this.accept(queued) {
                        return Poll::Ready(Some(question));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|shut_down| *shut_down).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_question(id: &str) -> AdmiralQuestion {
        AdmiralQuestion::builder(id, "Which cache backend?")
            .agent("agent-7")
            .mission("M-42")
            .options(["Redis", "SQLite"])
            .build()
    }

    async fn wait_until_pending(gate: &QuestionGate, id: &str) {
        while !gate.is_pending(id) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_ask_and_answer() {
        let gate = QuestionGate::new(4);
        let mut questions = gate.take_questions().unwrap();

        let asker = gate.clone();
        let handle =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });

        let question = questions.next().await.unwrap();
        assert_eq!(question.id, "Q-1");
        assert!(gate.is_pending("Q-1"));

        gate.submit_answer(AdmiralAnswer::selected("Q-1", "Redis")).unwrap();

        let answer = handle.await.unwrap().unwrap();
        assert_eq!(answer, AdmiralAnswer::selected("Q-1", "Redis"));
        assert_eq!(gate.pending_count(), 0);

        let history = gate.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question.id, "Q-1");
        assert!(history[0].answered_at >= history[0].asked_at);
    }

    #[tokio::test]
    async fn test_second_answer_is_not_found() {
        let gate = QuestionGate::new(4);
        let asker = gate.clone();
        let handle =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });
        wait_until_pending(&gate, "Q-1").await;

        gate.submit_answer(AdmiralAnswer::selected("Q-1", "Redis")).unwrap();
        let err = gate
            .submit_answer(AdmiralAnswer::selected("Q-1", "SQLite"))
            .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(handle.await.unwrap().unwrap(), AdmiralAnswer::selected("Q-1", "Redis"));
        assert_eq!(gate.history().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let gate = QuestionGate::new(4);
        let err = gate.submit_answer(AdmiralAnswer::skip("Q-404")).unwrap_err();
        assert!(matches!(err, GateError::NotFound { ref question_id } if question_id == "Q-404"));
        assert!(gate.history().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_answer_keeps_question_pending() {
        let gate = QuestionGate::new(4);
        let asker = gate.clone();
        let mut handle =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });
        wait_until_pending(&gate, "Q-1").await;

        let err = gate
            .submit_answer(AdmiralAnswer::free_text("Q-1", "either"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(gate.is_pending("Q-1"));

        let still_waiting = tokio::time::timeout(Duration::from_millis(20), &mut handle).await;
        assert!(still_waiting.is_err());

        gate.submit_answer(AdmiralAnswer::selected("Q-1", "sqlite")).unwrap();
        assert_eq!(
            handle.await.unwrap().unwrap(),
            AdmiralAnswer::selected("Q-1", "sqlite")
        );
    }

    #[tokio::test]
    async fn test_cancel_retracts_question() {
        let gate = QuestionGate::new(4);
        let mut questions = gate.take_questions().unwrap();
        let (ctx, cancel) = AskContext::cancellable();

        let asker = gate.clone();
        let handle = tokio::spawn(async move { asker.ask(ctx, cache_question("Q-1")).await });
        wait_until_pending(&gate, "Q-1").await;

        cancel.cancel();
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, GateError::Cancelled { .. }));
        assert!(err.is_cancellation());

        let late = gate.submit_answer(AdmiralAnswer::selected("Q-1", "Redis"));
        assert!(late.unwrap_err().is_not_found());
        assert!(questions.try_next().is_none());
        assert!(gate.history().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_context_never_queues() {
        let gate = QuestionGate::new(4);
        let mut questions = gate.take_questions().unwrap();
        let (ctx, cancel) = AskContext::cancellable();
        cancel.cancel();

        let err = gate.ask(ctx, cache_question("Q-1")).await.unwrap_err();
        assert!(matches!(err, GateError::Cancelled { .. }));
        assert!(!gate.is_pending("Q-1"));
        assert!(questions.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let gate = QuestionGate::new(4);
        let err = gate
            .ask(AskContext::with_timeout(Duration::from_secs(30)), cache_question("Q-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::DeadlineExceeded { .. }));
        assert!(!gate.is_pending("Q-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_applies() {
        let gate = QuestionGate::with_config(
            GateConfig::default().with_default_timeout(Duration::from_secs(60)),
        );
        let err = gate
            .ask(AskContext::background(), cache_question("Q-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::DeadlineExceeded { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_pending_id_rejected() {
        let gate = QuestionGate::new(4);
        let asker = gate.clone();
        let _first =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });
        wait_until_pending(&gate, "Q-1").await;

        let err = gate
            .ask(AskContext::background(), cache_question("Q-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::DuplicateQuestion { .. }));
        assert!(gate.is_pending("Q-1"));
    }

    #[tokio::test]
    async fn test_dropped_ask_future_retracts() {
        let gate = QuestionGate::new(4);
        let asker = gate.clone();
        let handle =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });
        wait_until_pending(&gate, "Q-1").await;

        handle.abort();
        let _ = handle.await;

        assert!(!gate.is_pending("Q-1"));
        assert!(gate
            .submit_answer(AdmiralAnswer::selected("Q-1", "Redis"))
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_shutdown_unblocks_askers() {
        let gate = QuestionGate::new(4);
        let asker = gate.clone();
        let handle =
            tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question("Q-1")).await
            });
        wait_until_pending(&gate, "Q-1").await;

        gate.shutdown();
        assert!(matches!(handle.await.unwrap(), Err(GateError::Shutdown)));
        assert!(gate.is_shut_down());

        let later = gate.ask(AskContext::background(), cache_question("Q-2")).await;
        assert!(matches!(later, Err(GateError::Shutdown)));
    }

    #[tokio::test]
    async fn test_stream_ends_on_shutdown() {
        let gate = QuestionGate::new(4);
        let mut questions = gate.take_questions().unwrap();
        gate.shutdown();
        assert!(questions.next().await.is_none());
        assert!(questions.try_next().is_none());
    }

    #[tokio::test]
    async fn test_idle_stream_wakes_on_shutdown() {
        use futures_util::StreamExt;

        let gate = QuestionGate::new(4);
        let mut questions = gate.take_questions().unwrap();
        let reader = tokio::spawn(async move { StreamExt::next(&mut questions).await });

        // Let the reader park on the empty mailbox
        tokio::task::yield_now().await;
        gate.shutdown();
        assert!(reader.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_single_consumer() {
        let gate = QuestionGate::new(4);
        assert!(gate.take_questions().is_some());
        assert!(gate.take_questions().is_none());
    }

    #[tokio::test]
    async fn test_pending_ordered_by_arrival() {
        let gate = QuestionGate::new(8);
        let mut handles = Vec::new();
        for id in ["Q-a", "Q-b", "Q-c"] {
            let asker = gate.clone();
            handles.push(tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question(id)).await
            }));
            wait_until_pending(&gate, id).await;
        }

        let ids: Vec<String> = gate.pending().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["Q-a", "Q-b", "Q-c"]);

        gate.shutdown();
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
    }

    #[tokio::test]
    async fn test_retracted_question_frees_its_slot() {
        let gate = QuestionGate::new(1);
        let mut questions = gate.take_questions().unwrap();

        let (ctx, cancel) = AskContext::cancellable();
        let asker = gate.clone();
        let first = tokio::spawn(async move { asker.ask(ctx, cache_question("Q-a")).await });
        wait_until_pending(&gate, "Q-a").await;
        cancel.cancel();
        assert!(first.await.unwrap().unwrap_err().is_cancellation());

        // The cancelled question was never read, yet the next one gets queued
        let asker = gate.clone();
        let second = tokio::spawn(async move {
            asker
                .ask(AskContext::with_timeout(Duration::from_millis(500)), cache_question("Q-b"))
                .await
        });
        let question = tokio::time::timeout(Duration::from_millis(200), questions.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(question.id, "Q-b");

        gate.submit_answer(AdmiralAnswer::selected("Q-b", "SQLite")).unwrap();
        assert_eq!(second.await.unwrap().unwrap(), AdmiralAnswer::selected("Q-b", "SQLite"));
    }

    #[tokio::test]
    async fn test_read_question_frees_its_slot() {
        let gate = QuestionGate::new(1);
        let mut questions = gate.take_questions().unwrap();

        let mut handles = Vec::new();
        for id in ["Q-a", "Q-b"] {
            let asker = gate.clone();
            handles.push(tokio::spawn(async move {
                asker.ask(AskContext::background(), cache_question(id)).await
            }));
            assert_eq!(questions.next().await.unwrap().id, id);
        }
        assert_eq!(gate.pending_count(), 2);

        gate.shutdown();
        for handle in handles {
            assert!(matches!(handle.await.unwrap(), Err(GateError::Shutdown)));
        }
    }

    #[test]
    fn test_default_capacity_matches_config() {
        let settings = admiral_core::GateSettings::default();
        assert_eq!(GateConfig::default().capacity, settings.capacity);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let gate = QuestionGate::new(0);
        assert_eq!(gate.config().capacity, 1);
    }
}
