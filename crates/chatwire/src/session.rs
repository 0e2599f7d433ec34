//! The streaming conversation engine.
//!
//! A [`Session`] owns the transcript and drives it through one request at a
//! time:
//!
//! ```text
//!          send()                 2xx                  end-of-stream
//!   Idle ─────────► Sent ──────────────► Streaming ──────────────► Idle
//!                    │                       │
//!                    │ non-2xx / transport   │ transport drop
//!                    ▼                       ▼
//!             rollback, Err(..)       keep partial reply, Interrupted
//!                    │                       │
//!                    └──────────► Idle ◄─────┘
//! ```
//!
//! * `send` while a request is in flight is ignored ([`SendOutcome::Ignored`]);
//!   there is no queue and no cancellation.
//! * Every transcript change is published as a full snapshot to the
//!   [`TranscriptObserver`]: once after the user turn is appended, once for
//!   the empty assistant reply, once per non-empty delta, and once more if a
//!   failed request is rolled back.
//! * A failure before streaming restores the transcript exactly as it was
//!   before `send`, system message included. Dropping the `send` future
//!   before streaming starts does the same.
//!
//! The lock guarding the state is only held between suspension points, never
//! across an `.await`.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatwire_core::{
    credential::Credential,
    error::{ChatError, Result},
    provider::StreamingChatProvider,
    transcript::{Message, Transcript},
};
use chatwire_types::{
    clock::{Clock, SystemClock},
    fragments::{DEFAULT_INSTRUCTIONS, SystemPreamble},
};
use futures_util::StreamExt;

use crate::request::build_request;

/// Where the session is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No outstanding request; `send` is accepted.
    Idle,
    /// Request dispatched, waiting for the response status.
    Sent,
    /// 2xx received, deltas are being applied.
    Streaming,
}

/// How a call to [`Session::send`] ended, short of a surfaced error.
#[derive(Debug)]
pub enum SendOutcome {
    /// The stream ended normally. `reply` may be empty.
    Completed { reply: String },
    /// The connection dropped mid-stream. The transcript keeps the user turn
    /// and whatever part of the reply had arrived.
    Interrupted { partial: String, error: ChatError },
    /// Another request was still in flight; nothing happened.
    Ignored,
}

/// Receives a full transcript snapshot after every mutation.
pub trait TranscriptObserver: Send + Sync {
    fn publish(&self, transcript: &Transcript);
}

impl<F> TranscriptObserver for F
where
    F: Fn(&Transcript) + Send + Sync,
{
    fn publish(&self, transcript: &Transcript) {
        self(transcript)
    }
}

struct Silent;

impl TranscriptObserver for Silent {
    fn publish(&self, _transcript: &Transcript) {}
}

struct State {
    phase: Phase,
    transcript: Transcript,
}

/// Owned conversation state plus the provider that serves it.
pub struct Session<P> {
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn TranscriptObserver>,
    instructions: String,
    state: Mutex<State>,
}

impl<P> Session<P>
where
    P: StreamingChatProvider,
{
    /// A session whose transcript holds only today's system preamble.
    pub fn new(provider: Arc<P>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let instructions = DEFAULT_INSTRUCTIONS.to_string();
        let system = SystemPreamble::new(instructions.clone(), clock.today()).text();

        Self {
            provider,
            clock,
            observer: Arc::new(Silent),
            instructions,
            state: Mutex::new(State {
                phase: Phase::Idle,
                transcript: Transcript::new(system),
            }),
        }
    }

    /// Replace the assistant instructions at the top of the system message.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self.refresh_system();
        self
    }

    /// Use another source for the date embedded in the system message.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self.refresh_system();
        self
    }

    pub fn with_observer(mut self, observer: impl TranscriptObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    fn refresh_system(&mut self) {
        let text = self.preamble().text();
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .transcript
            .replace_system(text);
    }

    fn preamble(&self) -> SystemPreamble {
        SystemPreamble::new(self.instructions.clone(), self.clock.today())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current transcript.
    pub fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// `true` while a request is in flight; the UI should disable sending.
    pub fn is_busy(&self) -> bool {
        self.phase() != Phase::Idle
    }

    /// Send `text` as the next user turn and stream the reply into the
    /// transcript.
    ///
    /// # Errors
    ///
    /// * [`ChatError::Rejected`] – non-success status, already classified.
    /// * [`ChatError::Transport`] – the request never got a response.
    ///
    /// In both cases the transcript is rolled back to its state before the
    /// call. A connection drop *after* streaming started is not an error; see
    /// [`SendOutcome::Interrupted`].
    pub async fn send(&self, credential: &Credential, model: &str, text: &str) -> Result<SendOutcome> {
        let (request, prior, snapshot) = {
            let mut state = self.lock();
            if state.phase != Phase::Idle {
                tracing::debug!(phase = ?state.phase, "send ignored, a request is already in flight");
                return Ok(SendOutcome::Ignored);
            }

            let preamble = self.preamble();
            let prior = state.transcript.clone();
            let system = preamble.text();
            let request = build_request(model, &state.transcript, text, preamble);

            state.transcript.replace_system(system);
            state.transcript.push(Message::user(text))?;
            state.phase = Phase::Sent;
            (request, prior, state.transcript.clone())
        };
        let mut in_flight = InFlight {
            state: &self.state,
            observer: &*self.observer,
            prior: Some(prior),
        };
        self.observer.publish(&snapshot);

        tracing::debug!(model, messages = request.messages.len(), "sending chat request");
        let mut stream = match self.provider.open_chat_stream(credential, request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed, rolling back user turn");
                drop(in_flight);
                return Err(err);
            }
        };

        // from here on the user turn stays, even if the reply is cut short
        in_flight.prior = None;
        let snapshot = {
            let mut state = self.lock();
            state.phase = Phase::Streaming;
            state.transcript.begin_reply();
            state.transcript.clone()
        };
        self.observer.publish(&snapshot);

        let mut reply = String::new();
        while let Some(item) = stream.next().await {
            let delta = match item {
                Ok(delta) if delta.is_empty() => continue,
                Ok(delta) => delta,
                Err(error) => {
                    tracing::warn!(error = %error, received = reply.len(), "stream interrupted, keeping partial reply");
                    self.lock().phase = Phase::Idle;
                    return Ok(SendOutcome::Interrupted {
                        partial: reply,
                        error,
                    });
                }
            };

            reply.push_str(&delta);
            let snapshot = {
                let mut state = self.lock();
                state.transcript.append_to_reply(&delta)?;
                state.transcript.clone()
            };
            self.observer.publish(&snapshot);
        }

        self.lock().phase = Phase::Idle;
        tracing::info!(chars = reply.chars().count(), "reply completed");
        Ok(SendOutcome::Completed { reply })
    }
}

/// Puts the session back to `Idle` when a send finishes or its future is
/// dropped.
///
/// While `prior` is set the request has not started streaming; ending the
/// send then restores `prior` and publishes it.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    observer: &'a dyn TranscriptObserver,
    prior: Option<Transcript>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let restored = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let restored = match self.prior.take() {
                Some(prior) if state.phase == Phase::Sent => {
                    state.transcript = prior;
                    Some(state.transcript.clone())
                }
                _ => None,
            };
            state.phase = Phase::Idle;
            restored
        };

        if let Some(snapshot) = restored {
            self.observer.publish(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chatwire_core::{
        classify::{ErrorBody, Rejection, RejectionKind},
        transcript::Role,
    };
    use chrono::NaiveDate;
    use futures_util::FutureExt;

    use super::*;
    use crate::testing::{Script, ScriptedProvider};

    fn fixed_day(d: u32) -> impl Fn() -> NaiveDate + Send + Sync {
        move || NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    struct Recorder(Arc<Mutex<Vec<Transcript>>>);

    impl TranscriptObserver for Recorder {
        fn publish(&self, transcript: &Transcript) {
            self.0.lock().unwrap().push(transcript.clone());
        }
    }

    fn session(provider: ScriptedProvider) -> (Session<ScriptedProvider>, Arc<Mutex<Vec<Transcript>>>) {
        let published = Arc::new(Mutex::new(Vec::new()));
        let session = Session::new(Arc::new(provider))
            .with_clock(fixed_day(1))
            .with_observer(Recorder(Arc::clone(&published)));
        (session, published)
    }

    fn key() -> Credential {
        Credential::new("sk-test")
    }

    fn deltas(parts: &[&str]) -> Script {
        Script::Deltas(parts.iter().map(|p| Ok(p.to_string())).collect())
    }

    fn rejection(status: u16, code: Option<&str>) -> Script {
        Script::Fail(ChatError::Rejected(Rejection::classify(
            status,
            ErrorBody {
                message: "remote says no".into(),
                code: code.map(Into::into),
            },
        )))
    }

    #[tokio::test]
    async fn streams_reply_into_transcript() {
        let (session, published) = session(ScriptedProvider::new([deltas(&["Hi", " there", "!"])]));

        let outcome = session.send(&key(), "gpt-3.5-turbo", "hello").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Completed { ref reply } if reply == "Hi there!"));

        let transcript = session.transcript();
        assert_eq!(
            transcript.history(),
            &[Message::user("hello"), Message::assistant("Hi there!")]
        );
        assert_eq!(session.phase(), Phase::Idle);

        let published = published.lock().unwrap();
        // user turn, empty reply, then one per delta
        assert_eq!(published.len(), 5);
        assert_eq!(published[1].last(), &Message::assistant(""));
        let partials: Vec<&str> = published[2..].iter().map(|t| t.last().content.as_str()).collect();
        assert_eq!(partials, ["Hi", "Hi there", "Hi there!"]);
    }

    #[tokio::test]
    async fn empty_deltas_are_not_published() {
        let (session, published) = session(ScriptedProvider::new([deltas(&["", "a", "", "b"])]));

        session.send(&key(), "m", "q").await.unwrap();

        assert_eq!(session.transcript().last(), &Message::assistant("ab"));
        assert_eq!(published.lock().unwrap().len(), 2 + 2);
    }

    #[tokio::test]
    async fn zero_deltas_leave_an_empty_reply() {
        let (session, _) = session(ScriptedProvider::new([deltas(&[])]));

        let outcome = session.send(&key(), "m", "q").await.unwrap();

        assert!(matches!(outcome, SendOutcome::Completed { ref reply } if reply.is_empty()));
        assert_eq!(session.transcript().last(), &Message::assistant(""));
    }

    #[tokio::test]
    async fn rejection_restores_transcript_exactly() {
        let provider = ScriptedProvider::new([
            deltas(&["first answer"]),
            rejection(400, Some("context_length_exceeded")),
        ]);
        let (session, published) = session(provider);
        session.send(&key(), "m", "first").await.unwrap();
        let before = session.transcript();

        let err = session.send(&key(), "m", "second").await.unwrap_err();

        assert_eq!(err.rejection().unwrap().kind, RejectionKind::ContextLengthExceeded);
        assert_eq!(session.transcript(), before);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(published.lock().unwrap().last(), Some(&before));
    }

    #[tokio::test]
    async fn rate_limit_rolls_back_to_system_only() {
        let (session, _) = session(ScriptedProvider::new([rejection(429, None)]));
        let before = session.transcript();

        let err = session.send(&key(), "m", "hello").await.unwrap_err();

        assert_eq!(err.rejection().unwrap().kind, RejectionKind::RateLimited);
        assert_eq!(session.transcript(), before);
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn rollback_restores_previous_system_message() {
        let day = Arc::new(Mutex::new(1u32));
        let clock_day = Arc::clone(&day);
        let session = Session::new(Arc::new(ScriptedProvider::new([rejection(500, None)])))
            .with_clock(move || NaiveDate::from_ymd_opt(2024, 6, *clock_day.lock().unwrap()).unwrap());
        let before = session.transcript();

        *day.lock().unwrap() = 2;
        session.send(&key(), "m", "hello").await.unwrap_err();

        // the attempt carried the new date, the transcript keeps the old one
        let requests = session.provider.requests();
        assert!(requests[0].messages[0].content.contains("2024-06-02"));
        assert_eq!(session.transcript(), before);
        assert!(session.transcript().system().content.contains("2024-06-01"));
    }

    #[tokio::test]
    async fn transport_failure_before_streaming_is_surfaced() {
        let provider = ScriptedProvider::new([Script::Fail(ChatError::Transport("connection refused".into()))]);
        let (session, _) = session(provider);

        let err = session.send(&key(), "m", "hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Transport(_)));
        assert!(err.user_message().contains("Could not reach"));
        assert!(!session.transcript().has_history());
    }

    #[tokio::test]
    async fn mid_stream_drop_keeps_partial_reply() {
        let script = Script::Deltas(vec![
            Ok("Partial".to_string()),
            Ok(" answ".to_string()),
            Err(ChatError::Transport("reset by peer".into())),
            Ok("never applied".to_string()),
        ]);
        let (session, _) = session(ScriptedProvider::new([script]));

        let outcome = session.send(&key(), "m", "hello").await.unwrap();

        match outcome {
            SendOutcome::Interrupted { partial, error } => {
                assert_eq!(partial, "Partial answ");
                assert!(matches!(error, ChatError::Transport(_)));
            }
            other => panic!("expected interruption, got {other:?}"),
        }
        assert_eq!(
            session.transcript().history(),
            &[Message::user("hello"), Message::assistant("Partial answ")]
        );
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn concurrent_send_is_ignored() {
        let provider = ScriptedProvider::new([deltas(&["only once"])]);
        let (session, _) = session(provider);

        let key = key();
        let (first, second) = tokio::join!(
            session.send(&key, "m", "one"),
            session.send(&key, "m", "two")
        );

        assert!(matches!(first.unwrap(), SendOutcome::Completed { .. }));
        assert!(matches!(second.unwrap(), SendOutcome::Ignored));
        assert_eq!(session.provider.requests().len(), 1);
        assert_eq!(
            session.transcript().history(),
            &[Message::user("one"), Message::assistant("only once")]
        );
    }

    #[tokio::test]
    async fn abandoned_send_is_rolled_back() {
        let (session, published) = session(ScriptedProvider::new([deltas(&["fine"])]));
        let key = key();
        let before = session.transcript();

        // pending inside the provider, then dropped
        let abandoned = session.send(&key, "m", "abandoned").now_or_never();
        assert!(abandoned.is_none());

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.transcript(), before);
        assert_eq!(published.lock().unwrap().last(), Some(&before));

        session.send(&key, "m", "next").await.unwrap();

        let requests = session.provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[1..], [Message::user("next")]);
        assert_eq!(
            session.transcript().history(),
            &[Message::user("next"), Message::assistant("fine")]
        );
    }

    #[tokio::test]
    async fn system_message_follows_the_clock() {
        let provider = ScriptedProvider::new([deltas(&["a"]), deltas(&["b"]), deltas(&["c"])]);
        let day = Arc::new(Mutex::new(1u32));
        let clock_day = Arc::clone(&day);
        let session = Session::new(Arc::new(provider))
            .with_clock(move || NaiveDate::from_ymd_opt(2024, 6, *clock_day.lock().unwrap()).unwrap());

        session.send(&key(), "m", "x").await.unwrap();
        session.send(&key(), "m", "x").await.unwrap();
        *day.lock().unwrap() = 2;
        session.send(&key(), "m", "x").await.unwrap();

        let requests = session.provider.requests();
        assert_eq!(requests[0].messages[0], requests[1].messages[0]);
        assert_ne!(requests[1].messages[0], requests[2].messages[0]);
        assert_eq!(requests[2].messages[0].role, Role::System);
        assert!(requests[2].messages[0].content.contains("2024-06-02"));
        assert_eq!(session.transcript().system(), &requests[2].messages[0]);
    }

    #[tokio::test]
    async fn request_replays_history_and_new_turn() {
        let provider = ScriptedProvider::new([deltas(&["4"]), deltas(&["8"])]);
        let session = Session::new(Arc::new(provider)).with_instructions("Only answer with digits.");

        session.send(&key(), "gpt-4", "2+2").await.unwrap();
        session.send(&key(), "gpt-4", "4+4").await.unwrap();

        let requests = session.provider.requests();
        let second = &requests[1];
        assert_eq!(second.model, "gpt-4");
        assert!(second.stream);
        assert!(second.messages[0].content.starts_with("Only answer with digits."));
        assert_eq!(
            second.messages[1..],
            [Message::user("2+2"), Message::assistant("4"), Message::user("4+4")]
        );
    }
}
