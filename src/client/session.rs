//! Session state container
//!
//! Phases move `Idle -> Loading -> Revealing -> Idle` on success and
//! `Idle -> Loading -> Error -> Idle` on failure. Every change is published
//! through a `watch` channel so a view can render each reveal frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::files::{self, DownloadTarget};
use super::reveal::Reveal;
use super::transport::CorrectionTransport;
use super::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Revealing,
    Error,
}

/// Published view of the session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub input_text: String,
    pub output_text: String,
    pub phase: Phase,
    /// Chars of the corrected text revealed so far
    pub revealed: usize,
    /// Bumped whenever a running reveal must stop publishing
    generation: u64,
}

impl Snapshot {
    pub fn loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

pub struct Session<T> {
    transport: T,
    state: Arc<watch::Sender<Snapshot>>,
    reveal_task: Option<JoinHandle<()>>,
    reveal_delay: Duration,
}

impl<T: CorrectionTransport> Session<T> {
    pub fn new(transport: T, reveal_delay: Duration) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            transport,
            state: Arc::new(state),
            reveal_task: None,
            reveal_delay,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn input(&self) -> String {
        self.state.borrow().input_text.clone()
    }

    pub fn output(&self) -> String {
        self.state.borrow().output_text.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.input_text = text);
    }

    /// Replace the output text, stopping any reveal that would overwrite it
    pub fn set_output(&mut self, text: impl Into<String>) {
        self.cancel_reveal();
        let text = text.into();
        self.state.send_modify(|state| state.output_text = text);
    }

    /// Send the input for correction and start revealing the result.
    ///
    /// Empty input is rejected before any network activity and leaves the
    /// state untouched. Any transport failure is logged and reported as
    /// [`ClientError::ServiceUnavailable`] with the output left empty.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let input = self.input();
        if input.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        self.cancel_reveal();
        self.state.send_modify(|state| {
            state.phase = Phase::Loading;
            state.output_text.clear();
            state.revealed = 0;
        });

        match self.transport.request_correction(&input).await {
            Ok(corrected) => {
                let generation = self.state.borrow().generation;
                self.state.send_modify(|state| state.phase = Phase::Revealing);
                tracing::debug!("Revealing {} chars", corrected.chars().count());

                self.reveal_task = Some(tokio::spawn(run_reveal(
                    self.state.clone(),
                    corrected,
                    generation,
                    self.reveal_delay,
                )));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Correction request failed: {}", e);
                self.state.send_modify(|state| {
                    state.phase = Phase::Error;
                    state.output_text.clear();
                });
                Err(ClientError::ServiceUnavailable)
            }
        }
    }

    /// Wait for the current reveal to publish its last frame
    pub async fn finish_reveal(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!("Reveal task failed: {}", e);
                }
            }
        }
    }

    pub fn clear_input(&mut self) {
        self.state.send_modify(|state| state.input_text.clear());
    }

    pub fn clear_output(&mut self) {
        self.cancel_reveal();
        self.state.send_modify(|state| {
            state.output_text.clear();
            state.revealed = 0;
        });
    }

    /// Reset both texts and return to idle
    pub fn clear(&mut self) {
        self.clear_input();
        self.clear_output();
        self.dismiss_error();
    }

    pub fn dismiss_error(&mut self) {
        self.state.send_if_modified(|state| {
            if state.phase != Phase::Error {
                return false;
            }
            state.phase = Phase::Idle;
            true
        });
    }

    pub fn load_input_file(&mut self, path: &Path) -> Result<(), ClientError> {
        let text = files::load_text_file(path)?;
        self.set_input(text);
        Ok(())
    }

    pub fn load_output_file(&mut self, path: &Path) -> Result<(), ClientError> {
        let text = files::load_text_file(path)?;
        self.set_output(text);
        Ok(())
    }

    /// Write the current input or output text into `dir`
    pub fn save(&self, dir: &Path, target: DownloadTarget) -> Result<PathBuf, ClientError> {
        let text = match target {
            DownloadTarget::Input => self.input(),
            DownloadTarget::Output => self.output(),
        };
        files::save_text_file(dir, target, &text)
    }

    fn cancel_reveal(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
        self.state.send_if_modified(|state| {
            state.generation += 1;
            if state.phase == Phase::Revealing {
                state.phase = Phase::Idle;
                return true;
            }
            false
        });
    }
}

impl<T> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }
}

/// Publish one frame per char, `delay` apart, while `generation` is current
async fn run_reveal(
    state: Arc<watch::Sender<Snapshot>>,
    text: String,
    generation: u64,
    delay: Duration,
) {
    let mut frames = Reveal::new(&text);
    if frames.is_finished() {
        state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.phase = Phase::Idle;
            true
        });
        return;
    }

    while let Some(frame) = frames.next() {
        let revealed = frames.cursor();
        let finished = frames.is_finished();

        let current = state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.output_text = frame;
            snapshot.revealed = revealed;
            if finished {
                snapshot.phase = Phase::Idle;
            }
            true
        });

        if !current {
            tracing::debug!("Reveal superseded after {} chars", revealed - 1);
            return;
        }
        if !finished {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::TransportError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_millis(50);

    struct FakeTransport {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CorrectionTransport for FakeTransport {
        async fn request_correction(&self, _input_text: &str) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .ok_or(TransportError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    /// Transport that holds the request until released
    struct GatedTransport {
        release: tokio::sync::Notify,
        reply: String,
    }

    #[async_trait]
    impl CorrectionTransport for GatedTransport {
        async fn request_correction(&self, _input_text: &str) -> Result<String, TransportError> {
            self.release.notified().await;
            Ok(self.reply.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_while_request_in_flight() {
        let transport = Arc::new(GatedTransport {
            release: tokio::sync::Notify::new(),
            reply: "He goes to school.".to_string(),
        });
        let mut session = Session::new(transport.clone(), DELAY);
        session.set_input("He go to school.");
        session.set_output("previous result");
        let mut rx = session.subscribe();

        let submit = tokio::spawn(async move {
            session.submit().await.unwrap();
            session
        });

        rx.wait_for(|snapshot| snapshot.loading()).await.unwrap();
        {
            let snapshot = rx.borrow_and_update();
            assert!(snapshot.loading());
            assert_eq!(snapshot.phase, Phase::Loading);
            assert_eq!(snapshot.output_text, "");
        }

        transport.release.notify_one();
        let mut session = submit.await.unwrap();

        let phase = rx.borrow_and_update().phase;
        assert!(matches!(phase, Phase::Revealing | Phase::Idle), "{phase:?}");
        assert!(!session.loading());

        session.finish_reveal().await;
        assert_eq!(session.output(), "He goes to school.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_is_rejected_without_request() {
        let transport = FakeTransport::replying("unused");
        let mut session = Session::new(transport.clone(), DELAY);
        session.set_output("previous");

        let err = session.submit().await.unwrap_err();

        assert!(matches!(err, ClientError::EmptyInput));
        assert_eq!(transport.calls(), 0);
        assert!(!session.loading());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.output(), "previous");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_publishes_one_update_per_char() {
        let corrected = "He goes to school.";
        let mut session = Session::new(FakeTransport::replying(corrected), DELAY);
        session.set_input("He go to school.");
        let mut rx = session.subscribe();

        session.submit().await.unwrap();
        assert!(!session.loading());

        let mut seen = Vec::new();
        loop {
            rx.changed().await.unwrap();
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.revealed > 0 {
                assert!(corrected.starts_with(&snapshot.output_text));
                seen.push((snapshot.revealed, snapshot.output_text));
            }
            if snapshot.phase == Phase::Idle {
                break;
            }
        }

        let counts: Vec<usize> = seen.iter().map(|(n, _)| *n).collect();
        assert_eq!(counts, (1..=corrected.chars().count()).collect::<Vec<_>>());
        assert_eq!(seen[0].1, "H");
        assert_eq!(seen[1].1, "He");
        assert_eq!(session.output(), corrected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_follows_the_delay() {
        let mut session = Session::new(FakeTransport::replying("abc"), DELAY);
        session.set_input("abc");
        let started = tokio::time::Instant::now();

        session.submit().await.unwrap();
        session.finish_reveal().await;

        assert_eq!(session.output(), "abc");
        assert_eq!(session.phase(), Phase::Idle);
        // First char is shown immediately, then one per delay.
        let elapsed = started.elapsed();
        assert!(elapsed >= DELAY * 2 && elapsed < DELAY * 3, "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_leaves_empty_output() {
        let transport = FakeTransport::failing();
        let mut session = Session::new(transport.clone(), DELAY);
        session.set_input("text");
        session.set_output("stale");

        let err = session.submit().await.unwrap_err();

        assert!(matches!(err, ClientError::ServiceUnavailable));
        assert_eq!(transport.calls(), 1);
        assert_eq!(session.output(), "");
        assert!(!session.loading());
        assert_eq!(session.phase(), Phase::Error);

        session.dismiss_error();
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_stops_inflight_reveal() {
        let mut session = Session::new(FakeTransport::replying("a long corrected text"), DELAY);
        session.set_input("input");
        session.submit().await.unwrap();

        tokio::time::sleep(DELAY * 3).await;
        assert!(!session.output().is_empty());

        session.clear();
        assert_eq!(session.input(), "");
        assert_eq!(session.output(), "");
        assert_eq!(session.phase(), Phase::Idle);

        tokio::time::sleep(DELAY * 50).await;
        assert_eq!(session.output(), "");

        // Clearing again is a no-op.
        session.clear();
        assert_eq!(session.snapshot().output_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submit_supersedes_previous_reveal() {
        let transport = FakeTransport::replying("second answer");
        let mut session = Session::new(transport.clone(), DELAY);
        session.set_input("question");

        session.submit().await.unwrap();
        tokio::time::sleep(DELAY * 2).await;
        session.submit().await.unwrap();
        session.finish_reveal().await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(session.output(), "second answer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_correction_returns_to_idle() {
        let mut session = Session::new(FakeTransport::replying(""), DELAY);
        session.set_input("text");

        session.submit().await.unwrap();
        session.finish_reveal().await;

        assert_eq!(session.output(), "");
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_output_file_cancels_reveal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.txt");
        std::fs::write(&path, "from disk").unwrap();

        let mut session = Session::new(FakeTransport::replying("revealed text"), DELAY);
        session.set_input("input");
        session.submit().await.unwrap();
        session.load_output_file(&path).unwrap();

        tokio::time::sleep(DELAY * 50).await;
        assert_eq!(session.output(), "from disk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Line one.\r\n  Line two with trailing space \n";

        let mut session = Session::new(FakeTransport::replying("unused"), DELAY);
        session.set_input(text);
        let path = session.save(dir.path(), DownloadTarget::Input).unwrap();
        assert_eq!(path.file_name().unwrap(), "input.txt");

        session.clear();
        session.load_input_file(&path).unwrap();
        assert_eq!(session.input(), text);
    }

    #[tokio::test]
    async fn test_end_to_end_through_proxy() {
        use crate::config::ServerConfig;
        use crate::provider::{Corrector, ProviderError};
        use crate::server::{build_router, ProxyState};

        struct Fixed;

        #[async_trait]
        impl Corrector for Fixed {
            async fn correct(&self, _text: &str) -> Result<String, ProviderError> {
                Ok("He goes to school.".to_string())
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(ProxyState::new(Arc::new(Fixed)), &ServerConfig::default());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let transport = crate::client::HttpTransport::new(format!("http://{}/api/endpoint", addr));
        let mut session = Session::new(transport, Duration::from_millis(1));
        session.set_input("He go to school.");

        session.submit().await.unwrap();
        session.finish_reveal().await;

        assert_eq!(session.output(), "He goes to school.");
    }
}
