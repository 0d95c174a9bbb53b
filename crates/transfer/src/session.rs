//! Transfer session state.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use peerpass_protocol::{Direction, FailureKind, InviteCode, TransferSnapshot, TransferState};

use crate::progress::{ProgressEstimator, RateMode};

struct SessionInner {
    state: TransferState,
    failure: Option<FailureKind>,
    total_bytes: Option<u64>,
    filename: Option<String>,
    estimator: ProgressEstimator,
}

/// Shared state of one transfer, readable from any thread.
///
/// The orchestrator driving the transfer is the only writer; UI code polls
/// [`snapshot`](TransferSession::snapshot) whenever it wants. Once a
/// session reaches a terminal state every further transition and progress
/// update is ignored, so observers can never see it come back to life.
pub struct TransferSession {
    id: Uuid,
    direction: Direction,
    resource: Option<InviteCode>,
    started_at: DateTime<Utc>,
    inner: RwLock<SessionInner>,
}

impl TransferSession {
    /// Creates a download session for the resource behind `resource`.
    pub fn download(resource: InviteCode, rate_mode: RateMode) -> Self {
        Self::new(Direction::Download, Some(resource), rate_mode)
    }

    /// Creates an upload session. The invite code only exists once the
    /// relay answers, so the session carries none.
    pub fn upload(rate_mode: RateMode) -> Self {
        Self::new(Direction::Upload, None, rate_mode)
    }

    fn new(direction: Direction, resource: Option<InviteCode>, rate_mode: RateMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            resource,
            started_at: Utc::now(),
            inner: RwLock::new(SessionInner {
                state: TransferState::Idle,
                failure: None,
                total_bytes: None,
                filename: None,
                estimator: ProgressEstimator::new(rate_mode),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The invite code this session reads from, if it is a download.
    pub fn resource(&self) -> Option<InviteCode> {
        self.resource
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> TransferState {
        self.inner.read().unwrap().state
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.inner.read().unwrap().failure
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.inner.read().unwrap().total_bytes
    }

    pub fn filename(&self) -> Option<String> {
        self.inner.read().unwrap().filename.clone()
    }

    /// Bytes delivered so far, clamped to the total once it is known.
    pub fn bytes_transferred(&self) -> u64 {
        let inner = self.inner.read().unwrap();
        clamp_to_total(&inner)
    }

    /// True while the session is doing work.
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    // -----------------------------------------------------------------------
    // Transitions, orchestrator-only
    // -----------------------------------------------------------------------

    /// Marks the session as probing the resource size.
    pub fn mark_probing(&self) {
        self.transition(TransferState::Probing);
    }

    /// Records what the probe learned and moves to planning.
    pub fn mark_planning(&self, total_bytes: u64, filename: String) {
        let mut inner = self.inner.write().unwrap();
        if inner.state.is_terminal() {
            return;
        }
        inner.total_bytes = Some(total_bytes);
        inner.filename = Some(filename);
        inner.state = TransferState::Planning;
    }

    /// Records the total for sessions that learn it without probing.
    pub fn set_total(&self, total_bytes: u64) {
        let mut inner = self.inner.write().unwrap();
        if inner.state.is_terminal() {
            return;
        }
        inner.total_bytes = Some(total_bytes);
    }

    /// Marks the session as actively moving bytes.
    pub fn mark_fetching(&self) {
        self.transition(TransferState::Fetching);
    }

    /// Marks the session as waiting out a retry delay.
    pub fn mark_retrying(&self) {
        self.transition(TransferState::Retrying);
    }

    /// Marks the session as reassembling fetched chunks.
    pub fn mark_assembling(&self) {
        self.transition(TransferState::Assembling);
    }

    /// Moves to `Complete`. Ignored once terminal.
    pub fn complete(&self) {
        self.transition(TransferState::Complete);
    }

    /// Moves to `Failed` and records why. Ignored once terminal.
    pub fn fail(&self, kind: FailureKind) {
        let mut inner = self.inner.write().unwrap();
        if inner.state.is_terminal() {
            return;
        }
        inner.state = TransferState::Failed;
        inner.failure = Some(kind);
    }

    /// Moves to `Cancelled`. Ignored once terminal.
    pub fn cancel(&self) {
        self.transition(TransferState::Cancelled);
    }

    /// Records `count` more bytes delivered. Ignored once terminal.
    pub fn add_progress(&self, count: u64) {
        let mut inner = self.inner.write().unwrap();
        if inner.state.is_terminal() {
            return;
        }
        inner.estimator.on_bytes_delivered(count);
    }

    fn transition(&self, to: TransferState) {
        let mut inner = self.inner.write().unwrap();
        if inner.state.is_terminal() {
            return;
        }
        inner.state = to;
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Point-in-time view of the session for UI consumption.
    pub fn snapshot(&self) -> TransferSnapshot {
        let inner = self.inner.read().unwrap();
        let percent = if inner.state == TransferState::Complete {
            100.0
        } else {
            inner.estimator.percent(inner.total_bytes)
        };
        let eta_seconds = if inner.state.is_active() {
            inner.estimator.eta_seconds(inner.total_bytes)
        } else {
            None
        };

        TransferSnapshot {
            state: inner.state,
            direction: self.direction,
            percent,
            bytes_transferred: clamp_to_total(&inner),
            total_bytes: inner.total_bytes,
            throughput_bytes_per_second: inner.estimator.throughput_bytes_per_second(),
            eta_seconds,
            filename: inner.filename.clone(),
            failure: inner.failure,
        }
    }
}

fn clamp_to_total(inner: &SessionInner) -> u64 {
    let bytes = inner.estimator.cumulative_bytes();
    match inner.total_bytes {
        Some(total) => bytes.min(total),
        None => bytes,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: u16) -> InviteCode {
        InviteCode::new(value).unwrap()
    }

    #[test]
    fn new_download_session_is_idle() {
        let session = TransferSession::download(code(4242), RateMode::SessionAverage);
        assert_eq!(session.state(), TransferState::Idle);
        assert_eq!(session.direction(), Direction::Download);
        assert_eq!(session.resource(), Some(code(4242)));
        assert_eq!(session.bytes_transferred(), 0);
        assert_eq!(session.failure(), None);
    }

    #[test]
    fn upload_session_has_no_resource_yet() {
        let session = TransferSession::upload(RateMode::SessionAverage);
        assert_eq!(session.direction(), Direction::Upload);
        assert_eq!(session.resource(), None);
    }

    #[test]
    fn planning_records_probe_results() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_probing();
        session.mark_planning(12_582_912, "video.mp4".into());

        assert_eq!(session.state(), TransferState::Planning);
        assert_eq!(session.total_bytes(), Some(12_582_912));
        assert_eq!(session.filename(), Some("video.mp4".into()));
    }

    #[test]
    fn fetching_and_retrying_roundtrip() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_fetching();
        session.mark_retrying();
        assert_eq!(session.state(), TransferState::Retrying);
        session.mark_fetching();
        assert_eq!(session.state(), TransferState::Fetching);
    }

    #[test]
    fn progress_accumulates_and_clamps() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_planning(1000, "f".into());
        session.add_progress(400);
        session.add_progress(400);
        assert_eq!(session.bytes_transferred(), 800);

        // Deliveries past the total never push the counter beyond it.
        session.add_progress(400);
        assert_eq!(session.bytes_transferred(), 1000);
    }

    #[test]
    fn fail_records_kind() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.fail(FailureKind::NetworkExhausted);
        assert_eq!(session.state(), TransferState::Failed);
        assert_eq!(session.failure(), Some(FailureKind::NetworkExhausted));
    }

    #[test]
    fn terminal_states_latch() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.complete();
        session.fail(FailureKind::Internal);
        session.cancel();
        session.mark_fetching();
        session.add_progress(100);

        assert_eq!(session.state(), TransferState::Complete);
        assert_eq!(session.failure(), None);
        assert_eq!(session.bytes_transferred(), 0);
    }

    #[test]
    fn cancel_latches_too() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_fetching();
        session.cancel();
        session.complete();
        assert_eq!(session.state(), TransferState::Cancelled);
    }

    #[test]
    fn snapshot_before_any_progress() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, TransferState::Idle);
        assert_eq!(snapshot.percent, 0.0);
        assert_eq!(snapshot.throughput_bytes_per_second, None);
        assert_eq!(snapshot.eta_seconds, None);
        assert_eq!(snapshot.total_bytes, None);
    }

    #[test]
    fn snapshot_of_complete_session_reads_one_hundred_percent() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_planning(1000, "f".into());
        session.add_progress(1000);
        session.complete();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, TransferState::Complete);
        assert_eq!(snapshot.percent, 100.0);
        assert_eq!(snapshot.bytes_transferred, 1000);
        assert_eq!(snapshot.eta_seconds, None);
    }

    #[test]
    fn snapshot_mid_transfer() {
        let session = TransferSession::download(code(1), RateMode::SessionAverage);
        session.mark_planning(1000, "f".into());
        session.mark_fetching();
        session.add_progress(250);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.percent, 25.0);
        assert_eq!(snapshot.bytes_transferred, 250);
        assert!(snapshot.throughput_bytes_per_second.is_some());
        assert_eq!(snapshot.filename, Some("f".into()));
    }

    #[test]
    fn concurrent_snapshots_while_progressing() {
        use std::sync::Arc;

        let session = Arc::new(TransferSession::download(code(1), RateMode::SessionAverage));
        session.mark_planning(100_000, "f".into());
        session.mark_fetching();

        let writer = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    session.add_progress(100);
                }
            })
        };
        let reader = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let snapshot = session.snapshot();
                    assert!(snapshot.percent <= 100.0);
                    assert!(snapshot.bytes_transferred <= 100_000);
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(session.bytes_transferred(), 100_000);
    }
}
