//! Upload orchestration: one multipart request with transport progress.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use peerpass_api::ApiClient;
use peerpass_protocol::{FailureKind, InviteCode, TransferSnapshot, TransferState};
use peerpass_transfer::TransferSession;

use crate::TransferConfig;
use crate::error::UploadError;
use crate::events::{TransferEvent, emit};

/// A running (or finished) upload session.
pub struct UploadHandle {
    session: Arc<TransferSession>,
    cancel: CancellationToken,
    events_rx: Option<mpsc::Receiver<TransferEvent>>,
    task: JoinHandle<Result<InviteCode, UploadError>>,
}

impl UploadHandle {
    /// The session this handle observes. Cheap clone of a shared handle.
    pub fn session(&self) -> Arc<TransferSession> {
        Arc::clone(&self.session)
    }

    /// Current progress snapshot.
    pub fn snapshot(&self) -> TransferSnapshot {
        self.session.snapshot()
    }

    /// Token that cancels this session, for wiring into signal handlers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Requests cancellation. The in-flight request is abandoned; the relay
    /// may or may not have stored the file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Takes the event receiver. Only the first call gets one.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<TransferEvent>> {
        self.events_rx.take()
    }

    /// Waits for the session to end and returns the invite code.
    pub async fn wait(self) -> Result<InviteCode, UploadError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(UploadError::Internal(err.to_string())),
        }
    }
}

pub(crate) fn start(api: ApiClient, config: TransferConfig, path: PathBuf) -> UploadHandle {
    let session = Arc::new(TransferSession::upload(config.rate_mode));
    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(256);

    let task = tokio::spawn(run(
        api,
        path,
        Arc::clone(&session),
        events_tx,
        cancel.clone(),
    ));

    UploadHandle {
        session,
        cancel,
        events_rx: Some(events_rx),
        task,
    }
}

async fn run(
    api: ApiClient,
    path: PathBuf,
    session: Arc<TransferSession>,
    events: mpsc::Sender<TransferEvent>,
    cancel: CancellationToken,
) -> Result<InviteCode, UploadError> {
    match drive(&api, &path, &session, &events, &cancel).await {
        Ok(code) => {
            session.complete();
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Complete,
            });
            emit(&events, TransferEvent::Completed {
                total_bytes: session.total_bytes().unwrap_or(0),
            });
            info!(code = %code, file = %path.display(), "upload complete");
            Ok(code)
        }
        Err(UploadError::Cancelled) => {
            session.cancel();
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Cancelled,
            });
            info!(file = %path.display(), "upload cancelled");
            Err(UploadError::Cancelled)
        }
        Err(err) => {
            let kind = err.failure_kind().unwrap_or(FailureKind::Internal);
            session.fail(kind);
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Failed,
            });
            emit(&events, TransferEvent::Failed { kind });
            warn!(file = %path.display(), error = %err, "upload failed");
            Err(err)
        }
    }
}

async fn drive(
    api: &ApiClient,
    path: &Path,
    session: &Arc<TransferSession>,
    events: &mpsc::Sender<TransferEvent>,
    cancel: &CancellationToken,
) -> Result<InviteCode, UploadError> {
    let size = tokio::fs::metadata(path)
        .await
        .map_err(peerpass_api::UploadError::Io)?
        .len();
    session.set_total(size);
    session.mark_fetching();
    emit(events, TransferEvent::StateChanged {
        state: TransferState::Fetching,
    });

    // Transport-level progress: the callback reports cumulative bytes
    // read from the file, converted to deltas for the session counter.
    let progress_session = Arc::clone(session);
    let previous = AtomicU64::new(0);
    let on_progress: peerpass_api::UploadProgressFn = Box::new(move |cumulative| {
        let last = previous.swap(cumulative, Ordering::Relaxed);
        if cumulative > last {
            progress_session.add_progress(cumulative - last);
        }
    });

    let code = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(UploadError::Cancelled),
        result = api.upload_file(path, on_progress) => result?,
    };

    Ok(code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
