//! Download orchestration: probe, plan, fetch with retry, assemble.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use peerpass_api::{ApiClient, FetchError};
use peerpass_protocol::{FailureKind, InviteCode, TransferSnapshot, TransferState};
use peerpass_transfer::{Assembler, ChunkRange, ChunkResult, TransferSession, plan};

use crate::TransferConfig;
use crate::error::DownloadError;
use crate::events::{TransferEvent, emit};

/// The assembled artifact, ready for whatever saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDownload {
    /// Name the relay suggested, or the default.
    pub filename: String,
    /// The complete resource, chunks concatenated in order.
    pub bytes: Vec<u8>,
}

/// A running (or finished) download session.
pub struct DownloadHandle {
    session: Arc<TransferSession>,
    cancel: CancellationToken,
    events_rx: Option<mpsc::Receiver<TransferEvent>>,
    task: JoinHandle<Result<CompletedDownload, DownloadError>>,
}

impl DownloadHandle {
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

    /// Requests cancellation. The in-flight request is abandoned, not
    /// drained; any partial artifact is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Takes the event receiver. Only the first call gets one.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<TransferEvent>> {
        self.events_rx.take()
    }

    /// Waits for the session to end and returns the artifact.
    pub async fn wait(self) -> Result<CompletedDownload, DownloadError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(DownloadError::Internal(err.to_string())),
        }
    }
}

pub(crate) fn start(api: ApiClient, config: TransferConfig, code: InviteCode) -> DownloadHandle {
    let session = Arc::new(TransferSession::download(code, config.rate_mode));
    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(256);

    let task = tokio::spawn(run(
        api,
        config,
        code,
        Arc::clone(&session),
        events_tx,
        cancel.clone(),
    ));

    DownloadHandle {
        session,
        cancel,
        events_rx: Some(events_rx),
        task,
    }
}

async fn run(
    api: ApiClient,
    config: TransferConfig,
    code: InviteCode,
    session: Arc<TransferSession>,
    events: mpsc::Sender<TransferEvent>,
    cancel: CancellationToken,
) -> Result<CompletedDownload, DownloadError> {
    match drive(&api, &config, code, &session, &events, &cancel).await {
        Ok(artifact) => {
            session.complete();
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Complete,
            });
            emit(&events, TransferEvent::Completed {
                total_bytes: artifact.bytes.len() as u64,
            });
            info!(code = %code, bytes = artifact.bytes.len(), file = %artifact.filename, "download complete");
            Ok(artifact)
        }
        Err(DownloadError::Cancelled) => {
            session.cancel();
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Cancelled,
            });
            info!(code = %code, "download cancelled");
            Err(DownloadError::Cancelled)
        }
        Err(err) => {
            let kind = err.failure_kind().unwrap_or(FailureKind::Internal);
            session.fail(kind);
            emit(&events, TransferEvent::StateChanged {
                state: TransferState::Failed,
            });
            emit(&events, TransferEvent::Failed { kind });
            warn!(code = %code, error = %err, "download failed");
            Err(err)
        }
    }
}

async fn drive(
    api: &ApiClient,
    config: &TransferConfig,
    code: InviteCode,
    session: &TransferSession,
    events: &mpsc::Sender<TransferEvent>,
    cancel: &CancellationToken,
) -> Result<CompletedDownload, DownloadError> {
    session.mark_probing();
    emit(events, TransferEvent::StateChanged {
        state: TransferState::Probing,
    });

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
        result = api.probe(code) => result?,
    };
    emit(events, TransferEvent::Probed {
        total_bytes: outcome.total_bytes,
        filename: outcome.filename.clone(),
    });

    session.mark_planning(outcome.total_bytes, outcome.filename.clone());
    emit(events, TransferEvent::StateChanged {
        state: TransferState::Planning,
    });
    let ranges = plan(outcome.total_bytes, config.chunk_size);
    debug!(code = %code, total_bytes = outcome.total_bytes, chunks = ranges.len(), "chunk plan ready");

    if ranges.is_empty() {
        // Zero-byte resource: nothing to fetch, the artifact is empty.
        return Ok(CompletedDownload {
            filename: outcome.filename,
            bytes: Vec::new(),
        });
    }

    session.mark_fetching();
    emit(events, TransferEvent::StateChanged {
        state: TransferState::Fetching,
    });

    let mut assembler = Assembler::new(ranges.len());
    for range in ranges {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            result = fetch_with_retry(api, config, code, range, session, events) => {
                result.map_err(|source| DownloadError::Fetch {
                    sequence_index: range.sequence_index,
                    source,
                })?
            }
        };

        session.mark_fetching();
        session.add_progress(chunk.payload.len() as u64);
        emit(events, TransferEvent::ChunkCompleted {
            sequence_index: chunk.sequence_index,
            bytes: chunk.payload.len() as u64,
        });
        assembler.append(chunk);
    }

    session.mark_assembling();
    emit(events, TransferEvent::StateChanged {
        state: TransferState::Assembling,
    });
    let bytes = assembler.finalize()?;

    Ok(CompletedDownload {
        filename: outcome.filename,
        bytes,
    })
}

async fn fetch_with_retry(
    api: &ApiClient,
    config: &TransferConfig,
    code: InviteCode,
    range: ChunkRange,
    session: &TransferSession,
    events: &mpsc::Sender<TransferEvent>,
) -> Result<ChunkResult, FetchError> {
    config
        .retry
        .run(
            |_attempt| api.fetch_chunk(code, range),
            |attempt, delay| {
                session.mark_retrying();
                emit(events, TransferEvent::ChunkRetrying {
                    sequence_index: range.sequence_index,
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                });
            },
        )
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
