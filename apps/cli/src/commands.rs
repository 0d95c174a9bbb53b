//! The `send` and `receive` commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use peerpass_client::{TransferClient, TransferConfig, TransferSession};
use peerpass_protocol::format::{format_bytes, format_eta, format_rate};
use peerpass_protocol::{InviteCode, TransferSnapshot, TransferState};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const FALLBACK_FILENAME: &str = "downloaded-file";

/// Uploads `file` and prints the invite code the relay assigned.
pub async fn send(server: &str, file: &Path) -> anyhow::Result<()> {
    let client = TransferClient::new(server, TransferConfig::default());
    let handle = client.start_upload(file);
    cancel_on_ctrl_c(handle.cancel_token());

    let bar = progress_bar();
    watch_session(&handle.session(), &bar).await;

    let code = handle.wait().await?;
    println!("invite code: {code}");
    println!("share it with the receiving side: peerpass receive {code}");
    Ok(())
}

/// Downloads the file behind `code` into `output`.
pub async fn receive(server: &str, code: &str, output: &Path) -> anyhow::Result<()> {
    let code: InviteCode = code.parse()?;
    let client = TransferClient::new(server, TransferConfig::default());
    let handle = client.start_download(code);
    cancel_on_ctrl_c(handle.cancel_token());

    let bar = progress_bar();
    watch_session(&handle.session(), &bar).await;

    let artifact = handle.wait().await?;
    let path = save_path(output, &artifact.filename);
    tokio::fs::create_dir_all(output).await?;
    tokio::fs::write(&path, &artifact.bytes).await?;

    println!(
        "saved {} ({})",
        path.display(),
        format_bytes(artifact.bytes.len() as u64)
    );
    Ok(())
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

/// Polls the session and redraws the bar until it reaches a terminal state.
async fn watch_session(session: &TransferSession, bar: &ProgressBar) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        ticker.tick().await;
        let snapshot = session.snapshot();
        draw(bar, &snapshot);
        if snapshot.state.is_terminal() {
            finish(bar, &snapshot);
            break;
        }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

fn draw(bar: &ProgressBar, snapshot: &TransferSnapshot) {
    bar.set_position(snapshot.percent.round() as u64);
    let rate = snapshot
        .throughput_bytes_per_second
        .map(format_rate)
        .unwrap_or_else(|| "--".to_string());
    bar.set_message(format!(
        "{} | {} | {} | eta {}",
        state_label(snapshot.state),
        format_bytes(snapshot.bytes_transferred),
        rate,
        format_eta(snapshot.eta_seconds),
    ));
}

fn finish(bar: &ProgressBar, snapshot: &TransferSnapshot) {
    match snapshot.state {
        TransferState::Complete => bar.finish_with_message("done"),
        TransferState::Cancelled => bar.abandon_with_message("cancelled"),
        TransferState::Failed => {
            let cause = snapshot
                .failure
                .map(|kind| kind.describe())
                .unwrap_or("failed");
            bar.abandon_with_message(cause.to_string());
        }
        _ => bar.finish(),
    }
}

fn state_label(state: TransferState) -> &'static str {
    match state {
        TransferState::Idle => "starting",
        TransferState::Probing => "probing",
        TransferState::Planning => "planning",
        TransferState::Fetching => "transferring",
        TransferState::Retrying => "retrying",
        TransferState::Assembling => "assembling",
        TransferState::Complete => "complete",
        TransferState::Failed => "failed",
        TransferState::Cancelled => "cancelled",
    }
}

/// Joins the relay-suggested filename onto `output`, stripped of any path
/// components a hostile relay might smuggle in.
fn save_path(output: &Path, suggested: &str) -> PathBuf {
    let name = Path::new(suggested)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
    output.join(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
