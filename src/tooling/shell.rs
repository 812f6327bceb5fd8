//! Line-oriented shell transport.
//!
//! Reads commands one per line, dispatches them concurrently on the blocking
//! pool (bounded by a semaphore), and prints replies in input order.

use crate::dispatch::{Dispatch, Dispatcher, Event};
use crate::error::{ApiError, StorageError};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::debug;

/// Origin label attached to shell events
pub const ORIGIN: &str = "shell";

/// Counts of dispatch outcomes over a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellStats {
    pub handled: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl ShellStats {
    fn record(&mut self, outcome: Dispatch) {
        match outcome {
            Dispatch::Handled => self.handled += 1,
            Dispatch::Failed => self.failed += 1,
            Dispatch::Unknown => self.unknown += 1,
        }
    }
}

type Pending = JoinHandle<(Event, Dispatch)>;

/// Run until `input` is exhausted. `workers` bounds the events in flight.
pub async fn run<R, W>(
    dispatcher: Arc<Dispatcher>,
    workers: usize,
    input: R,
    mut output: W,
) -> Result<ShellStats, ApiError>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel::<String>(workers.max(1) * 2);
    let reader = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        for line in input.lines() {
            if tx.blocking_send(line?).is_err() {
                break;
            }
        }
        Ok(())
    });

    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut pending: VecDeque<Pending> = VecDeque::new();
    let mut stats = ShellStats::default();

    while let Some(line) = rx.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|_| ApiError::WorkerFailed("dispatch pool closed".to_string()))?;
        let dispatcher = Arc::clone(&dispatcher);
        pending.push_back(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut event = Event::parse(&line).with_origin(ORIGIN);
            let outcome = dispatcher.dispatch(&mut event);
            (event, outcome)
        }));

        while pending.front().map_or(false, |task| task.is_finished()) {
            if let Some(task) = pending.pop_front() {
                emit(task, &mut output, &mut stats).await?;
            }
        }
    }

    while let Some(task) = pending.pop_front() {
        emit(task, &mut output, &mut stats).await?;
    }

    reader
        .await
        .map_err(|e| ApiError::WorkerFailed(e.to_string()))?
        .map_err(|e| ApiError::StorageError(StorageError::IoError(e)))?;
    debug!(?stats, "shell input exhausted");
    Ok(stats)
}

async fn emit<W: Write>(task: Pending, output: &mut W, stats: &mut ShellStats) -> Result<(), ApiError> {
    let (event, outcome) = task
        .await
        .map_err(|e| ApiError::WorkerFailed(e.to_string()))?;
    stats.record(outcome);
    write_replies(output, &event, outcome)
        .map_err(|e| ApiError::StorageError(StorageError::IoError(e)))
}

fn write_replies<W: Write>(output: &mut W, event: &Event, outcome: Dispatch) -> std::io::Result<()> {
    if outcome == Dispatch::Unknown {
        writeln!(output, "unknown command: {}", event.command)?;
    }
    for reply in event.replies() {
        writeln!(output, "{}", reply)?;
    }
    output.flush()
}
