use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use super::observer::{FailurePolicy, StateObserver};
use super::sample::{Sample, UNKNOWN_STATE, monotonic_nanos};

/// Control messages understood by the sampling loop.
pub enum Command {
    /// Hand over the buffered samples through the reply side, leaving only
    /// the most recent sample behind as the next batch's starting point.
    Collect(oneshot::Sender<Vec<Sample>>),
    /// Exit the loop.
    Terminate,
}

/// Runs the sampling loop until terminated.
///
/// Each iteration observes once, buffers the sample and sleeps for one
/// sampling interval. Pending commands are serviced only between
/// iterations, never during an observation or the sleep, so a collect
/// request waits at most one interval plus one observation. The buffer is
/// owned exclusively by this task and leaves it only as a batch moved into
/// a `Collect` reply.
pub async fn run_sampling_loop<O: StateObserver>(
    mut observer: O,
    interval: Duration,
    policy: FailurePolicy,
    mut commands: mpsc::Receiver<Command>,
) {
    let mut buffer: Vec<Sample> = Vec::new();
    loop {
        match observer.observe().await {
            Ok(sample) => buffer.push(sample),
            Err(err) => match policy {
                FailurePolicy::RecordUnknown => {
                    log::warn!("observation failed, recording `{UNKNOWN_STATE}`: {err}");
                    buffer.push(Sample::new(UNKNOWN_STATE, monotonic_nanos()));
                }
                FailurePolicy::Halt => {
                    log::error!("observation failed, halting sampling: {err}");
                    return;
                }
            },
        }
        tokio::time::sleep(interval).await;

        loop {
            match commands.try_recv() {
                Ok(Command::Collect(reply)) => {
                    let batch = std::mem::take(&mut buffer);
                    if let Some(last) = batch.last() {
                        buffer.push(last.clone());
                    }
                    // the requester may have timed out and dropped the
                    // receiver; the buffer reset stands either way
                    let _ = reply.send(batch);
                }
                Ok(Command::Terminate) => return,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }
    }
}
