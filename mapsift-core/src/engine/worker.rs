use std::sync::mpsc::{self, Receiver, TryIter};
use std::thread::{self, JoinHandle};

use log::{error, trace};

use crate::{AnnotationStore, DedupIndex, TileArchive, TrackStore};

use super::{
    CancelFlag, ExtractionEngine, ExtractionError, ExtractionOutcome, ExtractionReport,
    ProgressTick,
};

const WORKER_NAME: &str = "mapsift-extract";

/// A run executing on its own worker thread.
#[derive(Debug)]
pub struct ExtractionHandle {
    progress: Receiver<ProgressTick>,
    cancel: CancelFlag,
    join: JoinHandle<ExtractionOutcome>,
}

impl ExtractionHandle {
    /// Ticks received so far, without blocking.
    pub fn try_progress(&self) -> TryIter<'_, ProgressTick> {
        self.progress.try_iter()
    }

    /// Blocking iterator over ticks; ends when the worker finishes.
    pub fn progress(&self) -> impl Iterator<Item = ProgressTick> + '_ {
        self.progress.iter()
    }

    /// Ask the worker to stop before its next tile.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker thread has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the terminal outcome.
    ///
    /// A panicking worker yields a failed outcome carrying
    /// [`ExtractionError::WorkerPanicked`].
    #[must_use]
    pub fn wait(self) -> ExtractionOutcome {
        self.join.join().unwrap_or_else(|_| {
            error!("extraction worker panicked");
            ExtractionOutcome::failed(
                ExtractionError::WorkerPanicked,
                ExtractionReport::default(),
                DedupIndex::new(),
            )
        })
    }
}

/// Run `engine` on a dedicated thread that owns the archive and both stores.
///
/// Progress ticks are forwarded over a channel exposed by the returned
/// handle.
///
/// # Errors
/// Returns [`ExtractionError::Spawn`] when the thread cannot be created.
pub fn spawn_extraction<A, N, T>(
    engine: ExtractionEngine,
    archive: A,
    mut notes: N,
    mut tracks: T,
) -> Result<ExtractionHandle, ExtractionError>
where
    A: TileArchive + Send + 'static,
    N: AnnotationStore + Send + 'static,
    T: TrackStore + Send + 'static,
{
    let (sender, progress) = mpsc::channel();
    let cancel = engine.cancel_flag();
    let join = thread::Builder::new()
        .name(WORKER_NAME.to_owned())
        .spawn(move || {
            engine.run(&archive, &mut notes, &mut tracks, |tick| {
                // A dropped receiver only means nobody is watching.
                if sender.send(tick).is_err() {
                    trace!("progress receiver dropped");
                }
            })
        })
        .map_err(ExtractionError::Spawn)?;
    Ok(ExtractionHandle {
        progress,
        cancel,
        join,
    })
}
