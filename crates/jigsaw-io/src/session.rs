//! Last-request-wins puzzle generation.
//!
//! Every call to [`PuzzleSession::generate`] takes a ticket from a
//! monotonically increasing generation counter *before* it suspends. When
//! the image arrives, a result whose ticket is no longer the latest is
//! thrown away, so a slow load can never overwrite the puzzle of a newer
//! request.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jigsaw_pipeline::{Bounds, Puzzle, PuzzleConfig, PuzzleError};

use crate::source::{ImageSource, LoadError};

/// Errors returned by [`PuzzleSession::generate`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The source image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The pipeline rejected the image or config.
    #[error(transparent)]
    Generate(#[from] PuzzleError),

    /// A newer request was issued while this one was in flight.
    #[error("generation {ticket} superseded by {latest}")]
    Superseded {
        /// Ticket of the discarded request.
        ticket: u64,
        /// Latest ticket at the time the result was discarded.
        latest: u64,
    },
}

/// Owns the most recently generated puzzle.
#[derive(Debug, Default)]
pub struct PuzzleSession {
    generation: AtomicU64,
    current: Mutex<Option<Arc<Puzzle>>>,
}

impl PuzzleSession {
    /// Empty session with no puzzle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket of the most recently issued request (0 before the first).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Latest successfully generated puzzle.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Puzzle>> {
        self.lock_current().clone()
    }

    /// Start a generation request.
    ///
    /// The ticket is issued when this method is called, not when the
    /// returned future is first polled. The future awaits `image`, then
    /// runs the synchronous pipeline.
    ///
    /// # Errors
    ///
    /// The future resolves to [`SessionError::Superseded`] when a newer
    /// request was issued in the meantime (whatever the outcome of this
    /// one), [`SessionError::Load`] when the image cannot be loaded and
    /// [`SessionError::Generate`] when the pipeline fails. On any error
    /// the current puzzle is left unchanged.
    pub fn generate<F>(
        &self,
        image: F,
        config: PuzzleConfig,
        bounds: Bounds,
    ) -> impl Future<Output = Result<Arc<Puzzle>, SessionError>>
    where
        F: Future<Output = Result<Vec<u8>, LoadError>>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("generation {ticket} issued");

        async move {
            let loaded = image.await;
            self.check_latest(ticket)?;

            let puzzle = Arc::new(jigsaw_pipeline::generate(&loaded?, &config, bounds)?);

            let mut current = self.lock_current();
            self.check_latest(ticket)?;
            *current = Some(Arc::clone(&puzzle));
            log::info!("generation {ticket} stored ({} pieces)", puzzle.pieces.len());
            Ok(puzzle)
        }
    }

    /// [`generate`](Self::generate) from an [`ImageSource`].
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_from(
        &self,
        source: ImageSource,
        config: PuzzleConfig,
        bounds: Bounds,
    ) -> impl Future<Output = Result<Arc<Puzzle>, SessionError>> {
        self.generate(source.load(), config, bounds)
    }

    fn check_latest(&self, ticket: u64) -> Result<(), SessionError> {
        let latest = self.generation();
        if latest == ticket {
            Ok(())
        } else {
            log::warn!("discarding generation {ticket}: superseded by {latest}");
            Err(SessionError::Superseded { ticket, latest })
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Arc<Puzzle>>> {
        // Writes are a single pointer swap, so a poisoned slot is still whole.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
