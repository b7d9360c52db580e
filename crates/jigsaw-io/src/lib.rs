//! jigsaw-io: Image loading and generation sessions.
//!
//! Waiting for the source image is the only suspension point of puzzle
//! generation. [`ImageSource::load`] produces that wait as a future;
//! [`PuzzleSession::generate`] composes it with the synchronous
//! pipeline and discards results that were superseded by a newer
//! request while the image was loading.

pub mod session;
pub mod source;

pub use session::{PuzzleSession, SessionError};
pub use source::{ImageSource, LoadError};
