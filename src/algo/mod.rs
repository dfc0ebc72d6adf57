//! Geometric algorithms on boards.
//!
//! - [`relax`]: force-based re-embedding with Procrustes shape matching,
//!   angular order preservation and area correction
//! - [`procrustes`]: least-squares rotation fitting
//! - [`backend`]: the seam for swapping in another layout engine
//! - [`progress`]: progress callbacks

pub mod backend;
pub mod procrustes;
pub mod progress;
pub mod relax;

pub use progress::Progress;
