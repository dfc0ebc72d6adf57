//! Progress callbacks for iterative algorithms.
//!
//! ```
//! use trellis::algo::progress::Progress;
//! use trellis::algo::relax::{relax_with_progress, RelaxOptions};
//! use trellis::boards::square_board;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut board = square_board(2, 2).unwrap();
//! relax_with_progress(&mut board, &RelaxOptions::default().with_iterations(3), &progress);
//! ```

/// Receives `(current, total, message)` as an algorithm advances.
///
/// `current` counts completed steps; `total` is the planned number of steps,
/// which a run that stops early (on convergence, say) may never reach before
/// its final report.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// A reporter that ignores every update.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }

    /// Forward an update to the callback.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
