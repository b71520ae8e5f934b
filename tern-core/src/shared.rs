//! Guarded shared access to a screen
//!
//! Two actors operate on one screen concurrently: the byte-feeding writer
//! thread and the UI thread issuing queries. `SharedScreen` makes the lock
//! explicit and scoped. Any read that touches multiple related fields
//! (e.g. "is this coordinate inside the screen, and does that cell carry a
//! hyperlink") must happen within a single `with` scope, so it observes
//! one consistent snapshot.
//!
//! Listener callbacks run while the lock is held; a listener must not call
//! back into the same `SharedScreen`, or it will deadlock.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::events::ScreenEvents;
use crate::screen::Screen;

/// A screen behind an exclusive lock, cheap to clone across threads
pub struct SharedScreen<E: ScreenEvents> {
    inner: Arc<Mutex<Screen<E>>>,
}

impl<E: ScreenEvents> SharedScreen<E> {
    pub fn new(screen: Screen<E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(screen)),
        }
    }

    /// Run one state transition or consistent multi-field read
    pub fn with<R>(&self, f: impl FnOnce(&mut Screen<E>) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Scope-bound accessor; prefer [`SharedScreen::with`]
    pub fn lock(&self) -> MutexGuard<'_, Screen<E>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock cannot corrupt the grid in a
            // memory-unsafe way; keep serving the last consistent state.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<E: ScreenEvents> Clone for SharedScreen<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::events::NoopEvents;
    use crate::{Coordinate, Dimensions};

    #[test]
    fn test_concurrent_writer_and_reader() {
        let shared = SharedScreen::new(Screen::new(Dimensions::new(20, 5), NoopEvents));

        let writer = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    shared.with(|screen| {
                        for c in "hello ".chars() {
                            screen.apply(Command::AppendChar(c));
                        }
                    });
                }
            })
        };

        let reader = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    shared.with(|screen| {
                        // Multi-field read under one guard scope.
                        let pos = screen.cursor_position();
                        assert!(screen.contains(pos));
                        let _ = screen.cell_at(Coordinate::new(1, 1));
                    });
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
