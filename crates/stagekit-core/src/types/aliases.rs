//! Type aliases for commonly used shared-ownership types.
//!
//! Stage drivers are reachable from the driver-management layer and from
//! the calibration that commands them, and a mover may be driven from more
//! than one thread. These aliases name the wrappers used for that sharing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stagekit_core::types::*;
//!
//! // Instead of: Arc<Mutex<Journal>>
//! let journal: ThreadSafe<Journal> = thread_safe(Journal::default());
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
/// `T` may be unsized, e.g. `ThreadSafe<dyn Stage>`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe vector for cross-thread collection management.
pub type ThreadSafeVec<T> = Arc<Mutex<Vec<T>>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new empty `ThreadSafeVec<T>`.
#[inline]
pub fn thread_safe_vec<T>() -> ThreadSafeVec<T> {
    Arc::new(Mutex::new(Vec::new()))
}
