//! Lazily built, process-wide shared resources.
//!
//! Model clients are expensive to construct (weights to load, connections to
//! open) and stateless once built. A [`Resource`] builds one on first use and
//! hands out the same `Arc` for the rest of the process.
//!
//! ```rust
//! use charter::{Resource, Result};
//!
//! struct Reranker { model: &'static str }
//!
//! fn connect() -> Result<Reranker> {
//!     Ok(Reranker { model: "cross-encoder/ms-marco-MiniLM-L-6-v2" })
//! }
//!
//! static RERANKER: Resource<Reranker> = Resource::new(connect);
//!
//! let a = RERANKER.get().unwrap();
//! let b = RERANKER.get().unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::Result;

/// A value constructed on first successful access and then reused.
///
/// A failed initialisation is not cached; the next [`Resource::get`] tries
/// again. If two threads race on first access both may run `init`, and
/// only one result is kept.
pub struct Resource<T> {
    cell: OnceLock<Arc<T>>,
    init: fn() -> Result<T>,
}

impl<T> Resource<T> {
    /// Declare a resource. Nothing runs until [`Resource::get`].
    #[must_use]
    pub const fn new(init: fn() -> Result<T>) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }

    /// The shared value, building it if this is the first access.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returned on failure.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(value) = self.cell.get() {
            return Ok(Arc::clone(value));
        }
        let built = Arc::new((self.init)()?);
        debug!(resource = std::any::type_name::<T>(), "initialized shared resource");
        Ok(Arc::clone(self.cell.get_or_init(|| built)))
    }

    /// Whether the value has been built.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> std::fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("type", &std::any::type_name::<T>())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
