use super::Context;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A free list of reusable [`Context`]s.
///
/// Acquiring never fails: an empty pool allocates a new context.
#[derive(Default)]
pub struct ContextPool {
    spare: Mutex<Vec<Box<Context>>>,
}

impl ContextPool {
    pub fn new() -> ContextPool {
        ContextPool::default()
    }

    /// Takes a context with room for at least `max_params` parameters and
    /// `max_sections` backtracking entries.
    pub fn acquire(&self, max_params: usize, max_sections: usize) -> Box<Context> {
        match self.lock().pop() {
            Some(mut ctx) => {
                ctx.reserve(max_params, max_sections);
                ctx
            }
            None => Box::new(Context::with_capacity(max_params, max_sections)),
        }
    }

    /// Resets `ctx` and keeps it for a later request.
    pub fn release(&self, mut ctx: Box<Context>) {
        ctx.reset();
        self.lock().push(ctx);
    }

    /// Number of idle contexts.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    // A panic while the lock is held can't leave the list half-updated.
    fn lock(&self) -> MutexGuard<'_, Vec<Box<Context>>> {
        self.spare.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
