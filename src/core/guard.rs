//! Guard predicates for controlling state transitions.
//!
//! Guards decide whether a candidate transition may fire. They read the
//! machine context and the dispatch arguments but cannot change either.
//! A guard may be synchronous or return a future; either way it is awaited
//! before the next candidate is considered.

use super::context::Context;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Future returned by an asynchronous guard.
pub type GuardFuture<'a> = BoxFuture<'a, bool>;

type GuardFn<D, A> = dyn for<'a> Fn(&'a Context<D>, &'a A) -> GuardFuture<'a> + Send + Sync;

/// Predicate that determines if a transition can execute.
///
/// Guards are evaluated in registration order while selecting a transition
/// and again by [`StateMachine::can`](crate::StateMachine::can), so they must
/// be deterministic and free of side effects.
///
/// # Example
///
/// ```rust
/// use turnstile::core::Guard;
///
/// struct Order {
///     items: usize,
/// }
///
/// // Guard that only lets non-empty orders move on
/// let has_items = Guard::new(|ctx: &turnstile::Context<Order>, _args: &()| ctx.data.items > 0);
///
/// // Guard that waits on something before answering
/// let in_stock: Guard<Order, ()> = Guard::from_async(|ctx: &turnstile::Context<Order>, _: &()| {
///     Box::pin(async move { ctx.data.items < 100 })
/// });
/// # let _ = (has_items, in_stock);
/// ```
pub struct Guard<D, A> {
    predicate: Arc<GuardFn<D, A>>,
}

impl<D, A> Guard<D, A> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context<D>, &A) -> bool + Send + Sync + 'static,
    {
        Self::from_async(move |ctx, args| {
            let allowed = predicate(ctx, args);
            Box::pin(async move { allowed })
        })
    }

    /// Create a guard from a function returning a boxed future that may
    /// borrow the context and arguments while it runs.
    pub fn from_async<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a Context<D>, &'a A) -> GuardFuture<'a> + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context and
    /// these arguments.
    pub fn check<'a>(&self, context: &'a Context<D>, args: &'a A) -> GuardFuture<'a> {
        (self.predicate)(context, args)
    }
}

impl<D, A> Clone for Guard<D, A> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
