//! Lifecycle hooks run around a transition.

use super::context::{BoxError, Context};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Future returned by an asynchronous hook.
pub type HookFuture<'a> = BoxFuture<'a, Result<(), BoxError>>;

type HookFn<D, A> = dyn for<'a> Fn(&'a mut Context<D>, &'a A) -> HookFuture<'a> + Send + Sync;

/// Callback run at a fixed point of a transition's lifecycle
/// (`on_leave`, `on_enter` or `on_exit`).
///
/// Hooks get exclusive access to the context for as long as they run.
/// Returning an error aborts the rest of the dispatch.
///
/// ```rust
/// use turnstile::{Context, Hook};
///
/// let count_entries: Hook<u32, ()> = Hook::from_fn(|ctx: &mut Context<u32>, _: &()| {
///     ctx.data += 1;
///     Ok(())
/// });
///
/// let audited: Hook<u32, ()> = Hook::from_async(|ctx, _| {
///     Box::pin(async move {
///         ctx.data += 10;
///         Ok(())
///     })
/// });
/// # let _ = (count_entries, audited);
/// ```
pub struct Hook<D, A> {
    f: Arc<HookFn<D, A>>,
}

impl<D, A> Hook<D, A> {
    /// Build a hook from a function returning a boxed future that may
    /// borrow the context for its whole run.
    pub fn from_async<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<D>, &'a A) -> HookFuture<'a> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Build a hook from a synchronous function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Context<D>, &A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::from_async(move |ctx, args| {
            let result = f(ctx, args);
            Box::pin(async move { result })
        })
    }

    pub(crate) fn call<'a>(&self, ctx: &'a mut Context<D>, args: &'a A) -> HookFuture<'a> {
        (self.f)(ctx, args)
    }
}

impl<D, A> Clone for Hook<D, A> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

/// Which lifecycle point produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    OnLeave,
    OnEnter,
    Subscriber,
    OnExit,
}

impl HookKind {
    /// Whether a failure at this point happens after the state was committed.
    pub fn after_commit(self) -> bool {
        matches!(self, Self::Subscriber | Self::OnExit)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnLeave => "on_leave",
            Self::OnEnter => "on_enter",
            Self::Subscriber => "subscriber",
            Self::OnExit => "on_exit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::Injected;

    fn context() -> Context<Vec<String>> {
        Context::new(Vec::new(), Injected::default())
    }

    #[tokio::test]
    async fn sync_hook_mutates_context() {
        let hook: Hook<Vec<String>, ()> = Hook::from_fn(|ctx: &mut Context<Vec<String>>, _: &()| {
            ctx.data.push("entered".to_string());
            Ok(())
        });
        let mut ctx = context();

        hook.call(&mut ctx, &()).await.unwrap();

        assert_eq!(ctx.data, vec!["entered".to_string()]);
    }

    #[tokio::test]
    async fn async_hook_sees_arguments() {
        let hook: Hook<Vec<String>, String> = Hook::from_async(|ctx: &mut Context<Vec<String>>, warehouse: &String| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                ctx.data.push(warehouse.clone());
                Ok(())
            })
        });
        let mut ctx = context();

        hook.call(&mut ctx, &"north".to_string()).await.unwrap();

        assert_eq!(ctx.data, vec!["north".to_string()]);
    }

    #[tokio::test]
    async fn failing_hook_returns_its_error() {
        let hook: Hook<Vec<String>, ()> =
            Hook::from_fn(|_: &mut Context<Vec<String>>, _: &()| Err("boom".into()));
        let mut ctx = context();

        let err = hook.call(&mut ctx, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn hook_kind_reports_commit_side() {
        assert!(!HookKind::OnLeave.after_commit());
        assert!(!HookKind::OnEnter.after_commit());
        assert!(HookKind::Subscriber.after_commit());
        assert!(HookKind::OnExit.after_commit());
        assert_eq!(HookKind::OnEnter.to_string(), "on_enter");
    }
}
