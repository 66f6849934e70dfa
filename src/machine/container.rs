//! Lazy dependency container and the one-shot context initialization.

use super::error::MachineError;
use crate::core::{BoxError, Context, Injected, Resolved};
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

type SyncFactory = Arc<dyn Fn() -> Result<Resolved, BoxError> + Send + Sync>;
type AsyncFactory = Arc<dyn Fn() -> BoxFuture<'static, Result<Resolved, BoxError>> + Send + Sync>;

/// Produces the application data of a fresh context.
pub(crate) type DataInit<D> = Arc<dyn Fn() -> BoxFuture<'static, Result<D, BoxError>> + Send + Sync>;

/// A registered way of producing one named dependency.
#[derive(Clone)]
pub(crate) enum Factory {
    Sync(SyncFactory),
    Async(AsyncFactory),
}

impl Factory {
    pub(crate) fn value<T: Any + Send + Sync>(value: T) -> Self {
        let value: Resolved = Arc::new(value);
        Self::Sync(Arc::new(move || Ok(Arc::clone(&value))))
    }

    pub(crate) fn from_fn<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(move || factory().map(|v| Arc::new(v) as Resolved)))
    }

    pub(crate) fn from_async<T, F, Fut>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        Self::Async(Arc::new(move || {
            let pending = factory();
            async move { pending.await.map(|v| Arc::new(v) as Resolved) }.boxed()
        }))
    }

    async fn resolve(&self) -> Result<Resolved, BoxError> {
        match self {
            Self::Sync(factory) => factory(),
            Self::Async(factory) => factory().await,
        }
    }
}

/// Where the lazy initialization of a context stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Readiness {
    Uninitialized,
    /// An attempt started but never finished (its caller stopped polling).
    Resolving,
    Ready,
}

/// Owns a machine's context together with everything needed to build it
/// lazily: the data initializer and the not-yet-resolved dependencies.
pub(crate) struct ContextSlot<D> {
    init: DataInit<D>,
    context: Option<Context<D>>,
    /// Dependencies kept across a reset that discarded the data.
    retained: Injected,
    pending: VecDeque<(String, Factory)>,
    readiness: Readiness,
}

impl<D: Send + Sync + 'static> ContextSlot<D> {
    pub(crate) fn new(init: DataInit<D>, dependencies: Vec<(String, Factory)>) -> Self {
        Self {
            init,
            context: None,
            retained: Injected::default(),
            pending: dependencies.into(),
            readiness: Readiness::Uninitialized,
        }
    }

    #[cfg(test)]
    pub(crate) fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub(crate) fn context(&self) -> Option<&Context<D>> {
        self.context.as_ref()
    }

    /// Resolve the context if needed and hand it out.
    ///
    /// On failure the slot keeps whatever did resolve; the next call picks
    /// up from there.
    pub(crate) async fn ready(&mut self) -> Result<&mut Context<D>, MachineError> {
        if self.readiness == Readiness::Resolving {
            tracing::debug!("previous context initialization was abandoned, retrying");
        }
        self.readiness = Readiness::Resolving;

        let context = match self.context.take() {
            Some(context) => context,
            None => {
                let data = (self.init)().await.map_err(|source| {
                    self.readiness = Readiness::Uninitialized;
                    tracing::warn!(error = %source, "context initialization failed");
                    MachineError::Initialization { source }
                })?;
                Context::new(data, std::mem::take(&mut self.retained))
            }
        };
        let context = self.context.insert(context);

        while let Some((name, factory)) = self.pending.front().cloned() {
            match factory.resolve().await {
                Ok(value) => {
                    tracing::debug!(dependency = %name, "dependency resolved");
                    context.injected.insert(name, value);
                    self.pending.pop_front();
                }
                Err(source) => {
                    self.readiness = Readiness::Uninitialized;
                    tracing::warn!(dependency = %name, error = %source, "dependency failed to resolve");
                    return Err(MachineError::Injection { name, source });
                }
            }
        }

        self.readiness = Readiness::Ready;
        Ok(context)
    }

    /// Register a dependency. Once the slot has been resolved, the new entry
    /// is resolved right away; existing entries are left alone.
    pub(crate) async fn register(&mut self, name: String, factory: Factory) -> Result<(), MachineError> {
        self.pending.retain(|(pending, _)| *pending != name);
        self.pending.push_back((name, factory));

        if self.readiness == Readiness::Ready {
            self.ready().await?;
        }
        Ok(())
    }

    /// Drop the data so the next `ready` re-runs the initializer. Resolved
    /// dependencies survive.
    pub(crate) fn reset_data(&mut self) {
        if let Some(context) = self.context.take() {
            self.retained = context.injected;
        }
        self.readiness = Readiness::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_init(calls: Arc<AtomicUsize>) -> DataInit<usize> {
        Arc::new(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, BoxError>(n) }.boxed()
        })
    }

    #[test]
    fn nothing_resolves_before_first_ready() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&factory_calls);
        let slot = ContextSlot::new(
            counting_init(Arc::clone(&calls)),
            vec![(
                "db".to_string(),
                Factory::from_fn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("pool")
                }),
            )],
        );

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(factory_calls.load(Ordering::SeqCst), 0);
        assert_eq!(slot.readiness(), Readiness::Uninitialized);
        assert!(slot.context().is_none());
    }

    #[tokio::test]
    async fn ready_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&factory_calls);
        let mut slot = ContextSlot::new(
            counting_init(Arc::clone(&calls)),
            vec![(
                "db".to_string(),
                Factory::from_async(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, BoxError>("pool") }
                }),
            )],
        );

        slot.ready().await.unwrap();
        let ctx = slot.ready().await.unwrap();

        assert_eq!(ctx.data, 1);
        assert_eq!(ctx.get::<&str>("db"), Some(&"pool"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initializer_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);
        let init: DataInit<u32> = Arc::new(move || {
            let attempt = seen.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err::<u32, BoxError>("database unavailable".into())
                } else {
                    Ok(7)
                }
            }
            .boxed()
        });
        let mut slot = ContextSlot::new(init, Vec::new());

        let err = slot.ready().await.unwrap_err();
        assert!(matches!(err, MachineError::Initialization { .. }));
        assert_eq!(slot.readiness(), Readiness::Uninitialized);

        assert_eq!(slot.ready().await.unwrap().data, 7);
        assert_eq!(slot.readiness(), Readiness::Ready);
    }

    #[tokio::test]
    async fn failed_dependency_stays_pending() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);
        let mut slot = ContextSlot::new(
            counting_init(Arc::new(AtomicUsize::new(0))),
            vec![
                ("config".to_string(), Factory::value(3u8)),
                (
                    "flaky".to_string(),
                    Factory::from_fn(move || {
                        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err("timeout".into())
                        } else {
                            Ok(true)
                        }
                    }),
                ),
            ],
        );

        let err = slot.ready().await.unwrap_err();
        assert!(matches!(err, MachineError::Injection { ref name, .. } if name == "flaky"));
        assert!(slot.context().unwrap().injected.contains("config"));

        let ctx = slot.ready().await.unwrap();
        assert_eq!(ctx.get::<bool>("flaky"), Some(&true));
        assert_eq!(ctx.data, 1);
    }

    #[tokio::test]
    async fn late_registration_resolves_only_new_entry() {
        let factory_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&factory_calls);
        let mut slot = ContextSlot::new(
            counting_init(Arc::new(AtomicUsize::new(0))),
            vec![(
                "early".to_string(),
                Factory::from_fn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(1u8)
                }),
            )],
        );
        slot.ready().await.unwrap();

        slot.register("late".to_string(), Factory::value("x"))
            .await
            .unwrap();

        let ctx = slot.context().unwrap();
        assert!(ctx.injected.contains("late"));
        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registration_before_ready_waits() {
        let mut slot = ContextSlot::new(counting_init(Arc::new(AtomicUsize::new(0))), Vec::new());

        slot.register("late".to_string(), Factory::value(1u8))
            .await
            .unwrap();

        assert!(slot.context().is_none());
        assert!(slot.ready().await.unwrap().injected.contains("late"));
    }

    #[tokio::test]
    async fn reset_keeps_dependencies_and_reinitializes_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut slot = ContextSlot::new(
            counting_init(Arc::clone(&calls)),
            vec![("config".to_string(), Factory::value(3u8))],
        );
        slot.ready().await.unwrap().data = 100;

        slot.reset_data();
        assert!(slot.context().is_none());

        let ctx = slot.ready().await.unwrap();
        assert_eq!(ctx.data, 2);
        assert_eq!(ctx.get::<u8>("config"), Some(&3));
    }
}
