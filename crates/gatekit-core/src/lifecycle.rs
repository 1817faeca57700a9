//! Component lifecycle
//!
//! Boot runs an ordered list of components over a shared [`Context`];
//! shutdown pops their teardown callbacks in reverse order. A component that
//! fails during start aborts boot immediately; a teardown that fails (or
//! panics) during stop is caught, logged, and never prevents the remaining
//! callbacks.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("component '{component}' failed to start: {source}")]
    StartFailed {
        component: String,
        #[source]
        source: anyhow::Error,
    },
}

type TeardownFn = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

struct Teardown {
    label: String,
    callback: TeardownFn,
}

/// Mutable typed key/value context threaded through boot. Components store
/// what they build (pools, services) under their type; later components read
/// what earlier ones put. Also owns the ordered teardown stack.
#[derive(Default)]
pub struct Context {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    teardowns: Vec<Teardown>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("teardowns", &self.teardowns.len())
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }

    /// Pushes a zero-argument teardown callback. Callbacks run in strict
    /// reverse-of-registration order during [`stop`].
    pub fn defer<F, Fut>(&mut self, label: impl Into<String>, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.teardowns.push(Teardown {
            label: label.into(),
            callback: Box::new(move || callback().boxed()),
        });
    }

    pub fn pending_teardowns(&self) -> usize {
        self.teardowns.len()
    }
}

/// One initialization step of the boot sequence.
#[async_trait]
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self, cx: &mut Context) -> anyhow::Result<()>;
}

/// Folds each component over the context strictly in list order — later
/// components may depend on context populated by earlier ones; this ordering
/// is a contract, not an incident. The first failure aborts boot.
pub async fn start(
    mut cx: Context,
    components: &[Box<dyn Component>],
) -> Result<Context, LifecycleError> {
    for component in components {
        info!(component = component.name(), "starting");
        component
            .start(&mut cx)
            .await
            .map_err(|source| LifecycleError::StartFailed {
                component: component.name().to_string(),
                source,
            })?;
    }
    Ok(cx)
}

/// Pops and awaits every teardown in reverse order of registration. Failures
/// are isolated per callback; the returned context has the stack drained.
pub async fn stop(mut cx: Context) -> Context {
    while let Some(teardown) = cx.teardowns.pop() {
        debug!(teardown = %teardown.label, "running teardown");
        let fut = (teardown.callback)();
        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(teardown = %teardown.label, "teardown failed: {e:#}"),
            Err(_) => error!(teardown = %teardown.label, "teardown panicked"),
        }
    }
    cx
}
