use std::future::Future;

mod bevy_runtime;

/// A runtime abstraction allowing you to use any runtime for simlink
pub trait Runtime: Send + Sync + 'static {
    /// Associated handle for the spawned task
    type JoinHandle: JoinHandle;

    /// Spawn a new task.
    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) -> Self::JoinHandle;
}

/// A handle to a spawned task
pub trait JoinHandle: Send + 'static {
    /// Stop the task. It must not be polled again after this returns.
    fn abort(&mut self);
}

pub(crate) fn run_async<F, RT>(task: F, runtime: &RT) -> RT::JoinHandle
where
    F: Future<Output = ()> + Send + 'static,
    RT: Runtime,
{
    runtime.spawn(task)
}
