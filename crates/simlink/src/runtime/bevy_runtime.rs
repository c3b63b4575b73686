use std::future::Future;

use bevy::tasks::{Task, TaskPool};

use super::{JoinHandle, Runtime};

impl Runtime for TaskPool {
    type JoinHandle = Option<Task<()>>;

    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) -> Self::JoinHandle {
        tracing::trace!("[TaskPool::spawn] Spawning task");
        // Not detached: `abort` cancels the task by dropping it.
        Some(TaskPool::spawn(self, task))
    }
}

impl JoinHandle for Option<Task<()>> {
    fn abort(&mut self) {
        // Dropping a bevy task cancels it.
        self.take();
    }
}
