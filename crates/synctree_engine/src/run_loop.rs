//! The engine's serialized execution context.

use crate::error::{EngineError, EngineResult};
use crate::state::EngineState;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::trace;

type Task = Box<dyn FnOnce(&mut EngineState) + Send>;

/// The single-threaded owner of all engine state.
///
/// Every read of and mutation to the synced tree runs as a task on this
/// loop, in submission order. Other threads never touch `EngineState`
/// directly; any step that needs a consistent point-in-time view of engine
/// state is expressed as a task submitted here.
///
/// The loop thread exits once the `RunLoop` is dropped and the queued
/// tasks have drained.
pub struct RunLoop {
    tasks: Option<Sender<Task>>,
    handle: Option<JoinHandle<()>>,
}

impl RunLoop {
    /// Spawns the loop thread, giving it exclusive ownership of `state`.
    pub(crate) fn spawn(mut state: EngineState) -> Self {
        let (tasks, queue) = mpsc::channel::<Task>();
        let handle = thread::spawn(move || {
            while let Ok(task) = queue.recv() {
                task(&mut state);
            }
            trace!("run loop drained, exiting");
        });
        Self {
            tasks: Some(tasks),
            handle: Some(handle),
        }
    }

    /// Runs `f` on the loop and blocks the *calling* thread until the
    /// result is handed back.
    ///
    /// The loop itself is never blocked: the task executes in turn and the
    /// result crosses back over a channel. Fails with
    /// [`EngineError::Shutdown`] if the loop is gone.
    pub fn run<R, F>(&self, f: F) -> EngineResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut EngineState) -> R + Send + 'static,
    {
        let (reply, response) = mpsc::channel();
        self.submit(move |state| {
            // The caller may have given up waiting; a dead receiver is fine.
            let _ = reply.send(f(state));
        })?;
        response.recv().map_err(|_| EngineError::Shutdown)
    }

    /// Submits `f` to the loop without waiting for it.
    pub fn submit<F>(&self, f: F) -> EngineResult<()>
    where
        F: FnOnce(&mut EngineState) + Send + 'static,
    {
        let tasks = self.tasks.as_ref().ok_or(EngineError::Shutdown)?;
        tasks
            .send(Box::new(f))
            .map_err(|_| EngineError::Shutdown)
    }
}

impl Drop for RunLoop {
    fn drop(&mut self) {
        // Closing the channel lets the loop drain pending tasks and exit.
        drop(self.tasks.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
