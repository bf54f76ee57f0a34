//! # Render Loop
//!
//! Drives a [`Renderer`] from a tokio task. The renderer never leaves the
//! task; everything else talks to it through a cloneable
//! [`RendererHandle`]. Queueing sends on an unbounded channel, so producers
//! never wait on a drain.
//!
//! The loop fires frame callbacks every [`FRAME_INTERVAL`] while a frame
//! drain is pending or a worker batch is in flight, and sleeps until the
//! pending timer otherwise.
//!
//! ```ignore
//! let (task, handle) = RenderLoop::spawn(renderer);
//! handle.queue_patch(patch)?;
//! let stats = handle.flush().await?;
//! handle.shutdown()?;
//! let renderer = task.await?;
//! ```

use crate::errors::{RenderError, RuntimeError};
use crate::live::{LiveTree, NodeId};
use crate::patch::Patch;
use crate::renderer::{MountId, Renderer};
use crate::stats::RenderStats;
use crate::vnode::VNode;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Frame callback period (60 Hz)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type TreeFn = Box<dyn FnOnce(&mut LiveTree) + Send>;

enum Command {
    Queue(Vec<Patch>),
    Flush(oneshot::Sender<RenderStats>),
    Clear,
    Stats(oneshot::Sender<RenderStats>),
    Observe(NodeId, oneshot::Sender<bool>),
    Unobserve(NodeId, oneshot::Sender<bool>),
    Mount(NodeId, VNode, oneshot::Sender<Result<MountId, RenderError>>),
    Render(MountId, VNode, oneshot::Sender<Result<usize, RenderError>>),
    WithTree(TreeFn),
    Shutdown,
}

#[derive(Clone)]
pub struct RendererHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl RendererHandle {
    fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.commands.send(command).map_err(|_| RuntimeError::Closed)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(command(tx))?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub fn queue_patch(&self, patch: Patch) -> Result<(), RuntimeError> {
        self.send(Command::Queue(vec![patch]))
    }

    pub fn queue_patches(&self, patches: Vec<Patch>) -> Result<(), RuntimeError> {
        self.send(Command::Queue(patches))
    }

    pub fn clear(&self) -> Result<(), RuntimeError> {
        self.send(Command::Clear)
    }

    /// Stop the loop; the renderer is destroyed and returned by the task
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown)
    }

    /// Drain everything and return the stats afterwards
    pub async fn flush(&self) -> Result<RenderStats, RuntimeError> {
        self.request(Command::Flush).await
    }

    pub async fn stats(&self) -> Result<RenderStats, RuntimeError> {
        self.request(Command::Stats).await
    }

    pub async fn observe(&self, node: NodeId) -> Result<bool, RuntimeError> {
        self.request(|tx| Command::Observe(node, tx)).await
    }

    pub async fn unobserve(&self, node: NodeId) -> Result<bool, RuntimeError> {
        self.request(|tx| Command::Unobserve(node, tx)).await
    }

    pub async fn mount(&self, parent: NodeId, vnode: VNode) -> Result<MountId, RuntimeError> {
        Ok(self.request(|tx| Command::Mount(parent, vnode, tx)).await??)
    }

    pub async fn render(&self, mount: MountId, vnode: VNode) -> Result<usize, RuntimeError> {
        Ok(self.request(|tx| Command::Render(mount, vnode, tx)).await??)
    }

    /// Run `f` against the live tree inside the loop. Changes to observed
    /// subtrees are queued as patches right after.
    pub async fn with_tree<F, R>(&self, f: F) -> Result<R, RuntimeError>
    where
        F: FnOnce(&mut LiveTree) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.request(|tx| {
            Command::WithTree(Box::new(move |tree| {
                tx.send(f(tree)).ok();
            }))
        })
        .await
    }
}

pub struct RenderLoop {
    renderer: Renderer,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl RenderLoop {
    pub fn new(renderer: Renderer) -> (Self, RendererHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let render_loop = Self {
            renderer,
            commands: rx,
        };
        (render_loop, RendererHandle { commands: tx })
    }

    pub fn spawn(renderer: Renderer) -> (JoinHandle<Renderer>, RendererHandle) {
        let (render_loop, handle) = Self::new(renderer);
        (tokio::spawn(render_loop.run()), handle)
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) -> Renderer {
        info!(
            use_raf = self.renderer.config().use_raf,
            use_worker = self.renderer.has_worker(),
            "Render loop starting"
        );

        let mut frames = time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wants_frame = self.renderer.wants_frame();
            let deadline = self.renderer.next_deadline();

            // Due drains go first so a busy command channel cannot starve them.
            tokio::select! {
                biased;

                _ = frames.tick(), if wants_frame => {
                    self.renderer.on_frame();
                }

                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.renderer.on_timer(Instant::now());
                }

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
            }
        }

        self.renderer.destroy();
        info!("Render loop stopped");
        self.renderer
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Queue(patches) => self.renderer.queue_patches(patches),
            Command::Flush(reply) => {
                self.renderer.flush();
                reply.send(self.renderer.stats()).ok();
            }
            Command::Clear => self.renderer.clear(),
            Command::Stats(reply) => {
                reply.send(self.renderer.stats()).ok();
            }
            Command::Observe(node, reply) => {
                reply.send(self.renderer.observe_element(node)).ok();
            }
            Command::Unobserve(node, reply) => {
                reply.send(self.renderer.unobserve_element(node)).ok();
            }
            Command::Mount(parent, vnode, reply) => {
                reply.send(self.renderer.mount(parent, vnode)).ok();
            }
            Command::Render(mount, vnode, reply) => {
                reply.send(self.renderer.render(mount, vnode)).ok();
            }
            Command::WithTree(f) => {
                f(self.renderer.tree_mut());
                let queued = self.renderer.sync_observed();
                if queued > 0 {
                    debug!(queued, "Queued observed changes");
                }
            }
            Command::Shutdown => {}
        }
    }
}
