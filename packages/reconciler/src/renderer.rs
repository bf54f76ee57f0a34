//! # Renderer
//!
//! Owns the live tree and the patch pipeline:
//!
//! ```text
//! Differ | Observer ──► queue ──► Scheduler ──► Optimizer ──► Applier ──► LiveTree
//!                                                  │
//!                                            OptimizeWorker (large batches)
//! ```
//!
//! Producers call [`Renderer::queue_patch`] and never block. A drain is
//! scheduled on the next frame or after `batch_delay`, and the host calls
//! [`Renderer::on_frame`] or [`Renderer::on_timer`] to run it (the async
//! [`RenderLoop`](crate::runtime::RenderLoop) does this for tokio hosts).
//!
//! Each drain takes at most `max_batch_size` patches. `is_rendering` stays
//! set from the moment a batch leaves the queue until the applier returns,
//! including while the worker optimizes it. Further drains are rescheduled
//! only after the batch is applied, so batches never interleave.

use crate::applier::apply_patches;
use crate::config::RendererConfig;
use crate::differ::{Anchor, Differ};
use crate::errors::{ApplyError, ConfigError, RenderError, WorkerError};
use crate::live::{LiveTree, NodeId};
use crate::observer::Observer;
use crate::optimizer::optimize_patches;
use crate::patch::Patch;
use crate::scheduler::Scheduler;
use crate::stats::RenderStats;
use crate::vnode::{VChild, VNode};
use crate::worker::OptimizeWorker;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tracing::{debug, info, warn};

/// Handle to a tree mounted with [`Renderer::mount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u32);

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct Mount {
    root: NodeId,
    vnode: VNode,
    /// Last applied root while a wholesale replacement is still queued
    replaced: Option<NodeId>,
}

/// Batch handed to the worker and not yet applied
struct InFlight {
    id: u64,
    batch: Vec<Patch>,
    started: std::time::Instant,
}

pub struct Renderer {
    config: RendererConfig,
    tree: LiveTree,
    queue: VecDeque<Patch>,
    scheduler: Scheduler,
    observer: Observer,
    worker: Option<OptimizeWorker>,
    in_flight: Option<InFlight>,
    is_rendering: bool,
    destroyed: bool,
    stats: RenderStats,
    mounts: BTreeMap<MountId, Mount>,
    next_mount: u32,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Result<Self, ConfigError> {
        Self::with_tree(config, LiveTree::new())
    }

    /// Build a renderer around an existing live tree
    pub fn with_tree(config: RendererConfig, tree: LiveTree) -> Result<Self, ConfigError> {
        config.validate()?;

        let worker = if config.use_worker {
            match OptimizeWorker::spawn() {
                Ok(worker) => Some(worker),
                Err(err) => {
                    warn!(error = %err, "Optimizer worker unavailable, optimizing inline");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            scheduler: Scheduler::from_config(&config),
            config,
            tree,
            queue: VecDeque::new(),
            observer: Observer::new(),
            worker,
            in_flight: None,
            is_rendering: false,
            destroyed: false,
            stats: RenderStats::default(),
            mounts: BTreeMap::new(),
            next_mount: 0,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn tree(&self) -> &LiveTree {
        &self.tree
    }

    /// Mutable access for external writers; changes inside observed
    /// subtrees are recorded and fed back through [`Renderer::sync_observed`].
    pub fn tree_mut(&mut self) -> &mut LiveTree {
        &mut self.tree
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_rendering(&self) -> bool {
        self.is_rendering
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    pub fn queue_patch(&mut self, patch: Patch) {
        if self.destroyed {
            debug!(?patch, "Ignoring patch queued after destroy");
            return;
        }
        self.queue.push_back(patch);
        self.schedule_render();
    }

    pub fn queue_patches(&mut self, patches: impl IntoIterator<Item = Patch>) {
        if self.destroyed {
            debug!("Ignoring patches queued after destroy");
            return;
        }
        self.queue.extend(patches);
        self.schedule_render();
    }

    /// Schedule a drain unless one is pending or a batch is in progress
    pub fn schedule_render(&mut self) {
        if self.is_rendering {
            return;
        }
        self.request_drain();
    }

    fn request_drain(&mut self) {
        if self.destroyed || (self.queue.is_empty() && !self.tree.has_records()) {
            return;
        }
        if let Some(pending) = self.scheduler.schedule(tokio::time::Instant::now()) {
            debug!(handle = pending.handle(), "Scheduled render");
        }
    }

    pub fn cancel_scheduled_render(&mut self) {
        if let Some(pending) = self.scheduler.cancel() {
            debug!(handle = pending.handle(), "Cancelled scheduled render");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// Deadline of the pending timer drain, if any
    pub fn next_deadline(&self) -> Option<tokio::time::Instant> {
        self.scheduler.next_deadline()
    }

    /// Whether the host should call [`Renderer::on_frame`] soon
    pub fn wants_frame(&self) -> bool {
        self.scheduler.wants_frame() || self.in_flight.is_some()
    }

    /// Frame callback. Completes a finished worker batch or runs the
    /// pending frame drain. Returns whether any work was done.
    pub fn on_frame(&mut self) -> bool {
        if self.poll_worker() {
            return true;
        }
        if !self.scheduler.take_frame() {
            return false;
        }
        self.process_batch()
    }

    /// Timer callback; runs the pending drain once its deadline has passed
    pub fn on_timer(&mut self, now: tokio::time::Instant) -> bool {
        if self.poll_worker() {
            return true;
        }
        if !self.scheduler.take_due_timer(now) {
            return false;
        }
        self.process_batch()
    }

    /// Drain one batch. Returns `false` when rejected by the re-entrancy
    /// guard or when there is nothing to do.
    pub fn process_batch(&mut self) -> bool {
        if self.is_rendering {
            debug!("Render already in progress");
            return false;
        }
        if self.destroyed {
            return false;
        }

        let observed = self.observer.collect(&mut self.tree);
        self.queue.extend(observed);
        if self.queue.is_empty() {
            return false;
        }

        self.is_rendering = true;
        let take = self.queue.len().min(self.config.max_batch_size);
        let batch: Vec<Patch> = self.queue.drain(..take).collect();
        let started = std::time::Instant::now();

        if batch.len() >= self.config.worker_threshold {
            if let Some(worker) = self.worker.as_mut() {
                match worker.submit(&batch) {
                    Ok(id) => {
                        debug!(request = id, size = batch.len(), "Offloaded batch optimization");
                        self.in_flight = Some(InFlight { id, batch, started });
                        return true;
                    }
                    Err(err) => {
                        warn!(error = %err, "Worker submit failed, optimizing inline");
                    }
                }
            }
        }

        let size = batch.len();
        self.finish_batch(size, optimize_patches(batch), started);
        true
    }

    /// Non-blocking check for the in-flight worker batch
    pub fn poll_worker(&mut self) -> bool {
        let Some(id) = self.in_flight.as_ref().map(|f| f.id) else {
            return false;
        };
        let result = match self.worker.as_ref() {
            Some(worker) => match worker.try_result(id) {
                Some(result) => result,
                None => return false,
            },
            None => Err(WorkerError::Disconnected),
        };

        if let Some(in_flight) = self.in_flight.take() {
            self.complete_in_flight(in_flight, result);
        }
        true
    }

    fn wait_in_flight(&mut self) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        let result = match self.worker.as_ref() {
            Some(worker) => worker.wait(in_flight.id, self.config.worker_timeout()),
            None => Err(WorkerError::Disconnected),
        };
        self.complete_in_flight(in_flight, result);
    }

    fn complete_in_flight(&mut self, in_flight: InFlight, result: Result<Vec<Patch>, WorkerError>) {
        let InFlight { id, batch, started } = in_flight;
        let size = batch.len();

        let optimized = match result {
            Ok(optimized) => optimized,
            Err(err) => {
                warn!(request = id, error = %err, "Worker optimization failed, optimizing inline");
                if matches!(err, WorkerError::Disconnected) {
                    self.worker = None;
                }
                optimize_patches(batch)
            }
        };
        self.finish_batch(size, optimized, started);
    }

    fn finish_batch(&mut self, size: usize, optimized: Vec<Patch>, started: std::time::Instant) {
        let report = apply_patches(&mut self.tree, &optimized);
        let elapsed = started.elapsed();
        self.stats.record_batch(size, &report, elapsed);

        debug!(
            size,
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed,
            remaining = self.queue.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Applied batch"
        );

        if !self.queue.is_empty() {
            self.request_drain();
        }
        self.is_rendering = false;
    }

    /// Drain everything now, on the caller's thread
    pub fn flush(&mut self) {
        self.cancel_scheduled_render();
        self.wait_in_flight();

        while self.process_batch() {
            self.wait_in_flight();
        }
        self.cancel_scheduled_render();
    }

    /// Drop every pending patch and any pending drain. Mounts fall back to
    /// what the live tree actually holds.
    pub fn clear(&mut self) {
        self.cancel_scheduled_render();
        let dropped = self.queue.len();
        self.queue.clear();
        if let Some(in_flight) = self.in_flight.take() {
            debug!(request = in_flight.id, "Abandoned in-flight worker batch");
        }
        self.is_rendering = false;
        self.tree.take_records();
        self.resync_mounts();
        debug!(dropped, "Cleared patch queue");
    }

    /// Undo replacements that never got applied and re-snapshot every
    /// mount from the live tree.
    fn resync_mounts(&mut self) {
        for (id, mount) in self.mounts.iter_mut() {
            if let Some(applied) = mount.replaced.take() {
                if !self.tree.is_reachable(mount.root) && self.tree.is_reachable(applied) {
                    let pending = std::mem::replace(&mut mount.root, applied);
                    self.tree
                        .with_records_suppressed(|tree| tree.remove(pending))
                        .ok();
                    debug!(mount = %id, %pending, root = %applied, "Dropped pending replacement");
                }
            }
            if let Some(VChild::Node(snapshot)) = self.tree.to_vchild(mount.root) {
                mount.vnode = snapshot;
            }
        }
    }

    /// Stop for good: clears the queue, releases the worker and the
    /// observer. Late worker results are discarded with the worker.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.clear();
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        self.observer.disconnect(&mut self.tree);
        self.destroyed = true;
        info!(
            batches = self.stats.batch_count,
            patches = self.stats.total_patches,
            "Renderer destroyed"
        );
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            queue_size: self.queue.len(),
            is_rendering: self.is_rendering,
            ..self.stats.clone()
        }
    }

    pub fn observe_element(&mut self, node: NodeId) -> bool {
        self.observer.observe(&mut self.tree, node)
    }

    pub fn unobserve_element(&mut self, node: NodeId) -> bool {
        self.observer.unobserve(&mut self.tree, node)
    }

    /// Queue patches for external mutations recorded since the last sync
    pub fn sync_observed(&mut self) -> usize {
        let patches = self.observer.collect(&mut self.tree);
        let count = patches.len();
        if count > 0 {
            self.queue_patches(patches);
        }
        count
    }

    /// Materialize `vnode` and append it under `parent` right away
    pub fn mount(&mut self, parent: NodeId, vnode: VNode) -> Result<MountId, RenderError> {
        if self.destroyed {
            return Err(RenderError::Destroyed);
        }

        let root = self.tree.with_records_suppressed(|tree| {
            let node = tree.materialize_node(&vnode);
            match tree.append_child(parent, node) {
                Ok(()) => Ok(node),
                Err(err) => {
                    tree.remove(node).ok();
                    Err(err)
                }
            }
        })?;

        self.next_mount += 1;
        let id = MountId(self.next_mount);
        info!(mount = %id, %parent, %root, tag = %vnode.tag, "Mounted tree");
        self.mounts.insert(
            id,
            Mount {
                root,
                vnode,
                replaced: None,
            },
        );
        Ok(id)
    }

    /// Current live root of a mount
    pub fn mount_root(&self, id: MountId) -> Option<NodeId> {
        self.mounts.get(&id).map(|mount| mount.root)
    }

    /// Queue the changes that turn a mount into `vnode`. Returns the number
    /// of patches queued.
    ///
    /// With `use_virtual_dom` the previous tree is diffed against `vnode`;
    /// otherwise the root is replaced wholesale. A changed root tag is
    /// always a wholesale replacement.
    pub fn render(&mut self, id: MountId, vnode: VNode) -> Result<usize, RenderError> {
        if self.destroyed {
            return Err(RenderError::Destroyed);
        }
        let previous = self.mount_root(id).ok_or(RenderError::UnknownMount(id))?;
        if self.config.use_virtual_dom || !self.tree.is_reachable(previous) {
            self.flush();
        }

        let mount = self
            .mounts
            .get_mut(&id)
            .ok_or(RenderError::UnknownMount(id))?;
        let root = mount.root;
        if !self.tree.is_reachable(root) {
            return Err(ApplyError::DanglingTarget(root).into());
        }

        let patches = if self.config.use_virtual_dom && mount.vnode.tag == vnode.tag {
            Differ::new(&self.tree).diff(
                Anchor::at(&self.tree, root),
                Some(&mount.vnode),
                Some(&vnode),
            )
        } else {
            let replacement = self.tree.materialize_node(&vnode);
            mount.root = replacement;
            mount.replaced = Some(root);
            vec![Patch::update(root, replacement)]
        };
        mount.vnode = vnode;

        let count = patches.len();
        debug!(mount = %id, patches = count, "Rendered");
        self.queue_patches(patches);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchKind;
    use crate::scheduler::ScheduleMode;
    use std::time::Duration;

    fn renderer(config: RendererConfig) -> (Renderer, NodeId) {
        let mut renderer = Renderer::new(config).unwrap();
        let root = renderer.tree_mut().create_root("body");
        (renderer, root)
    }

    fn attr(target: NodeId, value: &str) -> Patch {
        Patch::set_attribute(target, "title", Some(value.into()))
    }

    #[test]
    fn test_queue_schedules_one_drain() {
        let (mut renderer, root) = renderer(RendererConfig::default());

        renderer.queue_patch(attr(root, "a"));
        renderer.queue_patch(attr(root, "b"));

        assert!(renderer.is_scheduled());
        assert!(renderer.wants_frame());
        assert_eq!(renderer.queue_len(), 2);
        assert!(renderer.tree().element(root).unwrap().attributes.is_empty());

        assert!(renderer.on_frame());
        assert!(!renderer.is_scheduled());
        assert_eq!(renderer.queue_len(), 0);
        assert_eq!(renderer.tree().element(root).unwrap().attributes["title"], "b");
        assert_eq!(renderer.stats().batch_count, 1);
    }

    #[test]
    fn test_timer_mode_waits_for_deadline() {
        let config = RendererConfig {
            use_raf: false,
            batch_delay: 20,
            ..RendererConfig::default()
        };
        let (mut renderer, root) = renderer(config);
        assert_eq!(
            renderer.scheduler.mode(),
            ScheduleMode::Timer(Duration::from_millis(20))
        );

        renderer.queue_patch(attr(root, "a"));
        let deadline = renderer.next_deadline().unwrap();

        assert!(!renderer.on_frame());
        assert!(!renderer.on_timer(deadline - Duration::from_millis(1)));
        assert!(renderer.on_timer(deadline));
        assert_eq!(renderer.queue_len(), 0);
    }

    #[test]
    fn test_cancel_scheduled_render_keeps_queue() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        renderer.queue_patch(attr(root, "a"));

        renderer.cancel_scheduled_render();

        assert!(!renderer.is_scheduled());
        assert!(!renderer.on_frame());
        assert_eq!(renderer.queue_len(), 1);
    }

    #[test]
    fn test_reentrant_process_batch_is_rejected() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        renderer.queue_patch(attr(root, "a"));
        renderer.is_rendering = true;

        assert!(!renderer.process_batch());
        assert_eq!(renderer.queue_len(), 1);

        renderer.is_rendering = false;
        assert!(renderer.process_batch());
    }

    #[test]
    fn test_schedule_render_is_noop_while_rendering() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        renderer.is_rendering = true;

        renderer.queue_patch(attr(root, "a"));
        assert!(!renderer.is_scheduled());
    }

    #[test]
    fn test_batches_reschedule_until_drained() {
        let config = RendererConfig {
            max_batch_size: 2,
            ..RendererConfig::default()
        };
        let (mut renderer, root) = renderer(config);
        renderer.queue_patches((0..5).map(|i| attr(root, &i.to_string())));

        let mut frames = 0;
        while renderer.on_frame() {
            frames += 1;
        }

        assert_eq!(frames, 3);
        assert_eq!(renderer.stats().batch_count, 3);
        assert_eq!(renderer.stats().total_patches, 5);
        assert_eq!(renderer.tree().element(root).unwrap().attributes["title"], "4");
    }

    #[test]
    fn test_failed_patches_are_counted_not_raised() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        let text = renderer.tree_mut().create_text("t");
        renderer.tree_mut().append_child(root, text).unwrap();

        renderer.queue_patches(vec![
            attr(text, "x"),
            Patch::remove(NodeId(999)),
            Patch::empty(PatchKind::Move),
            attr(root, "ok"),
        ]);
        renderer.flush();

        let stats = renderer.stats();
        assert_eq!(stats.failed_patches, 1);
        assert_eq!(stats.skipped_patches, 2);
        assert_eq!(renderer.tree().element(root).unwrap().attributes["title"], "ok");
    }

    #[test]
    fn test_clear_discards_queue_and_pending_drain() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        renderer.queue_patch(attr(root, "a"));

        renderer.clear();

        assert_eq!(renderer.queue_len(), 0);
        assert!(!renderer.is_scheduled());
        renderer.flush();
        assert_eq!(renderer.stats().batch_count, 0);
    }

    #[test]
    fn test_destroy_ignores_later_work() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        renderer.destroy();

        renderer.queue_patch(attr(root, "a"));
        assert_eq!(renderer.queue_len(), 0);
        assert!(!renderer.is_scheduled());
        assert_eq!(
            renderer.mount(root, VNode::new("p")),
            Err(RenderError::Destroyed)
        );
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = RendererConfig {
            max_batch_size: 0,
            ..RendererConfig::default()
        };
        assert!(Renderer::new(config).is_err());
    }

    #[test]
    fn test_mount_and_wholesale_render() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        let mount = renderer
            .mount(root, VNode::new("div").with_text("one"))
            .unwrap();
        let first = renderer.mount_root(mount).unwrap();
        assert_eq!(renderer.tree().children(root), &[first]);

        let queued = renderer
            .render(mount, VNode::new("div").with_text("two"))
            .unwrap();
        assert_eq!(queued, 1);
        renderer.flush();

        let second = renderer.mount_root(mount).unwrap();
        assert_ne!(first, second);
        assert!(!renderer.tree().contains(first));
        assert_eq!(
            renderer.tree().to_vchild(second),
            Some(VNode::new("div").with_text("two").into())
        );
    }

    #[test]
    fn test_consecutive_wholesale_renders_settle_on_last() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        let mount = renderer.mount(root, VNode::new("div")).unwrap();

        renderer.render(mount, VNode::new("p")).unwrap();
        renderer.render(mount, VNode::new("span")).unwrap();
        renderer.flush();

        let current = renderer.mount_root(mount).unwrap();
        assert_eq!(renderer.tree().children(root), &[current]);
        assert_eq!(renderer.tree().element(current).unwrap().tag, "span");
    }

    #[test]
    fn test_virtual_dom_render_diffs() {
        let config = RendererConfig {
            use_virtual_dom: true,
            ..RendererConfig::default()
        };
        let (mut renderer, root) = renderer(config);
        let mount = renderer
            .mount(root, VNode::new("div").with_prop("class", "a").with_text("hi"))
            .unwrap();
        let node = renderer.mount_root(mount).unwrap();

        let queued = renderer
            .render(mount, VNode::new("div").with_prop("class", "b").with_text("bye"))
            .unwrap();
        assert_eq!(queued, 2);
        renderer.flush();

        assert_eq!(renderer.mount_root(mount), Some(node));
        assert_eq!(renderer.tree().element(node).unwrap().classes, vec!["b"]);
        assert_eq!(
            renderer.tree().to_vchild(node),
            Some(VNode::new("div").with_prop("class", "b").with_text("bye").into())
        );
    }

    #[test]
    fn test_clear_restores_pending_wholesale_render() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        let mount = renderer.mount(root, VNode::new("div")).unwrap();
        let first = renderer.mount_root(mount).unwrap();

        renderer.render(mount, VNode::new("p")).unwrap();
        let pending = renderer.mount_root(mount).unwrap();
        let nodes = renderer.tree().len();
        renderer.clear();

        assert_eq!(renderer.mount_root(mount), Some(first));
        assert!(!renderer.tree().contains(pending));
        assert_eq!(renderer.tree().len(), nodes - 1);
        assert_eq!(renderer.tree().children(root), &[first]);

        assert_eq!(renderer.render(mount, VNode::new("span")), Ok(1));
        renderer.flush();
        let current = renderer.mount_root(mount).unwrap();
        assert_eq!(renderer.tree().children(root), &[current]);
        assert_eq!(renderer.tree().element(current).unwrap().tag, "span");
    }

    #[test]
    fn test_clear_resyncs_virtual_dom_mount() {
        let config = RendererConfig {
            use_virtual_dom: true,
            ..RendererConfig::default()
        };
        let (mut renderer, root) = renderer(config);
        let mount = renderer
            .mount(root, VNode::new("div").with_text("a"))
            .unwrap();
        let node = renderer.mount_root(mount).unwrap();

        assert_eq!(renderer.render(mount, VNode::new("div").with_text("b")), Ok(1));
        renderer.clear();
        assert_eq!(
            renderer.tree().to_vchild(node),
            Some(VNode::new("div").with_text("a").into())
        );

        assert_eq!(renderer.render(mount, VNode::new("div").with_text("b")), Ok(1));
        renderer.flush();
        assert_eq!(
            renderer.tree().to_vchild(node),
            Some(VNode::new("div").with_text("b").into())
        );
    }

    #[test]
    fn test_render_unknown_mount() {
        let (mut renderer, _) = renderer(RendererConfig::default());
        let missing = MountId(42);
        assert_eq!(
            renderer.render(missing, VNode::new("div")),
            Err(RenderError::UnknownMount(missing))
        );
    }

    #[test]
    fn test_observed_changes_join_the_queue() {
        let (mut renderer, root) = renderer(RendererConfig::default());
        assert!(renderer.observe_element(root));

        renderer.tree_mut().set_attribute(root, "title", "external").unwrap();
        assert_eq!(renderer.sync_observed(), 1);
        assert!(renderer.is_scheduled());

        renderer.flush();
        assert_eq!(renderer.stats().total_patches, 1);
        assert_eq!(
            renderer.tree().element(root).unwrap().attributes["title"],
            "external"
        );
        assert!(!renderer.tree().has_records());

        assert!(renderer.unobserve_element(root));
        renderer.tree_mut().set_attribute(root, "title", "quiet").unwrap();
        assert_eq!(renderer.sync_observed(), 0);
    }
}
