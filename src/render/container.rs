use tracing::trace;

use crate::error::StarMapResult;
use crate::render::{RenderSurface, SceneNode};

/// In-memory render container for headless hosts and tests.
///
/// `mount_latency_polls` delays visibility of mounted scenes: a mounted node
/// only shows up after that many `capture_scene` calls, which mimics a
/// renderer that finishes drawing after the call returned.
#[derive(Debug, Default)]
pub struct SceneContainer {
    id: String,
    nodes: Vec<SceneNode>,
    pending: Vec<(SceneNode, u32)>,
    mount_latency_polls: u32,
    clear_count: usize,
}

impl SceneContainer {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mount_latency(mut self, polls: u32) -> Self {
        self.mount_latency_polls = polls;
        self
    }

    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// How many times the container has been emptied.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    fn promote_pending(&mut self) {
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for (node, remaining) in self.pending.drain(..) {
            if remaining == 0 {
                self.nodes.push(node);
            } else {
                still_pending.push((node, remaining - 1));
            }
        }
        self.pending = still_pending;
    }
}

impl RenderSurface for SceneContainer {
    fn container_id(&self) -> String {
        self.id.clone()
    }

    fn assign_container_id(&mut self, id: &str) {
        self.id = id.to_owned();
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.pending.clear();
        self.clear_count += 1;
    }

    fn mount(&mut self, scene: SceneNode) -> StarMapResult<()> {
        if self.mount_latency_polls == 0 {
            self.nodes.push(scene);
        } else {
            self.pending.push((scene, self.mount_latency_polls - 1));
        }
        Ok(())
    }

    fn capture_scene(&mut self) -> StarMapResult<Option<String>> {
        let found = self
            .nodes
            .iter()
            .find_map(|node| node.find("svg"))
            .map(SceneNode::to_markup);
        if found.is_none() {
            self.promote_pending();
        }
        trace!(container = %self.id, found = found.is_some(), "capture scene");
        Ok(found)
    }
}
