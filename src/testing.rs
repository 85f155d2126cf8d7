//=========================================================================
// Test Doubles
//=========================================================================
//
// In-memory collaborators shared by the unit tests.
//
// - `GatedProvider`: asset provider whose loads either resolve at once or
//   wait until the test completes them, counting loads and releases.
// - `RecordingSurface`: render surface that records every node's state
//   and the child order of every parent.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};

//=== Internal Dependencies ===============================================

use crate::asset::{Asset, AssetProvider, ProviderError};
use crate::surface::{NodeId, Parent, RenderSurface, SurfaceError};

//=== GatedProvider =======================================================

type Reply = oneshot::Sender<Result<Asset, ProviderError>>;

#[derive(Default)]
struct ProviderState {
    loads: HashMap<String, usize>,
    releases: HashMap<String, usize>,
    failing: HashSet<String>,
    pending: HashMap<String, Vec<Reply>>,
}

/// Asset provider driven by the test.
pub(crate) struct GatedProvider {
    gated: bool,
    state: RefCell<ProviderState>,
}

impl GatedProvider {
    /// Loads resolve on first poll.
    pub(crate) fn immediate() -> Rc<Self> {
        Rc::new(Self {
            gated: false,
            state: RefCell::default(),
        })
    }

    /// Loads stay pending until `complete` is called for their path.
    pub(crate) fn gated() -> Rc<Self> {
        Rc::new(Self {
            gated: true,
            state: RefCell::default(),
        })
    }

    pub(crate) fn fail_path(&self, path: &str) {
        self.state.borrow_mut().failing.insert(path.to_string());
    }

    /// Resolves every pending load of `path`.
    pub(crate) fn complete(&self, path: &str) {
        let (replies, fails) = {
            let mut state = self.state.borrow_mut();
            (
                state.pending.remove(path).unwrap_or_default(),
                state.failing.contains(path),
            )
        };

        for reply in replies {
            let _ = reply.send(Self::outcome(path, fails));
        }
    }

    pub(crate) fn load_count(&self, path: &str) -> usize {
        self.state.borrow().loads.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn release_count(&self, path: &str) -> usize {
        self.state.borrow().releases.get(path).copied().unwrap_or(0)
    }

    /// True when every pending load of `path` was dropped by its caller.
    pub(crate) fn is_cancelled(&self, path: &str) -> bool {
        self.state
            .borrow()
            .pending
            .get(path)
            .is_some_and(|replies| !replies.is_empty() && replies.iter().all(|r| r.is_canceled()))
    }

    fn outcome(path: &str, fails: bool) -> Result<Asset, ProviderError> {
        if fails {
            Err(ProviderError(format!("{} not found", path)))
        } else {
            Ok(Asset::new(path, path.to_string()))
        }
    }
}

impl AssetProvider for GatedProvider {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Asset, ProviderError>> {
        let mut state = self.state.borrow_mut();
        *state.loads.entry(path.to_string()).or_default() += 1;

        if !self.gated {
            let fails = state.failing.contains(path);
            return future::ready(Self::outcome(path, fails)).boxed_local();
        }

        let (reply, result) = oneshot::channel();
        state.pending.entry(path.to_string()).or_default().push(reply);

        async move {
            result
                .await
                .unwrap_or_else(|_| Err(ProviderError("load abandoned".into())))
        }
        .boxed_local()
    }

    fn release(&self, asset: &Asset) {
        *self
            .state
            .borrow_mut()
            .releases
            .entry(asset.path().to_string())
            .or_default() += 1;
    }
}

//=== RecordingSurface ====================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeRecord {
    pub active: bool,
    pub interactable: bool,
    pub sort_order: i32,
    pub parent: Parent,
    pub path: Option<String>,
    pub destroyed: bool,
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self {
            active: false,
            interactable: false,
            sort_order: 0,
            parent: Parent::Root,
            path: None,
            destroyed: false,
        }
    }
}

#[derive(Default)]
pub(crate) struct SurfaceRecord {
    nodes: HashMap<NodeId, NodeRecord>,
    children: HashMap<Parent, Vec<NodeId>>,
    failing: HashSet<String>,
    next_id: u64,
}

impl SurfaceRecord {
    pub(crate) fn node(&self, node: NodeId) -> &NodeRecord {
        &self.nodes[&node]
    }

    /// Children of `parent` in sibling order.
    pub(crate) fn children(&self, parent: Parent) -> Vec<NodeId> {
        self.children.get(&parent).cloned().unwrap_or_default()
    }

    /// Nodes created from assets and not yet destroyed.
    pub(crate) fn live_windows(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.path.is_some() && !n.destroyed)
            .count()
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.nodes.values().filter(|n| n.destroyed).count()
    }

    fn spawn(&mut self, path: Option<String>) -> NodeId {
        self.next_id += 1;
        let node = NodeId(self.next_id);
        self.nodes.insert(
            node,
            NodeRecord {
                path,
                ..NodeRecord::default()
            },
        );
        self.children.entry(Parent::Root).or_default().push(node);
        node
    }

    fn detach(&mut self, node: NodeId, parent: Parent) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&n| n != node);
        }
    }
}

/// Render surface double. Clones share one record.
#[derive(Clone, Default)]
pub(crate) struct RecordingSurface {
    record: Rc<RefCell<SurfaceRecord>>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self) -> Ref<'_, SurfaceRecord> {
        self.record.borrow()
    }

    /// Creates a bare node under the root, returning its raw id.
    pub(crate) fn spawn_node(&mut self) -> u64 {
        self.record.borrow_mut().spawn(Some(String::new())).0
    }

    pub(crate) fn fail_instantiate(&self, path: &str) {
        self.record.borrow_mut().failing.insert(path.to_string());
    }
}

impl RenderSurface for RecordingSurface {
    fn instantiate(&mut self, asset: &Asset) -> Result<NodeId, SurfaceError> {
        let mut record = self.record.borrow_mut();
        if record.failing.contains(asset.path()) {
            return Err(SurfaceError(format!("cannot instantiate {}", asset.path())));
        }
        Ok(record.spawn(Some(asset.path().to_string())))
    }

    fn create_overlay(&mut self) -> NodeId {
        self.record.borrow_mut().spawn(None)
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        self.record.borrow_mut().nodes.entry(node).or_default().active = active;
    }

    fn set_interactable(&mut self, node: NodeId, interactable: bool) {
        self.record.borrow_mut().nodes.entry(node).or_default().interactable = interactable;
    }

    fn set_sort_order(&mut self, node: NodeId, order: i32) {
        self.record.borrow_mut().nodes.entry(node).or_default().sort_order = order;
    }

    fn set_parent(&mut self, node: NodeId, parent: Parent) {
        let mut record = self.record.borrow_mut();
        let current = record.nodes.entry(node).or_default().parent;
        let attached = record
            .children
            .get(&current)
            .is_some_and(|siblings| siblings.contains(&node));
        if current == parent && attached {
            return;
        }

        record.detach(node, current);
        record.children.entry(parent).or_default().push(node);
        record.nodes.entry(node).or_default().parent = parent;
    }

    fn sibling_index(&self, node: NodeId) -> usize {
        let record = self.record.borrow();
        let parent = record.nodes.get(&node).map_or(Parent::Root, |n| n.parent);
        record
            .children
            .get(&parent)
            .and_then(|siblings| siblings.iter().position(|&n| n == node))
            .unwrap_or(0)
    }

    fn set_sibling_index(&mut self, node: NodeId, index: usize) {
        let mut record = self.record.borrow_mut();
        let parent = record.nodes.get(&node).map_or(Parent::Root, |n| n.parent);
        let siblings = record.children.entry(parent).or_default();
        siblings.retain(|&n| n != node);
        let index = index.min(siblings.len());
        siblings.insert(index, node);
    }

    fn destroy(&mut self, node: NodeId) {
        let mut record = self.record.borrow_mut();
        let parent = record.nodes.get(&node).map_or(Parent::Root, |n| n.parent);
        record.detach(node, parent);
        record.nodes.entry(node).or_default().destroyed = true;
    }
}
