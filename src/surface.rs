//=========================================================================
// Rendering Surface Interface
//=========================================================================
//
// Host-to-core capability contract for the visual side of windows.
//
// The manager never reaches into rendering internals. Everything it does
// to a window's visuals goes through this trait: create, show/hide,
// sort, parent and destroy.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::asset::Asset;
use crate::core::window::Layer;

//=== NodeId ==============================================================

/// Opaque identifier of a visual node owned by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

//=== Parent ==============================================================

/// Where a node is attached in the host hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The neutral root. Idle overlays park here.
    Root,

    /// The root node of a layer.
    Layer(Layer),
}

//=== SurfaceError ========================================================

/// Host-side failure while creating a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SurfaceError(pub String);

//=== RenderSurface =======================================================

/// Rendering capability provided by the host.
///
/// All calls happen on the main timeline. Implementations may assume a
/// node id they receive was produced by the same surface and has not been
/// destroyed yet.
pub trait RenderSurface {
    /// Creates a window node from a loaded asset.
    fn instantiate(&mut self, asset: &Asset) -> Result<NodeId, SurfaceError>;

    /// Creates the shared modal overlay node. Called once per manager.
    fn create_overlay(&mut self) -> NodeId;

    fn set_active(&mut self, node: NodeId, active: bool);

    fn set_interactable(&mut self, node: NodeId, interactable: bool);

    fn set_sort_order(&mut self, node: NodeId, order: i32);

    fn set_parent(&mut self, node: NodeId, parent: Parent);

    /// Position of the node among the children of its parent.
    fn sibling_index(&self, node: NodeId) -> usize;

    /// Moves the node to `index` among its siblings, shifting the rest.
    fn set_sibling_index(&mut self, node: NodeId, index: usize);

    fn destroy(&mut self, node: NodeId);
}
