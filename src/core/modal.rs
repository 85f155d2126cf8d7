//=========================================================================
// Modal Controller
//=========================================================================
//
// Drives the single overlay shared by every modal window.
//
// The overlay always sits directly behind the most recently shown modal
// window: same parent layer, the sibling slot just before it, and a sort
// order one below. When that window is hidden the next modal down the
// stack claims the overlay again; when none is left the overlay is
// deactivated and parked under the neutral root.
//
// At most one click binding exists at a time, always pointing at the
// current top modal if it asked for click-outside-close.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::window::{Layer, WindowKind};
use crate::surface::{NodeId, Parent, RenderSurface};

//=== ModalTarget =========================================================

/// Everything the controller needs to know about a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTarget<K: WindowKind> {
    pub kind: K,
    pub node: NodeId,
    pub layer: Layer,
    pub order: i32,
    pub modal: bool,
    pub click_close: bool,
}

//=== ModalController =====================================================

pub struct ModalController<K: WindowKind> {
    overlay: NodeId,
    stack: Vec<K>,
    click_target: Option<K>,
    active: bool,
}

impl<K: WindowKind> ModalController<K> {
    /// Takes ownership of the overlay node and parks it.
    pub fn new(surface: &mut dyn RenderSurface) -> Self {
        let overlay = surface.create_overlay();
        surface.set_active(overlay, false);
        surface.set_parent(overlay, Parent::Root);

        Self {
            overlay,
            stack: Vec::new(),
            click_target: None,
            active: false,
        }
    }

    //--- Mask Control -----------------------------------------------------

    /// Puts the overlay behind `target`. No-op for non-modal windows.
    ///
    /// Showing a window already on the stack moves it to the top.
    pub fn show_mask(&mut self, surface: &mut dyn RenderSurface, target: &ModalTarget<K>) {
        if !target.modal {
            return;
        }

        self.stack.retain(|&kind| kind != target.kind);
        self.stack.push(target.kind);
        self.attach(surface, target);
    }

    /// Drops `kind` from the stack and hands the overlay to the new top.
    ///
    /// `resolve` maps a kind to its current target.
    pub fn hide_mask(
        &mut self,
        surface: &mut dyn RenderSurface,
        kind: K,
        resolve: impl Fn(K) -> Option<ModalTarget<K>>,
    ) {
        let Some(pos) = self.stack.iter().position(|&k| k == kind) else {
            return;
        };
        self.stack.remove(pos);

        self.refresh(surface, resolve);
    }

    /// Re-attaches the overlay to the current top, for instance after
    /// sort orders changed.
    pub fn refresh(
        &mut self,
        surface: &mut dyn RenderSurface,
        resolve: impl Fn(K) -> Option<ModalTarget<K>>,
    ) {
        match self.stack.last().copied().and_then(&resolve) {
            Some(target) => self.attach(surface, &target),
            None if self.stack.is_empty() => self.detach(surface),
            None => {
                // Top could not be resolved; treat it as gone.
                self.stack.pop();
                self.refresh(surface, resolve);
            }
        }
    }

    /// Deactivates the overlay and forgets every modal.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) {
        self.stack.clear();
        self.detach(surface);
    }

    fn attach(&mut self, surface: &mut dyn RenderSurface, target: &ModalTarget<K>) {
        surface.set_parent(self.overlay, Parent::Layer(target.layer));

        // Removing the overlay first shifts the window down by one.
        let window_index = surface.sibling_index(target.node);
        let index = if surface.sibling_index(self.overlay) < window_index {
            window_index - 1
        } else {
            window_index
        };
        surface.set_sibling_index(self.overlay, index);
        surface.set_sort_order(self.overlay, target.order - 1);
        surface.set_active(self.overlay, true);

        self.active = true;
        self.click_target = target.click_close.then_some(target.kind);
        debug!("Overlay attached behind {:?}", target.kind);
    }

    fn detach(&mut self, surface: &mut dyn RenderSurface) {
        if self.active {
            debug!("Overlay released");
        }
        surface.set_active(self.overlay, false);
        surface.set_parent(self.overlay, Parent::Root);

        self.active = false;
        self.click_target = None;
    }

    //--- Query API --------------------------------------------------------

    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Window the overlay's click currently closes.
    pub fn click_target(&self) -> Option<K> {
        self.click_target
    }

    /// Current top modal.
    pub fn top(&self) -> Option<K> {
        self.stack.last().copied()
    }

    pub fn contains(&self, kind: K) -> bool {
        self.stack.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

//=== Tests ===============================================================
