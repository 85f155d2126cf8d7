//=========================================================================
// Layer Controller
//=========================================================================
//
// Computes draw order for every window in every layer.
//
// Each layer owns a contiguous band of sort orders:
//
//   order = layer.index() * stride + position * step
//
// With the default stride of 1000 and step of 5 a layer holds 200
// windows before colliding with the next band. Position follows
// add / bring-to-front recency, so the last window added is drawn on top.
//
// A full-screen window hides every window below it in the same layer.
//
// The controller is pure bookkeeping. It returns `Placement`s and the
// manager pushes them to the render surface.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::window::{Layer, WindowKind};

//=== Placement ===========================================================

/// Computed draw state for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<K: WindowKind> {
    pub kind: K,
    pub order: i32,
    /// False when a full-screen window above covers it.
    pub visible: bool,
}

//=== LayerController =====================================================

#[derive(Debug, Clone, Copy)]
struct Slot<K: WindowKind> {
    kind: K,
    full_screen: bool,
}

pub struct LayerController<K: WindowKind> {
    layers: [Vec<Slot<K>>; Layer::ALL.len()],
    stride: i32,
    step: i32,
}

impl<K: WindowKind> LayerController<K> {
    pub fn new(stride: i32, step: i32) -> Self {
        if step <= 0 || stride <= step {
            warn!(
                "Layer stride {} with step {} leaves no room between layers",
                stride, step
            );
        }

        Self {
            layers: std::array::from_fn(|_| Vec::new()),
            stride,
            step,
        }
    }

    //--- Mutation ---------------------------------------------------------

    /// Appends `kind` to `layer`, or moves it to the front if present.
    ///
    /// Returns the recomputed placements of that layer.
    pub fn add_to_layer(&mut self, kind: K, layer: Layer, full_screen: bool) -> Vec<Placement<K>> {
        if let Some(current) = self.layer_of(kind) {
            if current != layer {
                warn!("{:?} moved from {:?} to {:?}", kind, current, layer);
                self.layers[current.index()].retain(|slot| slot.kind != kind);
            }
        }

        let slots = &mut self.layers[layer.index()];
        slots.retain(|slot| slot.kind != kind);
        slots.push(Slot { kind, full_screen });
        debug!("{:?} is now front of {:?}", kind, layer);

        self.placements(layer)
    }

    /// Moves an already placed window to the front of its layer.
    pub fn bring_to_front(&mut self, kind: K) -> Vec<Placement<K>> {
        let Some(layer) = self.layer_of(kind) else {
            debug!("{:?} is not in any layer", kind);
            return Vec::new();
        };

        let slots = &mut self.layers[layer.index()];
        if let Some(pos) = slots.iter().position(|slot| slot.kind == kind) {
            let slot = slots.remove(pos);
            slots.push(slot);
        }

        self.placements(layer)
    }

    /// Removes `kind` from its layer and recomputes the rest of it.
    pub fn remove_from_layer(&mut self, kind: K) -> Vec<Placement<K>> {
        let Some(layer) = self.layer_of(kind) else {
            return Vec::new();
        };

        self.layers[layer.index()].retain(|slot| slot.kind != kind);
        self.placements(layer)
    }

    pub fn clear(&mut self) {
        for slots in &mut self.layers {
            slots.clear();
        }
    }

    //--- Query API --------------------------------------------------------

    /// First sort order of `layer`.
    pub fn base(&self, layer: Layer) -> i32 {
        layer.index() as i32 * self.stride
    }

    pub fn layer_of(&self, kind: K) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| self.layers[layer.index()].iter().any(|slot| slot.kind == kind))
    }

    pub fn order_of(&self, kind: K) -> Option<i32> {
        let layer = self.layer_of(kind)?;
        self.placements(layer)
            .into_iter()
            .find(|placement| placement.kind == kind)
            .map(|placement| placement.order)
    }

    /// Windows of `layer`, back to front.
    pub fn kinds(&self, layer: Layer) -> Vec<K> {
        self.layers[layer.index()].iter().map(|slot| slot.kind).collect()
    }

    /// Draw state of every window in `layer`, back to front.
    pub fn placements(&self, layer: Layer) -> Vec<Placement<K>> {
        let base = self.base(layer);
        let slots = &self.layers[layer.index()];

        let mut placements: Vec<Placement<K>> = slots
            .iter()
            .enumerate()
            .map(|(position, slot)| Placement {
                kind: slot.kind,
                order: base + position as i32 * self.step,
                visible: true,
            })
            .collect();

        // Top-down: everything under a full-screen window is hidden.
        let mut occluded = false;
        for (placement, slot) in placements.iter_mut().zip(slots).rev() {
            placement.visible = !occluded;
            occluded |= slot.full_screen;
        }

        placements
    }
}

//=== Tests ===============================================================
