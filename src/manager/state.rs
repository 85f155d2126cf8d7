//=========================================================================
// Manager State
//=========================================================================
//
// Everything the window manager mutates, behind one `RefCell`.
//
// Every method here is a single synchronous step of the main timeline:
// it never awaits, so layer, modal and navigation updates of one step
// can never interleave with another step's.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;

use futures::future::{AbortHandle, LocalBoxFuture, Shared};
use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::UiConfig;
use crate::asset::{Asset, AssetCache};
use crate::core::commands::CommandQueue;
use crate::core::events::{EventQueue, UiEvent};
use crate::core::layer::{LayerController, Placement};
use crate::core::modal::ModalController;
use crate::core::navigation::{NavSignal, NavigationStack};
use crate::core::registry::WindowRegistry;
use crate::core::window::{WindowCatalog, WindowHandle, WindowKind, WindowState};
use crate::error::UiError;
use crate::surface::{Parent, RenderSurface};

//=== Transitions =========================================================

/// Outcome of a transition. Closing resolves to `None`.
pub(super) type TransitionResult<K> = Result<Option<WindowHandle<K>>, UiError>;

pub(super) type SharedTransition<K> = Shared<LocalBoxFuture<'static, TransitionResult<K>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
    /// Waiting for the asset. Cancellable.
    Loading,
    /// Registered and running the open animation.
    Opening,
    /// Running the close animation.
    Closing,
}

/// The single transition a kind may have in flight.
pub(super) struct InFlight<K: WindowKind> {
    pub id: u64,
    pub phase: Phase,
    pub abort: Option<AbortHandle>,
    pub future: SharedTransition<K>,
    /// Callers currently awaiting `future`.
    pub joiners: usize,
}

//=== UiState =============================================================

pub(super) struct UiState<K: WindowKind> {
    pub surface: Box<dyn RenderSurface>,
    pub registry: WindowRegistry<K>,
    pub layers: LayerController<K>,
    pub modal: ModalController<K>,
    pub navigation: NavigationStack<K>,
    pub transitions: HashMap<K, InFlight<K>>,
    /// Kinds receiving `on_update`, in registration order.
    pub updating: Vec<K>,
    pub commands: CommandQueue<K>,
    pub events: EventQueue<K>,
    pub shut_down: bool,
    next_id: u64,
}

impl<K: WindowKind> UiState<K> {
    pub fn new(mut surface: Box<dyn RenderSurface>, config: &UiConfig) -> Self {
        let modal = ModalController::new(surface.as_mut());

        Self {
            surface,
            registry: WindowRegistry::new(),
            layers: LayerController::new(config.layer_stride, config.order_step),
            modal,
            navigation: NavigationStack::new(),
            transitions: HashMap::new(),
            updating: Vec::new(),
            commands: CommandQueue::new(),
            events: EventQueue::new(),
            shut_down: false,
            next_id: 0,
        }
    }

    //--- Transition Bookkeeping -------------------------------------------

    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// True while transition `id` is still the one registered for `kind`.
    pub fn owns(&self, kind: K, id: u64) -> bool {
        self.transitions.get(&kind).is_some_and(|in_flight| in_flight.id == id)
    }

    pub fn phase(&self, kind: K) -> Option<Phase> {
        self.transitions.get(&kind).map(|in_flight| in_flight.phase)
    }

    pub fn set_phase(&mut self, kind: K, phase: Phase) {
        if let Some(in_flight) = self.transitions.get_mut(&kind) {
            in_flight.phase = phase;
        }
    }

    /// Registers one more caller on the transition of `kind`.
    pub fn join(&mut self, kind: K) -> Option<(u64, Phase, SharedTransition<K>)> {
        let in_flight = self.transitions.get_mut(&kind)?;
        in_flight.joiners += 1;
        Some((in_flight.id, in_flight.phase, in_flight.future.clone()))
    }

    /// Drops one caller from transition `id`. True when it was the last.
    pub fn leave(&mut self, kind: K, id: u64) -> bool {
        match self.transitions.get_mut(&kind) {
            Some(in_flight) if in_flight.id == id => {
                in_flight.joiners = in_flight.joiners.saturating_sub(1);
                in_flight.joiners == 0
            }
            _ => false,
        }
    }

    /// Completes the transition of `kind` on the spot once nobody polls it.
    ///
    /// A load is aborted. An open or close animation is skipped and the
    /// window lands in Opened or Closed.
    pub fn settle_abandoned(&mut self, kind: K, cache: &AssetCache) -> Option<InFlight<K>> {
        let phase = self.phase(kind)?;
        let in_flight = self.cancel(kind)?;

        let Some(handle) = self.registry.get(kind).cloned() else {
            return Some(in_flight);
        };
        match phase {
            Phase::Loading => {}
            Phase::Opening => {
                if handle.state() == WindowState::Opening {
                    self.finish_open(&handle);
                }
            }
            Phase::Closing => self.close_now(&handle, cache),
        }
        Some(in_flight)
    }

    /// Unregisters the transition of `kind`, aborting it if still loading.
    ///
    /// The caller drops the returned value once its borrow is released.
    pub fn cancel(&mut self, kind: K) -> Option<InFlight<K>> {
        let in_flight = self.transitions.remove(&kind)?;
        if let Some(abort) = &in_flight.abort {
            abort.abort();
        }
        debug!("Superseded {:?} transition of {:?}", in_flight.phase, kind);
        Some(in_flight)
    }

    //--- Creation ---------------------------------------------------------

    /// Builds a hidden instance of `kind` from a loaded asset.
    ///
    /// The asset reference is handed back to the cache on failure.
    pub fn instantiate(
        &mut self,
        catalog: &WindowCatalog<K>,
        cache: &AssetCache,
        kind: K,
        asset: Asset,
    ) -> Result<WindowHandle<K>, UiError> {
        let created = catalog
            .descriptor(kind)
            .copied()
            .and_then(|descriptor| Ok((descriptor, catalog.create(kind)?)));
        let (descriptor, window) = match created {
            Ok(created) => created,
            Err(err) => {
                cache.release(&asset);
                return Err(err);
            }
        };

        let node = match self.surface.instantiate(&asset) {
            Ok(node) => node,
            Err(err) => {
                error!("Failed to instantiate {:?}: {}", kind, err);
                let failure = UiError::load_failure(asset.path(), err.0);
                cache.release(&asset);
                return Err(failure);
            }
        };

        let handle = WindowHandle::new(kind, descriptor, node, asset, window);
        self.surface.set_parent(node, Parent::Layer(descriptor.layer));
        handle.set_visible(self.surface.as_mut(), false);
        handle.set_interactable(self.surface.as_mut(), false);
        handle.invoke("on_create", &mut self.commands, |window, ctx| window.on_create(ctx));

        debug!("Created {:?} as {:?}", kind, node);
        Ok(handle)
    }

    //--- Opening ----------------------------------------------------------

    /// Registers `handle` and shows it, up to the open animation.
    pub fn open_visuals(&mut self, handle: &WindowHandle<K>, param: Option<&dyn Any>) {
        let kind = handle.kind();
        let descriptor = *handle.descriptor();

        self.registry.insert_opened(handle.clone());
        handle.set_state(WindowState::Opening);
        handle.set_visible(self.surface.as_mut(), true);
        handle.set_interactable(self.surface.as_mut(), false);
        handle.invoke("on_open", &mut self.commands, |window, ctx| window.on_open(ctx, param));

        let placements = self
            .layers
            .add_to_layer(kind, descriptor.layer, descriptor.full_screen);
        self.apply_placements(placements);
        self.modal.show_mask(self.surface.as_mut(), &handle.modal_target());

        if descriptor.updates && !self.updating.contains(&kind) {
            self.updating.push(kind);
        }
        debug!("Opening {:?}", kind);
    }

    /// Re-opening an open window: hooks and front position, no animation.
    pub fn refresh_opened(&mut self, handle: &WindowHandle<K>, param: Option<&dyn Any>) {
        handle.invoke("on_refresh", &mut self.commands, |window, ctx| {
            window.on_refresh(ctx, param)
        });

        let placements = self.layers.bring_to_front(handle.kind());
        self.apply_placements(placements);
        self.modal.show_mask(self.surface.as_mut(), &handle.modal_target());
        debug!("Refreshed {:?}", handle.kind());
    }

    /// Completes an open after its animation.
    pub fn finish_open(&mut self, handle: &WindowHandle<K>) {
        let kind = handle.kind();

        handle.set_interactable(self.surface.as_mut(), true);
        handle.set_state(WindowState::Opened);

        if handle.descriptor().stackable {
            let Self {
                registry,
                navigation,
                commands,
                ..
            } = self;
            navigation.push(kind, |target, signal| {
                if let Some(target) = registry.get(target) {
                    dispatch_nav(target, signal, commands);
                }
            });
        }

        self.events.push(UiEvent::Opened(kind));
        debug!("Opened {:?}", kind);
    }

    //--- Closing ----------------------------------------------------------

    /// Hides `handle` and unregisters it everywhere, then caches or
    /// destroys it.
    pub fn close_now(&mut self, handle: &WindowHandle<K>, cache: &AssetCache) {
        let kind = handle.kind();
        let descriptor = *handle.descriptor();

        self.registry.remove_opened(kind);
        self.updating.retain(|&k| k != kind);

        handle.set_interactable(self.surface.as_mut(), false);
        handle.set_visible(self.surface.as_mut(), false);
        handle.set_state(WindowState::Closed);
        handle.invoke("on_close", &mut self.commands, |window, ctx| window.on_close(ctx));

        if descriptor.stackable {
            let Self {
                registry,
                navigation,
                commands,
                ..
            } = self;
            navigation.pop(kind, |target, signal| {
                let target = if target == kind {
                    Some(handle)
                } else {
                    registry.get(target)
                };
                if let Some(target) = target {
                    dispatch_nav(target, signal, commands);
                }
            });
        }

        let registry = &self.registry;
        self.modal.hide_mask(self.surface.as_mut(), kind, |k| {
            registry.get(k).map(WindowHandle::modal_target)
        });

        let placements = self.layers.remove_from_layer(kind);
        self.apply_placements(placements);

        self.events.push(UiEvent::Closed(kind));
        debug!("Closed {:?}", kind);

        if descriptor.destroy_on_close {
            self.destroy(handle, cache);
        } else {
            self.registry.insert_cached(handle.clone());
        }
    }

    /// Tears the instance down and returns its asset reference.
    pub fn destroy(&mut self, handle: &WindowHandle<K>, cache: &AssetCache) {
        handle.invoke_destroy();
        self.surface.destroy(handle.node());

        if let Some(asset) = handle.take_asset() {
            cache.release(&asset);
        }
        handle.set_state(WindowState::Destroyed);
        debug!("Destroyed {:?}", handle.kind());
    }

    //--- Layout -----------------------------------------------------------

    fn apply_placements(&mut self, placements: Vec<Placement<K>>) {
        let surface = self.surface.as_mut();
        for placement in placements {
            if let Some(handle) = self.registry.get(placement.kind) {
                handle.set_sort_order(surface, placement.order);
                handle.set_visible(surface, placement.visible);
            }
        }

        // Orders moved, so the overlay has to follow its window.
        let registry = &self.registry;
        self.modal.refresh(self.surface.as_mut(), |kind| {
            registry.get(kind).map(WindowHandle::modal_target)
        });
    }
}

//=== Helpers =============================================================

fn dispatch_nav<K: WindowKind>(
    handle: &WindowHandle<K>,
    signal: NavSignal,
    commands: &mut CommandQueue<K>,
) {
    match signal {
        NavSignal::Pause => handle.invoke("on_pause", commands, |window, ctx| window.on_pause(ctx)),
        NavSignal::Resume => {
            handle.invoke("on_resume", commands, |window, ctx| window.on_resume(ctx))
        }
    }
}
