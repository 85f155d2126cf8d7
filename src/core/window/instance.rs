//=========================================================================
// Window Instance
//=========================================================================
//
// Runtime object bound to one window kind.
//
// State machine:
//   None → Loading → Opening → Opened → Closing → Closed → Destroyed
//                       ↑                           │
//                       └──── cached reopen ────────┘
//
// Instances are shared through `WindowHandle` (an `Rc`). Mutable
// attributes live in `Cell`s so the manager can update them while other
// handles to the same instance are alive.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::warn;

//=== Internal Dependencies ===============================================

use super::{instant_transition, Transition, Window, WindowDescriptor, WindowKind};
use crate::asset::Asset;
use crate::core::commands::{CommandQueue, WindowContext};
use crate::core::modal::ModalTarget;
use crate::error::HookResult;
use crate::surface::{NodeId, RenderSurface};

//=== WindowState =========================================================

/// Lifecycle state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    /// No instance exists.
    #[default]
    None,

    /// The window's resource is being loaded.
    Loading,

    Opening,

    Opened,

    Closing,

    /// Hidden and retained for reopening.
    Closed,

    /// Released. Terminal.
    Destroyed,
}

//=== WindowInstance ======================================================

struct WindowInstance<K: WindowKind> {
    kind: K,
    descriptor: WindowDescriptor,
    node: NodeId,
    state: Cell<WindowState>,
    visible: Cell<bool>,
    interactable: Cell<bool>,
    sort_order: Cell<i32>,
    asset: RefCell<Option<Asset>>,
    window: RefCell<Box<dyn Window<K>>>,
}

//=== WindowHandle ========================================================

/// Shared handle to a live window instance.
pub struct WindowHandle<K: WindowKind> {
    inner: Rc<WindowInstance<K>>,
}

impl<K: WindowKind> Clone for WindowHandle<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: WindowKind> fmt::Debug for WindowHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle")
            .field("kind", &self.inner.kind)
            .field("state", &self.inner.state.get())
            .field("node", &self.inner.node)
            .finish()
    }
}

impl<K: WindowKind> WindowHandle<K> {
    pub(crate) fn new(
        kind: K,
        descriptor: WindowDescriptor,
        node: NodeId,
        asset: Asset,
        window: Box<dyn Window<K>>,
    ) -> Self {
        Self {
            inner: Rc::new(WindowInstance {
                kind,
                descriptor,
                node,
                state: Cell::new(WindowState::None),
                visible: Cell::new(false),
                interactable: Cell::new(false),
                sort_order: Cell::new(0),
                asset: RefCell::new(Some(asset)),
                window: RefCell::new(window),
            }),
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn kind(&self) -> K {
        self.inner.kind
    }

    pub fn descriptor(&self) -> &WindowDescriptor {
        &self.inner.descriptor
    }

    pub fn node(&self) -> NodeId {
        self.inner.node
    }

    pub fn state(&self) -> WindowState {
        self.inner.state.get()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn is_interactable(&self) -> bool {
        self.inner.interactable.get()
    }

    pub fn sort_order(&self) -> i32 {
        self.inner.sort_order.get()
    }

    /// True while the instance still holds its asset reference.
    pub fn holds_asset(&self) -> bool {
        self.inner.asset.borrow().is_some()
    }

    /// True when both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &WindowHandle<K>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs `f` against the concrete window type.
    ///
    /// Returns `None` when the window is not a `T` or is currently busy
    /// inside one of its own hooks.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut window = self.inner.window.try_borrow_mut().ok()?;
        window.as_any_mut().downcast_mut::<T>().map(f)
    }

    //--- Manager Mutations ------------------------------------------------

    pub(crate) fn set_state(&self, state: WindowState) {
        self.inner.state.set(state);
    }

    pub(crate) fn set_visible(&self, surface: &mut dyn RenderSurface, visible: bool) {
        self.inner.visible.set(visible);
        surface.set_active(self.inner.node, visible);
    }

    pub(crate) fn set_interactable(&self, surface: &mut dyn RenderSurface, interactable: bool) {
        self.inner.interactable.set(interactable);
        surface.set_interactable(self.inner.node, interactable);
    }

    pub(crate) fn set_sort_order(&self, surface: &mut dyn RenderSurface, order: i32) {
        self.inner.sort_order.set(order);
        surface.set_sort_order(self.inner.node, order);
    }

    /// Hands the asset reference out. Yields it at most once.
    pub(crate) fn take_asset(&self) -> Option<Asset> {
        self.inner.asset.borrow_mut().take()
    }

    pub(crate) fn modal_target(&self) -> ModalTarget<K> {
        let descriptor = &self.inner.descriptor;
        ModalTarget {
            kind: self.inner.kind,
            node: self.inner.node,
            layer: descriptor.layer,
            order: self.inner.sort_order.get(),
            modal: descriptor.modal,
            click_close: descriptor.click_outside_close,
        }
    }

    //--- Hook Dispatch ----------------------------------------------------

    /// Invokes a hook with a context for this window, logging failures.
    pub(crate) fn invoke(
        &self,
        hook: &str,
        commands: &mut CommandQueue<K>,
        f: impl FnOnce(&mut dyn Window<K>, &mut WindowContext<'_, K>) -> HookResult,
    ) {
        let Ok(mut window) = self.inner.window.try_borrow_mut() else {
            warn!("{:?} is busy, skipping {}", self.inner.kind, hook);
            return;
        };

        let mut ctx = WindowContext::new(self.inner.kind, commands);
        if let Err(err) = f(window.as_mut(), &mut ctx) {
            warn!("{:?} {} failed: {}", self.inner.kind, hook, err);
        }
    }

    pub(crate) fn invoke_destroy(&self) {
        let Ok(mut window) = self.inner.window.try_borrow_mut() else {
            warn!("{:?} is busy, skipping on_destroy", self.inner.kind);
            return;
        };

        if let Err(err) = window.on_destroy() {
            warn!("{:?} on_destroy failed: {}", self.inner.kind, err);
        }
    }

    pub(crate) fn open_transition(&self) -> Transition {
        match self.inner.window.try_borrow_mut() {
            Ok(mut window) => window.open_transition(),
            Err(_) => instant_transition(),
        }
    }

    pub(crate) fn close_transition(&self) -> Transition {
        match self.inner.window.try_borrow_mut() {
            Ok(mut window) => window.close_transition(),
            Err(_) => instant_transition(),
        }
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::Layer;
    use crate::testing::RecordingSurface;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestUi {
        Bag,
    }

    impl WindowKind for TestUi {}

    struct Bag {
        opened: usize,
    }

    impl Window<TestUi> for Bag {
        fn on_open(&mut self, _ctx: &mut WindowContext<'_, TestUi>, _param: Option<&dyn Any>) -> HookResult {
            self.opened += 1;
            Err("bag failed to open".into())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn handle() -> WindowHandle<TestUi> {
        WindowHandle::new(
            TestUi::Bag,
            WindowDescriptor::new("Bag", Layer::Normal, "ui/bag"),
            NodeId(7),
            Asset::new("ui/bag", ()),
            Box::new(Bag { opened: 0 }),
        )
    }

    #[test]
    fn new_handle_starts_absent_and_hidden() {
        let handle = handle();

        assert_eq!(handle.state(), WindowState::None);
        assert!(!handle.is_visible());
        assert!(!handle.is_interactable());
        assert!(handle.holds_asset());
    }

    #[test]
    fn take_asset_yields_once() {
        let handle = handle();

        assert!(handle.take_asset().is_some());
        assert!(handle.take_asset().is_none());
        assert!(!handle.holds_asset());
    }

    #[test]
    fn failing_hook_is_contained() {
        let handle = handle();
        let mut commands = CommandQueue::new();

        handle.invoke("on_open", &mut commands, |w, ctx| w.on_open(ctx, None));

        assert_eq!(handle.with(|bag: &mut Bag| bag.opened), Some(1));
    }

    #[test]
    fn with_rejects_wrong_type() {
        let handle = handle();
        assert_eq!(handle.with(|_: &mut String| ()), None);
    }

    #[test]
    fn visual_setters_reach_surface() {
        let handle = handle();
        let mut surface = RecordingSurface::new();

        handle.set_visible(&mut surface, true);
        handle.set_sort_order(&mut surface, 2005);
        handle.set_interactable(&mut surface, true);

        let record = surface.record();
        let node = record.node(NodeId(7));
        assert!(node.active);
        assert!(node.interactable);
        assert_eq!(node.sort_order, 2005);
        assert_eq!(handle.sort_order(), 2005);
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = handle();
        let b = a.clone();
        let c = handle();

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
