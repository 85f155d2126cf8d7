//=========================================================================
// Window Definitions
//=========================================================================
//
// Static window description and the per-window hook interface.
//
// Architecture:
//   WindowCatalog
//     └─ K → { WindowDescriptor, factory → Box<dyn Window<K>> }
//
//   WindowHandle (Rc<WindowInstance>)
//     ├─ state / visible / interactable / sort order
//     ├─ asset reference + surface node
//     └─ RefCell<Box<dyn Window<K>>>  (hooks)
//
//=========================================================================

//=== Module Declarations =================================================

mod catalog;
mod instance;

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

//=== Internal Dependencies ===============================================

use crate::core::commands::WindowContext;
use crate::error::HookResult;

//=== Public API ==========================================================

pub use catalog::{WindowCatalog, WindowFactory};
pub use instance::{WindowHandle, WindowState};

//=== Window Kind Trait ===================================================

/// Marker trait for window identifiers.
///
/// Window kinds key every manager structure. Typically implemented by a
/// game-specific enum.
pub trait WindowKind: Clone + Copy + Eq + Hash + Debug + 'static {}

//=== Layer ===============================================================

/// Coarse draw-order bucket. Later variants draw above earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Scene backdrops such as a main menu background.
    Scene,
    Hud,
    Normal,
    Popup,
    /// Loading screens and similar.
    Top,
    /// Debug consoles.
    System,
}

impl Layer {
    /// Every layer, bottom to top.
    pub const ALL: [Layer; 6] = [
        Layer::Scene,
        Layer::Hud,
        Layer::Normal,
        Layer::Popup,
        Layer::Top,
        Layer::System,
    ];

    /// Rank of the layer, 0 for the bottom one.
    pub const fn index(self) -> usize {
        self as usize
    }
}

//=== WindowDescriptor ====================================================

/// Immutable per-kind window configuration.
///
/// Built once at startup and handed to the catalog; never mutated at
/// runtime.
///
/// # Example
///
/// ```rust
/// use aetheric_ui::prelude::*;
///
/// const SETTINGS: WindowDescriptor =
///     WindowDescriptor::new("Settings", Layer::Normal, "ui/settings")
///         .modal()
///         .click_outside_close();
///
/// assert!(SETTINGS.modal && SETTINGS.stackable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDescriptor {
    pub name: &'static str,
    pub layer: Layer,
    /// Logical resource path handed to the asset cache.
    pub path: &'static str,
    /// Blocks everything behind it with the shared overlay.
    pub modal: bool,
    /// Clicking the overlay closes the window. Only meaningful when modal.
    pub click_outside_close: bool,
    /// Participates in back navigation.
    pub stackable: bool,
    /// Destroyed on close instead of kept for reopening.
    pub destroy_on_close: bool,
    /// Hides windows below it in the same layer.
    pub full_screen: bool,
    /// Receives `on_update` every frame while open.
    pub updates: bool,
}

impl WindowDescriptor {
    /// Non-modal, stackable, cached on close.
    pub const fn new(name: &'static str, layer: Layer, path: &'static str) -> Self {
        Self {
            name,
            layer,
            path,
            modal: false,
            click_outside_close: false,
            stackable: true,
            destroy_on_close: false,
            full_screen: false,
            updates: false,
        }
    }

    pub const fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub const fn click_outside_close(mut self) -> Self {
        self.click_outside_close = true;
        self
    }

    pub const fn unstacked(mut self) -> Self {
        self.stackable = false;
        self
    }

    pub const fn destroy_on_close(mut self) -> Self {
        self.destroy_on_close = true;
        self
    }

    pub const fn full_screen(mut self) -> Self {
        self.full_screen = true;
        self
    }

    pub const fn updates(mut self) -> Self {
        self.updates = true;
        self
    }
}

//=== Window Trait ========================================================

/// Parameter passed to `on_open` / `on_refresh`.
pub type WindowParam = Rc<dyn Any>;

/// Open or close animation. Runs to completion before the transition
/// continues; an error is logged and the transition proceeds anyway.
pub type Transition = LocalBoxFuture<'static, HookResult>;

/// Returns a transition that completes immediately.
pub fn instant_transition() -> Transition {
    future::ready(Ok(())).boxed_local()
}

/// Lifecycle hooks implemented per window variant.
///
/// Hooks run in the middle of a manager step. They must not call back
/// into the manager; further requests go through the [`WindowContext`]
/// and are applied on the next `update`.
///
/// Errors returned from hooks are logged and never abort the transition
/// that invoked them.
///
/// # Minimal Implementation
///
/// ```rust
/// # use aetheric_ui::prelude::*;
/// # use std::any::Any;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Ui { Hud }
/// # impl WindowKind for Ui {}
/// struct HudWindow;
///
/// impl Window<Ui> for HudWindow {
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
/// ```
pub trait Window<K: WindowKind>: 'static {
    /// Called once after the visual node has been instantiated.
    fn on_create(&mut self, _ctx: &mut WindowContext<'_, K>) -> HookResult {
        Ok(())
    }

    /// Called when the window starts opening.
    fn on_open(&mut self, _ctx: &mut WindowContext<'_, K>, _param: Option<&dyn Any>) -> HookResult {
        Ok(())
    }

    /// Called when an already open window is opened again.
    fn on_refresh(&mut self, ctx: &mut WindowContext<'_, K>, param: Option<&dyn Any>) -> HookResult {
        self.on_open(ctx, param)
    }

    /// Called once the window is hidden and marked closed.
    fn on_close(&mut self, _ctx: &mut WindowContext<'_, K>) -> HookResult {
        Ok(())
    }

    /// Another stackable window covered this one.
    fn on_pause(&mut self, _ctx: &mut WindowContext<'_, K>) -> HookResult {
        Ok(())
    }

    /// This window became the top of the navigation stack.
    fn on_resume(&mut self, _ctx: &mut WindowContext<'_, K>) -> HookResult {
        Ok(())
    }

    /// Per-frame tick. Only called for descriptors with `updates` set.
    fn on_update(&mut self, _ctx: &mut WindowContext<'_, K>, _dt: f32) -> HookResult {
        Ok(())
    }

    /// Called right before the visual node is destroyed.
    fn on_destroy(&mut self) -> HookResult {
        Ok(())
    }

    fn open_transition(&mut self) -> Transition {
        instant_transition()
    }

    fn close_transition(&mut self) -> Transition {
        instant_transition()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//=== Tests ===============================================================
