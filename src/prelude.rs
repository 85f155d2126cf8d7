//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_ui::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Window manager
pub use crate::manager::{UiConfig, UiManager, UiManagerBuilder};

// Window model
pub use crate::core::window::{
    instant_transition, Layer, Transition, Window, WindowDescriptor, WindowHandle, WindowKind,
    WindowParam, WindowState,
};

// Hook plumbing
pub use crate::core::commands::{UiCommand, WindowContext};
pub use crate::core::events::UiEvent;
pub use crate::error::{HookError, HookResult, UiError};

// Assets
pub use crate::asset::{
    Asset, AssetCache, AssetProvider, BlockingLoader, ProviderError, ThreadedProvider,
};

// Host surface
pub use crate::surface::{NodeId, Parent, RenderSurface, SurfaceError};
