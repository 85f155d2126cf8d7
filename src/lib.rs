//=========================================================================
// Aetheric UI Library Root
//
// Window management core for layered game user interfaces.
//
// Responsibilities:
// - Expose the window manager facade (`UiManager`)
// - Define the host seams: asset loading (`AssetProvider`) and
//   presentation (`RenderSurface`)
// - Keep layer, modal and navigation bookkeeping behind the manager
//
// Typical usage:
// ```ignore
// use aetheric_ui::prelude::*;
//
// let manager = UiManager::builder()
//     .register(Ui::Settings, SETTINGS, || SettingsWindow::default())
//     .build(surface, provider);
//
// let settings = manager.open(Ui::Settings, None).await?;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the window model and the controllers the manager drives
// (layers, modal overlay, navigation). It is public so hosts can read
// handles, descriptors and events, but only `UiManager` mutates it.
//
pub mod core;

// Reference-counted asset cache and provider seams.
pub mod asset;

// Host presentation seam.
pub mod surface;

// The window manager and its builder.
pub mod manager;

// Error taxonomy.
pub mod error;

pub mod prelude;

//--- Internal Modules ----------------------------------------------------

#[cfg(test)]
mod testing;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the manager so hosts can `use aetheric_ui::UiManager;`
// without knowing the module layout.
//
pub use error::UiError;
pub use manager::{UiConfig, UiManager, UiManagerBuilder};
