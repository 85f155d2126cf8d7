//=========================================================================
// Core Window Systems
//=========================================================================
//
// Building blocks the window manager is assembled from.
//
// Responsibilities:
// - Describe windows and their hooks (`window`)
// - Track live instances (`registry`)
// - Compute draw order and occlusion (`layer`)
// - Drive the shared modal overlay (`modal`)
// - Keep back-navigation history (`navigation`)
// - Carry deferred requests and lifecycle notifications
//   (`commands`, `events`)
//
// Notes:
// Apart from `window`, none of these modules call window hooks or await
// anything. They are plain single-step bookkeeping, and the manager
// sequences them around the suspension points.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod commands;
pub mod events;
pub mod layer;
pub mod modal;
pub mod navigation;
pub mod queue;
pub mod registry;
pub mod window;
