//=========================================================================
// Window Events
//=========================================================================
//
// Lifecycle notifications the manager emits for the host.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::queue::DeferredQueue;
use super::window::WindowKind;

//=== UiEvent =============================================================

/// Lifecycle notification, drained with `UiManager::take_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent<K: WindowKind> {
    /// The window finished opening and accepts input.
    Opened(K),

    /// The window was hidden and marked closed.
    Closed(K),
}

impl<K: WindowKind> UiEvent<K> {
    pub fn kind(&self) -> K {
        match *self {
            UiEvent::Opened(kind) | UiEvent::Closed(kind) => kind,
        }
    }
}

pub type EventQueue<K> = DeferredQueue<UiEvent<K>>;
