//=========================================================================
// Window Commands
//=========================================================================
//
// Requests window hooks make of the manager.
//
// Hooks run while the manager is mid-step and cannot call back into it.
// They queue a `UiCommand` through their `WindowContext` instead, and
// the manager applies the queue at the end of the next `update`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::queue::DeferredQueue;
use super::window::WindowKind;

//=== UiCommand ===========================================================

/// Deferred manager request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand<K: WindowKind> {
    /// Closes a window immediately.
    Close(K),

    /// Closes the top of the navigation stack.
    Back,

    /// Closes every stackable window above the given one.
    BackTo(K),

    /// Closes every open window.
    CloseAll,
}

/// Commands queued during a manager step.
pub type CommandQueue<K> = DeferredQueue<UiCommand<K>>;

//=== WindowContext =======================================================

/// Handle passed to window hooks.
pub struct WindowContext<'a, K: WindowKind> {
    kind: K,
    commands: &'a mut CommandQueue<K>,
}

impl<'a, K: WindowKind> WindowContext<'a, K> {
    pub(crate) fn new(kind: K, commands: &'a mut CommandQueue<K>) -> Self {
        Self { kind, commands }
    }

    /// Kind of the window whose hook is running.
    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn close_self(&mut self) {
        self.commands.push(UiCommand::Close(self.kind));
    }

    pub fn close(&mut self, kind: K) {
        self.commands.push(UiCommand::Close(kind));
    }

    pub fn back(&mut self) {
        self.commands.push(UiCommand::Back);
    }

    pub fn back_to(&mut self, kind: K) {
        self.commands.push(UiCommand::BackTo(kind));
    }

    pub fn close_all(&mut self) {
        self.commands.push(UiCommand::CloseAll);
    }
}

//=== Tests ===============================================================
