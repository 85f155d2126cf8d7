//=========================================================================
// Navigation Stack
//=========================================================================
//
// Back-navigation history of stackable windows in open order.
//
// Pushing pauses the previous top and resumes the new one. Popping
// pauses the removed window and, when it was the top, resumes the
// window that surfaces. Removal from the middle is allowed.
//
// Hooks are not called from here. The stack reports each pause/resume
// through a callback so the manager can dispatch it to the window.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::window::WindowKind;

//=== NavSignal ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSignal {
    Pause,
    Resume,
}

//=== NavigationStack =====================================================

pub struct NavigationStack<K: WindowKind> {
    stack: Vec<K>,
}

impl<K: WindowKind> NavigationStack<K> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Makes `kind` the top. A kind already on the stack is moved up.
    pub fn push(&mut self, kind: K, mut notify: impl FnMut(K, NavSignal)) {
        if let Some(&top) = self.stack.last() {
            if top == kind {
                notify(kind, NavSignal::Resume);
                return;
            }
            notify(top, NavSignal::Pause);
        }

        self.stack.retain(|&k| k != kind);
        self.stack.push(kind);
        debug!("Navigation push {:?}, depth {}", kind, self.stack.len());

        notify(kind, NavSignal::Resume);
    }

    /// Removes `kind` wherever it sits. Returns false if absent.
    pub fn pop(&mut self, kind: K, mut notify: impl FnMut(K, NavSignal)) -> bool {
        let Some(pos) = self.stack.iter().position(|&k| k == kind) else {
            return false;
        };

        let was_top = pos + 1 == self.stack.len();
        self.stack.remove(pos);
        debug!("Navigation pop {:?}, depth {}", kind, self.stack.len());

        notify(kind, NavSignal::Pause);
        if was_top {
            if let Some(&top) = self.stack.last() {
                notify(top, NavSignal::Resume);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    //--- Query API --------------------------------------------------------

    pub fn top(&self) -> Option<K> {
        self.stack.last().copied()
    }

    pub fn contains(&self, kind: K) -> bool {
        self.stack.contains(&kind)
    }

    /// Kinds above the topmost occurrence of `kind`, top first.
    ///
    /// `None` when `kind` is not on the stack.
    pub fn kinds_above(&self, kind: K) -> Option<Vec<K>> {
        let pos = self.stack.iter().rposition(|&k| k == kind)?;
        Some(self.stack[pos + 1..].iter().rev().copied().collect())
    }

    /// Bottom to top.
    pub fn as_slice(&self) -> &[K] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<K: WindowKind> Default for NavigationStack<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
