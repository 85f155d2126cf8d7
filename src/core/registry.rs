//=========================================================================
// Window Registry
//=========================================================================
//
// Owns the live window instances, at most one per kind.
//
// Architecture:
//   WindowRegistry
//     ├─ opened: K → handle   (Opening / Opened / Closing)
//     ├─ order:  [K]          (registration order of opened kinds)
//     └─ cached: K → handle   (Closed, kept for reopening)
//
// A kind is never in both maps. Moving an instance into one map removes
// it from the other.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::window::{WindowHandle, WindowKind, WindowState};

//=== WindowRegistry ======================================================

pub struct WindowRegistry<K: WindowKind> {
    opened: HashMap<K, WindowHandle<K>>,
    order: Vec<K>,
    cached: HashMap<K, WindowHandle<K>>,
}

impl<K: WindowKind> WindowRegistry<K> {
    pub fn new() -> Self {
        Self {
            opened: HashMap::new(),
            order: Vec::new(),
            cached: HashMap::new(),
        }
    }

    //--- Opened -----------------------------------------------------------

    /// Registers `handle` as opened, taking it out of the cache.
    pub fn insert_opened(&mut self, handle: WindowHandle<K>) {
        let kind = handle.kind();

        if let Some(cached) = self.cached.remove(&kind) {
            if !cached.ptr_eq(&handle) {
                warn!("Replacing cached {:?} with a different instance", kind);
            }
        }

        if let Some(previous) = self.opened.insert(kind, handle.clone()) {
            if !previous.ptr_eq(&handle) {
                warn!("Replacing opened {:?} with a different instance", kind);
            }
        } else {
            self.order.push(kind);
        }

        debug!("Registered {:?} as opened", kind);
    }

    pub fn remove_opened(&mut self, kind: K) -> Option<WindowHandle<K>> {
        let handle = self.opened.remove(&kind)?;
        self.order.retain(|&k| k != kind);
        Some(handle)
    }

    /// Opened instance of `kind`.
    pub fn get(&self, kind: K) -> Option<&WindowHandle<K>> {
        self.opened.get(&kind)
    }

    pub fn is_opened(&self, kind: K) -> bool {
        self.opened.contains_key(&kind)
    }

    /// Opened kinds in registration order.
    pub fn opened_kinds(&self) -> &[K] {
        &self.order
    }

    pub fn opened(&self) -> impl Iterator<Item = &WindowHandle<K>> {
        self.order.iter().filter_map(|kind| self.opened.get(kind))
    }

    //--- Cached -----------------------------------------------------------

    /// Retains a closed instance for reopening.
    pub fn insert_cached(&mut self, handle: WindowHandle<K>) {
        let kind = handle.kind();
        if self.remove_opened(kind).is_some() {
            warn!("{:?} was still registered as opened when cached", kind);
        }

        if self.cached.insert(kind, handle).is_some() {
            warn!("Cached {:?} was replaced", kind);
        }
        debug!("Cached {:?}", kind);
    }

    pub fn take_cached(&mut self, kind: K) -> Option<WindowHandle<K>> {
        self.cached.remove(&kind)
    }

    pub fn get_cached(&self, kind: K) -> Option<&WindowHandle<K>> {
        self.cached.get(&kind)
    }

    pub fn is_cached(&self, kind: K) -> bool {
        self.cached.contains_key(&kind)
    }

    /// Removes and returns every cached instance.
    pub fn drain_cached(&mut self) -> Vec<WindowHandle<K>> {
        self.cached.drain().map(|(_, handle)| handle).collect()
    }

    //--- Query API --------------------------------------------------------

    /// Instance of `kind` in either map.
    pub fn find(&self, kind: K) -> Option<&WindowHandle<K>> {
        self.opened.get(&kind).or_else(|| self.cached.get(&kind))
    }

    pub fn opened_len(&self) -> usize {
        self.opened.len()
    }

    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    /// Checks that every instance's state agrees with the map holding it.
    pub fn is_consistent(&self) -> bool {
        let opened_ok = self.opened.iter().all(|(kind, handle)| {
            handle.kind() == *kind
                && !self.cached.contains_key(kind)
                && matches!(
                    handle.state(),
                    WindowState::Opening | WindowState::Opened | WindowState::Closing
                )
        });

        let cached_ok = self.cached.iter().all(|(kind, handle)| {
            handle.kind() == *kind
                && handle.state() == WindowState::Closed
                && !handle.descriptor().destroy_on_close
        });

        opened_ok && cached_ok && self.order.len() == self.opened.len()
    }
}

impl<K: WindowKind> Default for WindowRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::core::window::{Layer, Window, WindowDescriptor};
    use crate::surface::NodeId;
    use std::any::Any;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestUi {
        Bag,
        Shop,
    }

    impl WindowKind for TestUi {}

    struct Plain;

    impl Window<TestUi> for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn handle(kind: TestUi, state: WindowState) -> WindowHandle<TestUi> {
        let handle = WindowHandle::new(
            kind,
            WindowDescriptor::new("Test", Layer::Normal, "ui/test"),
            NodeId(1),
            Asset::new("ui/test", ()),
            Box::new(Plain),
        );
        handle.set_state(state);
        handle
    }

    #[test]
    fn caching_moves_out_of_opened() {
        let mut registry = WindowRegistry::new();
        let bag = handle(TestUi::Bag, WindowState::Opened);
        registry.insert_opened(bag.clone());
        assert!(registry.is_opened(TestUi::Bag));

        let bag = registry.remove_opened(TestUi::Bag).unwrap();
        bag.set_state(WindowState::Closed);
        registry.insert_cached(bag);

        assert!(!registry.is_opened(TestUi::Bag));
        assert!(registry.is_cached(TestUi::Bag));
        assert!(registry.is_consistent());
    }

    #[test]
    fn reopening_takes_instance_out_of_cache() {
        let mut registry = WindowRegistry::new();
        let bag = handle(TestUi::Bag, WindowState::Closed);
        registry.insert_cached(bag.clone());

        bag.set_state(WindowState::Opening);
        registry.insert_opened(bag.clone());

        assert!(!registry.is_cached(TestUi::Bag));
        assert!(registry.get(TestUi::Bag).unwrap().ptr_eq(&bag));
        assert_eq!(registry.opened_len() + registry.cached_len(), 1);
        assert!(registry.is_consistent());
    }

    #[test]
    fn opened_kinds_follow_registration_order() {
        let mut registry = WindowRegistry::new();
        registry.insert_opened(handle(TestUi::Shop, WindowState::Opened));
        registry.insert_opened(handle(TestUi::Bag, WindowState::Opened));

        assert_eq!(registry.opened_kinds(), &[TestUi::Shop, TestUi::Bag]);

        registry.remove_opened(TestUi::Shop);
        assert_eq!(registry.opened_kinds(), &[TestUi::Bag]);
    }

    #[test]
    fn state_mismatch_is_inconsistent() {
        let mut registry = WindowRegistry::new();
        registry.insert_opened(handle(TestUi::Bag, WindowState::Closed));

        assert!(!registry.is_consistent());
    }
}
