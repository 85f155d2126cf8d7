//=========================================================================
// Window Catalog
//=========================================================================
//
// Registration table mapping each window kind to its descriptor and the
// factory that builds its hook object.
//
// Filled once while building the manager and read-only afterwards.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{error, warn};

//=== Internal Dependencies ===============================================

use super::{Window, WindowDescriptor, WindowKind};
use crate::error::UiError;

//=== WindowFactory =======================================================

/// Builds a fresh hook object each time a window of the kind is created.
pub type WindowFactory<K> = Box<dyn Fn() -> Box<dyn Window<K>>>;

struct Registration<K: WindowKind> {
    descriptor: WindowDescriptor,
    factory: WindowFactory<K>,
}

//=== WindowCatalog =======================================================

/// Descriptor and factory per window kind.
pub struct WindowCatalog<K: WindowKind> {
    windows: HashMap<K, Registration<K>>,
}

impl<K: WindowKind> WindowCatalog<K> {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }

    /// Registers a window kind.
    ///
    /// Registering the same kind twice replaces the earlier entry.
    pub fn register<W, F>(&mut self, kind: K, descriptor: WindowDescriptor, factory: F)
    where
        W: Window<K>,
        F: Fn() -> W + 'static,
    {
        let registration = Registration {
            descriptor,
            factory: Box::new(move || Box::new(factory()) as Box<dyn Window<K>>),
        };

        if self.windows.insert(kind, registration).is_some() {
            warn!("Window {:?} was already registered and has been replaced", kind);
        }
    }

    /// Descriptor registered for `kind`.
    pub fn descriptor(&self, kind: K) -> Result<&WindowDescriptor, UiError> {
        match self.windows.get(&kind) {
            Some(registration) => Ok(&registration.descriptor),
            None => {
                error!("No descriptor registered for window {:?}", kind);
                Err(UiError::MissingDescriptor(format!("{:?}", kind)))
            }
        }
    }

    /// Builds a new hook object for `kind`.
    pub fn create(&self, kind: K) -> Result<Box<dyn Window<K>>, UiError> {
        match self.windows.get(&kind) {
            Some(registration) => Ok((registration.factory)()),
            None => Err(UiError::MissingDescriptor(format!("{:?}", kind))),
        }
    }

    pub fn contains(&self, kind: K) -> bool {
        self.windows.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl<K: WindowKind> Default for WindowCatalog<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
