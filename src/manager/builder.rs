//=========================================================================
// Manager Builder
//=========================================================================
//
// Fluent configuration for `UiManager`.
//
// ```text
//   UiManagerBuilder ──build(surface, provider)──> UiManager
//       ├─ with_cache_capacity()
//       ├─ with_layer_stride()
//       ├─ with_order_step()
//       └─ register(kind, descriptor, factory)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use log::info;

//=== Internal Dependencies ===============================================

use super::UiManager;
use crate::asset::AssetProvider;
use crate::core::window::{Window, WindowCatalog, WindowDescriptor, WindowKind};
use crate::surface::RenderSurface;

//=== UiConfig ============================================================

/// Tunables of a window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiConfig {
    /// Resident asset entries kept after a purge pass.
    pub cache_capacity: usize,

    /// Sort-order distance between two layers.
    pub layer_stride: i32,

    /// Sort-order distance between two windows of one layer.
    pub order_step: i32,
}

impl UiConfig {
    fn assert_valid(&self) {
        assert!(
            self.layer_stride > 0,
            "Layer stride must be positive, got {}",
            self.layer_stride
        );
        assert!(
            self.order_step > 0,
            "Order step must be positive, got {}",
            self.order_step
        );
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            layer_stride: 1000,
            order_step: 5,
        }
    }
}

//=== UiManagerBuilder ====================================================

/// Builder for configuring and constructing a [`UiManager`].
///
/// # Default Values
///
/// - **Cache capacity**: 64 resident assets
/// - **Layer stride**: 1000
/// - **Order step**: 5
///
/// # Example
///
/// ```rust
/// use aetheric_ui::prelude::*;
/// # use std::any::Any;
/// # use std::rc::Rc;
/// # use futures::future::{self, FutureExt, LocalBoxFuture};
/// # struct Surface(u64);
/// # impl RenderSurface for Surface {
/// #     fn instantiate(&mut self, _: &Asset) -> Result<NodeId, SurfaceError> { self.0 += 1; Ok(NodeId(self.0)) }
/// #     fn create_overlay(&mut self) -> NodeId { NodeId(0) }
/// #     fn set_active(&mut self, _: NodeId, _: bool) {}
/// #     fn set_interactable(&mut self, _: NodeId, _: bool) {}
/// #     fn set_sort_order(&mut self, _: NodeId, _: i32) {}
/// #     fn set_parent(&mut self, _: NodeId, _: Parent) {}
/// #     fn sibling_index(&self, _: NodeId) -> usize { 0 }
/// #     fn set_sibling_index(&mut self, _: NodeId, _: usize) {}
/// #     fn destroy(&mut self, _: NodeId) {}
/// # }
/// # struct Provider;
/// # impl AssetProvider for Provider {
/// #     fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Asset, ProviderError>> {
/// #         future::ready(Ok(Asset::new(path, ()))).boxed_local()
/// #     }
/// #     fn release(&self, _: &Asset) {}
/// # }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Ui { Settings }
/// impl WindowKind for Ui {}
///
/// struct SettingsWindow;
/// impl Window<Ui> for SettingsWindow {
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// let manager = UiManager::builder()
///     .with_cache_capacity(16)
///     .register(
///         Ui::Settings,
///         WindowDescriptor::new("Settings", Layer::Normal, "ui/settings").modal(),
///         || SettingsWindow,
///     )
///     .build(Surface(0), Rc::new(Provider));
///
/// let settings = futures::executor::block_on(manager.open(Ui::Settings, None)).unwrap();
/// assert_eq!(settings.state(), WindowState::Opened);
/// ```
pub struct UiManagerBuilder<K: WindowKind> {
    config: UiConfig,
    catalog: WindowCatalog<K>,
}

impl<K: WindowKind> UiManagerBuilder<K> {
    /// Creates a new builder with default settings and no windows.
    pub fn new() -> Self {
        Self {
            config: UiConfig::default(),
            catalog: WindowCatalog::new(),
        }
    }

    /// Replaces every tunable at once.
    ///
    /// # Panics
    ///
    /// Panics if the layer stride or the order step is not positive.
    pub fn with_config(mut self, config: UiConfig) -> Self {
        config.assert_valid();
        self.config = config;
        self
    }

    /// Sets how many unreferenced assets may stay resident after a purge.
    ///
    /// Default: 64
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Sets the sort-order distance between layers.
    ///
    /// Default: 1000
    ///
    /// # Panics
    ///
    /// Panics if `stride <= 0`.
    pub fn with_layer_stride(mut self, stride: i32) -> Self {
        assert!(stride > 0, "Layer stride must be positive, got {}", stride);
        self.config.layer_stride = stride;
        self
    }

    /// Sets the sort-order distance between windows in one layer.
    ///
    /// Default: 5
    ///
    /// # Panics
    ///
    /// Panics if `step <= 0`.
    pub fn with_order_step(mut self, step: i32) -> Self {
        assert!(step > 0, "Order step must be positive, got {}", step);
        self.config.order_step = step;
        self
    }

    /// Registers a window kind with its descriptor and hook factory.
    pub fn register<W, F>(mut self, kind: K, descriptor: WindowDescriptor, factory: F) -> Self
    where
        W: Window<K>,
        F: Fn() -> W + 'static,
    {
        self.catalog.register(kind, descriptor, factory);
        self
    }

    /// Builds the manager on top of the host's surface and provider.
    pub fn build(
        self,
        surface: impl RenderSurface + 'static,
        provider: Rc<dyn AssetProvider>,
    ) -> UiManager<K> {
        info!(
            "Building window manager ({} windows, cache capacity {})",
            self.catalog.len(),
            self.config.cache_capacity
        );

        UiManager::from_parts(self.config, self.catalog, Box::new(surface), provider)
    }
}

impl<K: WindowKind> Default for UiManagerBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
