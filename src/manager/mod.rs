//=========================================================================
// Window Manager
//=========================================================================
//
// Opens, closes and navigates windows on the main timeline.
//
// Architecture:
// ```text
//   UiManager (Rc handle)
//     ├─ catalog: K → descriptor + factory     (read-only)
//     ├─ cache:   AssetCache                   (own RefCell)
//     └─ state:   RefCell<UiState>
//           ├─ registry / layers / modal / navigation
//           ├─ transitions: K → InFlight { phase, Shared<future> }
//           └─ commands / events
// ```
//
// Transition discipline, per window kind:
//
//   requested \ in flight │ Loading │ Opening     │ Closing
//   ──────────────────────┼─────────┼─────────────┼───────────
//   open                  │ join    │ join        │ wait, open
//   close                 │ abort   │ wait, close │ join
//   close_immediate       │ abort   │ supersede   │ supersede
//
// Different kinds never wait on each other. The state borrow is only
// taken inside synchronous steps and is never held across an await.
//
// A transition advances while some caller polls it. When the last caller
// goes away the transition is settled at once: a load is aborted, an
// animation is skipped. Closes the manager starts by itself (overlay
// clicks, hook commands) are kept and polled from `update`.
//
//=========================================================================

//=== Module Declarations =================================================

mod builder;
mod state;


//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::task::Context;

use futures::future::{AbortHandle, Abortable, FutureExt, LocalBoxFuture};
use futures::task::noop_waker_ref;
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::asset::{Asset, AssetCache, AssetProvider};
use crate::core::commands::UiCommand;
use crate::core::events::UiEvent;
use crate::core::window::{WindowCatalog, WindowHandle, WindowKind, WindowParam, WindowState};
use crate::error::UiError;
use crate::surface::RenderSurface;
use state::{InFlight, Phase, SharedTransition, TransitionResult, UiState};

//=== Public API ==========================================================

pub use builder::{UiConfig, UiManagerBuilder};

//=== Internal Types ======================================================

struct Inner<K: WindowKind> {
    state: RefCell<UiState<K>>,
    catalog: WindowCatalog<K>,
    cache: AssetCache,
    /// Closes started on the host's behalf, polled from `update`.
    detached: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

enum Step<K: WindowKind> {
    /// Finished synchronously.
    Done(Option<WindowHandle<K>>),
    /// Share the outcome of the in-flight transition.
    Join(Ticket<K>),
    /// Let the in-flight transition finish, then retry.
    Wait(Ticket<K>),
}

/// A caller's share of an in-flight transition.
struct Ticket<K: WindowKind> {
    future: SharedTransition<K>,
    _joiner: Joiner<K>,
}

/// Counts one caller of a transition. The last one to drop settles the
/// transition if it has not finished.
struct Joiner<K: WindowKind> {
    inner: Weak<Inner<K>>,
    kind: K,
    id: u64,
}

impl<K: WindowKind> Drop for Joiner<K> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let Ok(mut guard) = inner.state.try_borrow_mut() else {
            warn!("Window manager busy while dropping a caller of {:?}", self.kind);
            return;
        };
        let state = &mut *guard;

        if !state.leave(self.kind, self.id) {
            return;
        }
        debug!("Last caller of {:?} went away, settling its transition", self.kind);
        let settled = state.settle_abandoned(self.kind, &inner.cache);
        drop(guard);
        drop(settled);
    }
}

//=== UiManager ===========================================================

/// Window lifecycle controller.
///
/// A cheap handle: clones drive the same windows. All methods must be
/// called from the main timeline, and never from inside a window hook;
/// hooks use their [`WindowContext`](crate::core::commands::WindowContext)
/// instead.
pub struct UiManager<K: WindowKind> {
    inner: Rc<Inner<K>>,
}

impl<K: WindowKind> Clone for UiManager<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: WindowKind> UiManager<K> {
    //--- Construction -----------------------------------------------------

    /// Starts configuring a manager.
    pub fn builder() -> UiManagerBuilder<K> {
        UiManagerBuilder::new()
    }

    fn from_parts(
        config: UiConfig,
        catalog: WindowCatalog<K>,
        surface: Box<dyn RenderSurface>,
        provider: Rc<dyn AssetProvider>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(UiState::new(surface, &config)),
                catalog,
                cache: AssetCache::new(provider, config.cache_capacity),
                detached: RefCell::new(Vec::new()),
            }),
        }
    }

    //--- Opening ----------------------------------------------------------

    /// Opens `kind`, resolving once it is interactable.
    ///
    /// Opening a window that is already open refreshes it instead: its
    /// `on_refresh` hook runs with `param` and it moves to the front, with
    /// no animation. Callers that join an in-flight open share its result
    /// and their own `param` is not delivered.
    ///
    /// Resolves to [`UiError::Cancelled`] when a close supersedes the open.
    /// Dropping the future does not cancel an open that others still
    /// await; dropping the last one aborts a pending load, or finishes a
    /// running open animation at once.
    pub fn open(
        &self,
        kind: K,
        param: Option<WindowParam>,
    ) -> LocalBoxFuture<'static, Result<WindowHandle<K>, UiError>> {
        let manager = self.clone();

        async move {
            loop {
                match manager.begin_open(kind, param.clone())? {
                    Step::Done(Some(handle)) => return Ok(handle),
                    Step::Done(None) => return Err(UiError::Cancelled),
                    Step::Join(ticket) => {
                        return ticket.future.await?.ok_or(UiError::Cancelled);
                    }
                    Step::Wait(ticket) => {
                        let _ = ticket.future.await;
                    }
                }
            }
        }
        .boxed_local()
    }

    /// Joins the in-flight transition of `kind`, if any.
    fn join(&self, state: &mut UiState<K>, kind: K) -> Option<(Phase, Ticket<K>)> {
        let (id, phase, future) = state.join(kind)?;
        Some((phase, self.ticket(kind, id, future)))
    }

    fn ticket(&self, kind: K, id: u64, future: SharedTransition<K>) -> Ticket<K> {
        Ticket {
            future,
            _joiner: Joiner {
                inner: Rc::downgrade(&self.inner),
                kind,
                id,
            },
        }
    }

    fn begin_open(&self, kind: K, param: Option<WindowParam>) -> Result<Step<K>, UiError> {
        let inner = &self.inner;
        let descriptor = *inner.catalog.descriptor(kind)?;

        let mut guard = inner.state.borrow_mut();
        let state = &mut *guard;
        if state.shut_down {
            return Err(UiError::ShutDown);
        }

        if let Some((phase, ticket)) = self.join(state, kind) {
            return Ok(match phase {
                Phase::Closing => {
                    debug!("{:?} is closing, opening afterwards", kind);
                    Step::Wait(ticket)
                }
                Phase::Loading | Phase::Opening => {
                    debug!("Joining in-flight open of {:?}", kind);
                    Step::Join(ticket)
                }
            });
        }

        if let Some(handle) = state.registry.get(kind).cloned() {
            state.refresh_opened(&handle, param.as_deref());
            return Ok(Step::Done(Some(handle)));
        }

        let id = state.next_id();
        let weak = Rc::downgrade(&self.inner);

        if let Some(handle) = state.registry.take_cached(kind) {
            debug!("Reopening cached {:?}", kind);
            state.open_visuals(&handle, param.as_deref());

            let transition = track(weak.clone(), kind, id, animate_open(weak, kind, id, handle));
            state.transitions.insert(
                kind,
                InFlight {
                    id,
                    phase: Phase::Opening,
                    abort: None,
                    future: transition.clone(),
                    joiners: 1,
                },
            );
            return Ok(Step::Join(self.ticket(kind, id, transition)));
        }

        debug!("Loading {:?} from '{}'", kind, descriptor.path);
        let (abort, registration) = AbortHandle::new_pair();
        let load = Abortable::new(inner.cache.load(descriptor.path), registration);

        let body = {
            let weak = weak.clone();
            async move {
                let asset = match load.await {
                    Ok(result) => result?,
                    Err(_aborted) => return Err(superseded(&weak)),
                };

                let handle = register_loaded(&weak, kind, id, asset, param)?;
                animate_open(weak, kind, id, handle).await
            }
        };

        let transition = track(weak, kind, id, body);
        state.transitions.insert(
            kind,
            InFlight {
                id,
                phase: Phase::Loading,
                abort: Some(abort),
                future: transition.clone(),
                joiners: 1,
            },
        );
        Ok(Step::Join(self.ticket(kind, id, transition)))
    }

    /// Loads and instantiates `kind` into the cache without opening it.
    ///
    /// Windows that are destroyed on close only have their asset warmed.
    pub fn preload(&self, kind: K) -> LocalBoxFuture<'static, Result<(), UiError>> {
        let manager = self.clone();

        async move {
            let inner = &manager.inner;
            let descriptor = *inner.catalog.descriptor(kind)?;
            if descriptor.destroy_on_close {
                return inner
                    .cache
                    .preload(descriptor.path)
                    .await
                    .map_err(|err| manager.shut_down_or(err));
            }

            if manager.has_instance(kind)? {
                return Ok(());
            }

            let asset = match inner.cache.load(descriptor.path).await {
                Ok(asset) => asset,
                Err(err) => return Err(manager.shut_down_or(err)),
            };

            // The window may have been opened while the asset loaded.
            match manager.has_instance(kind) {
                Ok(false) => {}
                other => {
                    inner.cache.release(&asset);
                    return other.map(|_| ());
                }
            }

            let mut guard = inner.state.borrow_mut();
            let state = &mut *guard;
            let handle = state.instantiate(&inner.catalog, &inner.cache, kind, asset)?;
            handle.set_state(WindowState::Closed);
            state.registry.insert_cached(handle);
            debug!("Preloaded {:?}", kind);
            Ok(())
        }
        .boxed_local()
    }

    fn has_instance(&self, kind: K) -> Result<bool, UiError> {
        let state = self.inner.state.borrow();
        if state.shut_down {
            return Err(UiError::ShutDown);
        }
        Ok(state.registry.find(kind).is_some() || state.transitions.contains_key(&kind))
    }

    /// Loads orphaned by a shutdown report the shutdown.
    fn shut_down_or(&self, err: UiError) -> UiError {
        if self.inner.state.borrow().shut_down {
            UiError::ShutDown
        } else {
            err
        }
    }

    //--- Closing ----------------------------------------------------------

    /// Closes `kind` with its close animation.
    ///
    /// The close starts right away; the future resolves once it is done.
    /// Dropping the future finishes the close without animation. Closing a
    /// window that is still loading cancels the load. Closing a window
    /// that is not open does nothing.
    pub fn close(&self, kind: K) -> LocalBoxFuture<'static, Result<(), UiError>> {
        let manager = self.clone();
        let first = self.begin_close(kind);

        async move {
            let mut step = first;
            loop {
                match step {
                    Step::Done(_) => return Ok(()),
                    Step::Join(ticket) => {
                        return match ticket.future.await {
                            Ok(_) | Err(UiError::Cancelled) => Ok(()),
                            Err(err) => Err(err),
                        };
                    }
                    Step::Wait(ticket) => {
                        let _ = ticket.future.await;
                    }
                }
                step = manager.begin_close(kind);
            }
        }
        .boxed_local()
    }

    fn begin_close(&self, kind: K) -> Step<K> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;

        if state.phase(kind) == Some(Phase::Loading) {
            let cancelled = state.cancel(kind);
            drop(guard);
            drop(cancelled);
            return Step::Done(None);
        }

        if let Some((phase, ticket)) = self.join(state, kind) {
            if phase == Phase::Opening {
                debug!("{:?} is opening, closing afterwards", kind);
                return Step::Wait(ticket);
            }
            return Step::Join(ticket);
        }

        let Some(handle) = state.registry.get(kind).cloned() else {
            debug!("{:?} is not open, nothing to close", kind);
            return Step::Done(None);
        };

        handle.set_interactable(state.surface.as_mut(), false);
        handle.set_state(WindowState::Closing);
        debug!("Closing {:?}", kind);

        let id = state.next_id();
        let weak = Rc::downgrade(&self.inner);
        let transition = track(weak.clone(), kind, id, animate_close(weak, kind, id, handle));
        state.transitions.insert(
            kind,
            InFlight {
                id,
                phase: Phase::Closing,
                abort: None,
                future: transition.clone(),
                joiners: 1,
            },
        );
        Step::Join(self.ticket(kind, id, transition))
    }

    /// Starts an animated close that the manager drives itself.
    fn close_detached(&self, kind: K) {
        let close = self.close(kind);
        self.inner.detached.borrow_mut().push(
            async move {
                if let Err(err) = close.await {
                    warn!("Failed to close {:?}: {}", kind, err);
                }
            }
            .boxed_local(),
        );
        self.drive_detached();
    }

    /// Polls the detached closes once, keeping the unfinished ones.
    fn drive_detached(&self) {
        let mut pending = std::mem::take(&mut *self.inner.detached.borrow_mut());
        if pending.is_empty() {
            return;
        }

        let mut cx = Context::from_waker(noop_waker_ref());
        pending.retain_mut(|close| close.poll_unpin(&mut cx).is_pending());

        let mut detached = self.inner.detached.borrow_mut();
        pending.append(&mut detached);
        *detached = pending;
    }

    /// Closes `kind` right away, skipping its animation.
    ///
    /// Supersedes any in-flight transition of `kind`; a superseded open
    /// resolves to [`UiError::Cancelled`].
    pub fn close_immediate(&self, kind: K) {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;

        let superseded = state.cancel(kind);
        let was_loading = superseded
            .as_ref()
            .is_some_and(|in_flight| in_flight.phase == Phase::Loading);

        if !was_loading {
            match state.registry.get(kind).cloned() {
                Some(handle) => state.close_now(&handle, &self.inner.cache),
                None => debug!("{:?} is not open, nothing to close", kind),
            }
        }

        drop(guard);
        drop(superseded);
    }

    /// Closes every open or loading window, one after another, animated.
    pub fn close_all(&self) -> LocalBoxFuture<'static, ()> {
        let manager = self.clone();

        async move {
            for kind in manager.live_kinds() {
                if let Err(err) = manager.close(kind).await {
                    warn!("Failed to close {:?}: {}", kind, err);
                }
            }
        }
        .boxed_local()
    }

    /// Closes every open or loading window without animation.
    pub fn close_all_immediate(&self) {
        for kind in self.live_kinds() {
            self.close_immediate(kind);
        }
    }

    fn live_kinds(&self) -> Vec<K> {
        let state = self.inner.state.borrow();
        let mut kinds = state.registry.opened_kinds().to_vec();
        for &kind in state.transitions.keys() {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    //--- Navigation -------------------------------------------------------

    /// Closes the top of the navigation stack without animation.
    ///
    /// Returns false when the stack is empty.
    pub fn back(&self) -> bool {
        let top = self.inner.state.borrow().navigation.top();
        match top {
            Some(kind) => {
                debug!("Back from {:?}", kind);
                self.close_immediate(kind);
                true
            }
            None => false,
        }
    }

    /// Closes every stackable window above the topmost `kind`, top first.
    ///
    /// Returns false, closing nothing, when `kind` is not on the stack.
    pub fn back_to(&self, kind: K) -> bool {
        let above = self.inner.state.borrow().navigation.kinds_above(kind);
        let Some(above) = above else {
            debug!("{:?} is not on the navigation stack", kind);
            return false;
        };

        for window in above {
            self.close_immediate(window);
        }
        true
    }

    /// Starts the animated close of whichever window the modal overlay's
    /// click is bound to. The close advances on later `update` ticks.
    ///
    /// Returns false when no click binding exists.
    pub fn click_overlay(&self) -> bool {
        let target = self.inner.state.borrow().modal.click_target();
        match target {
            Some(kind) => {
                debug!("Overlay click closes {:?}", kind);
                self.close_detached(kind);
                true
            }
            None => false,
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Per-frame tick.
    ///
    /// Calls `on_update` on every open window that subscribed to updates
    /// and is not closing, most recently registered first. Then applies
    /// the commands queued by hooks since the last tick and advances the
    /// closes the manager started by itself.
    pub fn update(&self, dt: f32) {
        let commands = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;

            let kinds = state.updating.clone();
            for kind in kinds.into_iter().rev() {
                let Some(handle) = state.registry.get(kind) else {
                    continue;
                };
                if handle.state() != WindowState::Closing {
                    handle.invoke("on_update", &mut state.commands, |window, ctx| {
                        window.on_update(ctx, dt)
                    });
                }
            }

            state.commands.take()
        };

        for command in commands {
            self.apply(command);
        }
        self.drive_detached();
    }

    fn apply(&self, command: UiCommand<K>) {
        debug!("Applying {:?}", command);
        match command {
            UiCommand::Close(kind) => self.close_detached(kind),
            UiCommand::Back => {
                self.back();
            }
            UiCommand::BackTo(kind) => {
                self.back_to(kind);
            }
            UiCommand::CloseAll => self.close_all_immediate(),
        }
    }

    /// Drains the lifecycle notifications raised since the last call.
    pub fn take_events(&self) -> Vec<UiEvent<K>> {
        self.inner.state.borrow_mut().events.take()
    }

    //--- Teardown ---------------------------------------------------------

    /// Destroys every cached window, then lets the asset cache evict
    /// down to capacity. Returns the number of destroyed windows.
    pub fn purge_cached(&self) -> usize {
        let destroyed = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;

            let cached = state.registry.drain_cached();
            for handle in &cached {
                state.destroy(handle, &self.inner.cache);
            }
            cached.len()
        };

        let evicted = self.inner.cache.purge();
        debug!("Purged {} cached window(s), evicted {} asset(s)", destroyed, evicted);
        destroyed
    }

    /// Cancels every transition, destroys every window without animation
    /// and clears the asset cache. Later opens fail with
    /// [`UiError::ShutDown`].
    pub fn shutdown(&self) {
        let transitions = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            info!("Shutting down window manager");

            let kinds: Vec<K> = state.transitions.keys().copied().collect();
            let transitions: Vec<InFlight<K>> =
                kinds.into_iter().filter_map(|kind| state.cancel(kind)).collect();

            let opened: Vec<K> = state.registry.opened_kinds().iter().rev().copied().collect();
            for kind in opened {
                if let Some(handle) = state.registry.get(kind).cloned() {
                    state.close_now(&handle, &self.inner.cache);
                }
            }
            for handle in state.registry.drain_cached() {
                state.destroy(&handle, &self.inner.cache);
            }

            state.navigation.clear();
            state.layers.clear();
            state.modal.clear(state.surface.as_mut());
            state.updating.clear();
            state.commands.clear();
            transitions
        };

        drop(transitions);
        let detached = std::mem::take(&mut *self.inner.detached.borrow_mut());
        drop(detached);
        self.inner.cache.clear();
    }

    //--- Query API --------------------------------------------------------

    /// The open instance of `kind`, including while it animates.
    pub fn get(&self, kind: K) -> Option<WindowHandle<K>> {
        self.inner.state.borrow().registry.get(kind).cloned()
    }

    /// The open window drawn on top of all others.
    pub fn get_top(&self) -> Option<WindowHandle<K>> {
        self.inner
            .state
            .borrow()
            .registry
            .opened()
            .max_by_key(|handle| handle.sort_order())
            .cloned()
    }

    /// Lifecycle state of `kind`.
    pub fn state(&self, kind: K) -> WindowState {
        let state = self.inner.state.borrow();
        if state.phase(kind) == Some(Phase::Loading) {
            return WindowState::Loading;
        }
        state
            .registry
            .find(kind)
            .map_or(WindowState::None, WindowHandle::state)
    }

    pub fn is_opened(&self, kind: K) -> bool {
        self.inner.state.borrow().registry.is_opened(kind)
    }

    pub fn is_cached(&self, kind: K) -> bool {
        self.inner.state.borrow().registry.is_cached(kind)
    }

    pub fn is_loading(&self, kind: K) -> bool {
        self.inner.state.borrow().phase(kind) == Some(Phase::Loading)
    }

    /// Stackable windows, bottom to top.
    pub fn navigation_stack(&self) -> Vec<K> {
        self.inner.state.borrow().navigation.as_slice().to_vec()
    }

    pub fn sort_order(&self, kind: K) -> Option<i32> {
        self.inner.state.borrow().layers.order_of(kind)
    }

    /// Modal window the overlay currently sits behind.
    pub fn overlay_target(&self) -> Option<K> {
        self.inner.state.borrow().modal.top()
    }

    /// Window a click on the overlay would close.
    pub fn overlay_click_target(&self) -> Option<K> {
        self.inner.state.borrow().modal.click_target()
    }

    pub fn is_overlay_active(&self) -> bool {
        self.inner.state.borrow().modal.is_active()
    }

    pub fn asset_cache(&self) -> &AssetCache {
        &self.inner.cache
    }

    /// Checks that window states agree with where the registry keeps them.
    pub fn is_consistent(&self) -> bool {
        self.inner.state.borrow().registry.is_consistent()
    }
}

//=== Transition Bodies ===================================================

/// Makes `body` the shared future of a transition, unregistering the
/// transition once it settles.
fn track<K: WindowKind>(
    weak: Weak<Inner<K>>,
    kind: K,
    id: u64,
    body: impl Future<Output = TransitionResult<K>> + 'static,
) -> SharedTransition<K> {
    async move {
        let result = body.await;

        if let Some(inner) = weak.upgrade() {
            let mut state = inner.state.borrow_mut();
            let finished = if state.owns(kind, id) {
                state.transitions.remove(&kind)
            } else {
                None
            };
            drop(state);
            drop(finished);
        }
        result
    }
    .boxed_local()
    .shared()
}

/// Error for a transition that lost ownership of its kind.
fn superseded<K: WindowKind>(weak: &Weak<Inner<K>>) -> UiError {
    match weak.upgrade() {
        Some(inner) if !inner.state.borrow().shut_down => UiError::Cancelled,
        _ => UiError::ShutDown,
    }
}

fn register_loaded<K: WindowKind>(
    weak: &Weak<Inner<K>>,
    kind: K,
    id: u64,
    asset: Asset,
    param: Option<WindowParam>,
) -> Result<WindowHandle<K>, UiError> {
    let Some(inner) = weak.upgrade() else {
        return Err(UiError::ShutDown);
    };

    let mut guard = inner.state.borrow_mut();
    let state = &mut *guard;
    if state.shut_down || !state.owns(kind, id) {
        inner.cache.release(&asset);
        drop(guard);
        return Err(superseded(weak));
    }

    let handle = state.instantiate(&inner.catalog, &inner.cache, kind, asset)?;
    state.set_phase(kind, Phase::Opening);
    state.open_visuals(&handle, param.as_deref());
    Ok(handle)
}

async fn animate_open<K: WindowKind>(
    weak: Weak<Inner<K>>,
    kind: K,
    id: u64,
    handle: WindowHandle<K>,
) -> TransitionResult<K> {
    if let Err(err) = handle.open_transition().await {
        warn!("{:?} open animation failed: {}", kind, err);
    }

    let inner = weak.upgrade().ok_or(UiError::ShutDown)?;
    let mut state = inner.state.borrow_mut();
    if state.shut_down {
        return Err(UiError::ShutDown);
    }
    if !state.owns(kind, id) || handle.state() != WindowState::Opening {
        debug!("Open of {:?} was superseded", kind);
        return Err(UiError::Cancelled);
    }

    state.finish_open(&handle);
    Ok(Some(handle))
}

async fn animate_close<K: WindowKind>(
    weak: Weak<Inner<K>>,
    kind: K,
    id: u64,
    handle: WindowHandle<K>,
) -> TransitionResult<K> {
    if let Err(err) = handle.close_transition().await {
        warn!("{:?} close animation failed: {}", kind, err);
    }

    let inner = weak.upgrade().ok_or(UiError::ShutDown)?;
    let mut state = inner.state.borrow_mut();
    if state.shut_down {
        return Err(UiError::ShutDown);
    }
    if !state.owns(kind, id) {
        debug!("Close of {:?} was superseded", kind);
        return Err(UiError::Cancelled);
    }

    state.close_now(&handle, &inner.cache);
    Ok(None)
}
