//! Pointer tracking for the particle field.
//!
//! [`PointerEvents`] is the window-level event source: the window loop feeds
//! it raw winit events and it converts cursor positions to normalized device
//! coordinates. Consumers call [`PointerEvents::subscribe`] and keep the
//! returned [`PointerSubscription`]; dropping the subscription removes it from
//! the source, so a subscriber can never leak or be registered twice.
//!
//! Everything here is `Rc`-based and therefore `!Send`: the writer (event
//! dispatch) and the reader (frame update) always run on the event-loop thread,
//! interleaved between turns, never concurrently.
//!
//! ```ignore
//! let events = PointerEvents::new();
//! let subscription = events.subscribe();
//!
//! events.set_window_size(800, 600);
//! events.dispatch_client(Vec2::new(400.0, 300.0));
//! assert_eq!(subscription.latest().ndc, Vec2::ZERO);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use winit::event::WindowEvent;

/// Latest pointer position in normalized device coordinates.
///
/// X grows to the right, Y grows upward, the window spans `[-1, 1]` on both
/// axes. Positions outside the window may fall outside that range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub ndc: Vec2,
}

impl PointerState {
    pub fn new(ndc: Vec2) -> Self {
        Self { ndc }
    }

    /// Convert a client-space pixel position to NDC.
    ///
    /// Returns `None` while the window has no area.
    pub fn from_client(client: Vec2, window_size: Vec2) -> Option<Self> {
        if window_size.x <= 0.0 || window_size.y <= 0.0 {
            return None;
        }
        Some(Self::new(Vec2::new(
            (client.x / window_size.x) * 2.0 - 1.0,
            -(client.y / window_size.y) * 2.0 + 1.0,
        )))
    }
}

#[derive(Debug)]
struct Registry {
    next_id: u64,
    window_size: Vec2,
    listeners: Vec<(u64, Rc<Cell<PointerState>>)>,
}

/// Window-level source of pointer-move events.
#[derive(Debug, Clone)]
pub struct PointerEvents {
    registry: Rc<RefCell<Registry>>,
}

impl PointerEvents {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                window_size: Vec2::new(800.0, 600.0),
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays active until the subscription is dropped.
    pub fn subscribe(&self) -> PointerSubscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;

        let slot = Rc::new(Cell::new(PointerState::default()));
        registry.listeners.push((id, slot.clone()));
        tracing::trace!(id, "pointer listener registered");

        PointerSubscription {
            id,
            slot,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Update the window size used for NDC conversion.
    pub fn set_window_size(&self, width: u32, height: u32) {
        self.registry.borrow_mut().window_size = Vec2::new(width as f32, height as f32);
    }

    /// Deliver a pointer move at the given client-space pixel position.
    pub fn dispatch_client(&self, client: Vec2) {
        let registry = self.registry.borrow();
        if let Some(state) = PointerState::from_client(client, registry.window_size) {
            for (_, slot) in &registry.listeners {
                slot.set(state);
            }
        }
    }

    /// Process a winit window event. Only resizes and cursor moves matter.
    pub fn handle_event(&self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.dispatch_client(Vec2::new(position.x as f32, position.y as f32));
            }
            _ => {}
        }
    }
}

impl Default for PointerEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped registration with a [`PointerEvents`] source.
///
/// Holds the most recently delivered pointer state. Unregisters on drop.
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    slot: Rc<Cell<PointerState>>,
    registry: Weak<RefCell<Registry>>,
}

impl PointerSubscription {
    /// The last pointer state delivered to this listener.
    pub fn latest(&self) -> PointerState {
        self.slot.get()
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(id = self.id, "pointer listener removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_client_corners() {
        let size = Vec2::new(800.0, 600.0);

        let center = PointerState::from_client(Vec2::new(400.0, 300.0), size).unwrap();
        assert!(center.ndc.abs_diff_eq(Vec2::ZERO, 1e-6));

        let top_left = PointerState::from_client(Vec2::ZERO, size).unwrap();
        assert_eq!(top_left.ndc, Vec2::new(-1.0, 1.0));

        let bottom_right = PointerState::from_client(size, size).unwrap();
        assert_eq!(bottom_right.ndc, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_from_client_zero_window() {
        assert!(PointerState::from_client(Vec2::ONE, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let events = PointerEvents::new();
        let a = events.subscribe();
        let b = events.subscribe();

        events.set_window_size(200, 100);
        events.dispatch_client(Vec2::new(150.0, 25.0));

        assert_eq!(a.latest().ndc, Vec2::new(0.5, 0.5));
        assert_eq!(b.latest(), a.latest());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let events = PointerEvents::new();
        let a = events.subscribe();
        let b = events.subscribe();
        assert_eq!(events.listener_count(), 2);

        drop(a);
        assert_eq!(events.listener_count(), 1);
        drop(b);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_source() {
        let events = PointerEvents::new();
        let sub = events.subscribe();
        drop(events);
        // Source is gone: the subscription keeps its last value and drops cleanly.
        assert_eq!(sub.latest(), PointerState::default());
        drop(sub);
    }

    #[test]
    fn test_latest_not_reset_between_reads() {
        let events = PointerEvents::new();
        let sub = events.subscribe();
        events.set_window_size(100, 100);
        events.dispatch_client(Vec2::new(75.0, 75.0));

        assert_eq!(sub.latest().ndc, Vec2::new(0.5, -0.5));
        assert_eq!(sub.latest().ndc, Vec2::new(0.5, -0.5));
    }
}
