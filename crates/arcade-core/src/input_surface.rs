use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// Pointer position in game-arena coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Neither coordinate is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_id: u64,
    listeners: Vec<(u64, Rc<Cell<Option<PointerPos>>>)>,
}

/// The kiosk-wide pointer surface shared by spatial games.
///
/// Listeners are registered through [`InputSurface::acquire`], which hands
/// back a [`PointerLease`]. The listener lives exactly as long as the lease.
#[derive(Debug, Clone, Default)]
pub struct InputSurface {
    inner: Rc<RefCell<SurfaceState>>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pointer listener for the caller.
    pub fn acquire(&self) -> PointerLease {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let latest = Rc::new(Cell::new(None));
        state.listeners.push((id, Rc::clone(&latest)));
        tracing::trace!(listener = id, "pointer listener acquired");
        PointerLease {
            id,
            latest,
            surface: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a pointer move to every live listener. Returns how many saw it.
    pub fn dispatch(&self, pos: PointerPos) -> usize {
        let state = self.inner.borrow();
        for (_, cell) in &state.listeners {
            cell.set(Some(pos));
        }
        state.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Drop every registered listener. Returns how many were still attached.
    pub fn release_all(&self) -> usize {
        let mut state = self.inner.borrow_mut();
        let leaked = state.listeners.len();
        state.listeners.clear();
        leaked
    }
}

/// Scoped pointer registration. Dropping the lease deregisters it.
#[derive(Debug)]
pub struct PointerLease {
    id: u64,
    latest: Rc<Cell<Option<PointerPos>>>,
    surface: Weak<RefCell<SurfaceState>>,
}

impl PointerLease {
    /// Most recent position delivered to this listener, if any.
    pub fn latest(&self) -> Option<PointerPos> {
        self.latest.get()
    }

    /// Take the pending position, leaving none until the next move.
    pub fn take(&self) -> Option<PointerPos> {
        self.latest.take()
    }

    /// Whether the surface still routes moves to this lease.
    pub fn is_attached(&self) -> bool {
        let Some(surface) = self.surface.upgrade() else {
            return false;
        };
        let state = surface.borrow();
        state.listeners.iter().any(|(id, _)| *id == self.id)
    }
}

impl Drop for PointerLease {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.upgrade() {
            surface.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(listener = self.id, "pointer listener released");
        }
    }
}
