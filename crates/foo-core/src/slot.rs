//! Single-slot holder for a callback handle

use crate::handle::CallbackHandle;

/// Holds zero or one [`CallbackHandle`]
///
/// Assigning over an occupied slot releases the previous handle before the
/// new one is stored, so the slot never references more than one live handle.
pub struct CallbackSlot<C: ?Sized> {
    handle: Option<CallbackHandle<C>>,
}

impl<C: ?Sized> CallbackSlot<C> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Store `handle`, releasing any handle already held
    pub fn set(&mut self, handle: CallbackHandle<C>) {
        if let Some(old) = self.handle.take() {
            tracing::debug!(old = old.id(), new = handle.id(), "replacing registered callback");
            old.release();
        }
        self.handle = Some(handle);
    }

    /// Store `handle` and hand back the previous one unreleased
    ///
    /// Lets the caller release the old handle once it no longer borrows the
    /// slot.
    pub fn replace(&mut self, handle: CallbackHandle<C>) -> Option<CallbackHandle<C>> {
        self.handle.replace(handle)
    }

    /// Empty the slot without releasing the held handle
    pub fn take(&mut self) -> Option<CallbackHandle<C>> {
        self.handle.take()
    }

    /// Non-owning peek at the held handle
    pub fn get(&self) -> Option<&CallbackHandle<C>> {
        self.handle.as_ref()
    }

    /// Empty the slot, releasing the held handle
    ///
    /// Returns `true` if a handle was released.
    pub fn clear(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.release();
                true
            }
            None => false,
        }
    }

    /// Whether the slot holds no handle
    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }
}

impl<C: ?Sized> Default for CallbackSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
