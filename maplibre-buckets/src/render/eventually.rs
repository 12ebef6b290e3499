/// Wrapper around a resource which can be initialized or uninitialized.
/// Uninitialized resources are initialized by calling [`Eventually::set()`].
#[derive(Debug)]
pub enum Eventually<T> {
    Initialized(T),
    Uninitialized,
}

impl<T> Eventually<T> {
    /// Replaces the current value, no matter whether it was initialized before.
    pub fn set(&mut self, value: T) {
        *self = Eventually::Initialized(value);
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Eventually::Initialized(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Eventually::Initialized(value) => Some(value),
            Eventually::Uninitialized => None,
        }
    }
}

impl<T> Default for Eventually<T> {
    fn default() -> Self {
        Eventually::Uninitialized
    }
}
