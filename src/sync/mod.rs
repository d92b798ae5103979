//! Blocking synchronisation primitives
pub mod queue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Queue capacity
pub enum Capacity {
    /// Unlimited number of messages
    Unbounded,
    /// Limited number of messages
    Bounded(usize),
}

impl Capacity {
    /// `true` if `len` messages fill a queue of this capacity
    pub fn is_full(&self, len: usize) -> bool {
        match *self {
            Capacity::Unbounded => false,
            Capacity::Bounded(cap) => len >= cap,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Unbounded
    }
}

impl From<Option<usize>> for Capacity {
    fn from(cap: Option<usize>) -> Self {
        match cap {
            Some(cap) => Capacity::Bounded(cap),
            None => Capacity::Unbounded,
        }
    }
}
