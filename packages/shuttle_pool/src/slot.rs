use std::fmt;

/// One of the two intrusive lists that thread through the pool storage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum List {
    Free,
    Used,
}

/// The list membership of a slot.
///
/// A slot that is linked into a list knows which list it is in and the index of the next member
/// (`None` at the tail). A checked out slot has no link at all: the caller's `SlotHandle` is the
/// only thing that refers to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Listed { list: List, next: Option<usize> },
    CheckedOut,
}

impl Link {
    /// The link a slot has right after the pool is created or reset. Slots form a chain in index
    /// order, with the last slot being the tail of the free list.
    #[must_use]
    pub(crate) fn initial<const CAPACITY: usize>(index: usize) -> Self {
        Self::Listed {
            list: List::Free,
            next: index.checked_add(1).filter(|next| *next < CAPACITY),
        }
    }

    #[must_use]
    pub(crate) fn state(self) -> SlotState {
        match self {
            Self::Listed { list, .. } => list.into(),
            Self::CheckedOut => SlotState::CheckedOut,
        }
    }
}

/// A storage entry of the pool. Slots never move relative to the pool and are never rebuilt,
/// only their link changes (and the value, on reset).
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) value: T,
    pub(crate) link: Link,
}

/// Where a slot of a [`ShuttlePool`][crate::ShuttlePool] currently is.
///
/// Every slot is in exactly one of these states at any time.
///
/// # Examples
///
/// ```
/// use shuttle_pool::{ShuttlePool, SlotState};
///
/// let mut pool = ShuttlePool::<u32, 2>::new();
/// assert_eq!(pool.slot_state(0), SlotState::Free);
///
/// let handle = pool.take_free().unwrap();
/// assert_eq!(pool.slot_state(handle.index()), SlotState::CheckedOut);
///
/// pool.return_used(handle);
/// assert_eq!(pool.slot_state(0), SlotState::Used);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SlotState {
    /// The slot is a member of the free list.
    Free,

    /// The slot is a member of the used list.
    Used,

    /// The slot is held by a caller through a [`SlotHandle`][crate::SlotHandle] and is a member
    /// of neither list.
    CheckedOut,
}

impl From<List> for SlotState {
    fn from(list: List) -> Self {
        match list {
            List::Free => Self::Free,
            List::Used => Self::Used,
        }
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Used => write!(f, "used"),
            Self::CheckedOut => write!(f, "checked out"),
        }
    }
}
