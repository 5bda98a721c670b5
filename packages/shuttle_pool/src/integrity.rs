use thiserror::Error;

use crate::{Link, List, Slot, SlotState};

/// A broken pool invariant found by
/// [`ShuttlePool::check_integrity()`][crate::ShuttlePool::check_integrity].
///
/// Any of these means the free/used partition of the pool is corrupted. The safe API of the pool
/// cannot produce them when contract checks are enabled; they indicate a protocol violation that
/// went undetected in an optimized build.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum IntegrityError {
    /// A list link points outside the pool storage.
    #[error(
        "{list} list link from {from:?} points to slot {target}, beyond the capacity of {capacity}"
    )]
    LinkOutOfBounds {
        /// The list being walked.
        list: SlotState,

        /// The slot holding the bad link, `None` if the bad link is the list head.
        from: Option<usize>,

        /// The out-of-bounds target of the link.
        target: usize,

        /// The capacity of the pool.
        capacity: usize,
    },

    /// A slot was reached twice while walking the lists, either because it appears in both lists,
    /// twice in one list or because a list loops back on itself.
    #[error("slot {index} was reached a second time while walking the {list} list")]
    RevisitedSlot {
        /// The slot that was reached twice.
        index: usize,

        /// The list being walked when the slot was reached again.
        list: SlotState,
    },

    /// A slot reachable from one list records a different state.
    #[error("slot {index} is reachable from the {expected} list but records itself as {actual}")]
    StateMismatch {
        /// The slot with the inconsistent state.
        index: usize,

        /// The state implied by the list the slot was reached from.
        expected: SlotState,

        /// The state the slot records.
        actual: SlotState,
    },

    /// A slot records itself as a list member but neither list reaches it.
    #[error("slot {index} records itself as {state} but is not reachable from that list")]
    UnreachableSlot {
        /// The unreachable slot.
        index: usize,

        /// The state the slot records.
        state: SlotState,
    },
}

/// The slot accounting observed by a successful integrity check.
///
/// The three counts always add up to the capacity of the pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntegrityReport {
    capacity: usize,
    free: usize,
    used: usize,
    checked_out: usize,
}

impl IntegrityReport {
    /// The capacity of the checked pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of free list members.
    #[must_use]
    pub fn free(&self) -> usize {
        self.free
    }

    /// The number of used list members.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// The number of slots checked out by callers.
    #[must_use]
    pub fn checked_out(&self) -> usize {
        self.checked_out
    }
}

/// Walks both lists of the pool storage and cross-checks them against the state of every slot.
pub(crate) fn verify<T, const CAPACITY: usize>(
    slots: &[Slot<T>; CAPACITY],
    free_head: Option<usize>,
    used_head: Option<usize>,
) -> Result<IntegrityReport, IntegrityError> {
    let mut visited = [false; CAPACITY];

    let free = walk(slots, &mut visited, List::Free, free_head)?;
    let used = walk(slots, &mut visited, List::Used, used_head)?;

    let mut checked_out: usize = 0;

    for (index, (slot, was_visited)) in slots.iter().zip(visited).enumerate() {
        if was_visited {
            continue;
        }

        match slot.link {
            Link::CheckedOut => {
                checked_out = checked_out
                    .checked_add(1)
                    .expect("bounded by CAPACITY as we count each slot at most once");
            }
            Link::Listed { list, .. } => {
                return Err(IntegrityError::UnreachableSlot {
                    index,
                    state: list.into(),
                });
            }
        }
    }

    Ok(IntegrityReport {
        capacity: CAPACITY,
        free,
        used,
        checked_out,
    })
}

fn walk<T, const CAPACITY: usize>(
    slots: &[Slot<T>; CAPACITY],
    visited: &mut [bool; CAPACITY],
    list: List,
    head: Option<usize>,
) -> Result<usize, IntegrityError> {
    let mut count: usize = 0;
    let mut previous = None;
    let mut cursor = head;

    while let Some(index) = cursor {
        let slot = slots
            .get(index)
            .ok_or(IntegrityError::LinkOutOfBounds {
                list: list.into(),
                from: previous,
                target: index,
                capacity: CAPACITY,
            })?;

        let was_visited = visited
            .get_mut(index)
            .expect("slots and visited have the same length");

        if *was_visited {
            return Err(IntegrityError::RevisitedSlot {
                index,
                list: list.into(),
            });
        }

        *was_visited = true;

        cursor = match slot.link {
            Link::Listed { list: actual, next } if actual == list => next,
            other => {
                return Err(IntegrityError::StateMismatch {
                    index,
                    expected: list.into(),
                    actual: other.state(),
                });
            }
        };

        count = count
            .checked_add(1)
            .expect("bounded by CAPACITY as each slot is visited at most once");
        previous = Some(index);
    }

    Ok(count)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(IntegrityError: Send, Sync, Debug);
    assert_impl_all!(IntegrityReport: Send, Sync, Copy);

    fn listed(list: List, next: Option<usize>) -> Slot<u32> {
        Slot {
            value: 0,
            link: Link::Listed { list, next },
        }
    }

    fn checked_out() -> Slot<u32> {
        Slot {
            value: 0,
            link: Link::CheckedOut,
        }
    }

    #[test]
    fn healthy_storage_reports_counts() {
        let slots = [
            listed(List::Free, Some(2)),
            listed(List::Used, None),
            listed(List::Free, None),
            checked_out(),
        ];

        let report = verify(&slots, Some(0), Some(1)).unwrap();

        assert_eq!(report.capacity(), 4);
        assert_eq!(report.free(), 2);
        assert_eq!(report.used(), 1);
        assert_eq!(report.checked_out(), 1);
    }

    #[test]
    fn empty_storage_is_healthy() {
        let slots: [Slot<u32>; 0] = [];

        let report = verify(&slots, None, None).unwrap();

        assert_eq!(report.free(), 0);
        assert_eq!(report.used(), 0);
        assert_eq!(report.checked_out(), 0);
    }

    #[test]
    fn out_of_bounds_head_is_detected() {
        let slots = [listed(List::Free, None)];

        assert_eq!(
            verify(&slots, Some(5), None),
            Err(IntegrityError::LinkOutOfBounds {
                list: SlotState::Free,
                from: None,
                target: 5,
                capacity: 1,
            })
        );
    }

    #[test]
    fn out_of_bounds_link_is_detected() {
        let slots = [listed(List::Used, Some(9)), checked_out()];

        assert_eq!(
            verify(&slots, None, Some(0)),
            Err(IntegrityError::LinkOutOfBounds {
                list: SlotState::Used,
                from: Some(0),
                target: 9,
                capacity: 2,
            })
        );
    }

    #[test]
    fn cycle_is_detected() {
        let slots = [listed(List::Free, Some(1)), listed(List::Free, Some(0))];

        assert_eq!(
            verify(&slots, Some(0), None),
            Err(IntegrityError::RevisitedSlot {
                index: 0,
                list: SlotState::Free,
            })
        );
    }

    #[test]
    fn slot_in_both_lists_is_detected() {
        // The used list reaches into the tail of the free list.
        let slots = [
            listed(List::Free, Some(1)),
            listed(List::Free, None),
            listed(List::Used, Some(1)),
        ];

        assert_eq!(
            verify(&slots, Some(0), Some(2)),
            Err(IntegrityError::RevisitedSlot {
                index: 1,
                list: SlotState::Used,
            })
        );
    }

    #[test]
    fn checked_out_slot_in_list_is_detected() {
        let slots = [listed(List::Free, Some(1)), checked_out()];

        assert_eq!(
            verify(&slots, Some(0), None),
            Err(IntegrityError::StateMismatch {
                index: 1,
                expected: SlotState::Free,
                actual: SlotState::CheckedOut,
            })
        );
    }

    #[test]
    fn wrong_list_tag_is_detected() {
        let slots = [listed(List::Used, None)];

        assert_eq!(
            verify(&slots, Some(0), None),
            Err(IntegrityError::StateMismatch {
                index: 0,
                expected: SlotState::Free,
                actual: SlotState::Used,
            })
        );
    }

    #[test]
    fn unreachable_member_is_detected() {
        let slots = [listed(List::Free, None), listed(List::Free, None)];

        assert_eq!(
            verify(&slots, Some(0), None),
            Err(IntegrityError::UnreachableSlot {
                index: 1,
                state: SlotState::Free,
            })
        );
    }

    #[test]
    fn error_messages_name_the_slot() {
        let error = IntegrityError::RevisitedSlot {
            index: 3,
            list: SlotState::Used,
        };

        assert_eq!(
            error.to_string(),
            "slot 3 was reached a second time while walking the used list"
        );
    }
}
