use std::fmt;
use std::iter::FusedIterator;

use crate::{Link, Slot};

/// Iterates over the values of the members of one list of a
/// [`ShuttlePool`][crate::ShuttlePool], from the head of the list to its tail.
///
/// Lists are LIFO, so the most recently returned slot comes first.
///
/// Created by [`ShuttlePool::iter_free()`][crate::ShuttlePool::iter_free] and
/// [`ShuttlePool::iter_used()`][crate::ShuttlePool::iter_used].
pub struct ListIter<'p, T> {
    slots: &'p [Slot<T>],
    cursor: Option<usize>,

    /// A corrupted list may loop. We never yield more items than there are slots.
    budget: usize,
}

impl<'p, T> ListIter<'p, T> {
    pub(crate) fn new(slots: &'p [Slot<T>], head: Option<usize>) -> Self {
        Self {
            slots,
            cursor: head,
            budget: slots.len(),
        }
    }
}

impl<'p, T> Iterator for ListIter<'p, T> {
    type Item = &'p T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.budget = self.budget.checked_sub(1)?;

        let slot = self.slots.get(index)?;

        self.cursor = match slot.link {
            Link::Listed { next, .. } => next,
            Link::CheckedOut => None,
        };

        Some(&slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor.is_none() {
            (0, Some(0))
        } else {
            (0, Some(self.budget))
        }
    }
}

impl<T> FusedIterator for ListIter<'_, T> {}

impl<T> fmt::Debug for ListIter<'_, T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListIter")
            .field("cursor", &self.cursor)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::List;

    #[test]
    fn follows_links_from_head() {
        let slots = [
            Slot {
                value: 'a',
                link: Link::Listed {
                    list: List::Used,
                    next: None,
                },
            },
            Slot {
                value: 'b',
                link: Link::Listed {
                    list: List::Used,
                    next: Some(0),
                },
            },
        ];

        let values: Vec<char> = ListIter::new(&slots, Some(1)).copied().collect();

        assert_eq!(values, ['b', 'a']);
    }

    #[test]
    fn empty_list_yields_nothing() {
        let slots = [Slot {
            value: 1_u8,
            link: Link::CheckedOut,
        }];

        let mut iter = ListIter::new(&slots, None);

        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn looping_list_stops_after_capacity() {
        let slots = [
            Slot {
                value: 1_u8,
                link: Link::Listed {
                    list: List::Free,
                    next: Some(1),
                },
            },
            Slot {
                value: 2_u8,
                link: Link::Listed {
                    list: List::Free,
                    next: Some(0),
                },
            },
        ];

        assert_eq!(ListIter::new(&slots, Some(0)).count(), 2);
    }
}
