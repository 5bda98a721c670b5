#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]

//! A fixed-capacity, allocation-free object pool that shuttles its slots between a free list
//! and a used list.
//!
//! This crate provides [`ShuttlePool`], which stores exactly `CAPACITY` values inline, with
//! `CAPACITY` fixed at compile time. It never touches the heap, neither when created nor during
//! use, which makes it suitable for hot paths, real-time code and environments where dynamic
//! allocation is forbidden.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms
//! for high-performance hardware-aware programming in Rust.
//!
//! # Slot ownership
//!
//! Every slot of the pool is in exactly one of three places at any time:
//!
//! * the **free list** (where every slot starts),
//! * the **used list**,
//! * **checked out** by the caller, who holds a [`SlotHandle`] for it.
//!
//! Taking from a list checks a slot out. Returning a handle puts the slot back into either list.
//! The values themselves never move: they are default-constructed once, travel with their slot
//! and are only rebuilt by [`ShuttlePool::reset()`]. The value type therefore needs nothing
//! beyond [`Default`].
//!
//! ```text
//!              take_free()            return_used()
//!   free list ─────────────► handle ─────────────► used list
//!       ▲                                              │
//!       │       return_free()            take_used()   │
//!       └──────────────────── handle ◄─────────────────┘
//! ```
//!
//! Any other combination works, too: a slot taken from the free list may go back to the free
//! list and so on.
//!
//! # Misuse
//!
//! A [`SlotHandle`] is consumed when returned and cannot be cloned, so returning one checkout twice
//! is a compile error. Handles issued by a different pool, or issued before the pool was reset,
//! are detected at runtime and cause a panic. See [`ContractChecks`] for when this detection is
//! active.
//!
//! # Example
//!
//! ```
//! use shuttle_pool::ShuttlePool;
//!
//! #[derive(Default)]
//! struct Request {
//!     id: u64,
//!     body: [u8; 32],
//! }
//!
//! let mut pool = ShuttlePool::<Request, 32>::new();
//!
//! // Producer: fill a free slot and queue it in the used list.
//! let filled = pool.process_free(|request| {
//!     request.id = 1;
//!     request.body[0] = 0xFF;
//! });
//! assert!(filled);
//!
//! // Consumer: take the queued request, handle it, recycle the slot.
//! let handle = pool.take_used().unwrap();
//! assert_eq!(pool.get(&handle).id, 1);
//! pool.return_free(handle);
//!
//! assert_eq!(pool.free_remaining(), 32);
//! assert!(pool.check_integrity().is_ok());
//! ```

mod builder;
mod contract_checks;
mod drop_policy;
mod handle;
mod integrity;
mod list_iter;
mod pool;
mod slot;

pub use builder::*;
pub use contract_checks::*;
pub use drop_policy::*;
pub(crate) use handle::PoolId;
pub use handle::SlotHandle;
pub(crate) use integrity::verify;
pub use integrity::{IntegrityError, IntegrityReport};
pub use list_iter::*;
pub use pool::*;
pub(crate) use slot::{Link, List, Slot};
pub use slot::SlotState;
