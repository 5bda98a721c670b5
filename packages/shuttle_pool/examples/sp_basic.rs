//! Basic usage of the `shuttle_pool` crate:
//!
//! * Creating a pool.
//! * Filling free slots and queueing them in the used list.
//! * Draining the used list back into the free list.
//! * Checking the slot accounting.

use shuttle_pool::ShuttlePool;

#[derive(Debug, Default)]
struct Message {
    sequence: u32,
    text: String,
}

fn main() {
    let mut pool = ShuttlePool::<Message, 4>::new();

    // Fill and queue messages until the pool runs out of free slots. No allocation happens in
    // the pool itself: every slot already holds a default `Message`.
    let mut sequence = 0;
    while pool.process_free(|message| {
        message.sequence = sequence;
        message.text.clear();
        message.text.push_str("hello from the producer");
    }) {
        sequence += 1;
    }

    println!(
        "Queued {} messages, {} free slots left",
        pool.used_remaining(),
        pool.free_remaining()
    );

    // You can also hold on to a slot for a while instead of processing it in one go.
    let handle = pool.take_used().expect("we just queued messages");
    println!("Holding message: {:?}", pool.get(&handle));

    while pool.process_used(|message| println!("Consumed message: {message:?}")) {}

    pool.return_free(handle);

    let report = pool.check_integrity().expect("the pool was used correctly");
    println!(
        "Free: {}, used: {}, checked out: {}",
        report.free(),
        report.used(),
        report.checked_out()
    );
}
