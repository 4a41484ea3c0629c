/*
 * sync.rs
 *
 * no_std install-once cell for the notice hook.
 *
 * std::sync::OnceLock would do but pulls in std, and the boundary has to
 * work in no_std hosts. We also never need to block: a reader that races
 * an in-progress install just sees "empty" and moves on. The boundary can't
 * afford to spin waiting for anyone.
 */

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

/* state machine: EMPTY -> WRITING -> FULL, never backwards */
const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const FULL: u8 = 2;

/// A cell that can be written to only once, thread-safe, lock-free.
///
/// # Safety Invariants
///
/// - `EMPTY`: value is None, writable by whoever wins the CAS
/// - `WRITING`: exactly one thread is writing, nobody reads
/// - `FULL`: value is Some and immutable, anyone may read
///
/// The writer publishes with `Release`, readers load with `Acquire`.
pub struct OnceSlot<T> {
    state: AtomicU8,
    value: UnsafeCell<Option<T>>,
}

// SAFETY: the UnsafeCell is written only by the single thread that moved the
// state EMPTY -> WRITING, and read only after observing FULL with Acquire,
// which pairs with the writer's Release store. Once FULL nothing writes.
unsafe impl<T: Send + Sync> Sync for OnceSlot<T> {}

// SAFETY: owning an OnceSlot<T> is owning an Option<T>.
unsafe impl<T: Send> Send for OnceSlot<T> {}

impl<T: Copy> OnceSlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(None),
        }
    }

    /// The stored value, or None if empty or still being written.
    #[inline]
    pub fn get(&self) -> Option<T> {
        if self.state.load(Ordering::Acquire) == FULL {
            // SAFETY: FULL observed with Acquire, so the writer's store of
            // Some(value) happened-before this read, and FULL is final.
            unsafe { *self.value.get() }
        } else {
            None
        }
    }

    /// Store the value. Err(value) if someone got there first.
    pub fn set(&self, value: T) -> Result<(), T> {
        match self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                // SAFETY: we won EMPTY -> WRITING. Readers only read in FULL,
                // other writers lost the CAS. Exclusive access.
                unsafe {
                    *self.value.get() = Some(value);
                }
                self.state.store(FULL, Ordering::Release);
                Ok(())
            }
            Err(_) => Err(value),
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire) == FULL
    }
}

impl<T: Copy> Default for OnceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}


/* -------------------------------------------------------------------------- */
/*                              kani proofs                                   */
/* -------------------------------------------------------------------------- */

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /*
     * after a successful set(), get() returns exactly that value and a
     * second set() is refused with the value handed back.
     */
    #[kani::proof]
    fn verify_set_get_consistency() {
        let slot: OnceSlot<u32> = OnceSlot::new();
        let first: u32 = kani::any();
        let second: u32 = kani::any();

        kani::assert(slot.get().is_none(), "new slot should be empty");
        kani::assert(slot.set(first).is_ok(), "first set should win");
        kani::assert(slot.get() == Some(first), "get returns the stored value");
        kani::assert(
            slot.set(second) == Err(second),
            "second set is refused with its value",
        );
        kani::assert(slot.get() == Some(first), "value never changes once FULL");
    }

    /*
     * state only moves forward: EMPTY -> WRITING -> FULL.
     */
    #[kani::proof]
    fn verify_state_machine_monotonic() {
        let mut state: u8 = EMPTY;

        if state == EMPTY {
            state = WRITING;
        }
        kani::assert(state == WRITING, "should transition to WRITING");

        if state == WRITING {
            state = FULL;
        }
        kani::assert(state == FULL, "should transition to FULL");
        kani::assert(state <= FULL, "state never exceeds FULL");
    }
}
