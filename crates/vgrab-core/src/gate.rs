//! Admission gate: fixed budget of concurrent extraction jobs.
//!
//! A job holds a slot from just before the extraction tool is launched until
//! it reaches any terminal state. The permit is an RAII guard, so release
//! happens on every exit path (success, failure, timeout, task cancellation)
//! and can never be double-freed.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-capacity concurrency limiter for extraction jobs.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    slots: Arc<Semaphore>,
    capacity: usize,
}

/// One of the N admission slots. Dropping it releases the slot.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Suspend until a slot is free. Waiters are admitted in queue order
    /// (tokio semaphore is FIFO), so no waiter starves while slots turn over.
    pub async fn acquire(&self) -> AdmissionSlot {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("admission semaphore is never closed");
        AdmissionSlot { _permit: permit }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free. Test/status hook; racy by nature.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn capacity_has_floor_of_one() {
        assert_eq!(AdmissionGate::new(0).capacity(), 1);
        assert_eq!(AdmissionGate::new(3).capacity(), 3);
    }

    #[tokio::test]
    async fn acquire_and_drop_balance() {
        let gate = AdmissionGate::new(2);
        assert_eq!(gate.available(), 2);
        let a = gate.acquire().await;
        let b = gate.acquire().await;
        assert_eq!(gate.available(), 0);
        drop(a);
        assert_eq!(gate.available(), 1);
        drop(b);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn third_acquire_waits_until_release() {
        let gate = AdmissionGate::new(2);
        let a = gate.acquire().await;
        let _b = gate.acquire().await;

        let gate2 = gate.clone();
        let waiter = tokio::spawn(async move {
            let _slot = gate2.acquire().await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "waiter must block while gate is full");

        drop(a);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter admitted after release")
            .unwrap();
    }

    #[tokio::test]
    async fn slot_released_when_holding_task_panics() {
        let gate = AdmissionGate::new(1);
        let gate2 = gate.clone();
        let crashed = tokio::spawn(async move {
            let _slot = gate2.acquire().await;
            panic!("simulated job crash");
        });
        assert!(crashed.await.is_err());
        assert_eq!(gate.available(), 1, "slot must not leak on panic");
    }
}
