//! Channel-backed delivery context for a foreground loop.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::domain::ports::{DeliveryContext, DeliveryJob};

/// Creates a delivery context and the queue the foreground drains.
#[must_use]
pub fn channel() -> (ChannelDelivery, DeliveryQueue) {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    (ChannelDelivery { job_tx }, DeliveryQueue { job_rx })
}

/// Posts delivery jobs onto an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelDelivery {
    job_tx: mpsc::UnboundedSender<DeliveryJob>,
}

impl DeliveryContext for ChannelDelivery {
    fn post(&self, job: DeliveryJob) {
        if self.job_tx.send(job).is_err() {
            debug!("Delivery queue closed, dropping result");
        }
    }
}

/// Foreground end of a [`ChannelDelivery`]. Jobs run on whichever thread
/// or task drains this queue.
#[derive(Debug)]
pub struct DeliveryQueue {
    job_rx: mpsc::UnboundedReceiver<DeliveryJob>,
}

impl DeliveryQueue {
    /// Runs every job already posted without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(job) = self.job_rx.try_recv() {
            job();
            count += 1;
        }
        if count > 0 {
            trace!(count, "Ran pending deliveries");
        }
        count
    }

    /// Waits for the next job and runs it.
    ///
    /// Returns false once every [`ChannelDelivery`] has been dropped.
    pub async fn run_next(&mut self) -> bool {
        match self.job_rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_jobs_run_only_when_drained() {
        let (delivery, mut queue) = channel();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let ran = ran.clone();
            delivery.post(Box::new(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        assert!(queue.run_next().await);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_next_ends_when_senders_dropped() {
        let (delivery, mut queue) = channel();
        drop(delivery);
        assert!(!queue.run_next().await);
    }
}
