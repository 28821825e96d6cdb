//! Port for handing results back to the caller's execution context.

/// A unit of work to run on the caller's context.
pub type DeliveryJob = Box<dyn FnOnce() + Send + 'static>;

/// Schedules delivery jobs onto a caller-chosen execution context.
///
/// The worker never calls listeners inline; it posts a job here and the
/// context runs it later, on its own thread or loop.
pub trait DeliveryContext: Send + Sync {
    /// Posts `job` to run later on this context.
    fn post(&self, job: DeliveryJob);
}

impl<F> DeliveryContext for F
where
    F: Fn(DeliveryJob) + Send + Sync,
{
    fn post(&self, job: DeliveryJob) {
        self(job);
    }
}
