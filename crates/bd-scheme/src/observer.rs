//! Scheme observer trait for tracing and data collection.

use crate::Scheme;

/// Callbacks invoked by [`Scheme::compute_observed`] and
/// [`Scheme::compute_sync_observed`].
///
/// Both methods default to no-ops.  The scheme is passed read-only, so an
/// observer can sample any output through [`Scheme::absolute_output`] and
/// [`Scheme::output_value`].
///
/// # Example — print one output every step
///
/// ```rust,ignore
/// struct Print(OutputAddr);
///
/// impl SchemeObserver for Print {
///     fn on_step_end(&mut self, scheme: &Scheme) {
///         println!("{} {}", scheme.time(), scheme.output_value(self.0));
///     }
/// }
/// ```
pub trait SchemeObserver {
    /// Called after every block in the compute order has run for one step.
    fn on_step_end(&mut self, _scheme: &Scheme) {}

    /// Called once when a `compute*_observed` call returns successfully.
    fn on_run_end(&mut self, _scheme: &Scheme) {}
}

/// A [`SchemeObserver`] that does nothing.
pub struct NoopObserver;

impl SchemeObserver for NoopObserver {}
