//! Executor: the per-step loop.

use bd_block::BlockIo;
use tracing::debug;

use crate::{NoopObserver, Scheme, SchemeObserver, SchemeResult};

impl Scheme {
    /// Advance `steps` steps of `dt`.
    pub fn compute(&mut self, steps: u64) -> SchemeResult<()> {
        self.compute_observed(steps, &mut NoopObserver)
    }

    /// [`compute`][Self::compute] with observer callbacks.
    pub fn compute_observed<O: SchemeObserver>(
        &mut self,
        steps:    u64,
        observer: &mut O,
    ) -> SchemeResult<()> {
        self.ensure_ready()?;
        for _ in 0..steps {
            self.step();
            observer.on_step_end(self);
        }
        observer.on_run_end(self);
        Ok(())
    }

    /// Move the sync checkpoint forward by `sync_steps` sync steps and run
    /// `dt` steps until the clock reaches it.  Returns the steps run.
    ///
    /// The checkpoint advances by whole sync steps independently of `dt`,
    /// so a `dt` that does not divide the sync step overshoots by less than
    /// one `dt` per call and never drifts.
    pub fn compute_sync(&mut self, sync_steps: u64) -> SchemeResult<u64> {
        self.compute_sync_observed(sync_steps, &mut NoopObserver)
    }

    pub fn compute_sync_observed<O: SchemeObserver>(
        &mut self,
        sync_steps: u64,
        observer:   &mut O,
    ) -> SchemeResult<u64> {
        self.ensure_ready()?;
        let target = self.clock.extend_sync(sync_steps);
        let mut ran = 0;
        while self.clock.behind_sync() {
            self.step();
            observer.on_step_end(self);
            ran += 1;
        }
        debug!(%target, steps = ran, "sync checkpoint reached");
        observer.on_run_end(self);
        Ok(ran)
    }

    /// One step: advance time, then run every block in compute order.
    fn step(&mut self) {
        self.clock.advance();
        for &id in &self.plan.compute {
            let node = &mut self.nodes[id.index()];
            let mut io = BlockIo::new(&node.ports, &mut self.memory, &mut self.signals, &self.clock);
            node.block.compute(&mut io);
        }
    }
}
