//! The scheme's external signal vectors.
//!
//! Hosts exchange values with the running diagram through two flat `f64`
//! vectors.  Blocks that declare signal ports own a contiguous slice of each,
//! assigned in creation order by the allocator.

/// External input and output vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalBus {
    inputs:  Vec<f64>,
    outputs: Vec<f64>,
}

impl SignalBus {
    /// Resize both vectors.  Existing entries keep their positions.
    pub fn resize(&mut self, inputs: usize, outputs: usize) {
        self.inputs.resize(inputs, 0.0);
        self.outputs.resize(outputs, 0.0);
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    #[inline(always)]
    pub fn input(&self, i: usize) -> f64 {
        self.inputs[i]
    }

    #[inline(always)]
    pub fn set_output(&mut self, i: usize, value: f64) {
        self.outputs[i] = value;
    }
}
