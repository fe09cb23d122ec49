//! Dynamic elements: integrators, lags, and the one-step delay.
//!
//! All use explicit fixed-step Euler updates with the scheme's `dt`.  The
//! integrating ones (`Integrator`, `Inertial`, `Oscillatory`) are
//! loop-breakers computed in the implicit pass.

use bd_block::codegen::{DT_VAR, literal as lit};
use bd_block::{Block, BlockIo, BlockPorts, Capabilities, CodeNames};
use bd_core::PortType;

/// `y' = k·x`, `y(0) = y0`.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub k:  f64,
    pub y0: f64,
}

impl Block for Integrator {
    fn kind(&self) -> &'static str {
        "Integrator"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::INTEGRATING
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.y0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = io.output_real(0) + self.k * io.real(0) * io.dt_sec();
        io.set_real(0, y);
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), lit(self.y0))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} += {} * {} * {DT_VAR};",
            names.real_out(0),
            lit(self.k),
            names.real_in(0),
        )
    }
}

/// First-order lag `T·y' + y = k·x`, `y(0) = y0`.
#[derive(Debug, Clone)]
pub struct Inertial {
    pub k:  f64,
    pub t:  f64,
    pub y0: f64,
}

impl Block for Inertial {
    fn kind(&self) -> &'static str {
        "Inertial"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::INTEGRATING
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.y0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = io.output_real(0);
        io.set_real(0, y + (self.k * io.real(0) - y) * io.dt_sec() / self.t);
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), lit(self.y0))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let y = names.real_out(0);
        format!(
            "{y} += ({} * {} - {y}) * {DT_VAR} / {};",
            lit(self.k),
            names.real_in(0),
            lit(self.t),
        )
    }
}

/// Real differentiator `T·y' + y = k·x'`, `y(0) = y0`.
#[derive(Debug, Clone)]
pub struct InertialDifferential {
    pub k:  f64,
    pub t:  f64,
    pub y0: f64,
    prev_x: f64,
}

impl InertialDifferential {
    pub fn new(k: f64, t: f64, y0: f64) -> Self {
        Self { k, t, y0, prev_x: 0.0 }
    }
}

impl Block for InertialDifferential {
    fn kind(&self) -> &'static str {
        "InertialDifferential"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.y0);
        self.prev_x = io.real(0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        let y = io.output_real(0);
        io.set_real(0, y + (self.k * (x - self.prev_x) - y * io.dt_sec()) / self.t);
        self.prev_x = x;
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("double {} = 0;", names.var("prev_x"))
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {};\n{} = {};",
            names.real_out(0),
            lit(self.y0),
            names.var("prev_x"),
            names.real_in(0),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y, prev) = (names.real_in(0), names.real_out(0), names.var("prev_x"));
        format!(
            "{y} += ({} * ({x} - {prev}) - {y} * {DT_VAR}) / {};\n{prev} = {x};",
            lit(self.k),
            lit(self.t),
        )
    }
}

/// Second-order link `T²·y'' + 2bT·y' + y = k·x`, `y(0) = y0`, `y'(0) = dy0`.
#[derive(Debug, Clone)]
pub struct Oscillatory {
    pub k:   f64,
    pub t:   f64,
    pub b:   f64,
    pub y0:  f64,
    pub dy0: f64,
    dy:      f64,
}

impl Oscillatory {
    pub fn new(k: f64, t: f64, b: f64, y0: f64, dy0: f64) -> Self {
        Self { k, t, b, y0, dy0, dy: dy0 }
    }
}

impl Block for Oscillatory {
    fn kind(&self) -> &'static str {
        "Oscillatory"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::INTEGRATING
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.y0);
        self.dy = self.dy0;
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let dt = io.dt_sec();
        let prev_y = io.output_real(0);
        io.set_real(0, prev_y + self.dy * dt);
        let accel = (self.k * io.real(0) - 2.0 * self.b * self.t * self.dy - prev_y)
            / (self.t * self.t);
        self.dy += accel * dt;
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("double {} = {};", names.var("dy"), lit(self.dy0))
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {};\n{} = {};",
            names.real_out(0),
            lit(self.y0),
            names.var("dy"),
            lit(self.dy0),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y, dy, prev) = (
            names.real_in(0),
            names.real_out(0),
            names.var("dy"),
            names.var("prev_y"),
        );
        format!(
            "double {prev} = {y};\n\
             {y} += {dy} * {DT_VAR};\n\
             {dy} += ({} * {x} - {} * {dy} - {prev}) / {} * {DT_VAR};",
            lit(self.k),
            lit(2.0 * self.b * self.t),
            lit(self.t * self.t),
        )
    }
}

/// One-step delay: `y[n] = x[n-1]`, `y[0] = y0`.
#[derive(Debug, Clone)]
pub struct StepDelay {
    pub y0: f64,
    prev_x: f64,
}

impl StepDelay {
    pub fn new(y0: f64) -> Self {
        Self { y0, prev_x: 0.0 }
    }
}

impl Block for StepDelay {
    fn kind(&self) -> &'static str {
        "StepDelay"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.y0);
        self.prev_x = io.real(0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.prev_x);
        self.prev_x = io.real(0);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("double {} = 0;", names.var("prev_x"))
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {};\n{} = {};",
            names.real_out(0),
            lit(self.y0),
            names.var("prev_x"),
            names.real_in(0),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y, prev) = (names.real_in(0), names.real_out(0), names.var("prev_x"));
        format!("{y} = {prev};\n{prev} = {x};")
    }
}
