//! Latches, toggle triggers, and the selector switch.

use bd_block::{Block, BlockIo, BlockPorts, CodeNames};
use bd_core::PortType;

/// Which input wins when both are asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// RS trigger: reset wins.
    Reset,
    /// SR trigger: set wins.
    Set,
}

/// Set/reset latch.  Input 0 is S, input 1 is R; both low holds the state.
#[derive(Debug, Clone)]
pub struct Latch {
    pub priority: Priority,
    pub initial:  bool,
}

impl Block for Latch {
    fn kind(&self) -> &'static str {
        match self.priority {
            Priority::Reset => "RsTrigger",
            Priority::Set => "SrTrigger",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 2, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_flag(0, self.initial);
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let (set, reset) = (io.flag(0), io.flag(1));
        let next = match self.priority {
            Priority::Reset if reset => Some(false),
            Priority::Reset if set => Some(true),
            Priority::Set if set => Some(true),
            Priority::Set if reset => Some(false),
            _ => None,
        };
        if let Some(y) = next {
            io.set_flag(0, y);
        }
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {};\n{}",
            names.real_out(0),
            u8::from(self.initial),
            self.print_source(names),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (s, r, y) = (names.real_in(0), names.real_in(1), names.real_out(0));
        match self.priority {
            Priority::Reset => format!("if ({r} != 0)\n    {y} = 0;\nelse if ({s} != 0)\n    {y} = 1;"),
            Priority::Set => format!("if ({s} != 0)\n    {y} = 1;\nelse if ({r} != 0)\n    {y} = 0;"),
        }
    }
}

/// Edge of the T input that flips a [`ToggleTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEdge {
    Rising,
    Falling,
    /// Either edge.
    Both,
    /// Every step the input is high.
    Level,
}

impl ToggleEdge {
    /// Wire code: `0..=3`, or the letters `r`, `f`, `b`, `l`.
    pub fn from_code(code: u8) -> Option<ToggleEdge> {
        match code {
            0 | b'r' => Some(ToggleEdge::Rising),
            1 | b'f' => Some(ToggleEdge::Falling),
            2 | b'b' => Some(ToggleEdge::Both),
            3 | b'l' => Some(ToggleEdge::Level),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    fn fires(self, prev: bool, t: bool) -> bool {
        match self {
            ToggleEdge::Rising => !prev && t,
            ToggleEdge::Falling => prev && !t,
            ToggleEdge::Both => prev != t,
            ToggleEdge::Level => t,
        }
    }

    fn code_test(self, prev: &str, t: &str) -> String {
        match self {
            ToggleEdge::Rising => format!("!{prev} && {t} != 0"),
            ToggleEdge::Falling => format!("{prev} && {t} == 0"),
            ToggleEdge::Both => format!("{prev} != ({t} != 0)"),
            ToggleEdge::Level => format!("{t} != 0"),
        }
    }
}

/// T trigger: the output flips on the chosen edge of the T input.
///
/// With `latch` set the block also has S and R inputs (S, T, R in that
/// order) and the priority decides which of them wins; both beat T.
#[derive(Debug, Clone)]
pub struct ToggleTrigger {
    pub edge:    ToggleEdge,
    pub latch:   Option<Priority>,
    pub initial: bool,
    prev_t:      bool,
    y:           bool,
}

impl ToggleTrigger {
    pub fn new(edge: ToggleEdge, latch: Option<Priority>, initial: bool) -> Self {
        Self { edge, latch, initial, prev_t: false, y: initial }
    }

    fn t_input(&self) -> usize {
        usize::from(self.latch.is_some())
    }
}

impl Block for ToggleTrigger {
    fn kind(&self) -> &'static str {
        match self.latch {
            None => "TTrigger",
            Some(Priority::Reset) => "RtsTrigger",
            Some(Priority::Set) => "StrTrigger",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        let inputs = if self.latch.is_some() { 3 } else { 1 };
        ports.declare(PortType::Real, inputs, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.prev_t = io.flag(self.t_input());
        self.y = self.initial;
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let t = io.flag(self.t_input());
        let toggled = self.edge.fires(self.prev_t, t);
        self.prev_t = t;
        let forced = match self.latch {
            None => None,
            Some(Priority::Reset) if io.flag(2) => Some(false),
            Some(Priority::Reset) if io.flag(0) => Some(true),
            Some(Priority::Set) if io.flag(0) => Some(true),
            Some(Priority::Set) if io.flag(2) => Some(false),
            Some(_) => None,
        };
        self.y = match forced {
            Some(y) => y,
            None => self.y != toggled,
        };
        io.set_flag(0, self.y);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!(
            "bool {} = false;\nbool {} = {};",
            names.var("prev_t"),
            names.var("y"),
            self.initial,
        )
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {} != 0;\n{} = {};\n{}",
            names.var("prev_t"),
            names.real_in(self.t_input()),
            names.var("y"),
            self.initial,
            self.print_source(names),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (prev, y, out) = (names.var("prev_t"), names.var("y"), names.real_out(0));
        let t = names.real_in(self.t_input());
        let toggle = format!("if ({})\n    {y} = !{y};", self.edge.code_test(&prev, &t));
        let body = match self.latch {
            None => toggle,
            Some(priority) => {
                let (s, r) = (names.real_in(0), names.real_in(2));
                let (first, first_y, second, second_y) = match priority {
                    Priority::Reset => (r, "false", s, "true"),
                    Priority::Set => (s, "true", r, "false"),
                };
                format!(
                    "if ({first} != 0)\n    {y} = {first_y};\nelse if ({second} != 0)\n    \
                     {y} = {second_y};\nelse {toggle}"
                )
            }
        };
        format!("{body}\n{prev} = {t} != 0;\n{out} = {y};")
    }
}

/// `x₂ ? x₁ : x₀`.
#[derive(Debug, Clone)]
pub struct ToggleSwitch;

impl Block for ToggleSwitch {
    fn kind(&self) -> &'static str {
        "ToggleSwitch"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 3, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = if io.flag(2) { io.real(1) } else { io.real(0) };
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {} != 0 ? {} : {};",
            names.real_out(0),
            names.real_in(2),
            names.real_in(1),
            names.real_in(0),
        )
    }
}
