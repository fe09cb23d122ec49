//! Source emission: stitch every block's print hooks into one program text.
//!
//! Generated code mirrors the runtime layout exactly: one array per port
//! type named by the type's codename and sized by the last allocation,
//! the same arena offsets, and the same per-step order.

use std::fmt;

use bd_block::codegen::{literal, DT_VAR, SIGNALS_IN, SIGNALS_OUT, TIME_VAR};
use bd_block::CodeNames;
use bd_core::{BlockId, PortType};

use crate::{Scheme, SchemeResult};

/// Emitted program text in four sections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Arena, time, and signal vector declarations.
    pub declarations: String,
    /// Per-block persistent state, creation order.
    pub memory:       String,
    /// One-time setup, topological order.
    pub init:         String,
    /// Per-step body, compute order.
    pub step:         String,
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.declarations)?;
        writeln!(f, "{}", self.memory)?;
        writeln!(f, "void init() {{\n{}}}\n", self.init)?;
        write!(f, "void step() {{\n    {TIME_VAR} += dt;\n{}}}\n", self.step)
    }
}

impl Scheme {
    /// Emit the scheduled scheme as program text.
    pub fn emit_source(&self) -> SchemeResult<GeneratedSource> {
        self.ensure_ready()?;
        let mut out = GeneratedSource::default();

        for ty in PortType::ALL {
            let n = self.counts.outputs_of(ty);
            if n > 0 {
                let d = ty.descriptor();
                line(&mut out.declarations, format_args!("{} {}[{n}];", d.name, d.codename));
            }
        }
        line(&mut out.declarations, format_args!("long long {TIME_VAR} = 0;"));
        line(&mut out.declarations, format_args!("const long long dt = {};", self.clock.dt));
        line(
            &mut out.declarations,
            format_args!("const double {DT_VAR} = {};", literal(self.clock.dt_sec)),
        );
        let (sig_in, sig_out) = (self.counts.signal_inputs, self.counts.signal_outputs);
        if sig_in > 0 {
            line(&mut out.declarations, format_args!("double {SIGNALS_IN}[{sig_in}];"));
        }
        if sig_out > 0 {
            line(&mut out.declarations, format_args!("double {SIGNALS_OUT}[{sig_out}];"));
        }

        for i in 0..self.nodes.len() {
            let id = BlockId(i as u32);
            let text = self.nodes[i].block.print_memory(&self.names(id));
            push_fragment(&mut out.memory, id, self.nodes[i].block.kind(), &text, "");
        }
        for &id in &self.plan.sorted {
            let node = &self.nodes[id.index()];
            let text = node.block.print_init(&self.names(id));
            push_fragment(&mut out.init, id, node.block.kind(), &text, "    ");
        }
        for &id in &self.plan.compute {
            let node = &self.nodes[id.index()];
            let text = node.block.print_source(&self.names(id));
            push_fragment(&mut out.step, id, node.block.kind(), &text, "    ");
        }
        Ok(out)
    }

    fn names(&self, id: BlockId) -> CodeNames<'_> {
        CodeNames::new(id, &self.nodes[id.index()].ports, &self.memory)
    }
}

/// Append `text` and a newline.
fn line(buf: &mut String, text: fmt::Arguments<'_>) {
    buf.push_str(&text.to_string());
    buf.push('\n');
}

fn push_fragment(buf: &mut String, id: BlockId, kind: &str, text: &str, indent: &str) {
    if text.is_empty() {
        return;
    }
    line(buf, format_args!("{indent}// #{} {kind}", id.0));
    for l in text.lines() {
        line(buf, format_args!("{indent}{l}"));
    }
}
