//! Integration tests for bd-scheme.

use bd_block::{Block, BlockIo, BlockPorts, ErasedArena, InputSource, OutputAddr, PortInfo};
use bd_core::{
    AbsoluteLink, BlockId, BlockLink, ConfigError, EngineConfig, PortType, RelativeBlockLink,
    RelativeLink, SimTime,
};

use crate::{Phase, Scheme, SchemeError, SchemeObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn scheme(dt_sec: f64) -> Scheme {
    Scheme::new(&EngineConfig::with_step(dt_sec)).unwrap()
}

fn link(p: BlockId, pp: u32, c: BlockId, cp: u32) -> BlockLink {
    BlockLink::new(p.0, pp, c.0, cp)
}

fn real(offset: usize) -> OutputAddr {
    OutputAddr::new(PortType::Real, offset)
}

fn ids(raw: &[u32]) -> Vec<BlockId> {
    raw.iter().map(|&i| BlockId(i)).collect()
}

/// Real passthrough with a doubled second output, plus a bool inverter.
/// Declares Real before Bool to check that absolute order follows type keys.
struct Mixed;

impl Block for Mixed {
    fn kind(&self) -> &'static str {
        "Mixed"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 2).declare(PortType::Bool, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        io.set_real(0, x);
        io.set_real(1, 2.0 * x);
        let b = io.input::<bool>(0);
        io.set_output::<bool>(0, !b);
    }
}

/// `r = 1`, `sum = r - y`, `y' = sum`: ids 0, 1 (integrator), 2 (sum).
fn feedback(dt_sec: f64) -> Scheme {
    let mut s = scheme(dt_sec);
    let r = s.add_constant(1.0).unwrap();
    let i = s.add_integrator(1.0, 0.0).unwrap();
    let sum = s.add_summator(&[1.0, -1.0]).unwrap();
    s.set_block_links(&[link(r, 0, sum, 0), link(i, 0, sum, 1), link(sum, 0, i, 0)])
        .unwrap();
    s
}

/// Linear source into a gain of 2: ids 0, 1.
fn source_and_gain() -> Scheme {
    let mut s = scheme(0.1);
    let src = s.add_linear_source(1.0, 0.0).unwrap();
    let g = s.add_summator(&[2.0]).unwrap();
    s.set_block_links(&[link(src, 0, g, 0)]).unwrap();
    s
}

// ── Allocation and indexing ───────────────────────────────────────────────────

#[cfg(test)]
mod allocation {
    use super::*;

    #[test]
    fn offsets_follow_creation_order() {
        let mut s = scheme(0.1);
        let c = s.add_constant(1.0).unwrap();
        let sum = s.add_summator(&[1.0, 1.0]).unwrap();
        let d = s.add_step_delay(0.0).unwrap();
        s.schedule().unwrap();

        let counts = s.port_counts();
        assert_eq!(counts.outputs_of(PortType::Real), 3);
        assert_eq!(counts.inputs_of(PortType::Real), 3);
        assert_eq!(counts.outputs_of(PortType::Bool), 0);
        assert_eq!(counts.bytes, 24);

        for (n, id) in [c, sum, d].into_iter().enumerate() {
            let out = s.absolute_output(n).unwrap();
            assert_eq!(out.block, id);
            assert_eq!(out.addr, real(n));
        }
        assert_eq!(
            s.port_info(real(1)),
            Some(PortInfo { is_constant: false, block: sum, port: 0, relative_index: 1 })
        );
        assert!(s.port_info(real(0)).unwrap().is_constant);
        assert_eq!(s.port_info(real(3)), None);
    }

    #[test]
    fn absolute_numbering_walks_types_in_key_order() {
        let mut s = scheme(0.1);
        let c = s.add_constant(3.0).unwrap();
        let m = s.add_block(Box::new(Mixed));
        s.schedule().unwrap();

        let idx = s.port_index();
        assert_eq!(idx.output_count(), 4);
        assert_eq!(idx.absolute_output(1).unwrap().addr, OutputAddr::new(PortType::Bool, 0));
        assert_eq!(idx.absolute_output(2).unwrap().addr, real(1));
        assert_eq!(idx.absolute_output(3).unwrap().addr, real(2));
        let first_input = idx.absolute_input(0).unwrap();
        assert_eq!((first_input.block, first_input.ty), (m, PortType::Bool));
        assert_eq!(idx.relative_output(PortType::Real, 0).unwrap().block, c);
        assert_eq!(idx.relative_input(PortType::Real, 0).unwrap().block, m);
    }

    #[test]
    fn reindexing_unchanged_topology_is_idempotent() {
        let mut s = feedback(0.01);
        let infos = s.memory().arena(PortType::Real).infos().to_vec();
        let index = s.port_index().clone();
        let generation = s.port_counts().generation;

        s.schedule().unwrap();
        assert_eq!(s.memory().arena(PortType::Real).infos(), &infos[..]);
        assert_eq!(s.port_index(), &index);
        assert_eq!(s.port_counts().generation, generation + 1);
    }

    #[test]
    fn appended_blocks_keep_existing_wiring() {
        let mut s = source_and_gain();
        s.add_constant(5.0).unwrap();
        s.schedule().unwrap();
        assert_eq!(s.input_source(BlockId(1), 0), Some(InputSource::Wired(real(0))));
        assert_eq!(s.absolute_output(2).unwrap().addr, real(2));
    }
}

// ── Link binding ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod links {
    use super::*;

    fn mixed_pair() -> (Scheme, BlockId, BlockId) {
        let mut s = scheme(0.1);
        let c = s.add_constant(3.0).unwrap();
        let m = s.add_block(Box::new(Mixed));
        (s, c, m)
    }

    #[test]
    fn four_modes_bind_the_same_input() {
        let wired = Some(InputSource::Wired(real(0)));

        let (mut s, _, m) = mixed_pair();
        s.set_absolute_links(&[AbsoluteLink { output: 0, input: 1 }]).unwrap();
        assert_eq!(s.input_source(m, 1), wired);

        let (mut s, _, m) = mixed_pair();
        s.set_relative_links(&[RelativeLink { type_key: 5, output: 0, input: 0 }]).unwrap();
        assert_eq!(s.input_source(m, 1), wired);

        let (mut s, c, m) = mixed_pair();
        s.set_block_links(&[link(c, 0, m, 1)]).unwrap();
        assert_eq!(s.input_source(m, 1), wired);

        let (mut s, _, m) = mixed_pair();
        s.set_relative_block_links(&[RelativeBlockLink {
            type_key:      5,
            producer:      0,
            producer_port: 0,
            consumer:      1,
            consumer_port: 0,
        }])
        .unwrap();
        assert_eq!(s.input_source(m, 1), wired);

        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.block_output(m, 0), Some(1.0));
        assert_eq!(s.block_output(m, 1), Some(3.0));
        assert_eq!(s.block_output(m, 2), Some(6.0));
        assert_eq!(s.graph().edge_count(), 1);
    }

    #[test]
    fn flat_tables_bind_like_structs() {
        let (mut s, _, m) = mixed_pair();
        s.set_block_links(&BlockLink::from_flat(&[0, 0, 1, 1]).unwrap()).unwrap();
        assert_eq!(s.input_source(m, 1), Some(InputSource::Wired(real(0))));
    }

    #[test]
    fn type_mismatch_rejected() {
        let (mut s, c, m) = mixed_pair();
        let err = s.set_block_links(&[link(c, 0, m, 0)]).unwrap_err();
        assert_eq!(
            err,
            SchemeError::Config(ConfigError::TypeMismatch {
                output: PortType::Real,
                input:  PortType::Bool,
            })
        );
        let err = s.set_absolute_links(&[AbsoluteLink { output: 0, input: 0 }]).unwrap_err();
        assert!(matches!(err, SchemeError::Config(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn unknown_type_key_rejected() {
        let (mut s, _, _) = mixed_pair();
        let err = s
            .set_relative_links(&[RelativeLink { type_key: 4, output: 0, input: 0 }])
            .unwrap_err();
        assert_eq!(err, SchemeError::Config(ConfigError::UnknownType(4)));
    }

    #[test]
    fn out_of_range_links_rejected() {
        let (mut s, c, _) = mixed_pair();
        assert_eq!(
            s.set_block_links(&[BlockLink::new(0, 0, 5, 0)]).unwrap_err(),
            SchemeError::Config(ConfigError::BlockOutOfRange(BlockId(5)))
        );
        assert_eq!(
            s.set_block_links(&[link(c, 1, BlockId(1), 1)]).unwrap_err(),
            SchemeError::Config(ConfigError::LinkOutOfRange {
                what:  "producer port",
                index: 1,
                len:   1,
            })
        );
        assert_eq!(
            s.set_absolute_links(&[AbsoluteLink { output: 9, input: 0 }]).unwrap_err(),
            SchemeError::Config(ConfigError::LinkOutOfRange {
                what:  "absolute output",
                index: 9,
                len:   4,
            })
        );
    }

    #[test]
    fn failed_batch_changes_nothing() {
        let (mut s, c, m) = mixed_pair();
        let err = s.set_block_links(&[link(c, 0, m, 1), BlockLink::new(0, 0, 7, 0)]);
        assert!(err.is_err());
        assert_eq!(s.input_source(m, 1), Some(InputSource::Unbound));
        assert_eq!(s.graph().edge_count(), 0);
        assert_eq!(s.phase(), Phase::Assembly);
    }

    #[test]
    fn duplicate_links_add_parallel_edges() {
        let mut s = scheme(0.1);
        let c = s.add_constant(1.0).unwrap();
        let sum = s.add_summator(&[1.0, 1.0]).unwrap();
        s.set_block_links(&[link(c, 0, sum, 0), link(c, 0, sum, 1)]).unwrap();
        assert_eq!(s.graph().consumers(c), &[sum, sum]);
        assert_eq!(s.block_output(sum, 0), Some(2.0));
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduling {
    use super::*;
    use crate::{topological_order, DependencyGraph};

    fn graph(n: usize, edges: &[(u32, u32)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for _ in 0..n {
            g.add_node();
        }
        for &(p, c) in edges {
            g.add_edge(BlockId(p), BlockId(c));
        }
        g
    }

    #[test]
    fn ready_ties_go_to_smallest_id() {
        let g = graph(4, &[(3, 0)]);
        assert_eq!(topological_order(&g, &[false; 4]).unwrap(), ids(&[1, 2, 3, 0]));
    }

    #[test]
    fn loop_cut_at_breaker() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 1)]);
        assert_eq!(topological_order(&g, &[false, true, false]).unwrap(), ids(&[0, 2, 1]));
    }

    #[test]
    fn smallest_breaker_on_the_cycle_wins() {
        // 0 is a breaker but only hangs off the cycle 1 ↔ 2.
        let g = graph(3, &[(1, 2), (2, 1), (2, 0)]);
        let order = topological_order(&g, &[true, true, true]).unwrap();
        assert_eq!(order, ids(&[2, 0, 1]));
    }

    #[test]
    fn cycle_without_breaker_is_fatal() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        assert_eq!(
            topological_order(&g, &[true, false, false, false]),
            Err(ConfigError::UnbreakableLoop { blocks: ids(&[1, 2]) })
        );
    }

    #[test]
    fn integrator_feedback_order() {
        let s = feedback(0.01);
        assert_eq!(s.sorted_blocks(), &ids(&[0, 2, 1])[..]);
        assert_eq!(s.active_blocks(), &ids(&[2, 1])[..]);
        assert_eq!(s.compute_blocks(), &ids(&[1, 2])[..]);
        assert_eq!(s.plan().folded, ids(&[0]));
    }

    #[test]
    fn implicit_blocks_run_reversed_before_explicit() {
        // c → i1 → i2 → g, all in a line.
        let mut s = scheme(0.1);
        let c = s.add_constant(1.0).unwrap();
        let i1 = s.add_integrator(1.0, 0.0).unwrap();
        let i2 = s.add_integrator(1.0, 0.0).unwrap();
        let g = s.add_summator(&[1.0]).unwrap();
        s.set_block_links(&[link(c, 0, i1, 0), link(i1, 0, i2, 0), link(i2, 0, g, 0)])
            .unwrap();
        assert_eq!(s.compute_blocks(), &[i2, i1, g]);
    }

    #[test]
    fn unbreakable_loop_leaves_scheme_unwired() {
        let mut s = scheme(0.1);
        let a = s.add_summator(&[1.0]).unwrap();
        let b = s.add_summator(&[1.0]).unwrap();
        let err = s.set_block_links(&[link(a, 0, b, 0), link(b, 0, a, 0)]).unwrap_err();
        assert_eq!(err, SchemeError::Config(ConfigError::UnbreakableLoop { blocks: vec![a, b] }));
        assert_eq!(s.graph().edge_count(), 0);
        assert_eq!(s.input_source(a, 0), Some(InputSource::Unbound));
        assert_eq!(s.compute(1), Err(SchemeError::NotScheduled));
    }

    #[test]
    fn integrator_self_loop_is_accepted() {
        let mut s = scheme(0.1);
        let i = s.add_integrator(1.0, 1.0).unwrap();
        s.set_block_links(&[link(i, 0, i, 0)]).unwrap();
        s.compute(10).unwrap();
        // y' = y from 1 with Euler steps of 0.1.
        let expected = 1.1f64.powi(10);
        assert!((s.block_output(i, 0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn constant_subgraph_is_folded_out() {
        let mut s = scheme(0.1);
        let c1 = s.add_constant(2.0).unwrap();
        let c2 = s.add_constant(3.0).unwrap();
        let m = s.add_multiplier(2).unwrap();
        let lin = s.add_linear_source(1.0, 0.0).unwrap();
        let n = s.add_summator(&[1.0, 1.0]).unwrap();
        s.set_block_links(&[
            link(c1, 0, m, 0),
            link(c2, 0, m, 1),
            link(m, 0, n, 0),
            link(lin, 0, n, 1),
        ])
        .unwrap();

        assert_eq!(s.plan().folded, vec![c1, c2, m]);
        assert_eq!(s.compute_blocks(), &[lin, n]);
        assert!(s.port_info(real(2)).unwrap().is_constant);
        assert!(!s.port_info(real(4)).unwrap().is_constant);

        for _ in 0..5 {
            s.compute(1).unwrap();
            assert_eq!(s.block_output(m, 0), Some(6.0));
        }
        assert!((s.block_output(n, 0).unwrap() - 6.5).abs() < 1e-12);
    }

    #[test]
    fn unbound_inputs_never_fold() {
        let mut s = scheme(0.1);
        let neg = s.add_negate().unwrap();
        s.schedule().unwrap();
        assert_eq!(s.compute_blocks(), &[neg]);
    }

    #[test]
    fn adding_a_block_requires_rescheduling() {
        let mut s = source_and_gain();
        s.compute(1).unwrap();
        s.add_constant(0.0).unwrap();
        assert_eq!(s.phase(), Phase::Assembly);
        assert_eq!(s.compute(1), Err(SchemeError::NotScheduled));
        s.schedule().unwrap();
        assert_eq!(s.time(), SimTime::ZERO);
        s.compute(1).unwrap();
    }
}

// ── Randomized scheduling ─────────────────────────────────────────────────────

#[cfg(test)]
mod random_graphs {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    /// Independent check: a cycle made only of non-breaker blocks.
    fn plain_cycle(n: usize, edges: &[(usize, usize)], breaker: &[bool]) -> bool {
        let mut adj = vec![Vec::new(); n];
        for &(p, c) in edges {
            if !breaker[p] && !breaker[c] {
                adj[p].push(c);
            }
        }
        // 0 = unvisited, 1 = on stack, 2 = done.
        fn visit(v: usize, adj: &[Vec<usize>], color: &mut [u8]) -> bool {
            color[v] = 1;
            for &w in &adj[v] {
                if color[w] == 1 || (color[w] == 0 && visit(w, adj, color)) {
                    return true;
                }
            }
            color[v] = 2;
            false
        }
        let mut color = vec![0u8; n];
        (0..n).any(|v| color[v] == 0 && visit(v, &adj, &mut color))
    }

    #[test]
    fn compute_order_respects_non_breaker_edges() {
        let (mut scheduled, mut rejected) = (0, 0);
        for seed in 0..200u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let n = rng.gen_range(2..16);
            let mut s = scheme(0.01);
            let mut breaker = Vec::with_capacity(n);
            let mut inputs = Vec::with_capacity(n);
            for _ in 0..n {
                if rng.gen_bool(0.3) {
                    s.add_integrator(0.5, 0.0).unwrap();
                    breaker.push(true);
                    inputs.push(1);
                } else {
                    let k = rng.gen_range(1..=3);
                    s.add_summator(&vec![0.5; k]).unwrap();
                    breaker.push(false);
                    inputs.push(k);
                }
            }
            let mut links = Vec::new();
            let mut edges = Vec::new();
            for c in 0..n {
                for port in 0..inputs[c] {
                    let p = rng.gen_range(0..n);
                    links.push(BlockLink::new(p as u32, 0, c as u32, port as u32));
                    edges.push((p, c));
                }
            }

            match s.set_block_links(&links) {
                Ok(()) => {
                    scheduled += 1;
                    assert!(!plain_cycle(n, &edges, &breaker), "seed {seed}");
                    let order = s.compute_blocks();
                    let mut sorted = order.to_vec();
                    sorted.sort();
                    assert_eq!(sorted, ids(&(0..n as u32).collect::<Vec<_>>()), "seed {seed}");

                    let mut pos = vec![0usize; n];
                    for (i, id) in order.iter().enumerate() {
                        pos[id.index()] = i;
                    }
                    for &(p, c) in &edges {
                        if !breaker[p] && !breaker[c] {
                            assert!(pos[p] < pos[c], "seed {seed}: {p} -> {c} in {order:?}");
                        }
                    }
                    s.compute(3).unwrap();
                }
                Err(SchemeError::Config(ConfigError::UnbreakableLoop { blocks })) => {
                    rejected += 1;
                    assert!(plain_cycle(n, &edges, &breaker), "seed {seed}");
                    assert!(!blocks.is_empty());
                    assert!(blocks.iter().all(|b| !breaker[b.index()]), "seed {seed}");
                }
                Err(e) => panic!("seed {seed}: unexpected {e}"),
            }
        }
        assert!(scheduled > 0 && rejected > 0);
    }
}

// ── Execution scenarios ───────────────────────────────────────────────────────

#[cfg(test)]
mod execution {
    use super::*;

    #[test]
    fn step_delay_chain_shifts_the_source() {
        let mut s = scheme(0.1);
        let src = s.add_linear_source(2.0, 1.0).unwrap();
        let delays: Vec<BlockId> = (0..4).map(|_| s.add_step_delay(-1.0).unwrap()).collect();
        let mut links = vec![link(src, 0, delays[0], 0)];
        for w in delays.windows(2) {
            links.push(link(w[0], 0, w[1], 0));
        }
        s.set_block_links(&links).unwrap();
        assert_eq!(s.compute_blocks(), &ids(&[0, 1, 2, 3, 4])[..]);

        let source_at = |tick: u64| 1.0 + 2.0 * SimTime(tick * 100_000).as_secs();
        for k in 1..=8u64 {
            s.compute(1).unwrap();
            for (i, &d) in delays.iter().enumerate() {
                let i = i as u64;
                let expected = if k > i { source_at(k - i - 1) } else { -1.0 };
                assert_eq!(s.block_output(d, 0), Some(expected), "tick {k} node {i}");
            }
        }
    }

    #[test]
    fn integrator_feedback_tracks_exponential() {
        let mut s = feedback(0.001);
        s.compute(1000).unwrap();
        assert_eq!(s.time(), SimTime(1_000_000));
        assert_eq!(s.step_count(), 1000);

        let y = s.block_output(BlockId(1), 0).unwrap();
        let euler = 1.0 - (1.0f64 - 0.001).powi(1000);
        assert!((y - euler).abs() < 1e-9, "{y} vs {euler}");
        assert!((y - (1.0 - (-1.0f64).exp())).abs() < 1e-3);
        let sum = s.block_output(BlockId(2), 0).unwrap();
        assert!((sum - (1.0 - y)).abs() < 1e-12);
    }

    #[test]
    fn time_is_exact_after_many_steps() {
        let mut s = source_and_gain();
        s.compute(1_000_000).unwrap();
        assert_eq!(s.time(), SimTime(100_000_000_000));
    }

    #[test]
    fn compute_sync_reaches_checkpoints() {
        let mut s = source_and_gain();
        assert_eq!(s.compute_sync(2).unwrap(), 20);
        assert_eq!(s.time(), SimTime(2_000_000));

        let config = EngineConfig { dt_sec: 0.3, ..EngineConfig::default() };
        let mut s = Scheme::new(&config).unwrap();
        s.add_constant(1.0).unwrap();
        s.schedule().unwrap();
        assert_eq!(s.compute_sync(1).unwrap(), 4);
        assert_eq!(s.compute_sync(1).unwrap(), 3);
        assert_eq!(s.time(), SimTime(2_100_000));
    }

    #[test]
    fn compute_before_schedule_fails() {
        let mut s = scheme(0.1);
        s.add_constant(1.0).unwrap();
        assert_eq!(s.compute(1), Err(SchemeError::NotScheduled));
        assert_eq!(s.compute_sync(1), Err(SchemeError::NotScheduled));
        assert_eq!(s.emit_source().unwrap_err(), SchemeError::NotScheduled);
    }

    #[test]
    fn observer_sees_every_step() {
        #[derive(Default)]
        struct Recorder {
            values: Vec<f64>,
            ends:   u32,
        }
        impl SchemeObserver for Recorder {
            fn on_step_end(&mut self, scheme: &Scheme) {
                self.values.push(scheme.block_output(BlockId(1), 0).unwrap());
            }
            fn on_run_end(&mut self, _scheme: &Scheme) {
                self.ends += 1;
            }
        }

        let mut s = source_and_gain();
        let mut rec = Recorder::default();
        s.compute_observed(3, &mut rec).unwrap();
        s.compute_sync_observed(1, &mut rec).unwrap();
        assert_eq!(rec.values.len(), 3 + 7);
        assert!((rec.values[2] - 0.6).abs() < 1e-12);
        assert_eq!(rec.ends, 2);
    }
}

// ── External signals ──────────────────────────────────────────────────────────

#[cfg(test)]
mod signals {
    use super::*;

    fn rs_rig() -> Scheme {
        let mut s = scheme(0.1);
        let set = s.add_ext_in_signal(0.0).unwrap();
        let reset = s.add_ext_in_signal(0.0).unwrap();
        let t = s.add_rs_trigger(false).unwrap();
        let out = s.add_ext_out_signal().unwrap();
        s.set_block_links(&[link(set, 0, t, 0), link(reset, 0, t, 1), link(t, 0, out, 0)])
            .unwrap();
        s
    }

    #[test]
    fn rs_trigger_truth_table() {
        let mut s = rs_rig();
        assert_eq!((s.inputs().len(), s.outputs().len()), (2, 1));

        let table = [
            ([1.0, 0.0], 1.0),
            ([0.0, 0.0], 1.0),
            ([0.0, 1.0], 0.0),
            ([0.0, 0.0], 0.0),
            ([1.0, 0.0], 1.0),
            ([1.0, 1.0], 0.0),
        ];
        let mut out = [0.0];
        for (inputs, expected) in table {
            s.set_inputs(&inputs).unwrap();
            s.compute(1).unwrap();
            s.get_outputs(&mut out).unwrap();
            assert_eq!(out[0], expected, "inputs {inputs:?}");
        }
    }

    #[test]
    fn int_in_signal_follows_its_source() {
        let mut s = source_and_gain();
        let tap = s.add_int_in_signal(-1.0, BlockId(1)).unwrap();
        s.schedule().unwrap();
        assert_eq!(s.graph().edge_count(), 1);
        assert_eq!(s.block_output(tap, 0), Some(-1.0));

        s.compute(3).unwrap();
        assert_eq!(s.block_output(tap, 0), s.block_output(BlockId(1), 0));
    }

    #[test]
    fn bad_tap_sources_rejected() {
        let mut s = source_and_gain();
        s.add_int_in_signal(0.0, BlockId(9)).unwrap();
        let err = s.schedule().unwrap_err();
        assert_eq!(err, SchemeError::Config(ConfigError::BlockOutOfRange(BlockId(9))));

        let mut s = scheme(0.1);
        let plot = s.add_plot(1).unwrap();
        s.add_int_in_signal(0.0, plot).unwrap();
        let err = s.schedule().unwrap_err();
        assert_eq!(
            err,
            SchemeError::Config(ConfigError::LinkOutOfRange { what: "tapped output", index: 0, len: 0 })
        );
    }

    #[test]
    fn vector_lengths_must_match() {
        let mut s = rs_rig();
        assert_eq!(
            s.set_inputs(&[1.0]),
            Err(SchemeError::SignalCountMismatch {
                expected: 2,
                got:      1,
                what:     "input signal vector",
            })
        );
        let mut out = [0.0; 3];
        assert!(matches!(
            s.get_outputs(&mut out),
            Err(SchemeError::SignalCountMismatch { expected: 1, got: 3, .. })
        ));
    }
}

// ── Port freeze ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod freeze {
    use super::*;

    #[test]
    fn frozen_input_reads_override() {
        let mut s = source_and_gain();
        let g = BlockId(1);
        s.freeze_port(g, 0, 10.0).unwrap();
        s.compute(1).unwrap();
        assert_eq!(s.block_output(g, 0), Some(20.0));
        assert_eq!(s.graph().edge_count(), 1);
        assert_eq!(s.phase(), Phase::Ready);

        s.freeze_port(g, 0, 20.0).unwrap();
        assert_eq!(s.frozen_ports().len(), 1);
        assert_eq!(s.memory().arena(PortType::Real).live_pins(), 1);
        s.compute(1).unwrap();
        assert_eq!(s.block_output(g, 0), Some(40.0));
    }

    #[test]
    fn unfreeze_restores_source_and_trajectory() {
        let build = || {
            let mut s = scheme(0.1);
            let src = s.add_sinus_source(1.0, 3.0, 0.0).unwrap();
            let d = s.add_step_delay(0.0).unwrap();
            let i = s.add_inertial(2.0, 0.5, 0.0).unwrap();
            s.set_block_links(&[link(src, 0, d, 0), link(d, 0, i, 0)]).unwrap();
            s
        };
        let mut a = build();
        let mut b = build();

        a.compute(3).unwrap();
        let before = a.input_source(BlockId(2), 0);
        a.freeze_port(BlockId(2), 0, 99.0).unwrap();
        assert_eq!(a.input_source(BlockId(2), 0), Some(InputSource::Pinned(bd_core::SlotId(0))));
        assert_eq!(a.unfreeze_port(BlockId(2), 0), Ok(true));
        assert_eq!(a.input_source(BlockId(2), 0), before);
        a.compute(3).unwrap();

        b.compute(6).unwrap();
        let bits = |s: &Scheme| s.memory().reals.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.memory().arena(PortType::Real).live_pins(), 0);
    }

    #[test]
    fn unfreeze_all_restores_everything() {
        let mut s = scheme(0.1);
        let c = s.add_constant(1.0).unwrap();
        let sum = s.add_summator(&[1.0, 1.0]).unwrap();
        s.set_block_links(&[link(c, 0, sum, 0)]).unwrap();

        s.freeze_port(sum, 0, 5.0).unwrap();
        s.freeze_port(sum, 1, 7.0).unwrap();
        assert_eq!(s.unfreeze_port(sum, 1), Ok(true));
        assert_eq!(s.unfreeze_port(sum, 1), Ok(false));
        s.freeze_port(sum, 1, 7.0).unwrap();

        assert_eq!(s.unfreeze_all_ports(), 2);
        assert!(s.frozen_ports().is_empty());
        assert_eq!(s.input_source(sum, 0), Some(InputSource::Wired(real(0))));
        assert_eq!(s.input_source(sum, 1), Some(InputSource::Unbound));
        assert_eq!(s.memory().arena(PortType::Real).live_pins(), 0);
    }

    #[test]
    fn linking_a_frozen_input_updates_what_unfreeze_restores() {
        let mut s = scheme(0.1);
        let src = s.add_linear_source(1.0, 0.0).unwrap();
        let g = s.add_summator(&[2.0]).unwrap();
        s.freeze_port(g, 0, 7.0).unwrap();
        s.set_block_links(&[link(src, 0, g, 0)]).unwrap();

        assert_eq!(
            s.frozen_ports().get(g, 0).map(|f| f.original),
            Some(InputSource::Wired(real(0)))
        );
        s.compute(1).unwrap();
        assert_eq!(s.block_output(g, 0), Some(14.0));

        s.unfreeze_port(g, 0).unwrap();
        s.compute(1).unwrap();
        assert!((s.block_output(g, 0).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_freeze_rejected() {
        let mut s = source_and_gain();
        assert_eq!(
            s.freeze_port(BlockId(1), 1, 0.0),
            Err(SchemeError::PortOutOfRange { block: BlockId(1), port: 1, inputs: 1 })
        );
        assert_eq!(
            s.freeze_port(BlockId(9), 0, 0.0),
            Err(SchemeError::Config(ConfigError::BlockOutOfRange(BlockId(9))))
        );
        assert!(s.unfreeze_port(BlockId(0), 0).is_err());
    }
}

// ── Assembly streams ──────────────────────────────────────────────────────────

#[cfg(test)]
mod assembly {
    use bd_assembly::{AssemblyError, AssemblyWriter};
    use bd_blocks::BlockSpec;

    use super::*;

    fn closed_loop_stream() -> (usize, Vec<u8>) {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::SinusSource { amplitude: 1.0, omega: 2.0, phase: 0.3 })
            .block(&BlockSpec::Summator { coeffs: vec![1.0, -0.5] })
            .block(&BlockSpec::Oscillatory { k: 1.0, t: 0.4, b: 0.2, y0: 0.0, dy0: 0.0 })
            .block(&BlockSpec::Hysteresis { x1: -0.2, x2: 0.2, y1: 0.0, y2: 1.0, start_high: false })
            .block(&BlockSpec::ExtOutSignal);
        w.link(BlockLink::new(0, 0, 1, 0))
            .link(BlockLink::new(2, 0, 1, 1))
            .link(BlockLink::new(1, 0, 2, 0))
            .link(BlockLink::new(2, 0, 3, 0))
            .link(BlockLink::new(3, 0, 4, 0));
        w.finish()
    }

    #[test]
    fn same_stream_same_trajectory() {
        let (count, bytes) = closed_loop_stream();
        let mut a = scheme(0.01);
        let mut b = scheme(0.01);
        assert_eq!(a.assign(count, &bytes).unwrap(), ids(&[0, 1, 2, 3, 4]));
        b.assign(count, &bytes).unwrap();

        for _ in 0..200 {
            a.compute(1).unwrap();
            b.compute(1).unwrap();
            let bits = |s: &Scheme| {
                s.memory().reals.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            };
            assert_eq!(bits(&a), bits(&b));
            assert_eq!(a.outputs(), b.outputs());
        }
    }

    #[test]
    fn stream_links_are_relative_to_the_stream() {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Constant { value: 2.0 }).block(&BlockSpec::Negate);
        w.link(BlockLink::new(0, 0, 1, 0));
        let (count, bytes) = w.finish();

        let mut s = scheme(0.1);
        s.add_constant(5.0).unwrap();
        assert_eq!(s.assign(count, &bytes).unwrap(), ids(&[1, 2]));
        assert_eq!(s.block_output(BlockId(2), 0), Some(-2.0));
        assert_eq!(s.plan().folded, ids(&[0, 1, 2]));
    }

    #[test]
    fn truncated_stream_appends_nothing() {
        let mut s = scheme(0.1);
        let err = s.assign(1, &[50, 0, 0]).unwrap_err();
        assert!(matches!(err, SchemeError::Assembly(AssemblyError::Truncated { .. })));
        assert_eq!(s.block_count(), 0);
    }

    #[test]
    fn invalid_parameters_append_nothing() {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Constant { value: 1.0 })
            .block(&BlockSpec::Summator { coeffs: vec![] });
        let (count, bytes) = w.finish();
        let mut s = scheme(0.1);
        let err = s.assign(count, &bytes).unwrap_err();
        assert!(matches!(err, SchemeError::Config(ConfigError::InvalidParameters { .. })));
        assert_eq!(s.block_count(), 0);
    }

    #[test]
    fn stream_link_out_of_range_rejected() {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Constant { value: 1.0 });
        w.link(BlockLink::new(0, 0, 3, 0));
        let (count, bytes) = w.finish();

        let mut s = source_and_gain();
        let err = s.assign(count, &bytes).unwrap_err();
        // Reported in stream numbering, before anything is appended.
        assert_eq!(err, SchemeError::Config(ConfigError::BlockOutOfRange(BlockId(3))));
        assert_eq!(s.block_count(), 2);
        assert_eq!(s.phase(), Phase::Ready);
    }

    #[test]
    fn rejected_stream_restores_the_running_scheme() {
        // Two pass-through gains wired into a loop nothing can break.
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Summator { coeffs: vec![1.0] })
            .block(&BlockSpec::Summator { coeffs: vec![1.0] });
        w.link(BlockLink::new(0, 0, 1, 0)).link(BlockLink::new(1, 0, 0, 0));
        let (count, bytes) = w.finish();

        let mut s = source_and_gain();
        s.compute(5).unwrap();
        let before = s.memory().reals.values().to_vec();
        let counts = s.port_counts().clone();

        let err = s.assign(count, &bytes).unwrap_err();
        assert!(matches!(err, SchemeError::Config(ConfigError::UnbreakableLoop { .. })));
        assert_eq!(s.block_count(), 2);
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.step_count(), 5);
        assert_eq!(s.graph().edge_count(), 1);
        assert_eq!(s.port_counts(), &counts);
        assert_eq!(s.memory().reals.values(), &before[..]);

        s.compute(1).unwrap();
        let t = s.time().as_secs();
        assert!((s.block_output(BlockId(1), 0).unwrap() - 2.0 * t).abs() < 1e-12);
    }

    #[test]
    fn stream_taps_are_relative_to_the_stream() {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Constant { value: 3.0 })
            .block(&BlockSpec::IntInSignal { initial: 0.0, source: 0 });
        let (count, bytes) = w.finish();

        let mut s = scheme(0.1);
        s.add_constant(5.0).unwrap();
        s.assign(count, &bytes).unwrap();
        s.compute(1).unwrap();
        assert_eq!(s.block_output(BlockId(2), 0), Some(3.0));

        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::IntInSignal { initial: 0.0, source: 5 });
        let (count, bytes) = w.finish();
        let err = s.assign(count, &bytes).unwrap_err();
        assert_eq!(err, SchemeError::Config(ConfigError::BlockOutOfRange(BlockId(5))));
        assert_eq!(s.block_count(), 3);
    }
}

// ── Builder and parameters ────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use bd_blocks::BlockSpec;

    use super::*;
    use crate::SchemeBuilder;

    #[test]
    fn builds_a_ready_scheme() {
        let mut s = SchemeBuilder::new(EngineConfig::with_step(0.01))
            .parameter("gain", 2.5)
            .block(BlockSpec::Constant { value: 1.0 })
            .block(BlockSpec::Integrator { k: 1.0, y0: 0.0 })
            .links(vec![BlockLink::new(0, 0, 1, 0)])
            .build()
            .unwrap();
        assert_eq!(s.phase(), Phase::Ready);
        s.compute(100).unwrap();
        assert!((s.block_output(BlockId(1), 0).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(s.parameter("gain"), Ok(2.5));
    }

    #[test]
    fn builder_appends_assembly_after_blocks() {
        let mut w = bd_assembly::AssemblyWriter::new();
        w.block(&BlockSpec::StepDelay { y0: 4.0 });
        let (count, bytes) = w.finish();
        let s = SchemeBuilder::new(EngineConfig::default())
            .blocks([BlockSpec::Constant { value: 1.0 }])
            .assembly(count, bytes)
            .build()
            .unwrap();
        assert_eq!(s.block_count(), 2);
        assert_eq!(s.block_kind(BlockId(1)), Some("StepDelay"));
    }

    #[test]
    fn invalid_step_rejected() {
        let err = SchemeBuilder::new(EngineConfig::with_step(0.0)).build().err();
        assert_eq!(
            err,
            Some(SchemeError::Config(ConfigError::InvalidStep { what: "dt", secs: 0.0 }))
        );
    }

    #[test]
    fn invalid_block_rejected() {
        let err = SchemeBuilder::new(EngineConfig::default())
            .block(BlockSpec::Inertial { k: 1.0, t: 0.0, y0: 0.0 })
            .build()
            .err();
        assert!(matches!(err, Some(SchemeError::Config(ConfigError::InvalidParameters { .. }))));
    }

    #[test]
    fn parameters_from_config_and_setter() {
        let mut config = EngineConfig::default();
        config.parameters.insert("kp".into(), 0.7);
        let mut s = Scheme::new(&config).unwrap();
        assert_eq!(s.parameter("kp"), Ok(0.7));
        assert_eq!(s.parameter("ki"), Err(ConfigError::UnknownParameter("ki".into())));
        s.set_parameter("ki", 0.1);
        assert_eq!(s.parameter("ki"), Ok(0.1));
    }
}

// ── Source emission ───────────────────────────────────────────────────────────

#[cfg(test)]
mod emit {
    use super::*;

    #[test]
    fn fragments_follow_plan_order() {
        let s = feedback(0.01);
        let src = s.emit_source().unwrap();
        assert!(src.declarations.contains("double reals[3];"));
        assert!(src.declarations.contains("const double dt_sec = 0.01;"));
        assert!(!src.declarations.contains("bools"));

        let at = |text: &str, needle: &str| text.find(needle).unwrap();
        assert!(at(&src.init, "#0 Constant") < at(&src.init, "#2 Summator"));
        assert!(at(&src.init, "#2 Summator") < at(&src.init, "#1 Integrator"));
        assert!(at(&src.step, "#1 Integrator") < at(&src.step, "#2 Summator"));
        assert!(!src.step.contains("Constant"));
        assert!(src.step.contains("reals[1] += 1.0 * reals[2] * dt_sec;"));

        let text = src.to_string();
        assert!(text.contains("void init() {"));
        assert!(text.contains("void step() {"));
    }

    #[test]
    fn declarations_are_one_per_line() {
        let src = feedback(0.01).emit_source().unwrap();
        let lines: Vec<&str> = src.declarations.lines().collect();
        assert_eq!(
            lines,
            [
                "double reals[3];",
                "long long time = 0;",
                "const long long dt = 10000;",
                "const double dt_sec = 0.01;",
            ]
        );
        assert!(src.declarations.ends_with('\n'));
        assert!(src.init.lines().all(|l| l.starts_with("    ")));
        assert!(src.step.lines().all(|l| l.starts_with("    ")));
    }

    #[test]
    fn taps_emit_as_arena_reads() {
        let mut s = source_and_gain();
        s.add_int_in_signal(0.0, BlockId(1)).unwrap();
        s.schedule().unwrap();
        let src = s.emit_source().unwrap();
        assert!(src.step.contains("reals[2] = reals[1];"), "{}", src.step);
    }

    #[test]
    fn frozen_inputs_emit_as_literals() {
        let mut s = source_and_gain();
        s.freeze_port(BlockId(1), 0, 1.5).unwrap();
        let src = s.emit_source().unwrap();
        assert!(src.step.contains("reals[1] = 2.0 * 1.5;"), "{}", src.step);
    }
}
