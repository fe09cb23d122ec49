#[cfg(test)]
mod decode {
    use bd_blocks::{BlockKind, BlockSpec, CompareOp, GateOp, ToggleEdge};
    use bd_core::BlockLink;

    use crate::{decode, encode, Assembly, AssemblyError, AssemblyWriter};

    fn le(v: f64) -> [u8; 8] {
        v.to_le_bytes()
    }

    #[test]
    fn hand_written_stream() {
        // Constant(2.5) -> StepDelay(y0 = 1), one link.
        let mut bytes = vec![50];
        bytes.extend_from_slice(&le(2.5));
        bytes.push(8);
        bytes.extend_from_slice(&le(1.0));
        bytes.extend_from_slice(&1u32.to_le_bytes());
        for v in [0u32, 0, 1, 0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let a = decode(2, &bytes).unwrap();
        assert_eq!(
            a.blocks,
            vec![BlockSpec::Constant { value: 2.5 }, BlockSpec::StepDelay { y0: 1.0 }]
        );
        assert_eq!(a.links, vec![BlockLink::new(0, 0, 1, 0)]);
    }

    #[test]
    fn writer_output_decodes_to_the_same_diagram() {
        let assembly = Assembly {
            blocks: vec![
                BlockSpec::DelayOn { delay: 0.5 },
                BlockSpec::PiecewiseLinear { xs: vec![0.0, 1.0], ys: vec![0.0, 2.0], extrapolate: true },
                BlockSpec::Gate { op: GateOp::Xor, inputs: 3, inverted: true },
                BlockSpec::Compare(CompareOp::LessOrEqual),
                BlockSpec::Hysteresis { x1: -1.0, x2: 1.0, y1: 0.0, y2: 5.0, start_high: true },
                BlockSpec::Summator { coeffs: vec![1.0, -1.0] },
                BlockSpec::SrTrigger { initial: true },
                BlockSpec::ExtOutSignal,
            ],
            links: vec![BlockLink::new(0, 0, 1, 0), BlockLink::new(1, 0, 5, 1)],
        };
        let (count, bytes) = encode(&assembly);
        assert_eq!(count, 8);
        assert_eq!(decode(count, &bytes).unwrap(), assembly);
    }

    #[test]
    fn empty_diagram_is_just_a_zero_link_count() {
        let (count, bytes) = AssemblyWriter::new().finish();
        assert_eq!((count, bytes.as_slice()), (0, &[0u8, 0, 0, 0][..]));
        assert_eq!(decode(0, &bytes).unwrap(), Assembly::default());
    }

    #[test]
    fn truncated_parameter() {
        let mut bytes = vec![4];
        bytes.extend_from_slice(&le(1.0));
        bytes.extend_from_slice(&[0, 0, 0]);
        let err = decode(1, &bytes).unwrap_err();
        assert_eq!(err, AssemblyError::Truncated { offset: 9, needed: 5, what: "y0" });
    }

    #[test]
    fn missing_link_table() {
        let mut w = AssemblyWriter::new();
        w.block(&BlockSpec::Not);
        let (_, bytes) = w.finish();
        // One block more than the stream holds, then a short link count.
        assert!(matches!(decode(2, &bytes[..1]), Err(AssemblyError::Truncated { what: "kind tag", .. })));
        assert!(matches!(decode(1, &bytes[..3]), Err(AssemblyError::Truncated { what: "link count", .. })));
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let bytes = [13, 60, 0, 0, 0, 0];
        assert_eq!(
            decode(2, &bytes),
            Err(AssemblyError::UnknownBlockKind { tag: 60, index: 1, offset: 1 })
        );
    }

    #[test]
    fn unknown_mode_rejected() {
        let mut bytes = vec![1, 2];
        bytes.extend_from_slice(&le(0.5));
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = decode(1, &bytes).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::UnsupportedMode { kind: BlockKind::DelayOn, mode: 2, offset: 1 }
        ));
    }

    #[test]
    fn dynamic_modes_skip_their_parameters() {
        // DelayOnOff, Pulse and Hysteresis in mode 1, no links.
        let mut bytes = vec![3, 1, 39, 1, 23, 1];
        bytes.extend_from_slice(&le(-1.0));
        bytes.extend_from_slice(&le(1.0));
        bytes.push(1);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let a = decode(3, &bytes).unwrap();
        assert_eq!(
            a.blocks,
            vec![
                BlockSpec::DelayOnOffDynamic,
                BlockSpec::PulseDynamic,
                BlockSpec::HysteresisDynamic { y1: -1.0, y2: 1.0, start_high: true },
            ]
        );
    }

    #[test]
    fn trigger_types_accept_letters_and_numbers() {
        let bytes = [57, b'f', 1, 58, 2, 0, 59, 9, 0, 0, 0, 0, 0];
        let err = decode(3, &bytes).unwrap_err();
        assert_eq!(err, AssemblyError::UnsupportedMode { kind: BlockKind::StrTrigger, mode: 9, offset: 7 });

        let a = decode(2, &[57, b'f', 1, 58, 2, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            a.blocks,
            vec![
                BlockSpec::TTrigger { edge: ToggleEdge::Falling, initial: true },
                BlockSpec::RtsTrigger { edge: ToggleEdge::Both, initial: false },
            ]
        );
    }

    #[test]
    fn full_catalog_round_trips_through_the_writer() {
        let blocks = vec![
            BlockSpec::DelayOnOff { on: 0.5, off: 0.25 },
            BlockSpec::DelayOffDynamic,
            BlockSpec::SaturationDeadband { x1: -2.0, x2: 2.0, y1: -1.0, y2: 1.0, db_x1: -0.5, db_x2: 0.5 },
            BlockSpec::HysteresisDeadband {
                x1:    -2.0,
                x2:    2.0,
                y1:    -1.0,
                y2:    1.0,
                db_x1: -0.5,
                db_x2: 0.5,
                start: -1,
            },
            BlockSpec::VariableHysteresisMinus,
            BlockSpec::ChangePulse,
            BlockSpec::LongPulse { width: 2.0 },
            BlockSpec::ShortPulseDynamic,
            BlockSpec::DebounceOnOff { hold: 0.1 },
            BlockSpec::IntInSignal { initial: 3.0, source: 4 },
            BlockSpec::IntOutSignal,
            BlockSpec::Plot { inputs: 2 },
            BlockSpec::StrTrigger { edge: ToggleEdge::Level, initial: true },
        ];
        let assembly = Assembly { blocks, links: vec![] };
        let (count, bytes) = encode(&assembly);
        assert_eq!(decode(count, &bytes).unwrap(), assembly);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let (count, mut bytes) = AssemblyWriter::new().finish();
        bytes.push(0xff);
        assert_eq!(
            decode(count, &bytes),
            Err(AssemblyError::TrailingBytes { offset: 4, remaining: 1 })
        );
    }

    #[test]
    fn huge_link_count_fails_without_allocating() {
        let bytes = u32::MAX.to_le_bytes();
        assert!(matches!(decode(0, &bytes), Err(AssemblyError::Truncated { what: "link producer", .. })));
    }
}
