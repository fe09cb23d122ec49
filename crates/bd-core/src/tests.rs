//! Unit tests for bd-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BlockId, SlotId};

    #[test]
    fn index_roundtrip() {
        let id = BlockId(42);
        assert_eq!(id.index(), 42);
        assert!(id.is_valid());
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(BlockId::default(), BlockId::INVALID);
        assert_eq!(SlotId::INVALID.0, u32::MAX);
        assert!(!SlotId::default().is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(BlockId(7).to_string(), "#7");
        assert_eq!(SlotId(2).to_string(), "slot 2");
        assert_eq!(BlockId::INVALID.to_string(), "#?");
    }
}

#[cfg(test)]
mod time {
    use crate::{EngineConfig, SimClock, SimTime, TICKS_PER_SEC};

    #[test]
    fn time_arithmetic() {
        let t = SimTime(10);
        assert_eq!(t + 5, SimTime(15));
        assert_eq!(t.offset(3), SimTime(13));
        assert_eq!(SimTime(15) - SimTime(10), 5u64);
        assert_eq!(SimTime::from_secs(0.25), SimTime(250_000));
    }

    #[test]
    fn clock_does_not_drift() {
        let mut clock = SimClock::new(100_000, TICKS_PER_SEC);
        for _ in 0..1_000_000 {
            clock.advance();
        }
        assert_eq!(clock.now, SimTime(100_000 * 1_000_000));
        assert_eq!(clock.steps, 1_000_000);
        assert!((clock.dt_sec - 0.1).abs() < 1e-15);
    }

    #[test]
    fn sync_checkpoint() {
        let mut clock = EngineConfig::default().make_clock().unwrap();
        assert!(!clock.behind_sync());
        assert_eq!(clock.extend_sync(2), SimTime(2 * TICKS_PER_SEC));
        let mut ticks = 0;
        while clock.behind_sync() {
            clock.advance();
            ticks += 1;
        }
        assert_eq!(ticks, 20);
        clock.reset();
        assert_eq!(clock.now, SimTime::ZERO);
        assert_eq!(clock.sync_target, SimTime::ZERO);
    }

    #[test]
    fn arithmetic_saturates_at_end_of_time() {
        assert_eq!(SimTime(u64::MAX - 1) + 5, SimTime::MAX);
        assert_eq!(SimTime::MAX.offset(1), SimTime::MAX);

        let mut clock = EngineConfig::default().make_clock().unwrap();
        assert_eq!(clock.extend_sync(u64::MAX), SimTime::MAX);
        assert_eq!(clock.extend_sync(1), SimTime::MAX);
        assert!(clock.behind_sync());
    }
}

#[cfg(test)]
mod types {
    use crate::{ConfigError, PortType, TypeRegistry};

    #[test]
    fn registry_sizes_and_names() {
        let reg = TypeRegistry::global();
        assert_eq!(reg.size_of(PortType::Real.key()).unwrap(), 8);
        assert_eq!(reg.size_of(PortType::Bool.key()).unwrap(), 1);
        assert_eq!(reg.codename_of(PortType::Real.key()).unwrap(), "reals");
        assert_eq!(reg.name_of(PortType::Time.key()).unwrap(), "long long");
    }

    #[test]
    fn unknown_key_is_config_error() {
        let reg = TypeRegistry::global();
        assert_eq!(reg.size_of(4), Err(ConfigError::UnknownType(4)));
        assert!(matches!(reg.resolve(99), Err(ConfigError::UnknownType(99))));
    }

    #[test]
    fn ordering_follows_keys() {
        let keys: Vec<u32> = TypeRegistry::global().iter().map(|d| d.ty.key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        for (i, ty) in PortType::ALL.iter().enumerate() {
            assert_eq!(ty.ordinal(), i);
            assert_eq!(ty.descriptor().ty, *ty);
        }
    }
}

#[cfg(test)]
mod config {
    use crate::{ConfigError, EngineConfig};

    #[test]
    fn default_step() {
        let clock = EngineConfig::default().make_clock().unwrap();
        assert_eq!(clock.dt, 100_000);
        assert_eq!(clock.sync_step, 1_000_000);
    }

    #[test]
    fn rejects_degenerate_steps() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-9] {
            let err = EngineConfig::with_step(dt).make_clock().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidStep { what: "dt", .. }), "{dt}: {err}");
        }
    }
}

#[cfg(test)]
mod links {
    use crate::{AbsoluteLink, BlockLink, ConfigError, RelativeBlockLink, RelativeLink};

    #[test]
    fn flat_tables_parse_by_stride() {
        let abs = AbsoluteLink::from_flat(&[0, 1, 2, 3]).unwrap();
        assert_eq!(abs, vec![AbsoluteLink { output: 0, input: 1 }, AbsoluteLink { output: 2, input: 3 }]);
        let rel = RelativeLink::from_flat(&[5, 1, 2]).unwrap();
        assert_eq!(rel[0], RelativeLink { type_key: 5, output: 1, input: 2 });
        let blk = BlockLink::from_flat(&[0, 0, 1, 0]).unwrap();
        assert_eq!(blk[0], BlockLink::new(0, 0, 1, 0));
        assert_eq!(RelativeBlockLink::from_flat(&[]).unwrap(), vec![]);
    }

    #[test]
    fn ragged_tables_rejected() {
        assert_eq!(
            BlockLink::from_flat(&[0, 0, 1]),
            Err(ConfigError::MalformedLinkTable { len: 3, stride: 4 })
        );
    }
}
