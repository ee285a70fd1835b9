#[cfg(test)]
mod tests {
    use exclusion_engine::{
        run_simulation, AsymmetricTransition, LatticeState, MetricKind, MetricRegistry, MetricValue,
        Outcome, SimulationConfig, SimulationDriver, SimulationError, StopReason, SymmetricTransition,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // ========== End-to-End Scenario ==========

    #[test]
    fn test_small_ring_keeps_two_particles() {
        for seed in 0..20 {
            let config = SimulationConfig::new(4, 0.5).with_seed(seed);
            let mut state = LatticeState::from_config(&config).unwrap();
            assert_eq!(state.occupied_count(), 2);

            for _ in 0..500 {
                state.process_next_event().unwrap();
                assert_eq!(state.occupied_count(), 2);
                assert!(state.occupied_sites().all(|site| site < 4));
            }
        }
    }

    #[test]
    fn test_event_times_never_decrease() {
        let config = SimulationConfig::new(50, 0.3).with_seed(11);
        let mut state = LatticeState::from_config(&config).unwrap();
        let mut last = state.current_time();
        for _ in 0..5_000 {
            let record = state.process_next_event().unwrap();
            assert!(record.time >= last, "time went back: {} -> {}", last, record.time);
            assert_eq!(record.time, state.current_time());
            last = record.time;
        }
    }

    #[test]
    fn test_queue_stays_coherent_after_every_event() {
        let config = SimulationConfig::new(30, 0.6).with_defect(40.0, 0.5).with_seed(5);
        let mut state = LatticeState::from_config(&config).unwrap();
        state.verify_invariants().unwrap();
        for _ in 0..3_000 {
            state.process_next_event().unwrap();
            state.verify_invariants().unwrap();
            assert_eq!(state.queue().len(), state.occupied_count());
        }
    }

    // ========== Transition Mechanics ==========

    #[test]
    fn test_rejected_jump_rearms_clock_and_keeps_occupancy() {
        // Full ring: every proposal is blocked.
        let mut state = LatticeState::new(
            vec![true; 5],
            vec![1.0; 5],
            SymmetricTransition,
            ChaCha8Rng::seed_from_u64(9),
        )
        .unwrap();

        for _ in 0..200 {
            let before = state.occupied_sites().collect::<Vec<_>>();
            let record = state.process_next_event().unwrap();
            assert_eq!(record.outcome, Outcome::Blocked);
            assert_eq!(state.occupied_sites().collect::<Vec<_>>(), before);
            let rearmed = state.clock_time(record.site).unwrap();
            assert!(rearmed > record.time);
            assert_eq!(state.queue().time_of(record.site), Some(rearmed));
        }
    }

    #[test]
    fn test_move_erases_source_and_arms_destination() {
        let mut state = LatticeState::new(
            vec![true, false, false, false, false, false],
            vec![1.0; 6],
            SymmetricTransition,
            ChaCha8Rng::seed_from_u64(2),
        )
        .unwrap();

        let record = state.process_next_event().unwrap();
        assert_eq!(record.site, 0);
        assert_eq!(record.outcome, Outcome::Moved);
        assert!(record.destination == 1 || record.destination == 5);
        assert!(!state.is_occupied(0));
        assert!(state.is_occupied(record.destination));
        assert_eq!(state.clock_time(0), None);
        assert!(!state.queue().contains(0));
        assert!(state.clock_time(record.destination).unwrap() > record.time);
    }

    #[test]
    fn test_single_site_ring_always_blocks() {
        let mut state = LatticeState::new(
            vec![true],
            vec![1.0],
            SymmetricTransition,
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        for _ in 0..50 {
            let record = state.process_next_event().unwrap();
            assert_eq!(record.destination, 0);
            assert_eq!(record.outcome, Outcome::Blocked);
        }
        assert!(state.is_occupied(0));
    }

    #[test]
    fn test_fully_asymmetric_rule_drifts_right() {
        let config = SimulationConfig::new(8, 0.125).with_seed(4);
        let mut state =
            LatticeState::from_config_with(&config, AsymmetricTransition::new(1.0), ChaCha8Rng::seed_from_u64(4))
                .unwrap();
        let mut site = state.occupied_sites().next().unwrap();
        for _ in 0..20 {
            let record = state.process_next_event().unwrap();
            assert_eq!(record.site, site);
            assert_eq!(record.destination, (site + 1) % 8);
            site = record.destination;
        }
    }

    #[test]
    fn test_defect_rate_lands_on_site_zero() {
        let config = SimulationConfig::new(16, 0.5).with_defect(32.0, 0.5).with_seed(1);
        let state = LatticeState::from_config(&config).unwrap();
        assert_eq!(state.rate(0), Some(8.0));
        assert!((1..16).all(|site| state.rate(site) == Some(1.0)));
    }

    // ========== Driver ==========

    #[test]
    fn test_run_simulation_reaches_stop_time() {
        let config = SimulationConfig::new(20, 0.5).with_max_time(25.0).with_seed(8);
        let mut registry = MetricRegistry::all();
        let summary = run_simulation(&config, &mut [&mut registry]).unwrap();

        assert_eq!(summary.stop, StopReason::ReachedStopTime);
        assert!(summary.final_time >= 25.0);
        assert_eq!(summary.events, summary.moves + summary.rejections);

        let measures = registry.series(MetricKind::EmpiricalMeasure).unwrap();
        // Initial state plus one report per event.
        assert_eq!(measures.len() as u64, summary.events + 1);
        assert_eq!(measures.timestamps[0], 0.0);
        assert!(measures.timestamps.windows(2).all(|w| w[0] <= w[1]));
        match measures.last() {
            Some((MetricValue::EmpiricalMeasure(m), t)) => {
                assert_eq!(t, summary.final_time);
                assert_eq!(m.positions().len(), 10);
                assert!((m.total_mass() - 0.5).abs() < 1e-12);
            }
            other => panic!("unexpected last measure: {:?}", other),
        }
    }

    #[test]
    fn test_identical_seeds_give_identical_runs() {
        let config = SimulationConfig::new(40, 0.25).with_max_time(30.0).with_seed(77);
        let mut a = MetricRegistry::new();
        a.enable(MetricKind::PositionProfile);
        let mut b = a.clone();

        let sa = run_simulation(&config, &mut [&mut a]).unwrap();
        let sb = run_simulation(&config, &mut [&mut b]).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(
            a.series(MetricKind::PositionProfile),
            b.series(MetricKind::PositionProfile)
        );
    }

    #[test]
    fn test_sampled_run_reports_grid_points() {
        let config = SimulationConfig::new(10, 0.4)
            .with_max_time(2.0)
            .with_sample_interval(0.25)
            .with_seed(3);
        let mut registry = MetricRegistry::new();
        registry.enable(MetricKind::PositionProfile);
        let summary = run_simulation(&config, &mut [&mut registry]).unwrap();
        assert_eq!(summary.samples, 8);

        let series = registry.series(MetricKind::PositionProfile).unwrap();
        let on_grid = series
            .timestamps
            .iter()
            .filter(|&&t| {
                let k = (t / 0.25).round();
                k >= 1.0 && t == k * 0.25
            })
            .count();
        assert!(on_grid >= 8);
    }

    #[test]
    fn test_empty_lattice_is_quiescent() {
        let config = SimulationConfig::new(10, 0.0).with_max_time(5.0);
        let summary = run_simulation(&config, &mut []).unwrap();
        assert_eq!(summary.stop, StopReason::Quiescent);
        assert_eq!(summary.events, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        let config = SimulationConfig::new(0, 0.5);
        assert!(matches!(
            run_simulation(&config, &mut []),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let config = SimulationConfig::new(10, 0.5).with_defect(-1.0, 1.0);
        assert!(matches!(
            run_simulation(&config, &mut []),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_driver_can_continue_a_stepped_lattice() {
        let config = SimulationConfig::new(12, 0.5).with_seed(21);
        let mut state = LatticeState::from_config(&config).unwrap();
        for _ in 0..100 {
            state.process_next_event().unwrap();
        }
        let resumed_from = state.current_time();
        let stop = resumed_from + 10.0;
        let summary = SimulationDriver::new(stop).run(&mut state, &mut []).unwrap();
        assert!(summary.final_time >= stop);
        assert_eq!(state.occupied_count(), 6);
    }
}
