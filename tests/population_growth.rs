use cellpop_common::{SimulationConfig, MAX_AXIS_LENGTH, MAX_RADIUS, MIN_RADIUS};
use cellpop_engine::output::{save_final_population, save_snapshots};
use cellpop_engine::{CancelToken, CellPhase, RunOutcome, Simulation};

fn config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.initial_conditions.population_size = 15;
    config.initial_conditions.seed = 3;
    config.timing.run_time = 60.0;
    config.timing.record_increment = 10.0;
    config.timing.output_increment = 20.0;
    config.cell_params.growth_rates = vec![0.05, 0.08];
    config.cell_params.max_deform = 0.2;
    config
}

#[test]
fn population_grows_and_stays_valid() {
    let mut sim = Simulation::new(config()).unwrap();
    assert_eq!(sim.run(&CancelToken::new()).unwrap(), RunOutcome::Completed);

    let population = sim.population();
    assert!(population.size() > 15, "no division in 60 time units: {}", population.size());

    let cells: Vec<_> = population.iter().map(|(_, c)| c).collect();
    for (i, a) in cells.iter().enumerate() {
        assert!(a.radius() >= MIN_RADIUS - 1e-12 && a.radius() <= MAX_RADIUS + 1e-12);
        assert!(a.axis_length() <= MAX_AXIS_LENGTH + 1e-12);
        if a.phase() == CellPhase::Interphase {
            assert!((a.axis_length() - 2.0 * a.radius()).abs() < 1e-12);
        }
        for b in &cells[i + 1..] {
            assert!(!a.overlaps(b));
        }
    }

    // Sizes never shrink between recordings.
    let sizes: Vec<usize> = sim.snapshots().iter().map(|s| s.len()).collect();
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "{:?}", sizes);
}

#[test]
fn end_to_end_writes_outputs() {
    let mut config = config();
    config.timing.run_time = 5.0;
    config.output.base_filename = "e2e".to_string();
    config.output.format = Some("messagepack".to_string());
    let mut sim = Simulation::new(config).unwrap();
    sim.run(&CancelToken::new()).unwrap();

    let dir = std::env::temp_dir().join(format!("cellpop-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let snapshots = save_snapshots(&dir, &sim.config().output, sim.snapshots()).unwrap();
    assert!(snapshots.exists());

    let cells: Vec<_> = sim.population().iter().map(|(_, c)| c.record()).collect();
    let csv = save_final_population(&dir, &sim.config().output, &cells).unwrap();
    let rows = std::fs::read_to_string(csv).unwrap().lines().count();
    assert_eq!(rows, sim.population().size() + 1);
}
