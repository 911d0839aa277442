//! End-to-end tests of the batched training loop

mod common;

use common::{FixedStart, RampX, RecordingObserver};
use tdnav::{
    Error,
    adapters::{ConstantFeatures, ConstantReward, DriftOnlyMotion, Scene, SceneConfig},
    pipeline::{
        Collaborators, EpisodeConfig, EpisodeLog, MetricsObserver, TrainingConfig, TrainingLoop,
        TrainingState,
    },
    ports::FeatureSource,
    td::{EstimatorConfig, ValueEstimator},
    types::Position,
    utils::build_rng,
};

fn short_episodes() -> EpisodeConfig {
    EpisodeConfig {
        max_t: 2.0,
        ..EpisodeConfig::default()
    }
}

fn small_scene() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.place_cells.n = 25;
    config.environment.sample_dx = 0.05;
    config
}

fn run_scene(seed: u64) -> (EpisodeLog, Vec<f64>) {
    let mut scene = Scene::build(&small_scene(), Some(seed)).unwrap();
    let mut estimator =
        ValueEstimator::new(scene.features.dimension(), EstimatorConfig::default()).unwrap();
    let config = TrainingConfig {
        batches: 2,
        episodes_per_batch: 3,
        seed: Some(seed),
        ..TrainingConfig::default()
    };
    let mut training = TrainingLoop::new(config, short_episodes()).unwrap();
    let mut state = TrainingState::default();
    let mut log = EpisodeLog::new();
    let mut rng = build_rng(Some(seed));
    training
        .run(
            &mut estimator,
            scene.collaborators(),
            &mut state,
            &mut log,
            &mut rng,
        )
        .unwrap();
    (log, estimator.weights().to_vec())
}

#[test]
fn test_same_seed_reproduces_run() {
    let (log_a, weights_a) = run_scene(17);
    let (log_b, weights_b) = run_scene(17);
    assert_eq!(log_a.records(), log_b.records());
    assert_eq!(weights_a, weights_b);
    assert_eq!(log_a.len(), 6);
}

#[test]
fn test_observer_event_order() {
    let environment = FixedStart::new(Position::new(0.5, 0.5));
    let features = ConstantFeatures::new(vec![1.0]);
    let reward = ConstantReward::new(0.0);
    let mut motion = DriftOnlyMotion::new(Position::ZERO, 0.08);
    let collaborators = Collaborators {
        environment: &environment,
        features: &features,
        reward: &reward,
        motion: &mut motion,
    };

    let observer = RecordingObserver::new();
    let config = TrainingConfig {
        batches: 2,
        episodes_per_batch: 2,
        ..TrainingConfig::default()
    };
    let mut training = TrainingLoop::new(config, short_episodes())
        .unwrap()
        .with_observer(Box::new(observer.clone()));

    let mut estimator = ValueEstimator::new(1, EstimatorConfig::default()).unwrap();
    training
        .run(
            &mut estimator,
            collaborators,
            &mut TrainingState::default(),
            &mut EpisodeLog::new(),
            &mut build_rng(Some(1)),
        )
        .unwrap();

    assert_eq!(
        observer.events(),
        vec![
            "start 4",
            "batch 0",
            "episode 0",
            "episode 1",
            "batch end 0",
            "batch 1",
            "episode 2",
            "episode 3",
            "batch end 1",
            "end",
        ]
    );
}

#[test]
fn test_dimension_mismatch_fails_before_first_episode() {
    let environment = FixedStart::new(Position::new(0.5, 0.5));
    let features = ConstantFeatures::new(vec![1.0, 1.0]);
    let reward = ConstantReward::new(0.0);
    let mut motion = DriftOnlyMotion::new(Position::ZERO, 0.08);
    let collaborators = Collaborators {
        environment: &environment,
        features: &features,
        reward: &reward,
        motion: &mut motion,
    };

    let observer = RecordingObserver::new();
    let mut training = TrainingLoop::new(TrainingConfig::default(), short_episodes())
        .unwrap()
        .with_observer(Box::new(observer.clone()));
    let mut estimator = ValueEstimator::new(3, EstimatorConfig::default()).unwrap();
    let mut log = EpisodeLog::new();

    let result = training.run(
        &mut estimator,
        collaborators,
        &mut TrainingState::default(),
        &mut log,
        &mut build_rng(Some(2)),
    );

    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 3,
            got: 2,
            ..
        })
    ));
    assert!(observer.events().is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_rewarded_features_gain_value() {
    let environment = FixedStart::new(Position::new(0.5, 0.5));
    let features = ConstantFeatures::new(vec![1.0, 0.0]);
    let reward = ConstantReward::new(0.2).with_episode_end_time_constant(1e6);
    let mut motion = DriftOnlyMotion::new(Position::ZERO, 0.08);
    let collaborators = Collaborators {
        environment: &environment,
        features: &features,
        reward: &reward,
        motion: &mut motion,
    };

    let config = TrainingConfig {
        batches: 3,
        episodes_per_batch: 2,
        ..TrainingConfig::default()
    };
    let mut metrics = MetricsObserver::new();
    let mut training = TrainingLoop::new(config, short_episodes()).unwrap();
    let mut estimator =
        ValueEstimator::new(2, EstimatorConfig::default().with_learning_rate(0.01)).unwrap();
    let mut log = EpisodeLog::new();
    let result = training
        .run(
            &mut estimator,
            collaborators,
            &mut TrainingState::default(),
            &mut log,
            &mut build_rng(Some(3)),
        )
        .unwrap();

    assert!(estimator.weights()[0] > 0.0);
    assert_eq!(estimator.weights()[1], 0.0);
    // later snapshots see the learned value
    assert!(result.batches[2].max_reference > 0.0);
    assert_eq!(result.batches[0].max_reference, 0.0);

    for record in log.records() {
        tdnav::pipeline::Observer::on_episode_end(&mut metrics, record).unwrap();
    }
    assert_eq!(metrics.summary().total_episodes, result.total_episodes);
}

#[test]
fn test_batch_acts_on_its_start_snapshot() {
    let sample: Vec<Position> = (1..10)
        .map(|i| Position::new(i as f64 / 10.0, 0.5))
        .collect();
    let environment = FixedStart::new(Position::new(0.5, 0.5)).with_sample(sample);
    let reward = ConstantReward::new(0.5).with_episode_end_time_constant(1e9);
    let mut motion = DriftOnlyMotion::new(Position::ZERO, 0.08);

    let config = TrainingConfig {
        batches: 2,
        episodes_per_batch: 2,
        ..TrainingConfig::default()
    };
    let mut training = TrainingLoop::new(config, short_episodes()).unwrap();
    let mut estimator =
        ValueEstimator::new(1, EstimatorConfig::default().with_learning_rate(0.01)).unwrap();
    let mut log = EpisodeLog::new();
    let result = training
        .run(
            &mut estimator,
            Collaborators {
                environment: &environment,
                features: &RampX,
                reward: &reward,
                motion: &mut motion,
            },
            &mut TrainingState::default(),
            &mut log,
            &mut build_rng(Some(4)),
        )
        .unwrap();

    let batch0_ticks: usize = log.batch(0).map(|r| r.ticks).sum();
    let batch1_ticks: usize = log.batch(1).map(|r| r.ticks).sum();
    assert_eq!(motion.ticks(), batch0_ticks + batch1_ticks);

    // the live weights learn during batch 0, but its snapshot is all zeros
    assert_eq!(result.batches[0].max_reference, 0.0);
    assert!(motion.drifts()[..batch0_ticks].iter().all(Option::is_none));

    assert!(result.batches[1].max_reference > 0.0);
    for drift in &motion.drifts()[batch0_ticks..] {
        let drift = drift.expect("batch 1 follows the learned slope");
        assert!(drift.x > 0.0);
        assert!(drift.y.abs() < 1e-9);
    }
}
