//! On-disk formats: saved estimators and training results

use tdnav::{
    adapters::{Scene, SceneConfig},
    pipeline::{
        BatchSummary, EpisodeConfig, EpisodeLog, EpisodeOutcome, EpisodeRecord, TrainingResult,
    },
    ports::FeatureSource,
    td::{EstimatorConfig, SavedEstimator, TrainingMetadata, ValueEstimator},
    types::Position,
};
use tempfile::tempdir;

#[test]
fn test_saved_estimator_file_roundtrip() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("estimator.msgpack");

    let mut config = SceneConfig::default();
    config.place_cells.n = 9;
    let scene = Scene::build(&config, Some(21)).unwrap();

    let mut estimator = ValueEstimator::new(
        scene.features.dimension(),
        EstimatorConfig::default().with_learning_rate(0.01),
    )
    .unwrap();
    let phi = scene.features.evaluate(Position::new(0.5, 0.5));
    for _ in 0..50 {
        estimator.step(&phi, 0.05);
        estimator.train(1.0, 0.05);
    }

    let metadata = TrainingMetadata {
        episodes_trained: 80,
        batches: 10,
        successes: 12,
        seed: Some(21),
        exploration_ratio: Some(0.2),
    };
    let episode = EpisodeConfig {
        dt: 0.02,
        proximity_radius: Some(0.05),
        ..EpisodeConfig::default()
    };
    SavedEstimator::from_estimator(
        &estimator,
        scene.resolved_config().clone(),
        episode,
        metadata,
    )
    .save_to_file(&path)
    .unwrap();

    let loaded = SavedEstimator::load_from_file(&path).unwrap();
    assert_eq!(loaded.version, SavedEstimator::VERSION);
    assert_eq!(loaded.metadata.successes, 12);
    assert_eq!(loaded.episode, episode);
    assert_eq!(loaded.to_estimator().unwrap().weights(), estimator.weights());

    // the stored scene rebuilds identical receptive fields without a seed
    let rebuilt = Scene::build(&loaded.scene, None).unwrap();
    assert_eq!(rebuilt.features.centres(), scene.features.centres());
    assert_eq!(
        rebuilt.features.evaluate(Position::new(0.3, 0.7)),
        scene.features.evaluate(Position::new(0.3, 0.7))
    );
}

#[test]
fn test_loading_missing_file_fails_with_context() {
    let err = SavedEstimator::load_from_file("/nonexistent/estimator.msgpack").unwrap_err();
    assert!(err.to_string().contains("Failed to open file"));
}

#[test]
fn test_training_result_json_roundtrip() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("result.json");

    let mut log = EpisodeLog::new();
    for (episode, (outcome, end_time)) in [
        (EpisodeOutcome::Timeout, 60.0),
        (EpisodeOutcome::Success, 12.0),
    ]
    .into_iter()
    .enumerate()
    {
        log.push(EpisodeRecord {
            episode,
            batch: 0,
            outcome,
            ticks: (end_time / 0.05) as usize,
            start_time: 0.0,
            end_time,
            start_position: Position::new(0.2, 0.2),
            end_position: Position::new(0.5, 0.5),
            exploration_ratio: 0.1,
        });
    }
    let batches = vec![BatchSummary {
        batch: 0,
        episodes: 2,
        successes: 1,
        mean_duration: 36.0,
        exploration_ratio: 0.11,
        max_reference: 0.0,
    }];
    let result = TrainingResult::new(&log, batches, 0.11);
    assert_eq!(result.timeouts, 1);
    assert!((result.success_rate - 0.5).abs() < 1e-12);
    assert!((result.mean_duration - 36.0).abs() < 1e-12);

    result.save(&path).unwrap();
    let loaded = TrainingResult::load(&path).unwrap();
    assert_eq!(loaded.total_episodes, 2);
    assert_eq!(loaded.batches, result.batches);
}
