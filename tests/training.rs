use std::fs;
use std::path::PathBuf;

use gridq::learning::policy::greedy_action;
use gridq::{
    Config, Coordinate, Error, JsonFileStorage, Settings, Storage, TrainParams, Trainer,
};
use itertools::iproduct;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("gridq-it-{}", std::process::id()))
        .join(name)
}

#[test]
fn test_persisted_table_reproduces_greedy_behavior() {
    let path = temp_path("round-trip/q_table.json");
    let _ = fs::remove_file(&path);

    let mut trainer = Trainer::from_storage(Settings::default(), JsonFileStorage::new(&path))
        .unwrap()
        .with_rng(StdRng::seed_from_u64(11));
    trainer
        .train(TrainParams {
            decay_epsilon: true,
            rounds: Some(300),
        })
        .unwrap();

    let reloaded = Trainer::from_storage(Settings::default(), JsonFileStorage::new(&path)).unwrap();
    assert_eq!(reloaded.q_table(), trainer.q_table());
    for (x, y) in iproduct!(0..10, 0..10) {
        let c = Coordinate::new(x, y);
        assert_eq!(
            greedy_action(&reloaded.q_table().get(c)),
            greedy_action(&trainer.q_table().get(c))
        );
    }
    assert_eq!(reloaded.best_states(), trainer.best_states());
}

#[test]
fn test_full_default_run() {
    let path = temp_path("full-run/q_table.json");
    let _ = fs::remove_file(&path);

    let mut trainer = Trainer::from_storage(Settings::default(), JsonFileStorage::new(&path))
        .unwrap()
        .with_rng(StdRng::seed_from_u64(2024));
    let result = trainer
        .train(TrainParams {
            decay_epsilon: true,
            rounds: None,
        })
        .unwrap();
    assert_eq!(result.states.len(), 2000);
    assert!(path.exists());

    let best = trainer.best_states();
    assert_eq!(best.states.len(), 19);
    let env = trainer.environment();
    assert!(best.states.iter().all(|c| env.contains(*c)));
    let replayed: f64 = best.states.windows(2).map(|w| env.reward(w[0], w[1])).sum();
    assert!((best.rewards - replayed).abs() < 1e-9);
    assert!(result.max_rewards.is_finite());
    assert_ne!(trainer.q_table(), &gridq::QTable::zeros(10));
}

#[test]
fn test_corrupt_storage_fails_at_construction() {
    let path = temp_path("corrupt/q_table.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "not json").unwrap();
    assert!(matches!(
        Trainer::from_storage(Settings::default(), JsonFileStorage::new(&path)),
        Err(Error::MalformedSnapshot(_))
    ));
}

#[test]
fn test_unwritable_storage_surfaces_on_train() {
    // The parent "directory" is a regular file, so the write cannot succeed.
    let blocker = temp_path("blocker");
    fs::create_dir_all(blocker.parent().unwrap()).unwrap();
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("q_table.json");

    let mut trainer = Trainer::new(
        Settings::default(),
        gridq::QTable::zeros(10),
        JsonFileStorage::new(&path),
    )
    .unwrap()
    .with_rng(StdRng::seed_from_u64(5));
    let err = trainer
        .train(TrainParams {
            decay_epsilon: false,
            rounds: Some(3),
        })
        .unwrap_err();
    assert!(matches!(err, Error::StorageWrite { .. }));

    // Learned values survive the failed write and can be saved once the
    // location is usable again.
    assert_ne!(trainer.q_table(), &gridq::QTable::zeros(10));
    fs::remove_file(&blocker).unwrap();
    trainer.persist().unwrap();

    let stored = JsonFileStorage::new(&path).load().unwrap();
    assert_eq!(stored, Some(trainer.q_table().to_snapshot()));
}

#[test]
fn test_config_drives_settings() {
    let config = Config::from_toml_str(
        r#"
        [grid]
        size = 5

        [training]
        rounds = 20
        max_iterations_per_round = 8

        [storage]
        q_table_path = "unused.json"
        "#,
    )
    .unwrap();
    let settings = Settings::from_config(&config).unwrap();
    let mut trainer =
        Trainer::new(settings, gridq::QTable::zeros(5), gridq::MemoryStorage::new()).unwrap();
    let result = trainer
        .train(TrainParams {
            decay_epsilon: false,
            rounds: None,
        })
        .unwrap();
    assert_eq!(result.states.len(), 20);
    assert!(result.states.iter().all(|t| t.len() == 9));
    assert_eq!(trainer.best_states().states.len(), 9);
}

#[test]
fn test_result_json_shape() {
    let mut trainer = Trainer::new(
        Settings::default(),
        gridq::QTable::zeros(10),
        gridq::MemoryStorage::new(),
    )
    .unwrap()
    .with_rng(StdRng::seed_from_u64(1));
    let result = trainer
        .train(TrainParams {
            decay_epsilon: false,
            rounds: Some(2),
        })
        .unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert!(json["maxRewards"].is_f64());
    assert_eq!(json["states"].as_array().unwrap().len(), 2);
    assert_eq!(json["states"][0][0], serde_json::json!([0, 0]));

    let best: serde_json::Value = serde_json::to_value(trainer.best_states()).unwrap();
    assert!(best["rewards"].is_f64());
    assert_eq!(best["states"].as_array().unwrap().len(), 19);
}
