mod common;

use common::{dataset_lines, record, sorted_lines, write_lines, BOARDS};
use nnue_trainer::{
    checkpoint::read_bin, rng::Rand, run, train, Adam, Batch, Checkpoint, Chess768, Error, Network, OptimiserType,
    TextDataLoader, Trainer, TrainingSettings,
};

fn settings(dir: &std::path::Path, data: Vec<std::path::PathBuf>) -> TrainingSettings {
    TrainingSettings {
        data_files: data,
        output_directory: dir.join("nets"),
        hidden_size: 8,
        batch_size: 2,
        epochs: 2,
        loss_rate: 1,
        report_rate: 1,
        seed: Some(1),
        binary_export: true,
        ..Default::default()
    }
}

#[test]
fn single_step_reduces_batch_loss() {
    let settings = TrainingSettings {
        hidden_size: 8,
        eval_scale: 1.0,
        learning_rate: 0.001,
        ..Default::default()
    };

    let network = Network::random(8, &mut Rand::new(3));
    let mut trainer = Trainer::<Adam>::with_network(settings, network).unwrap();

    let mut batch = Batch::default();
    for (board, target) in BOARDS.iter().zip([0.2, 0.5, 0.7, 0.9]) {
        batch.push(Chess768::encode(board).unwrap(), target);
    }

    let before = trainer.train_on_batch(&batch);
    let after = trainer.network().forward(batch.inputs(), trainer.settings().activation, 1.0).loss(batch.targets());

    assert!(after < before, "loss went from {before} to {after}");
    assert_eq!(trainer.step(), 1);
}

#[test]
fn run_writes_checkpoints_every_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_lines(&dir.path().join("data.txt"), &dataset_lines());
    let before = sorted_lines(&data);

    let summary = train(settings(dir.path(), vec![data.clone()])).unwrap();

    assert_eq!(summary.epochs, 2);
    assert_eq!(summary.steps, 6);
    assert!(summary.min_dataset_loss.is_some());

    let nets = dir.path().join("nets");
    for epoch in 0..=2 {
        assert!(nets.join(format!("weights_relu_8_5_{epoch}.js")).exists());
        assert!(nets.join(format!("weights_relu_8_5_{epoch}.bin")).exists());
    }

    assert_eq!(summary.last_checkpoint, nets.join("weights_relu_8_5_2.js"));

    let last = Checkpoint::load(&summary.last_checkpoint).unwrap();
    assert_eq!(last.meta.epoch, 2);
    assert_eq!(last.meta.num_batches, 3);
    assert_eq!(last.meta.positions(), 6);
    assert_eq!(last.meta.optimiser, OptimiserType::Adam);
    assert_eq!(last.meta.loss, summary.final_loss);
    assert!(summary.min_dataset_loss.unwrap() <= last.meta.loss);

    let bin = read_bin(&nets.join("weights_relu_8_5_2.bin")).unwrap();
    assert_eq!(bin, last.network);

    let initial = Checkpoint::load(&nets.join("weights_relu_8_5_0.js")).unwrap();
    assert_eq!(initial.meta.loss, 0.0);
    assert_ne!(initial.network, last.network);

    assert_eq!(sorted_lines(&data), before);
}

#[test]
fn adamw_run_is_reproducible_with_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_lines(&dir.path().join("data.txt"), &dataset_lines());

    let make = |suffix: &str| TrainingSettings {
        optimiser: OptimiserType::AdamW,
        shuffle: false,
        epochs: 1,
        id_suffix: suffix.to_string(),
        binary_export: false,
        ..settings(dir.path(), vec![data.clone()])
    };

    let a = train(make("a")).unwrap();
    let b = train(make("b")).unwrap();

    let a = Checkpoint::load(&a.last_checkpoint).unwrap();
    let b = Checkpoint::load(&b.last_checkpoint).unwrap();
    assert_eq!(a.meta.optimiser, OptimiserType::AdamW);
    assert_eq!(a.network, b.network);
    assert_eq!(a.meta.loss, b.meta.loss);
}

#[test]
fn dataset_smaller_than_a_batch_trains_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_lines(&dir.path().join("tiny.txt"), &[record(BOARDS[1], 0, 0.5)]);

    let summary = train(TrainingSettings { epochs: 1, loss_rate: 2, ..settings(dir.path(), vec![data]) }).unwrap();

    assert_eq!(summary.steps, 0);
    assert_eq!(summary.final_loss, 0.0);
    assert_eq!(summary.min_dataset_loss, None);
}

#[test]
fn malformed_record_aborts_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = dataset_lines();
    lines.insert(3, "4k3/8/8/8/8/8/8/4K3 w - - 1 1 35".to_string());
    let data = write_lines(&dir.path().join("data.txt"), &lines);

    let result = train(settings(dir.path(), vec![data]));

    assert!(matches!(result, Err(Error::MalformedRecord { fields: 7, .. })));
    assert!(!dir.path().join("nets").exists());
}

#[test]
fn invalid_board_aborts_unless_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = dataset_lines();
    lines.push(record("4k3/8/8/8/8/8/8/4X3", 0, 0.5));
    let data = write_lines(&dir.path().join("data.txt"), &lines);

    let abort = settings(dir.path(), vec![data.clone()]);
    assert!(matches!(train(abort), Err(Error::InvalidBoard { .. })));

    let skip = TrainingSettings { board_policy: nnue_trainer::BoardPolicy::Skip, ..settings(dir.path(), vec![data]) };
    assert_eq!(train(skip).unwrap().steps, 6);
}

#[test]
fn invalid_settings_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_lines(&dir.path().join("data.txt"), &dataset_lines());

    let result = train(TrainingSettings { batch_size: 0, ..settings(dir.path(), vec![data]) });
    assert!(matches!(result, Err(Error::Settings(_))));
}

#[test]
fn run_rejects_zero_rates_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_lines(&dir.path().join("data.txt"), &dataset_lines());
    let loader = TextDataLoader::new(&[&data]);

    for settings in [
        TrainingSettings { report_rate: 0, ..settings(dir.path(), vec![data.clone()]) },
        TrainingSettings { loss_rate: 0, ..settings(dir.path(), vec![data.clone()]) },
        TrainingSettings { batch_size: 0, ..settings(dir.path(), vec![data.clone()]) },
    ] {
        let mut trainer = Trainer::<Adam>::new(settings);
        assert!(matches!(run(&mut trainer, &loader), Err(Error::Settings(_))));
        assert_eq!(trainer.step(), 0);
    }

    assert!(!dir.path().join("nets").exists());
}

#[test]
fn seeded_run_with_reshuffles_is_reproducible() {
    let run_in = |dir: &std::path::Path| {
        let data = write_lines(&dir.join("data.txt"), &dataset_lines());
        let settings = TrainingSettings { epochs: 3, binary_export: false, ..settings(dir, vec![data.clone()]) };
        assert!(settings.shuffle);

        let summary = train(settings).unwrap();
        let network = Checkpoint::load(&summary.last_checkpoint).unwrap().network;
        (network, std::fs::read_to_string(data).unwrap())
    };

    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let (net_a, data_a) = run_in(a.path());
    let (net_b, data_b) = run_in(b.path());

    assert_eq!(data_a, data_b);
    assert_eq!(net_a, net_b);
}
