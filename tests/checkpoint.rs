use nnue_trainer::{
    checkpoint::read_bin, rng::Rand, Activation, Checkpoint, CheckpointMeta, Error, Network, OptimiserType,
};

fn checkpoint(epoch: usize, seed: u64) -> Checkpoint {
    Checkpoint {
        meta: CheckpointMeta {
            hidden_size: 6,
            learning_rate: 0.001,
            activation: Activation::CReLU,
            eval_scale: 100.0,
            interp: 0.3,
            batch_size: 500,
            num_batches: 40,
            optimiser: OptimiserType::Adam,
            shuffle: false,
            l2_reg: true,
            epoch,
            loss: 0.0451,
        },
        network: Network::random(6, &mut Rand::new(seed)),
    }
}

#[test]
fn saved_checkpoint_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let ckpt = checkpoint(3, 11);

    let path = ckpt.save(&out, "crelu_6_3", true).unwrap();
    assert_eq!(path, out.join("weights_crelu_6_3_3.js"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("//{{{  weights\r\n"));
    assert!(text.contains("const net_positions   = 20000;\r\n"));

    assert_eq!(Checkpoint::load(&path).unwrap(), ckpt);
    assert_eq!(read_bin(&out.join("weights_crelu_6_3_3.bin")).unwrap(), ckpt.network);
}

#[test]
fn saving_the_same_epoch_replaces_the_file() {
    let dir = tempfile::tempdir().unwrap();

    let first = checkpoint(1, 1);
    let second = checkpoint(1, 2);
    first.save(dir.path(), "net", false).unwrap();
    let path = second.save(dir.path(), "net", false).unwrap();

    assert_eq!(Checkpoint::load(&path).unwrap(), second);
    assert!(!dir.path().join("weights_net_1.bin").exists());
}

#[test]
fn loading_garbage_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.js");
    std::fs::write(&path, "const net_h1_size = 4;\r\nnot an assignment\r\n").unwrap();

    assert!(matches!(Checkpoint::load(&path), Err(Error::Checkpoint(_))));
    assert!(matches!(Checkpoint::load(&dir.path().join("missing.js")), Err(Error::Io(_))));
}
