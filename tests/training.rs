//! Small end-to-end training loops: fit y = 2x + 1 with each optimizer,
//! and carry parameters across a checkpoint round-trip.

use revgrad::{checkpoint, scalar, Adam, Optimizer, RevGradError, Sgd, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct LinearFit {
    x: Value<f64>,
    y: Value<f64>,
    w: Value<f64>,
    b: Value<f64>,
}

impl LinearFit {
    fn new() -> Self {
        let x = Value::new(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
        let y = Value::new(vec![3.0, 5.0, 7.0, 9.0], vec![4]).unwrap();
        let w = scalar(0.0).unwrap();
        let b = scalar(0.0).unwrap();
        w.requires_grad_(true).unwrap();
        b.requires_grad_(true).unwrap();
        LinearFit { x, y, w, b }
    }

    fn params(&self) -> Vec<(String, Value<f64>)> {
        vec![
            ("w".to_string(), self.w.clone()),
            ("b".to_string(), self.b.clone()),
        ]
    }

    /// Mean squared error of `w * x + b` against the targets.
    fn loss(&self) -> Result<Value<f64>, RevGradError> {
        let pred = self.w.mul(&self.x)?.add(&self.b)?;
        pred.sub(&self.y)?.powf(2.0)?.mean()
    }

    fn train(&self, opt: &mut impl Optimizer<f64>, epochs: usize) -> f64 {
        let mut last = f64::INFINITY;
        for _ in 0..epochs {
            opt.zero_grad();
            let loss = self.loss().unwrap();
            last = loss.item().unwrap();
            loss.backward().unwrap();
            opt.step().unwrap();
        }
        last
    }
}

#[test]
fn test_sgd_fits_linear_model() {
    init_logging();
    let model = LinearFit::new();
    let initial = model.loss().unwrap().item().unwrap();

    let mut opt = Sgd::new(model.params(), 0.02).unwrap();
    let final_loss = model.train(&mut opt, 2000);

    assert!(final_loss < initial);
    assert!(final_loss < 0.01, "final loss {final_loss}");
    assert!((model.w.item().unwrap() - 2.0).abs() < 0.1);
    assert!((model.b.item().unwrap() - 1.0).abs() < 0.2);
}

#[test]
fn test_sgd_momentum_fits_linear_model() {
    init_logging();
    let model = LinearFit::new();
    let mut opt = Sgd::with_momentum(model.params(), 0.01, 0.9).unwrap();
    let final_loss = model.train(&mut opt, 2000);
    assert!(final_loss < 0.01, "final loss {final_loss}");
}

#[test]
fn test_adam_fits_linear_model() {
    init_logging();
    let model = LinearFit::new();
    let initial = model.loss().unwrap().item().unwrap();

    let mut opt = Adam::new(model.params(), 0.05).unwrap();
    let final_loss = model.train(&mut opt, 3000);

    assert!(final_loss < initial);
    assert!(final_loss < 0.05, "final loss {final_loss}");
}

#[test]
fn test_checkpoint_restores_training_state() {
    init_logging();
    let path = std::env::temp_dir().join(format!(
        "revgrad-training-checkpoint-{}.json",
        std::process::id()
    ));

    // Train a little, then snapshot.
    let model = LinearFit::new();
    let mut opt = Sgd::new(model.params(), 0.02).unwrap();
    model.train(&mut opt, 200);
    let saved_w = model.w.item().unwrap();
    let saved_loss = model.loss().unwrap().item().unwrap();
    checkpoint::save(&model.params(), &path).unwrap();

    // Clobber the parameters, restore, and verify bit-exact recovery.
    model.w.set_data(vec![123.0]).unwrap();
    model.b.set_data(vec![-7.0]).unwrap();
    checkpoint::load(&model.params(), &path).unwrap();
    assert_eq!(model.w.item().unwrap(), saved_w);
    assert_eq!(model.loss().unwrap().item().unwrap(), saved_loss);

    // Training keeps improving from the restored point.
    let resumed_loss = model.train(&mut opt, 200);
    assert!(resumed_loss < saved_loss);

    std::fs::remove_file(&path).ok();
}
