use crate::{
    inputs::Features,
    network::{Activation, ForwardPass, Network},
};

/// Batch-mean gradients of every parameter, in the network's own layout.
///
/// The output error is taken as `a2 - target` directly, without the slope
/// of the output sigmoid. Rows of `W1` for features absent from the whole
/// batch are left at zero.
pub fn gradients(
    inputs: &[Features],
    targets: &[f32],
    nnue: &Network,
    fwd: &ForwardPass,
    activation: Activation,
) -> Box<Network> {
    let batch_size = inputs.len();
    let hidden = nnue.hidden();

    assert_eq!(batch_size, targets.len());
    assert_eq!(batch_size, fwd.batch_size());

    let mut grad = Network::new(hidden);

    if batch_size == 0 {
        return grad;
    }

    let mut output_weights = vec![0.0; hidden];
    let mut output_bias = 0.0;
    let mut feature_biases = vec![0.0; hidden];
    let mut errors = vec![0.0; hidden];

    for (i, features) in inputs.iter().enumerate() {
        let err = fwd.a2[i] - targets[i];
        output_bias += err;

        let z1 = &fwd.z1[i * hidden..(i + 1) * hidden];
        let a1 = &fwd.a1[i * hidden..(i + 1) * hidden];

        for j in 0..hidden {
            output_weights[j] += err * a1[j];
            errors[j] = err * nnue.output_weights_slice()[j] * activation.prime(z1[j]);
            feature_biases[j] += errors[j];
        }

        for &feat in features {
            for (g, &e) in grad.feature_weights_row_mut(feat).iter_mut().zip(&errors) {
                *g += e;
            }
        }
    }

    let m = batch_size as f32;

    for g in grad.feature_weights_mut() {
        *g /= m;
    }

    for (g, sum) in grad.feature_biases_mut().iter_mut().zip(feature_biases) {
        *g = sum / m;
    }

    for (g, sum) in grad.output_weights_mut().iter_mut().zip(output_weights) {
        *g = sum / m;
    }

    *grad.output_bias_mut() = output_bias / m;

    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng::Rand, INPUT_SIZE};

    const SCALE: f32 = 2.0;
    const HIDDEN: usize = 4;

    fn features(idxs: &[usize]) -> Features {
        let mut feats = Features::default();
        for &idx in idxs {
            feats.push(idx);
        }
        feats
    }

    /// Cross-entropy scaled by the sigmoid's divisor, whose derivative with
    /// respect to `z2` is exactly `a2 - target`.
    fn surrogate_loss(nnue: &Network, inputs: &[Features], targets: &[f32], activation: Activation) -> f64 {
        let fwd = nnue.forward(inputs, activation, SCALE);
        let total = fwd
            .z2
            .iter()
            .zip(targets)
            .map(|(&z, &y)| {
                let (z, y) = (f64::from(z), f64::from(y));
                let a = 1.0 / (1.0 + (-z / f64::from(SCALE)).exp());
                -f64::from(SCALE) * (y * a.ln() + (1.0 - y) * (1.0 - a).ln())
            })
            .sum::<f64>();
        total / inputs.len() as f64
    }

    /// Hidden pre-activations are kept well inside (0, 1) so that no
    /// activation kink sits within the finite-difference step.
    fn test_net() -> Box<Network> {
        let mut rand = Rand::new(42);
        let mut nnue = Network::new(HIDDEN);
        rand.fill(nnue.feature_weights_mut(), 0.05);
        rand.fill(nnue.output_weights_mut(), 0.5);
        for b in nnue.feature_biases_mut() {
            *b = 0.4;
        }
        *nnue.output_bias_mut() = 0.1;
        nnue
    }

    #[test]
    fn gradients_match_finite_differences() {
        let inputs = [features(&[3, 100, 700]), features(&[100, 450]), features(&[3, 767])];
        let targets = [0.2, 0.9, 0.6];
        let untouched = 200;

        for activation in [Activation::ReLU, Activation::CReLU, Activation::SReLU, Activation::SCReLU] {
            let nnue = test_net();
            let fwd = nnue.forward(&inputs, activation, SCALE);
            let grad = gradients(&inputs, &targets, &nnue, &fwd, activation);

            let hidden_offset = INPUT_SIZE * HIDDEN;
            let mut checked = vec![
                3 * HIDDEN,
                100 * HIDDEN + 1,
                767 * HIDDEN + 3,
                untouched * HIDDEN + 2,
                hidden_offset,
                hidden_offset + 3,
                hidden_offset + HIDDEN,
                hidden_offset + HIDDEN + 2,
            ];
            checked.push(Network::size_for(HIDDEN) - 1);

            for idx in checked {
                let eps = 1e-2;
                let mut plus = nnue.clone();
                plus[idx] += eps;
                let mut minus = nnue.clone();
                minus[idx] -= eps;

                let numeric = (surrogate_loss(&plus, &inputs, &targets, activation)
                    - surrogate_loss(&minus, &inputs, &targets, activation))
                    / (2.0 * f64::from(eps));

                let analytic = f64::from(grad[idx]);
                let tolerance = 1e-3 + 0.02 * analytic.abs();
                assert!(
                    (numeric - analytic).abs() < tolerance,
                    "{activation} param {idx}: numeric {numeric} analytic {analytic}"
                );
            }
        }
    }

    #[test]
    fn untouched_rows_get_zero_gradient() {
        let inputs = [features(&[1, 2]), features(&[2, 3])];
        let nnue = test_net();
        let fwd = nnue.forward(&inputs, Activation::ReLU, SCALE);
        let grad = gradients(&inputs, &[0.0, 1.0], &nnue, &fwd, Activation::ReLU);

        for feat in 0..INPUT_SIZE {
            let row = grad.feature_weights_row(feat);
            if [1, 2, 3].contains(&feat) {
                assert!(row.iter().any(|&g| g != 0.0));
            } else {
                assert!(row.iter().all(|&g| g == 0.0));
            }
        }
    }

    #[test]
    fn gradients_are_batch_means() {
        let single = [features(&[10])];
        let doubled = [features(&[10]), features(&[10])];
        let nnue = test_net();

        let fwd1 = nnue.forward(&single, Activation::ReLU, SCALE);
        let fwd2 = nnue.forward(&doubled, Activation::ReLU, SCALE);
        let g1 = gradients(&single, &[0.3], &nnue, &fwd1, Activation::ReLU);
        let g2 = gradients(&doubled, &[0.3, 0.3], &nnue, &fwd2, Activation::ReLU);

        for (a, b) in g1.iter().zip(g2.iter()) {
            assert!((a - b).abs() < 1e-6);
        }

        assert!((g1.output_bias() - (fwd1.a2[0] - 0.3)).abs() < 1e-7);
    }
}
