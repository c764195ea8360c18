use super::Network;

/// Hidden-layer pre-activations of a single position, built up from the
/// feature biases plus one weight row per active feature.
pub struct Accumulator<'a> {
    vals: &'a mut [f32],
}

impl std::ops::Deref for Accumulator<'_> {
    type Target = [f32];
    fn deref(&self) -> &Self::Target {
        self.vals
    }
}

impl<'a> Accumulator<'a> {
    pub fn load_biases(vals: &'a mut [f32], nnue: &Network) -> Self {
        vals.copy_from_slice(nnue.feature_biases());
        Self { vals }
    }

    pub fn add_feature(&mut self, feature_idx: usize, nnue: &Network) {
        for (i, d) in self.vals.iter_mut().zip(nnue.feature_weights_row(feature_idx)) {
            *i += *d;
        }
    }
}
