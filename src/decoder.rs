use crate::aux_layers::{Activation, StackLayers};
use crate::model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::{ops, Linear, Module, VarBuilder};

/// Generator network: latent codes -> per-pixel Bernoulli means.
pub struct BernoulliDecoder {
    n_features: usize,
    n_latent: usize,
    fc: StackLayers<Linear>,
    x_mean: Linear,
}

impl BernoulliDecoder {
    /// Will create a new decoder module with these variables:
    ///
    /// * `nn.dec.fc.{}.weight` where {} is the layer index
    /// * `nn.dec.x.mean.weight`
    ///
    /// # Arguments
    /// * `n_features` - the number of observed features (pixels)
    /// * `n_latent` - latent dimensionality
    /// * `layers` - fully connected layers, each with the dim
    /// * `vs` - variable builder
    pub fn new(
        n_features: usize,
        n_latent: usize,
        layers: &[usize],
        vs: VarBuilder,
    ) -> Result<Self> {
        debug_assert!(!layers.is_empty());

        // (1) latent -> fc
        let mut fc = StackLayers::<Linear>::new();
        let mut prev_dim = n_latent;
        for (j, &next_dim) in layers.iter().enumerate() {
            let _name = format!("nn.dec.fc.{}", j);
            fc.push_with_act(
                candle_nn::linear(prev_dim, next_dim, vs.pp(_name))?,
                Activation::Softplus,
            );
            prev_dim = next_dim;
        }

        // (2) fc -> D
        let x_mean = candle_nn::linear(prev_dim, n_features, vs.pp("nn.dec.x.mean"))?;

        Ok(Self {
            n_features,
            n_latent,
            fc,
            x_mean,
        })
    }
}

impl DecoderModuleT for BernoulliDecoder {
    /// Reconstruction means in (0, 1)
    fn forward(&self, z_nk: &Tensor) -> Result<Tensor> {
        let fc_nl = self.fc.forward(z_nk)?;
        ops::sigmoid(&self.x_mean.forward(&fc_nl)?)
    }

    fn forward_with_llik<LlikFn>(
        &self,
        z_nk: &Tensor,
        x_nd: &Tensor,
        llik: &LlikFn,
    ) -> Result<(Tensor, Tensor)>
    where
        LlikFn: Fn(&Tensor, &Tensor) -> Result<Tensor>,
    {
        let recon_nd = self.forward(z_nk)?;
        let llik_n = llik(x_nd, &recon_nd)?;
        Ok((recon_nd, llik_n))
    }

    fn dim_obs(&self) -> usize {
        self.n_features
    }

    fn dim_latent(&self) -> usize {
        self.n_latent
    }
}
