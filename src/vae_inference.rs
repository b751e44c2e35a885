use crate::data_loader::*;
use crate::inference::TrainConfig;
use crate::model_traits::{DecoderModuleT, EncoderModuleT};

use candle_core::{Result, Tensor};
use candle_nn::AdamW;
use candle_nn::Optimizer;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;

pub struct Vae<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    pub encoder: &'a Enc,
    pub decoder: &'a Dec,
    pub variable_map: &'a candle_nn::VarMap,
}

pub trait VaeT<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    /// Train the VAE model by stochastic gradient descent on the
    /// negative evidence lower bound, `mean(kl - llik)`
    ///
    /// * `data` - data loader should have `minibatch_data`
    /// * `llik` - log likelihood function
    /// * `train_config` - training configuration
    ///
    /// Returns the per-epoch average negative ELBO trace.
    fn train_encoder_decoder<DataL, LlikFn>(
        &mut self,
        data: &mut DataL,
        llik: &LlikFn,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader,
        LlikFn: Fn(&Tensor, &Tensor) -> Result<Tensor>;

    /// Build a VAE model
    /// * `encoder` - encoder module
    /// * `decoder` - decoder module
    fn build(encoder: &'a Enc, decoder: &'a Dec, variable_map: &'a candle_nn::VarMap) -> Self;
}

impl<'a, Enc, Dec> VaeT<'a, Enc, Dec> for Vae<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    fn train_encoder_decoder<DataL, LlikFn>(
        &mut self,
        data: &mut DataL,
        llik_func: &LlikFn,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader,
        LlikFn: Fn(&Tensor, &Tensor) -> Result<Tensor>,
    {
        let device = &train_config.device;
        let mut adam = AdamW::new_lr(
            self.variable_map.all_vars(),
            train_config.learning_rate.into(),
        )?;

        let pb = ProgressBar::new(train_config.num_epochs as u64);

        if !train_config.show_progress || train_config.verbose {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let mut loss_trace = vec![];

        data.shuffle_minibatch(train_config.batch_size)?;

        let num_minibatches = data.num_minibatch();

        let minibatch_vec = (0..num_minibatches)
            .map(|b| {
                data.minibatch_data(b, device)
                    .unwrap_or_else(|_| panic!("failed to preload minibatch #{}", b))
            })
            .collect::<Vec<_>>();

        for _epoch in 0..train_config.num_epochs {
            let mut loss_tot = 0f32;

            for minibatch_data in minibatch_vec.iter() {
                let x_nd = &minibatch_data.input;

                let (z_nk, kl) = self.encoder.forward_t(x_nd, true)?;
                let (_, llik) = self.decoder.forward_with_llik(&z_nk, x_nd, llik_func)?;

                let loss = (kl - &llik)?.mean_all()?;
                adam.backward_step(&loss)?;
                loss_tot += loss.to_scalar::<f32>()?;
            }
            loss_trace.push(loss_tot / num_minibatches as f32);
            pb.inc(1);

            if train_config.verbose {
                info!(
                    "[{}] negative ELBO: {}",
                    _epoch + 1,
                    loss_trace.last().ok_or(anyhow::anyhow!("loss"))?
                );
            }
        } // each epoch

        pb.finish_and_clear();
        Ok(loss_trace)
    }

    fn build(encoder: &'a Enc, decoder: &'a Dec, variable_map: &'a candle_nn::VarMap) -> Self {
        assert_eq!(encoder.dim_latent(), decoder.dim_latent());
        assert_eq!(encoder.dim_obs(), decoder.dim_obs());

        Self {
            encoder,
            decoder,
            variable_map,
        }
    }
}
