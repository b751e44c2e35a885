pub mod interpolate;
pub mod sample;
pub mod train;

use clap::{Parser, Subcommand};

pub use interpolate::InterpolateArgs;
pub use sample::SampleArgs;
pub use train::{LikelihoodType, TrainArgs};

use crate::decoder::BernoulliDecoder;
use crate::encoder::GaussianEncoder;
use crate::mnist_data::N_PIXELS;
use candle_core::Device;
use candle_nn::VarBuilder;

#[derive(Parser)]
#[command(name = "digit-vae")]
#[command(about = "Variational autoencoder for handwritten digits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the VAE on the digit dataset
    Train(TrainArgs),
    /// Decode the latent path between two digit classes into JPEG frames
    Interpolate(InterpolateArgs),
    /// Decode random draws from the latent prior into JPEG images
    Sample(SampleArgs),
}

pub(crate) fn select_device(gpu: bool) -> Device {
    if gpu {
        #[cfg(target_os = "macos")]
        {
            Device::new_metal(0).unwrap_or(Device::Cpu)
        }
        #[cfg(target_os = "linux")]
        {
            Device::new_cuda(0).unwrap_or(Device::Cpu)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Device::Cpu
        }
    } else {
        Device::Cpu
    }
}

/// Assemble the encoder/decoder pair: the decoder mirrors the encoder's
/// hidden stack in reverse order.
pub(crate) fn build_model(
    latent_dim: usize,
    hidden: &[usize],
    vb: VarBuilder,
) -> candle_core::Result<(GaussianEncoder, BernoulliDecoder)> {
    let encoder = GaussianEncoder::new(N_PIXELS, latent_dim, hidden, vb.clone())?;

    let decoder_layers = hidden.iter().rev().copied().collect::<Vec<_>>();
    let decoder = BernoulliDecoder::new(N_PIXELS, latent_dim, &decoder_layers, vb)?;

    Ok((encoder, decoder))
}
