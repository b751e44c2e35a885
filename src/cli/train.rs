use anyhow::Result;
use candle_core::{DType, Tensor};
use candle_nn::{VarBuilder, VarMap};
use clap::{Args, ValueEnum};
use log::info;
use std::path::PathBuf;

use crate::data_loader::InMemoryData;
use crate::inference::TrainConfig;
use crate::loss_functions::{bernoulli_likelihood, gaussian_likelihood};
use crate::mnist_data::{load_mnist, N_PIXELS};
use crate::vae_inference::{Vae, VaeT};

use super::{build_model, select_device};

#[derive(Clone, Debug, ValueEnum)]
pub enum LikelihoodType {
    /// Bernoulli pixel model: x ~ Bern(dec(z))
    Bernoulli,
    /// Gaussian pixel model: x ~ N(dec(z), 1)
    Gaussian,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(
        long,
        default_value = "data/mnist",
        help = "Digit dataset directory",
        long_help = "Directory holding the digit dataset archives.\n\
		     Missing archives are downloaded on first use."
    )]
    pub data_dir: PathBuf,

    #[arg(
        short,
        long,
        default_value = "vae.safetensors",
        help = "Output weight file (safetensors)"
    )]
    pub out: PathBuf,

    #[arg(long, default_value_t = 20, help = "Latent dimensionality")]
    pub latent_dim: usize,

    #[arg(
        long,
        value_delimiter(','),
        default_value = "500,500",
        help = "Encoder hidden layer widths (comma-separated)",
        long_help = "Encoder hidden layer widths (comma-separated).\n\
		     The decoder mirrors the stack in reverse order.\n\
		     Example: 500,500"
    )]
    pub hidden: Vec<usize>,

    #[arg(long, default_value_t = 55, help = "Training epochs")]
    pub epochs: usize,

    #[arg(long, default_value_t = 100, help = "Minibatch size")]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1e-3, help = "Learning rate")]
    pub lr: f32,

    #[arg(short, long, default_value = "bernoulli", help = "Reconstruction model")]
    pub likelihood: LikelihoodType,

    #[arg(long, help = "Use the GPU when available")]
    pub gpu: bool,

    #[arg(short, long, help = "Log the loss after every epoch")]
    pub verbose: bool,
}

pub fn run(args: &TrainArgs) -> Result<()> {
    let device = select_device(args.gpu);
    info!("Using device: {:?}", device);

    let dataset = load_mnist(&args.data_dir)?;
    info!(
        "Training set: {} x {}",
        dataset.train.num_samples(),
        N_PIXELS
    );

    let mut data = InMemoryData::new(&dataset.train.images)?;

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

    let (encoder, decoder) = build_model(args.latent_dim, &args.hidden, vb)?;
    let mut vae = Vae::build(&encoder, &decoder, &varmap);

    let train_config = TrainConfig {
        learning_rate: args.lr,
        batch_size: args.batch_size,
        num_epochs: args.epochs,
        device,
        verbose: args.verbose,
        show_progress: true,
    };

    info!(
        "Model: {} -> {:?} -> {} ({:?} reconstruction)",
        N_PIXELS, args.hidden, args.latent_dim, args.likelihood
    );

    let llik: fn(&Tensor, &Tensor) -> candle_core::Result<Tensor> = match args.likelihood {
        LikelihoodType::Bernoulli => bernoulli_likelihood,
        LikelihoodType::Gaussian => gaussian_likelihood,
    };

    let loss_trace = vae.train_encoder_decoder(&mut data, &llik, &train_config)?;

    if let Some(last) = loss_trace.last() {
        info!("Final negative ELBO: {:.4}", last);
    }

    varmap.save(&args.out)?;
    info!("Saved weights to {:?}", args.out);

    Ok(())
}
