use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use clap::Args;
use log::info;
use rand::prelude::*;
use std::path::PathBuf;

use crate::images::save_digit_image;
use crate::latent;
use crate::mnist_data::{load_mnist, DigitData, N_CLASSES, N_PIXELS};
use crate::model_traits::{DecoderModuleT, EncoderModuleT};

use super::{build_model, select_device};

#[derive(Args, Debug)]
pub struct InterpolateArgs {
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
        help = "Trained weight file (safetensors)"
    )]
    pub weights: PathBuf,

    #[arg(
        long,
        help = "Source digit class (0-9)",
        long_help = "Source digit class (0-9).\n\
		     When omitted, all ten classes are swept, each paired\n\
		     with a randomly chosen different class."
    )]
    pub from: Option<u8>,

    #[arg(
        long,
        help = "Target digit class (0-9)",
        long_help = "Target digit class (0-9).\n\
		     Picked at random among the other classes when omitted."
    )]
    pub to: Option<u8>,

    #[arg(long, default_value_t = 9, help = "Points on the latent path")]
    pub steps: usize,

    #[arg(
        short,
        long,
        default_value = "interpolations",
        help = "Output directory for JPEG frames"
    )]
    pub out: PathBuf,

    #[arg(long, default_value_t = 20, help = "Latent dimensionality of the trained model")]
    pub latent_dim: usize,

    #[arg(
        long,
        value_delimiter(','),
        default_value = "500,500",
        help = "Hidden layer widths of the trained model (comma-separated)"
    )]
    pub hidden: Vec<usize>,

    #[arg(long, help = "Use the GPU when available")]
    pub gpu: bool,
}

pub fn run(args: &InterpolateArgs) -> Result<()> {
    anyhow::ensure!(args.steps >= 2, "need at least two interpolation steps");

    let device = select_device(args.gpu);
    info!("Using device: {:?}", device);

    let dataset = load_mnist(&args.data_dir)?;
    let test = &dataset.test;

    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let (encoder, decoder) = build_model(args.latent_dim, &args.hidden, vb)?;
    varmap.load(&args.weights)?;
    info!("Loaded weights from {:?}", args.weights);

    std::fs::create_dir_all(&args.out)?;

    let mut rng = rand::rng();

    let pairs: Vec<(u8, u8)> = match (args.from, args.to) {
        (Some(a), Some(b)) => vec![(a, b)],
        (Some(a), None) => vec![(a, random_partner(a, &mut rng))],
        (None, _) => (0..N_CLASSES)
            .map(|a| (a, random_partner(a, &mut rng)))
            .collect(),
    };

    for (a, b) in pairs {
        let x_a = pick_class_image(test, a, &mut rng, &device)?;
        let x_b = pick_class_image(test, b, &mut rng, &device)?;

        // posterior means anchor the path
        let (z_a, _) = encoder.latent_params(&x_a)?;
        let (z_b, _) = encoder.latent_params(&x_b)?;

        let path_sk = latent::interpolate(&z_a, &z_b, args.steps)?;
        let frames_sd = decoder.forward(&path_sk)?;

        for (j, row) in frames_sd.to_vec2::<f32>()?.iter().enumerate() {
            let file = args.out.join(format!("digit{}to{}_step{:02}.jpg", a, b, j));
            save_digit_image(row, &file)?;
        }
        info!("Wrote {} frames for {} -> {}", args.steps, a, b);
    }

    Ok(())
}

/// Uniform draw among the other digit classes
fn random_partner<R: Rng>(digit: u8, rng: &mut R) -> u8 {
    let others = (0..N_CLASSES).filter(|&d| d != digit).collect::<Vec<_>>();
    others[rng.random_range(0..others.len())]
}

/// One random test image with the requested label, as a (1 x d) tensor
fn pick_class_image<R: Rng>(
    data: &DigitData,
    digit: u8,
    rng: &mut R,
    device: &Device,
) -> Result<Tensor> {
    let indexes = data.indexes_of(digit);
    anyhow::ensure!(!indexes.is_empty(), "no test image labelled {}", digit);

    let row = data.images.row(indexes[rng.random_range(0..indexes.len())]);

    Ok(Tensor::from_iter(row.iter().copied(), &Device::Cpu)?
        .reshape((1, N_PIXELS))?
        .to_device(device)?)
}
