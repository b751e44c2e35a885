use anyhow::Result;
use candle_core::DType;
use candle_nn::{VarBuilder, VarMap};
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::images::save_digit_image;
use crate::latent::sample_prior;
use crate::model_traits::DecoderModuleT;

use super::{build_model, select_device};

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[arg(
        short,
        long,
        default_value = "vae.safetensors",
        help = "Trained weight file (safetensors)"
    )]
    pub weights: PathBuf,

    #[arg(short, long, default_value_t = 10, help = "Number of prior draws")]
    pub num_samples: usize,

    #[arg(
        short,
        long,
        default_value = "samples",
        help = "Output directory for JPEG images"
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

pub fn run(args: &SampleArgs) -> Result<()> {
    let device = select_device(args.gpu);
    info!("Using device: {:?}", device);

    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let (_, decoder) = build_model(args.latent_dim, &args.hidden, vb)?;
    varmap.load(&args.weights)?;
    info!("Loaded weights from {:?}", args.weights);

    std::fs::create_dir_all(&args.out)?;

    let z_nk = sample_prior(args.num_samples, args.latent_dim, &device)?;
    let frames_nd = decoder.forward(&z_nk)?;

    for (i, row) in frames_nd.to_vec2::<f32>()?.iter().enumerate() {
        save_digit_image(row, &args.out.join(format!("sample_{:02}.jpg", i)))?;
    }
    info!("Wrote {} samples to {:?}", args.num_samples, args.out);

    Ok(())
}
