use approx::assert_relative_eq;
use candle_core::{DType, Device, Tensor};
use ndarray::Array2;

use digit_vae::data_loader::{DataLoader, InMemoryData};
use digit_vae::images::{rgb_bytes, save_digit_image};
use digit_vae::inference::TrainConfig;
use digit_vae::latent::{interpolate, sample_prior};
use digit_vae::loss_functions::bernoulli_likelihood;
use digit_vae::vae_inference::{Vae, VaeT};
use digit_vae::cli::train::LikelihoodType;

fn toy_matrix(n: usize, d: usize) -> Array2<f32> {
    Array2::from_shape_fn((n, d), |(i, j)| ((i * d + j) % 7) as f32 / 7.)
}

#[test]
fn loader_requires_shuffling_first() -> anyhow::Result<()> {
    let data = InMemoryData::new(&toy_matrix(10, 4))?;
    assert_eq!(data.num_rows(), 10);
    assert_eq!(data.num_minibatch(), 0);
    assert!(data.minibatch_data(0, &Device::Cpu).is_err());
    Ok(())
}

#[test]
fn loader_drops_trailing_partial_minibatch() -> anyhow::Result<()> {
    let mut data = InMemoryData::new(&toy_matrix(10, 4))?;
    data.shuffle_minibatch(3)?;

    assert_eq!(data.num_minibatch(), 3);
    for b in 0..data.num_minibatch() {
        let minibatch = data.minibatch_data(b, &Device::Cpu)?;
        assert_eq!(minibatch.input.dims(), &[3, 4]);
    }
    assert!(data.minibatch_data(3, &Device::Cpu).is_err());
    Ok(())
}

#[test]
fn loader_accepts_tensor_rows() -> anyhow::Result<()> {
    let x = Tensor::rand(0f32, 1f32, (6, 5), &Device::Cpu)?;
    let mut data = InMemoryData::new(&x)?;
    data.shuffle_minibatch(2)?;

    assert_eq!(data.num_minibatch(), 3);
    assert_eq!(data.minibatch_data(1, &Device::Cpu)?.input.dims(), &[2, 5]);
    Ok(())
}

#[test]
fn training_reduces_reconstruction_loss_trace() -> anyhow::Result<()> {
    let device = Device::Cpu;
    let mut data = InMemoryData::new(&toy_matrix(32, 8))?;

    let varmap = candle_nn::VarMap::new();
    let vb = candle_nn::VarBuilder::from_varmap(&varmap, DType::F32, &device);

    let encoder = digit_vae::encoder::GaussianEncoder::new(8, 2, &[16], vb.pp("enc"))?;
    let decoder = digit_vae::decoder::BernoulliDecoder::new(8, 2, &[16], vb.pp("dec"))?;
    let mut vae = Vae::build(&encoder, &decoder, &varmap);

    let train_config = TrainConfig {
        learning_rate: 1e-3,
        batch_size: 8,
        num_epochs: 3,
        device,
        verbose: false,
        show_progress: false,
    };

    let trace = vae.train_encoder_decoder(&mut data, &bernoulli_likelihood, &train_config)?;

    assert_eq!(trace.len(), 3);
    assert!(trace.iter().all(|v| v.is_finite()));
    Ok(())
}

#[test]
fn interpolation_path_hits_both_endpoints() -> anyhow::Result<()> {
    let z_a = Tensor::from_slice(&[0f32, 1., -2., 4.], (1, 4), &Device::Cpu)?;
    let z_b = Tensor::from_slice(&[2f32, -1., 0., 0.], (1, 4), &Device::Cpu)?;

    let path = interpolate(&z_a, &z_b, 5)?;
    assert_eq!(path.dims(), &[5, 4]);

    let rows = path.to_vec2::<f32>()?;
    let a = z_a.to_vec2::<f32>()?;
    let b = z_b.to_vec2::<f32>()?;

    for (got, want) in rows[0].iter().zip(a[0].iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-6);
    }
    for (got, want) in rows[4].iter().zip(b[0].iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-6);
    }
    // midpoint is the average of the endpoints
    for ((got, lo), hi) in rows[2].iter().zip(a[0].iter()).zip(b[0].iter()) {
        assert_relative_eq!(*got, (lo + hi) / 2., epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn single_step_path_is_the_source() -> anyhow::Result<()> {
    let z_a = Tensor::from_slice(&[1f32, 2.], (1, 2), &Device::Cpu)?;
    let z_b = Tensor::from_slice(&[-1f32, 0.], (1, 2), &Device::Cpu)?;

    let path = interpolate(&z_a, &z_b, 1)?;
    assert_eq!(path.to_vec2::<f32>()?, z_a.to_vec2::<f32>()?);
    Ok(())
}

#[test]
fn prior_draws_have_requested_shape() -> anyhow::Result<()> {
    let z = sample_prior(12, 20, &Device::Cpu)?;
    assert_eq!(z.dims(), &[12, 20]);
    Ok(())
}

#[test]
fn grayscale_rows_triplicate_to_rgb() {
    let bytes = rgb_bytes(&[0., 0.5, 1., 2., -1.]);
    assert_eq!(bytes.len(), 15);
    assert_eq!(&bytes[0..3], &[0, 0, 0]);
    assert_eq!(&bytes[3..6], &[127, 127, 127]);
    assert_eq!(&bytes[6..9], &[255, 255, 255]);
    // out-of-range values are clamped
    assert_eq!(&bytes[9..12], &[255, 255, 255]);
    assert_eq!(&bytes[12..15], &[0, 0, 0]);
}

#[test]
fn decoded_rows_round_trip_through_jpeg() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("digit.jpg");

    let pixels = (0..784).map(|i| (i % 255) as f32 / 255.).collect::<Vec<_>>();
    save_digit_image(&pixels, &path)?;

    let img = image::open(&path)?;
    assert_eq!(img.width(), 28);
    assert_eq!(img.height(), 28);
    Ok(())
}

#[test]
fn wrong_pixel_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.jpg");
    assert!(save_digit_image(&[0.5; 100], &path).is_err());
}

#[test]
fn likelihood_choices_parse_from_cli_names() {
    use clap::ValueEnum;
    assert!(LikelihoodType::from_str("bernoulli", true).is_ok());
    assert!(LikelihoodType::from_str("gaussian", true).is_ok());
    assert!(LikelihoodType::from_str("poisson", true).is_err());
}
