use candle_core::{Device, Result, Tensor};

/// Linear blend between two latent codes.
///
/// Step `j` decodes `(1 - t) * z_a + t * z_b` with `t = j / (steps - 1)`,
/// so the endpoints reproduce `z_a` and `z_b` exactly.
///
/// * `z_a` - starting latent code (1 x k)
/// * `z_b` - ending latent code (1 x k)
/// * `steps` - number of points on the path, including both ends
///
/// Returns a (steps x k) tensor of blended codes.
pub fn interpolate(z_a: &Tensor, z_b: &Tensor, steps: usize) -> Result<Tensor> {
    let mut path = Vec::with_capacity(steps);

    for j in 0..steps {
        let t = if steps > 1 {
            j as f64 / (steps - 1) as f64
        } else {
            0.
        };
        path.push(((z_a * (1. - t))? + (z_b * t)?)?);
    }

    Tensor::cat(&path, 0)
}

/// Draw `n` latent codes from the standard normal prior
pub fn sample_prior(n: usize, dim_latent: usize, device: &Device) -> Result<Tensor> {
    Tensor::randn(0f32, 1f32, (n, dim_latent), device)
}
