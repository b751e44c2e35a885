use candle_core::{Result, Tensor};

/// KL divergence loss between the encoder's Gaussian and the standard
/// normal prior
///
/// -0.5 * (1 + log(sigma^2) - mu^2 - sigma^2)
///
/// * `z_mean` - mean of Gaussian distribution
/// * `z_lnvar` - log variance of Gaussian distribution
///
pub fn gaussian_kl_loss(z_mean: &Tensor, z_lnvar: &Tensor) -> Result<Tensor> {
    let z_var = z_lnvar.exp()?;
    (z_var - 1. + z_mean.powf(2.)? - z_lnvar)?.sum(z_mean.rank() - 1)? * 0.5
}

/// Bernoulli log-likelihood of pixel data in `[0, 1]`
///
/// llik(i) = sum_d x(i,d) * log(p(i,d)) + (1 - x(i,d)) * log(1 - p(i,d))
///
/// The small offset keeps the logs finite when the decoder saturates.
///
/// * `x_nd` - data tensor (observed pixels)
/// * `p_nd` - probability tensor (reconstruction means)
///
pub fn bernoulli_likelihood(x_nd: &Tensor, p_nd: &Tensor) -> Result<Tensor> {
    let eps = 1e-10;
    let log_p = (p_nd + eps)?.log()?;
    let log_not_p = (p_nd.affine(-1., 1.)? + eps)?.log()?;
    let not_x_nd = x_nd.affine(-1., 1.)?;

    (x_nd.mul(&log_p)? + not_x_nd.mul(&log_not_p)?)?.sum(x_nd.rank() - 1)
}

/// Gaussian log-likelihood of real-valued data
///
/// llik(i) = -0.5 * sum_d [ x(i,d) - xhat(i,d) ]^2
///
/// * `x_nd` - data tensor (observed data)
/// * `hat_nd` - reconstruction tensor
///
pub fn gaussian_likelihood(x_nd: &Tensor, hat_nd: &Tensor) -> Result<Tensor> {
    x_nd.sub(hat_nd)?.powf(2.)?.sum(x_nd.rank() - 1)? * (-0.5)
}
