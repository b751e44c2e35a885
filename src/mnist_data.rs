use anyhow::Result;
use mnist::MnistBuilder;
use ndarray::Array2;
use std::path::Path;

/// Width and height of the digit images in pixels.
pub const IMAGE_DIM: usize = 28;

/// Flattened image size (28 * 28).
pub const N_PIXELS: usize = IMAGE_DIM * IMAGE_DIM;

/// Number of digit classes.
pub const N_CLASSES: u8 = 10;

const N_TRAIN: u32 = 60_000;
const N_TEST: u32 = 10_000;

/// One split of the digit dataset: images as rows scaled to `[0, 1]`
/// with the matching digit labels.
pub struct DigitData {
    pub images: Array2<f32>,
    pub labels: Vec<u8>,
}

impl DigitData {
    pub fn num_samples(&self) -> usize {
        self.labels.len()
    }

    /// Row indexes of all samples labelled with `digit`
    pub fn indexes_of(&self, digit: u8) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &label)| (label == digit).then_some(i))
            .collect()
    }
}

pub struct DigitDataset {
    pub train: DigitData,
    pub test: DigitData,
}

/// Load the MNIST handwritten digits, downloading and extracting the
/// archives into `data_dir` on first use.
pub fn load_mnist(data_dir: &Path) -> Result<DigitDataset> {
    let base_path = data_dir
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("invalid data directory {:?}", data_dir))?;

    let mnist = MnistBuilder::new()
        .base_path(base_path)
        .label_format_digit()
        .training_set_length(N_TRAIN)
        .validation_set_length(0)
        .test_set_length(N_TEST)
        .download_and_extract()
        .finalize();

    Ok(DigitDataset {
        train: to_digit_data(mnist.trn_img, mnist.trn_lbl)?,
        test: to_digit_data(mnist.tst_img, mnist.tst_lbl)?,
    })
}

fn to_digit_data(img: Vec<u8>, labels: Vec<u8>) -> Result<DigitData> {
    let n = labels.len();
    anyhow::ensure!(
        img.len() == n * N_PIXELS,
        "expected {} pixels for {} images, found {}",
        n * N_PIXELS,
        n,
        img.len()
    );

    let pixels = img.into_iter().map(|v| v as f32 / 255.).collect::<Vec<_>>();
    let images = Array2::from_shape_vec((n, N_PIXELS), pixels)?;

    Ok(DigitData { images, labels })
}
