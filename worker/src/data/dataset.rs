use std::path::{Path, PathBuf};
use std::{error::Error, fmt};

use mlp_core::INPUT_WIDTH;
use mnist::MnistBuilder;
use ndarray::Array2;

/// The four canonical idx files of an MNIST download.
const IDX_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

const TRAIN_LEN: u32 = 60_000;
const TEST_LEN: u32 = 10_000;

/// Dataset loading failures, all fatal at startup.
#[derive(Debug, PartialEq, Eq)]
pub enum DataErr {
    MissingFile(PathBuf),
    CountMismatch { images: usize, labels: usize },
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::MissingFile(path) => {
                write!(f, "missing dataset file {}", path.display())
            }
            DataErr::CountMismatch { images, labels } => {
                write!(f, "{images} images do not match {labels} labels")
            }
        }
    }
}

impl Error for DataErr {}

/// The full training split held in memory: flattened images row by row
/// plus one digit label per row.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    images: Vec<f32>,
    labels: Vec<u8>,
}

impl InMemoryDataset {
    /// Creates a dataset from owned buffers. Pixels are expected to be
    /// scaled already.
    ///
    /// # Panics
    /// - if `images.len() != labels.len() * 784`
    /// - if `labels` is empty
    pub fn new(images: Vec<f32>, labels: Vec<u8>) -> Self {
        assert_eq!(images.len(), labels.len() * INPUT_WIDTH, "images and labels must agree");
        assert!(!labels.is_empty(), "dataset must be non-empty");
        Self { images, labels }
    }

    /// Decodes the MNIST training split from the idx files under `dir`,
    /// scaling pixels from `0..=255` to `[0, 1]`.
    ///
    /// # Errors
    /// Returns `DataErr::MissingFile` if any of the four canonical idx
    /// files is absent, and `DataErr::CountMismatch` if the decoded image
    /// and label counts disagree.
    ///
    /// # Panics
    /// The underlying decoder aborts on files that exist but are
    /// truncated or otherwise malformed.
    pub fn load_training(dir: &str) -> Result<Self, DataErr> {
        for name in IDX_FILES {
            let path = Path::new(dir).join(name);
            if !path.is_file() {
                return Err(DataErr::MissingFile(path));
            }
        }

        let mnist = MnistBuilder::new()
            .base_path(dir)
            .training_set_length(TRAIN_LEN)
            .test_set_length(TEST_LEN)
            .finalize();

        if mnist.trn_img.len() != mnist.trn_lbl.len() * INPUT_WIDTH {
            return Err(DataErr::CountMismatch {
                images: mnist.trn_img.len() / INPUT_WIDTH,
                labels: mnist.trn_lbl.len(),
            });
        }

        let images = mnist.trn_img.iter().map(|&px| f32::from(px) / 255.0).collect();
        Ok(Self::new(images, mnist.trn_lbl))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pixels of the sample at `idx` (panics if out of bounds).
    #[inline]
    pub fn image(&self, idx: usize) -> &[f32] {
        &self.images[idx * INPUT_WIDTH..(idx + 1) * INPUT_WIDTH]
    }

    /// Label of the sample at `idx` (panics if out of bounds).
    #[inline]
    pub fn label(&self, idx: usize) -> u8 {
        self.labels[idx]
    }
}

/// One owned training batch: a row per sample plus its labels.
#[derive(Debug, Clone)]
pub struct Batch {
    pub xs: Array2<f32>,
    pub ys: Vec<u8>,
}

impl Batch {
    /// # Panics
    /// - if `xs.nrows() != ys.len()`
    /// - if `ys` is empty
    pub fn new(xs: Array2<f32>, ys: Vec<u8>) -> Self {
        assert_eq!(xs.nrows(), ys.len(), "xs and ys must have same length");
        assert!(!ys.is_empty(), "batch must be non-empty");
        Self { xs, ys }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ys.len()
    }
}
