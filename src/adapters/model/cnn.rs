//! Leaf disease CNN in burn.
//!
//! Architecture (NCHW, valid padding):
//! - conv 3x3, 3 -> 32, ReLU, max-pool 2x2   (64 -> 62 -> 31)
//! - conv 3x3, 32 -> 32, ReLU, max-pool 2x2  (31 -> 29 -> 14)
//! - flatten 32 * 14 * 14
//! - dense 128, ReLU
//! - dense 16, softmax

use burn::{
    module::{Module, Param},
    nn::{
        Linear, LinearConfig, Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
    },
    tensor::{Tensor, backend::Backend},
};

use crate::domain::{CHANNELS, IMAGE_SIZE, NUM_CLASSES};

pub const FILTERS: usize = 32;
pub const KERNEL: usize = 3;
pub const HIDDEN: usize = 128;

/// Spatial side after both conv/pool stages.
pub const FEATURE_SIDE: usize = ((IMAGE_SIZE - KERNEL + 1) / 2 - KERNEL + 1) / 2;
/// Length of the flattened feature vector fed to the dense head.
pub const FLAT_FEATURES: usize = FILTERS * FEATURE_SIDE * FEATURE_SIDE;

#[derive(Module, Debug)]
pub struct LeafCnn<B: Backend> {
    pub conv1: Conv2d<B>,
    pub pool1: MaxPool2d,
    pub conv2: Conv2d<B>,
    pub pool2: MaxPool2d,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    relu: Relu,
}

impl<B: Backend> LeafCnn<B> {
    /// Fresh network with randomly initialised weights.
    pub fn new(device: &B::Device) -> Self {
        Self {
            conv1: Conv2dConfig::new([CHANNELS, FILTERS], [KERNEL, KERNEL]).init(device),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv2: Conv2dConfig::new([FILTERS, FILTERS], [KERNEL, KERNEL]).init(device),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1: LinearConfig::new(FLAT_FEATURES, HIDDEN).init(device),
            fc2: LinearConfig::new(HIDDEN, NUM_CLASSES).init(device),
            relu: Relu::new(),
        }
    }

    /// Logits, shape [batch, NUM_CLASSES]. Input shape [batch, 3, 64, 64].
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool1.forward(self.relu.forward(self.conv1.forward(x)));
        let x = self.pool2.forward(self.relu.forward(self.conv2.forward(x)));

        let [batch_size, channels, h, w] = x.dims();
        let x = x.reshape([batch_size, channels * h * w]);

        let x = self.relu.forward(self.fc1.forward(x));
        self.fc2.forward(x)
    }

    /// Class probabilities, shape [batch, NUM_CLASSES].
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(x), 1)
    }

    /// Describes the first parameter whose shape differs from the declared
    /// architecture, or `None` if all match. A missing bias counts as a mismatch.
    pub fn shape_mismatch(&self) -> Option<String> {
        let conv1 = vec![FILTERS, CHANNELS, KERNEL, KERNEL];
        let conv2 = vec![FILTERS, FILTERS, KERNEL, KERNEL];
        let expected = [
            ("conv1.weight", Some(dims(&self.conv1.weight)), conv1),
            ("conv1.bias", self.conv1.bias.as_ref().map(dims), vec![FILTERS]),
            ("conv2.weight", Some(dims(&self.conv2.weight)), conv2),
            ("conv2.bias", self.conv2.bias.as_ref().map(dims), vec![FILTERS]),
            ("fc1.weight", Some(dims(&self.fc1.weight)), vec![FLAT_FEATURES, HIDDEN]),
            ("fc1.bias", self.fc1.bias.as_ref().map(dims), vec![HIDDEN]),
            ("fc2.weight", Some(dims(&self.fc2.weight)), vec![HIDDEN, NUM_CLASSES]),
            ("fc2.bias", self.fc2.bias.as_ref().map(dims), vec![NUM_CLASSES]),
        ];
        expected.into_iter().find_map(|(name, got, want)| match got {
            Some(got) if got == want => None,
            Some(got) => Some(format!("{name}: expected {want:?}, found {got:?}")),
            None => Some(format!("{name}: expected {want:?}, found none")),
        })
    }
}

fn dims<B: Backend, const D: usize>(param: &Param<Tensor<B, D>>) -> Vec<usize> {
    param.val().dims().to_vec()
}
