// ============================================================
// Layer 5 — ReconNet (encoder-decoder CNN)
// ============================================================
// Maps a single-channel measurement image to two flattened
// parameter profiles:
//
//   x [B,1,S,S] → enc1 → pool → enc2 → pool → enc3
//                  │             │              │
//                  │             └──── + ◄── dec1
//                  └─────────────────── + ◄── dec2
//                                       │
//                         head_mus ◄────┴────► head_mua
//                       [B, out_mus·S·S]      [B, out_mua·S·S]
//
// Reference: Burn Book §3 (Building Blocks)
//            Ronneberger et al. (2015) U-Net

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        loss::{MseLoss, Reduction},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::shape::ShapeConfig;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ReconNetConfig {
    pub in_channels:      usize,
    pub out_channels_mus: usize,
    pub out_channels_mua: usize,
    /// Width of the first encoder stage; later stages use 2× and 4×.
    #[config(default = 64)]
    pub base_channels:    usize,
}

impl ReconNetConfig {
    /// Single-channel input, heads sized so each flattened output
    /// has exactly `shape.target_len` values.
    pub fn for_shape(shape: &ShapeConfig) -> anyhow::Result<Self> {
        let heads = shape.head_channels()?;
        Ok(Self::new(1, heads, heads))
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ReconNet<B> {
        let c = self.base_channels;
        ReconNet {
            enc1:     ConvBlock::new(self.in_channels, c, device),
            enc2:     ConvBlock::new(c, 2 * c, device),
            enc3:     ConvBlock::new(2 * c, 4 * c, device),
            pool:     MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            dec1:     UpConv::new(4 * c, 2 * c, device),
            dec2:     UpConv::new(2 * c, c, device),
            head_mus: Conv2dConfig::new([c, self.out_channels_mus], [1, 1]).init(device),
            head_mua: Conv2dConfig::new([c, self.out_channels_mua], [1, 1]).init(device),
        }
    }
}

/// Two 3×3 convolutions (padding 1), each followed by ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = |i, o| {
            Conv2dConfig::new([i, o], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device)
        };
        Self {
            conv1: conv(in_channels, out_channels),
            conv2: conv(out_channels, out_channels),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv1.forward(x));
        relu(self.conv2.forward(x))
    }
}

/// 2×2 transposed convolution with stride 2, followed by ReLU.
#[derive(Module, Debug)]
pub struct UpConv<B: Backend> {
    pub deconv: ConvTranspose2d<B>,
}

impl<B: Backend> UpConv<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let deconv = ConvTranspose2dConfig::new([in_channels, out_channels], [2, 2])
            .with_stride([2, 2])
            .init(device);
        Self { deconv }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.deconv.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct ReconNet<B: Backend> {
    pub enc1:     ConvBlock<B>,
    pub enc2:     ConvBlock<B>,
    pub enc3:     ConvBlock<B>,
    pub pool:     MaxPool2d,
    pub dec1:     UpConv<B>,
    pub dec2:     UpConv<B>,
    pub head_mus: Conv2d<B>,
    pub head_mua: Conv2d<B>,
}

pub struct ReconOutput<B: Backend> {
    /// Flattened mus prediction — shape: [batch, out_mus × S × S]
    pub mus: Tensor<B, 2>,
    /// Flattened mua prediction — shape: [batch, out_mua × S × S]
    pub mua: Tensor<B, 2>,
}

impl<B: Backend> ReconNet<B> {
    /// measurements: [batch, 1, S, S] → mus, mua: [batch, L]
    pub fn forward(&self, measurements: Tensor<B, 4>) -> ReconOutput<B> {
        let e1 = self.enc1.forward(measurements);                      // [B, C,  S,   S  ]
        let e2 = self.enc2.forward(self.pool.forward(e1.clone()));     // [B, 2C, S/2, S/2]
        let e3 = self.enc3.forward(self.pool.forward(e2.clone()));     // [B, 4C, S/4, S/4]

        // Skip connections: add the matching encoder map before the next stage.
        let d2 = self.dec1.forward(e3);                                // [B, 2C, S/2, S/2]
        let d1 = self.dec2.forward(d2 + e2);                           // [B, C,  S,   S  ]
        let features = d1 + e1;

        let mus = self.head_mus.forward(features.clone()).flatten::<2>(1, 3);
        let mua = self.head_mua.forward(features).flatten::<2>(1, 3);

        ReconOutput { mus, mua }
    }

    /// Summed mean-squared error of both heads against their targets.
    pub fn forward_loss(
        &self,
        measurements: Tensor<B, 4>,
        mus_targets:  Tensor<B, 2>,
        mua_targets:  Tensor<B, 2>,
    ) -> (Tensor<B, 1>, ReconOutput<B>) {
        let output = self.forward(measurements);
        let mse    = MseLoss::new();
        let loss   = mse.forward(output.mus.clone(), mus_targets, Reduction::Mean)
                   + mse.forward(output.mua.clone(), mua_targets, Reduction::Mean);
        (loss, output)
    }
}
