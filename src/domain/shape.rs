// ============================================================
// Layer 3 — Shape Configuration
// ============================================================
// The one place the fixed tensor shapes are defined.
//
//   image_size — measurements are resized to image_size²
//   target_len — mus / mua are padded or truncated to this
//
// The network's 1×1 heads emit `head_channels` maps of
// image_size² pixels each, so target_len must be an exact
// multiple of image_size². The default (128, 16384) gives one
// channel per head.
//
// The encoder pools twice, so image_size must divide by 4.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_SIZE: usize = 128;
pub const DEFAULT_TARGET_LEN: usize = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub image_size: usize,
    pub target_len: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            target_len: DEFAULT_TARGET_LEN,
        }
    }
}

impl ShapeConfig {
    pub fn new(image_size: usize, target_len: usize) -> Self {
        Self { image_size, target_len }
    }

    /// Number of pixels in one resized measurement
    pub fn pixels(&self) -> usize {
        self.image_size * self.image_size
    }

    /// Check the coupling between grid size and target length.
    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 || self.image_size % 4 != 0 {
            bail!(
                "image_size must be a positive multiple of 4 (got {})",
                self.image_size
            );
        }
        if self.target_len == 0 || self.target_len % self.pixels() != 0 {
            bail!(
                "target_len {} is not a multiple of image_size² = {}",
                self.target_len,
                self.pixels()
            );
        }
        Ok(())
    }

    /// Output channels each network head needs so that its
    /// flattened output has exactly target_len elements.
    pub fn head_channels(&self) -> Result<usize> {
        self.validate()?;
        Ok(self.target_len / self.pixels())
    }
}
