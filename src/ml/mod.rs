// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn modules, the training loop and inference live here.
//
//   model.rs      — ReconNet encoder-decoder:
//                   • 3 encoder stages (two 3×3 conv + ReLU each)
//                   • 2× max-pool between encoder stages
//                   • 2 decoder stages (2×2 transposed conv, stride 2)
//                   • additive skip connections
//                   • two 1×1 heads (mus, mua), flattened per sample
//
//   trainer.rs    — fixed-epoch loop with Adam, summed dual MSE,
//                   best-validation checkpointing
//
//   inferencer.rs — Reconstructor: loads a checkpoint, predicts,
//                   de-normalises and hands results to a sink
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Ronneberger et al. (2015) U-Net

/// Encoder-decoder network
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference and de-normalisation
pub mod inferencer;
