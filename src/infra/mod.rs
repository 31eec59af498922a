// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence concerns shared by the other layers:
//
//   checkpoint.rs    — timestamped run directories, model weights
//                      via Burn's CompactRecorder, TrainConfig and
//                      NormalizationStats as JSON
//
//   metrics.rs       — per-epoch loss CSV
//
//   result_writer.rs — reconstructed mus / mua JSON files written
//                      next to each simulation result
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Reconstruction output files
pub mod result_writer;
