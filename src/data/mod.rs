// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from simulation result files to tensor batches:
//
//   simulation_config_and_results.json (per case, any depth)
//       │
//       ▼
//   SimulationLoader  → finds files, extracts Y / mus / mua
//       │
//       ▼
//   Preprocessor      → bilinear resize, pad / truncate
//       │
//       ▼
//   SampleStore       → dataset-wide stats, normalisation
//       │
//       ▼
//   split_train_val   → 80 / 20 shuffled split
//       │
//       ▼
//   ReconDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ReconBatcher      → stacks items into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Discovers and parses simulation result files
pub mod loader;

/// Resizes measurements and pads target vectors
pub mod preprocessor;

/// Computes normalisation statistics and normalises samples
pub mod store;

/// Implements Burn's Dataset trait for normalised samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
