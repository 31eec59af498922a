// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing what a DOT
// reconstruction run works with:
//
//   sample.rs — one simulation case as read from disk
//   shape.rs  — the fixed grid/vector shape shared by the
//               preprocessor, the network and the checkpoint
//   stats.rs  — dataset-wide normalisation statistics
//   traits.rs — the abstractions other layers implement
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// A raw simulation case (measurement + mus + mua + source dir)
pub mod sample;

/// Shared image size / target length configuration
pub mod shape;

/// Mean / standard deviation per field
pub mod stats;

/// Core abstractions (traits) that other layers implement
pub mod traits;
