// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training or reconstructing profiles).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing or writing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Which Burn backend a run executes on
pub mod backend;

// The training workflow
pub mod train_use_case;

// The inference workflow: checkpoint + simulations → reconstructed profiles
pub mod reconstruct_use_case;

#[cfg(test)]
pub(crate) mod fixtures;
