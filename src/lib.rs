// ============================================================
// dot-recon — DOT profile reconstruction
// ============================================================
// Layered crate, top to bottom:
//
//   cli          Layer 1 — argument parsing, printing
//   application  Layer 2 — train / reconstruct workflows
//   domain       Layer 3 — samples, shapes, statistics, seams
//   data         Layer 4 — discovery, preprocessing, batching
//   ml           Layer 5 — network, training loop, inference
//   infra        Layer 6 — checkpoints, metrics, result files
#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
