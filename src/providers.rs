//! Generation endpoint implementations.

pub mod triton;

// Re-export for convenience
pub use triton::TritonClient;
