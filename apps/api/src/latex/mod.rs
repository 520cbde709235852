//! CV-to-LaTeX rendering engine: escaping, per-section renderers and the
//! document composer. Everything in here is pure; compilation and I/O live
//! in `compiler` and the pipeline.

pub mod compose;
pub mod escape;
pub mod sections;

pub use compose::compose;
