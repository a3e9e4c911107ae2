//! Transform passes over the tirx IR.
//!
//! The central pass is loop unrolling: serial loops with small constant trip
//! counts, and loops explicitly marked `Unrolled`, are replaced by one copy of
//! their body per iteration. Thresholds come from [`UnrollConfig`] and may be
//! overridden for a subtree by `pragma_*` attributes.
//!
//! ```rust,ignore
//! let config = UnrollConfig::builder().auto_max_step(16).build();
//! let unrolled = unroll_loop(&func, &config)?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod pass;
pub mod unroll;


pub use config::UnrollConfig;
pub use context::PassContext;
pub use error::{PassError, UnrollError};
pub use pass::{Pass, UnrollLoop};
pub use unroll::{unroll_loop, unroll_loop_stmt};
