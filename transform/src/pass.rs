//! Module-level passes.

use snafu::ResultExt;
use tirx_ir::IrModule;

use crate::config::UnrollConfig;
use crate::context::PassContext;
use crate::error::{PassError, UnrollSnafu};
use crate::unroll::unroll_loop;

/// A transformation from one module to another.
///
/// Passes do not mutate their input; functions they leave alone are shared
/// with the returned module.
pub trait Pass {
    /// Name used as the pass-context key and in diagnostics.
    fn name(&self) -> &'static str;

    fn run(&self, module: &IrModule, ctx: &PassContext) -> Result<IrModule, PassError>;
}

/// Loop unrolling over every function of a module.
///
/// Configuration is read from the context entry [`UnrollLoop::CONFIG_KEY`],
/// falling back to [`UnrollConfig::from_env`] when the entry is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnrollLoop;

impl UnrollLoop {
    pub const CONFIG_KEY: &'static str = "tir.UnrollLoop";
}

impl Pass for UnrollLoop {
    fn name(&self) -> &'static str {
        Self::CONFIG_KEY
    }

    #[tracing::instrument(skip_all, fields(pass = Self::CONFIG_KEY, functions = module.len()))]
    fn run(&self, module: &IrModule, ctx: &PassContext) -> Result<IrModule, PassError> {
        let config = match ctx.config::<UnrollConfig>(Self::CONFIG_KEY)? {
            Some(config) => config,
            None => {
                tracing::debug!("no unroll config in pass context; reading environment");
                UnrollConfig::from_env()
            }
        };

        module
            .iter()
            .map(|(name, func)| {
                unroll_loop(func, &config).map(|func| (name.to_string(), func)).context(UnrollSnafu { func: name })
            })
            .collect()
    }
}
