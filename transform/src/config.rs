//! Unroll configuration.
//!
//! Built in code through a bon builder, decoded from a pass-context JSON
//! object, or read from the environment. Every field is optional in the
//! decoded and environment forms.

use bon::bon;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{InvalidConfigSnafu, Result};

/// Thresholds controlling automatic loop unrolling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnrollConfig {
    /// Step budget: a loop's extent times the unrolled size of its body. `0` disables
    /// automatic unrolling.
    pub auto_max_step: i64,
    /// Loops nested this deep or deeper are never auto-unrolled.
    pub auto_max_depth: i64,
    /// Loops with a larger extent are never auto-unrolled.
    pub auto_max_extent: i64,
    /// Materialize unrolled copies; otherwise only mark loops as unrolled.
    pub explicit_unroll: bool,
}

impl Default for UnrollConfig {
    fn default() -> Self {
        Self { auto_max_step: 0, auto_max_depth: i64::MAX, auto_max_extent: i64::MAX, explicit_unroll: true }
    }
}

#[bon]
impl UnrollConfig {
    /// Create an unroll configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = 0)] auto_max_step: i64,
        #[builder(default = i64::MAX)] auto_max_depth: i64,
        #[builder(default = i64::MAX)] auto_max_extent: i64,
        #[builder(default = true)] explicit_unroll: bool,
    ) -> Self {
        Self { auto_max_step, auto_max_depth, auto_max_extent, explicit_unroll }
    }
}

impl UnrollConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TIRX_UNROLL_MAX_STEP` - Step budget (default: 0, disabled)
    /// * `TIRX_UNROLL_MAX_DEPTH` - Depth limit (default: unlimited)
    /// * `TIRX_UNROLL_MAX_EXTENT` - Extent limit (default: unlimited)
    /// * `TIRX_UNROLL_EXPLICIT` - `0` or `false` to only mark loops (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let int = |key: &str, default: i64| lookup(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default);
        let explicit_unroll = match lookup("TIRX_UNROLL_EXPLICIT") {
            Some(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false"),
            None => defaults.explicit_unroll,
        };

        Self {
            auto_max_step: int("TIRX_UNROLL_MAX_STEP", defaults.auto_max_step),
            auto_max_depth: int("TIRX_UNROLL_MAX_DEPTH", defaults.auto_max_depth),
            auto_max_extent: int("TIRX_UNROLL_MAX_EXTENT", defaults.auto_max_extent),
            explicit_unroll,
        }
    }

    /// Reject negative thresholds.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("auto_max_step", self.auto_max_step),
            ("auto_max_depth", self.auto_max_depth),
            ("auto_max_extent", self.auto_max_extent),
        ] {
            ensure!(value >= 0, InvalidConfigSnafu { field, value });
        }
        Ok(())
    }
}
