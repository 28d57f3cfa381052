//! Configuration types deserialized from `braid.toml`.

use serde::Deserialize;

/// The top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BraidConfig {
    /// Combinational SSA compiler settings.
    #[serde(default)]
    pub ssa: SsaConfig,
    /// Settlement engine settings.
    #[serde(default)]
    pub propagation: PropagationConfig,
}

/// How the SSA compiler treats unique-case items that can match together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Say nothing.
    Allow,
    /// Emit a warning diagnostic.
    #[default]
    Warn,
    /// Fail compilation.
    Deny,
}

/// Settings for the combinational SSA compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsaConfig {
    /// Reaction to constant unique-case items that overlap.
    #[serde(default)]
    pub unique_overlap: OverlapPolicy,
    /// Warn about priority-case items shadowed by an earlier item.
    #[serde(default = "default_true")]
    pub lint_unreachable_items: bool,
}

impl Default for SsaConfig {
    fn default() -> Self {
        Self {
            unique_overlap: OverlapPolicy::Warn,
            lint_unreachable_items: true,
        }
    }
}

/// Settings for the zero-delay settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropagationConfig {
    /// Upper bound on the number of nodes one settlement pass may evaluate.
    #[serde(default = "default_max_pass_nodes")]
    pub max_pass_nodes: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_pass_nodes: default_max_pass_nodes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_pass_nodes() -> usize {
    1_000_000
}
