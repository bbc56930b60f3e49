//! CLI enum types.

use clap::ValueEnum;

/// Which camera backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// System webcam (needs the `native` feature)
    #[default]
    Native,
    /// Synthetic moving gradient, no hardware needed
    TestPattern,
}
