mod static_fragment;
mod system_preamble;

pub use static_fragment::StaticFragment;
pub use system_preamble::{DEFAULT_INSTRUCTIONS, SystemPreamble};
