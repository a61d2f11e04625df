//! Generic line-oriented CLI configuration primitives used by higher-level tools.

pub mod duration;
pub mod line;
pub mod net;
pub mod options;

pub use duration::{parse_duration_seconds, DurationError};
pub use line::{directives, Directive};
pub use net::{
    is_ipv4, is_ipv6, mask_to_prefix_len, prefix_len_to_mask, NetAddrError, NetworkSpec,
};
pub use options::{Arity, OptionGrammar, OptionSet, OptionValue, Strictness, TokenizeError};
