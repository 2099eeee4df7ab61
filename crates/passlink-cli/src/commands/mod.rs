//! CLI command implementations.

pub(crate) mod inspect;
pub(crate) mod keys;
pub(crate) mod serve;
pub(crate) mod share;
