//! Kernel ABI definitions.

pub mod uhid;
