#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;


mod bus;
mod config;
mod device;
mod error;
pub mod event;
mod raw;
#[cfg(feature = "serde")]
mod serde_impls;
pub mod touchpad;
pub mod transport;
mod util;

pub use bus::Bus;
pub use config::DeviceConfig;
pub use device::{
    DEFAULT_PATH, Events, State, UhidDevice, destroy_and_close, open_and_create, read_event,
    write_event,
};
pub use error::{Error, Result, UnknownVariant};
#[doc(inline)]
pub use event::{KernelEvent, UhidEvent};
#[doc(inline)]
pub use transport::Transport;
