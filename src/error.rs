use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Errors returned by this crate.
///
/// None of these are retried internally. They are terminal for the operation that produced them,
/// and the caller decides whether to retry (eg. with a different path, or after acquiring
/// permissions).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The device node could not be opened (missing, permission denied, invalid path, ...).
    #[error("failed to open UHID device node {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transport accepted fewer bytes than the fixed record size.
    ///
    /// This indicates a transport or ABI mismatch and is never retried.
    #[error("short write to UHID device: expected {expected_size} bytes, wrote {actual_size}")]
    ProtocolWrite {
        expected_size: usize,
        actual_size: usize,
    },

    /// An OS-level failure while reading from, writing to, or closing the device.
    #[error("UHID device I/O failed")]
    Io(#[from] io::Error),

    /// A [`DeviceConfig`][crate::DeviceConfig] value doesn't fit into the kernel ABI.
    #[error("invalid device configuration: {0}")]
    InvalidConfig(String),

    /// A record read from the device is malformed.
    #[error("invalid UHID event: {0}")]
    InvalidEvent(String),

    /// An input or reply report exceeds `UHID_DATA_MAX`.
    #[error("report of {len} bytes exceeds the maximum of {max} bytes")]
    ReportTooLarge { len: usize, max: usize },

    /// `create` was called on a device that has already been created.
    #[error("UHID device has already been created")]
    AlreadyCreated,

    /// The operation requires a created device.
    #[error("UHID device has not been created yet")]
    NotCreated,
}

impl Error {
    /// Returns the OS error code (`errno`) carried by [`Error::Open`] and [`Error::Io`].
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::Open { source, .. } | Error::Io(source) => source.raw_os_error(),
            _ => None,
        }
    }
}

/// Result type with this crate's [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned by [`FromStr`][std::str::FromStr] implementations when no matching variant
/// was found.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownVariant {
    pub(crate) _p: (),
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown variant name")
    }
}
impl std::error::Error for UnknownVariant {}
