//! The byte channel a [`UhidDevice`][crate::UhidDevice] talks to the kernel through.

use std::{
    fs::File,
    io::{self, Read, Write},
    os::fd::IntoRawFd,
};

use crate::util;

/// A bidirectional channel that carries whole UHID event records.
///
/// Implemented for [`File`], which is what [`UhidDevice::open`][crate::UhidDevice::open] uses.
/// Other implementations can stand in for the device node, for example to record or echo the
/// traffic in tests.
///
/// Every record is transferred with a single call to [`Write::write`] or [`Read::read`]; the
/// kernel never splits or merges UHID records.
pub trait Transport: Read + Write {
    /// Closes the transport, returning any error reported by the OS.
    ///
    /// The default implementation simply drops `self`.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        drop(self);
        Ok(())
    }
}

impl Transport for File {
    fn close(self) -> io::Result<()> {
        util::close(self.into_raw_fd())
    }
}
