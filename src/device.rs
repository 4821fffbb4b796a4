//! The device channel: owns a handle to `/dev/uhid` through the lifetime of one virtual device.

use std::{
    fs::File,
    io::{self, Read, Write},
    os::{
        fd::{AsFd, AsRawFd, BorrowedFd, RawFd},
        unix::fs::OpenOptionsExt,
    },
    path::Path,
    time::Instant,
};

use crate::{
    DeviceConfig, Error, Result,
    event::{EventType, KernelEvent, UHID_EVENT_SIZE, UhidEvent},
    transport::Transport,
    util::{block_until_readable, errorkind2libc, is_readable, set_nonblocking},
};

/// Default location of the UHID character device.
pub const DEFAULT_PATH: &str = "/dev/uhid";

/// Lifecycle state of a [`UhidDevice`].
///
/// There is no `Destroyed` state: [`UhidDevice::destroy`] consumes the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The device node is open, but no device has been registered yet.
    Opened,
    /// A `UHID_CREATE2` request has been written successfully.
    Created,
}

/// An open handle to the UHID device node, and the virtual HID device registered through it.
///
/// Each handle registers at most one device. The device goes away when [`UhidDevice::destroy`]
/// is called, or when the handle is dropped (the kernel destroys the device when the file is
/// closed).
#[derive(Debug)]
pub struct UhidDevice<T: Transport = File> {
    transport: T,
    state: State,
}

impl UhidDevice<File> {
    /// Opens the UHID device node at `path` for reading and writing.
    ///
    /// The file descriptor is opened with `O_CLOEXEC`, so it is not inherited by child processes.
    /// Nothing is retried: if the node is missing or inaccessible, [`Error::Open`] is returned and
    /// carries the OS error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::options()
            .read(true)
            .write(true)
            .custom_flags(libc::O_CLOEXEC)
            .open(path)
            .map_err(|source| {
                log::error!("cannot open {}: {source}", path.display());
                Error::Open {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        log::debug!("opened {}", path.display());
        Ok(Self::from_transport(file))
    }

    /// Moves this handle into or out of non-blocking mode.
    ///
    /// Returns whether the handle was previously in non-blocking mode.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<bool> {
        set_nonblocking(self.as_raw_fd(), nonblocking)
    }

    /// Returns whether a kernel event can be read without blocking.
    pub fn is_readable(&self) -> io::Result<bool> {
        is_readable(self.as_raw_fd())
    }

    /// Blocks the calling thread until [`UhidDevice::is_readable`] would return `true`.
    pub fn block_until_readable(&self) -> io::Result<()> {
        block_until_readable(self.as_raw_fd())
    }
}

impl AsFd for UhidDevice<File> {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.transport.as_fd()
    }
}

impl AsRawFd for UhidDevice<File> {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

impl<T: Transport> UhidDevice<T> {
    /// Wraps an already-open transport. The handle starts out in [`State::Opened`].
    pub fn from_transport(transport: T) -> Self {
        Self {
            transport,
            state: State::Opened,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.state == State::Created
    }

    #[inline]
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Registers the virtual HID device described by `config` with the kernel.
    ///
    /// The `UHID_CREATE2` record is written with a single write call. A short write is reported
    /// as [`Error::ProtocolWrite`] and is not retried.
    ///
    /// On failure the handle stays open and in [`State::Opened`]. It is up to the caller to close
    /// it (via [`UhidDevice::destroy`] or by dropping it) or to try again.
    pub fn create(&mut self, config: &DeviceConfig) -> Result<()> {
        if self.is_created() {
            return Err(Error::AlreadyCreated);
        }

        log::debug!(
            "creating UHID device '{}' ({:?} {:04x}:{:04x})",
            config.name(),
            config.bus(),
            config.vendor(),
            config.product(),
        );
        write_event(&mut self.transport, &UhidEvent::create(config))?;
        self.state = State::Created;
        Ok(())
    }

    /// Unregisters the device (if it was created) and closes the handle.
    ///
    /// Writing `UHID_DESTROY` is best-effort: failures are logged and do not prevent the handle
    /// from being closed, since the device is torn down regardless. Errors from closing the handle
    /// are logged as well.
    pub fn destroy(self) {
        let UhidDevice {
            mut transport,
            state,
        } = self;

        let now = Instant::now();
        match state {
            State::Created => {
                log::debug!("destroying UHID device");
                if let Err(e) = write_event(&mut transport, &UhidEvent::destroy()) {
                    log::error!("failed to destroy UHID device: {e}");
                }
            }
            State::Opened => log::debug!("closing UHID handle without a created device"),
        }

        if let Err(e) = transport.close() {
            log::error!("failed to close UHID handle: {e}");
        }
        log::trace!("`destroy` took {:?}", now.elapsed());
    }

    /// Sends an input report to the HID core.
    ///
    /// `report` is forwarded unchanged; it must start with the report ID if the device's report
    /// descriptor declares any.
    pub fn write_input(&mut self, report: &[u8]) -> Result<()> {
        self.ensure_created()?;
        let ev = UhidEvent::input(report)?;
        write_event(&mut self.transport, &ev)
    }

    /// Answers a [`KernelEvent::GetReport`] request.
    ///
    /// If `result` is an error, it is sent to the kernel as an `errno` value. A native OS error is
    /// passed through as-is; other errors are translated from their [`io::ErrorKind`], falling
    /// back to `EIO`.
    pub fn reply_get_report(&mut self, id: u32, result: io::Result<&[u8]>) -> Result<()> {
        self.ensure_created()?;
        let ev = match result {
            Ok(data) => UhidEvent::get_report_reply(id, 0, data)?,
            Err(e) => UhidEvent::get_report_reply(id, reply_errno("GET_REPORT", &e), &[])?,
        };
        write_event(&mut self.transport, &ev)
    }

    /// Answers a [`KernelEvent::SetReport`] request.
    ///
    /// Errors are translated like in [`UhidDevice::reply_get_report`].
    pub fn reply_set_report(&mut self, id: u32, result: io::Result<()>) -> Result<()> {
        self.ensure_created()?;
        let err = match result {
            Ok(()) => 0,
            Err(e) => reply_errno("SET_REPORT", &e),
        };
        write_event(&mut self.transport, &UhidEvent::set_report_reply(id, err))
    }

    /// Reads and decodes the next event sent by the kernel.
    ///
    /// Blocks if the handle is in blocking mode and no event is pending.
    pub fn read_event(&mut self) -> Result<KernelEvent> {
        read_event(&mut self.transport)?.decode()
    }

    /// Returns an iterator over the events sent by the kernel.
    pub fn events(&mut self) -> Events<'_, T> {
        Events { dev: self }
    }

    fn ensure_created(&self) -> Result<()> {
        if !self.is_created() {
            return Err(Error::NotCreated);
        }
        Ok(())
    }
}

/// An iterator over the [`KernelEvent`]s received by a [`UhidDevice`].
///
/// If the handle is in non-blocking mode, iteration ends when there are no more events to read
/// without blocking. Otherwise, iteration blocks until the next event arrives.
#[derive(Debug)]
pub struct Events<'a, T: Transport> {
    dev: &'a mut UhidDevice<T>,
}

impl<T: Transport> Iterator for Events<'_, T> {
    type Item = Result<KernelEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match read_event(&mut self.dev.transport) {
            Ok(ev) => Some(ev.decode()),
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Opens the UHID node at `path` and registers the device described by `config`.
///
/// If anything fails, the handle is closed before the error is returned, so the caller never has
/// to clean up after a failed call.
pub fn open_and_create(path: impl AsRef<Path>, config: &DeviceConfig) -> Result<UhidDevice> {
    let mut dev = UhidDevice::open(path)?;
    dev.create(config)?;
    Ok(dev)
}

/// Unregisters the device and closes its handle. See [`UhidDevice::destroy`].
pub fn destroy_and_close<T: Transport>(dev: UhidDevice<T>) {
    dev.destroy();
}

/// Writes one event record with a single `write` call.
///
/// Fails with [`Error::ProtocolWrite`] if fewer than [`UHID_EVENT_SIZE`] bytes were accepted, and
/// with [`Error::Io`] if the write itself failed. Neither is retried.
pub fn write_event<W: Write + ?Sized>(writer: &mut W, ev: &UhidEvent) -> Result<()> {
    let bytes = ev.as_bytes();
    let written = writer.write(bytes).map_err(|e| {
        log::error!("cannot write {:?} to UHID device: {e}", ev.event_type());
        Error::Io(e)
    })?;
    if written != bytes.len() {
        log::error!(
            "wrong size written to UHID device: {written} != {}",
            bytes.len()
        );
        return Err(Error::ProtocolWrite {
            expected_size: bytes.len(),
            actual_size: written,
        });
    }
    log::trace!("wrote {:?}", ev.event_type());
    Ok(())
}

/// Reads one event record with a single `read` call.
pub fn read_event<R: Read + ?Sized>(reader: &mut R) -> Result<UhidEvent> {
    let mut ev = UhidEvent::zeroed(EventType::from_raw(0));
    let read = reader.read(ev.as_bytes_mut())?;
    if read != UHID_EVENT_SIZE {
        return Err(Error::InvalidEvent(format!(
            "short read from UHID device: {read} != {UHID_EVENT_SIZE}"
        )));
    }
    log::trace!("read {:?}", ev.event_type());
    Ok(ev)
}

fn reply_errno(request: &str, e: &io::Error) -> u16 {
    let os_err = e.raw_os_error();
    let errno = os_err.unwrap_or_else(|| errorkind2libc(e.kind()).unwrap_or(libc::EIO));
    log::debug!(
        "{request} handler errored: {e} ({:?}, OS error: {os_err:?}) -> code {errno}",
        e.kind()
    );
    u16::try_from(errno).unwrap_or(libc::EIO as u16)
}
