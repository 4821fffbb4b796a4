//! UHID event records.
//!
//! Every message exchanged with `/dev/uhid` is a [`UhidEvent`]: a fixed-size record of
//! [`UHID_EVENT_SIZE`] bytes made up of a 32-bit [`EventType`] tag followed by a payload union.
//! Unused payload bytes are always zero.
//!
//! Records written *to* the kernel are built with the constructors on [`UhidEvent`]
//! ([`UhidEvent::create`], [`UhidEvent::destroy`], [`UhidEvent::input`], ...). Records read *from*
//! the kernel are turned into a [`KernelEvent`] by [`UhidEvent::decode`].

use std::{fmt, mem, slice};

use crate::{
    DeviceConfig, Error, Result,
    raw::uhid::{
        UHID_CLOSE, UHID_CREATE2, UHID_DATA_MAX, UHID_DESTROY, UHID_DEV_NUMBERED_FEATURE_REPORTS,
        UHID_DEV_NUMBERED_INPUT_REPORTS, UHID_DEV_NUMBERED_OUTPUT_REPORTS, UHID_FEATURE_REPORT,
        UHID_GET_REPORT, UHID_GET_REPORT_REPLY, UHID_INPUT_REPORT, UHID_INPUT2,
        UHID_LEGACY_CREATE, UHID_LEGACY_INPUT, UHID_LEGACY_OUTPUT_EV, UHID_OPEN, UHID_OUTPUT,
        UHID_OUTPUT_REPORT, UHID_SET_REPORT, UHID_SET_REPORT_REPLY, UHID_START, UHID_STOP,
        uhid_event,
    },
};

pub use crate::raw::uhid::UHID_EVENT_SIZE;

/// Maximum size of a report carried by a single event.
pub const MAX_REPORT_SIZE: usize = UHID_DATA_MAX;

ffi_enum! {
    /// The type tag of a [`UhidEvent`].
    pub enum EventType: u32 {
        LEGACY_CREATE    = UHID_LEGACY_CREATE,
        DESTROY          = UHID_DESTROY,
        START            = UHID_START,
        STOP             = UHID_STOP,
        OPEN             = UHID_OPEN,
        CLOSE            = UHID_CLOSE,
        OUTPUT           = UHID_OUTPUT,
        LEGACY_OUTPUT_EV = UHID_LEGACY_OUTPUT_EV,
        LEGACY_INPUT     = UHID_LEGACY_INPUT,
        GET_REPORT       = UHID_GET_REPORT,
        GET_REPORT_REPLY = UHID_GET_REPORT_REPLY,
        CREATE2          = UHID_CREATE2,
        INPUT2           = UHID_INPUT2,
        SET_REPORT       = UHID_SET_REPORT,
        SET_REPORT_REPLY = UHID_SET_REPORT_REPLY,
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_name() {
            Some(name) => write!(f, "UHID_{name}"),
            None => write!(f, "EventType({})", self.0),
        }
    }
}

ffi_enum! {
    /// HID report types, as used in `OUTPUT`, `GET_REPORT` and `SET_REPORT` requests.
    pub enum ReportType: u8 {
        FEATURE = UHID_FEATURE_REPORT,
        OUTPUT  = UHID_OUTPUT_REPORT,
        INPUT   = UHID_INPUT_REPORT,
    }
}

impl fmt::Debug for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_name() {
            Some(name) => write!(f, "UHID_{name}_REPORT"),
            None => write!(f, "ReportType({})", self.0),
        }
    }
}

/// Device flags sent by the kernel with `UHID_START`.
///
/// They tell the device which report types are prefixed with a report number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DevFlags(u64);

impl DevFlags {
    pub const NUMBERED_FEATURE_REPORTS: Self = Self(UHID_DEV_NUMBERED_FEATURE_REPORTS);
    pub const NUMBERED_OUTPUT_REPORTS: Self = Self(UHID_DEV_NUMBERED_OUTPUT_REPORTS);
    pub const NUMBERED_INPUT_REPORTS: Self = Self(UHID_DEV_NUMBERED_INPUT_REPORTS);

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Debug for DevFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(DevFlags, &str); 3] = [
            (DevFlags::NUMBERED_FEATURE_REPORTS, "NUMBERED_FEATURE_REPORTS"),
            (DevFlags::NUMBERED_OUTPUT_REPORTS, "NUMBERED_OUTPUT_REPORTS"),
            (DevFlags::NUMBERED_INPUT_REPORTS, "NUMBERED_INPUT_REPORTS"),
        ];

        let mut set = f.debug_set();
        let mut rest = self.0;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
                rest &= !flag.0;
            }
        }
        if rest != 0 {
            set.entry(&format_args!("{rest:#x}"));
        }
        set.finish()
    }
}

/// A decoded event sent by the kernel to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KernelEvent {
    /// The HID driver has been bound to the device.
    Start { dev_flags: DevFlags },
    /// The HID driver has been unbound from the device.
    Stop,
    /// Some process opened the HID device; input reports should be sent from now on.
    Open,
    /// The last user of the HID device closed it.
    Close,
    /// A report the driver wants to send to the device (eg. LED state).
    Output {
        report_type: ReportType,
        data: Vec<u8>,
    },
    /// The driver requests a report; answer with
    /// [`UhidDevice::reply_get_report`][crate::UhidDevice::reply_get_report].
    GetReport {
        id: u32,
        report_number: u8,
        report_type: ReportType,
    },
    /// The driver wants to set a report; answer with
    /// [`UhidDevice::reply_set_report`][crate::UhidDevice::reply_set_report].
    SetReport {
        id: u32,
        report_number: u8,
        report_type: ReportType,
        data: Vec<u8>,
    },
    /// Any other event type. The kernel never sends these, but a transport that echoes records
    /// back will.
    Other(EventType),
}

impl KernelEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            KernelEvent::Start { .. } => EventType::START,
            KernelEvent::Stop => EventType::STOP,
            KernelEvent::Open => EventType::OPEN,
            KernelEvent::Close => EventType::CLOSE,
            KernelEvent::Output { .. } => EventType::OUTPUT,
            KernelEvent::GetReport { .. } => EventType::GET_REPORT,
            KernelEvent::SetReport { .. } => EventType::SET_REPORT,
            KernelEvent::Other(ty) => *ty,
        }
    }
}

/// A raw UHID event record, exactly as the kernel reads and writes it.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct UhidEvent(uhid_event);

impl fmt::Debug for UhidEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UhidEvent")
            .field("type", &self.event_type())
            .finish_non_exhaustive()
    }
}

impl PartialEq for UhidEvent {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl Eq for UhidEvent {}

impl UhidEvent {
    /// Returns an all-zero record with the given type tag.
    pub fn zeroed(event_type: EventType) -> Self {
        // Safety: `uhid_event` only contains integers and arrays of integers.
        let mut ev = unsafe { mem::zeroed::<uhid_event>() };
        ev.type_ = event_type.0;
        Self(ev)
    }

    /// Builds the `UHID_CREATE2` request that registers a device described by `config`.
    ///
    /// The result only depends on `config`, and is byte-for-byte identical on every call.
    pub fn create(config: &DeviceConfig) -> Self {
        let mut ev = Self::zeroed(EventType::CREATE2);
        // Safety: writing to a union field of plain integers; the record was zeroed above.
        let req = unsafe { &mut ev.0.u.create2 };

        // `DeviceConfig` guarantees that everything fits with room for a NUL terminator.
        req.name[..config.name.len()].copy_from_slice(config.name.as_bytes());
        req.phys[..config.phys.len()].copy_from_slice(config.phys.as_bytes());
        req.uniq[..config.uniq.len()].copy_from_slice(config.uniq.as_bytes());

        let rd = config.report_descriptor();
        req.rd_data[..rd.len()].copy_from_slice(rd);
        req.rd_size = rd.len() as u16;
        req.bus = config.bus.raw();
        req.vendor = config.vendor;
        req.product = config.product;
        req.version = config.version;
        req.country = config.country;
        ev
    }

    /// Builds the `UHID_DESTROY` request. It has no payload.
    pub fn destroy() -> Self {
        Self::zeroed(EventType::DESTROY)
    }

    /// Builds a `UHID_INPUT2` request that feeds `report` into the HID core.
    ///
    /// The report is forwarded verbatim, including the report ID prefix if the descriptor uses
    /// report IDs.
    pub fn input(report: &[u8]) -> Result<Self> {
        check_report_len(report)?;
        let mut ev = Self::zeroed(EventType::INPUT2);
        let req = unsafe { &mut ev.0.u.input2 };
        req.size = report.len() as u16;
        req.data[..report.len()].copy_from_slice(report);
        Ok(ev)
    }

    /// Builds the answer to a [`KernelEvent::GetReport`].
    ///
    /// `err` is a positive `errno` value, or 0 if `data` contains the requested report.
    pub fn get_report_reply(id: u32, err: u16, data: &[u8]) -> Result<Self> {
        check_report_len(data)?;
        let mut ev = Self::zeroed(EventType::GET_REPORT_REPLY);
        let req = unsafe { &mut ev.0.u.get_report_reply };
        req.id = id;
        req.err = err;
        req.size = data.len() as u16;
        req.data[..data.len()].copy_from_slice(data);
        Ok(ev)
    }

    /// Builds the answer to a [`KernelEvent::SetReport`].
    pub fn set_report_reply(id: u32, err: u16) -> Self {
        let mut ev = Self::zeroed(EventType::SET_REPORT_REPLY);
        let req = unsafe { &mut ev.0.u.set_report_reply };
        req.id = id;
        req.err = err;
        ev
    }

    /// Parses a record from exactly [`UHID_EVENT_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != UHID_EVENT_SIZE {
            return Err(Error::InvalidEvent(format!(
                "expected {UHID_EVENT_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let mut ev = Self::zeroed(EventType(0));
        ev.as_bytes_mut().copy_from_slice(bytes);
        Ok(ev)
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    /// Returns the wire representation of this record.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: `uhid_event` is packed, so there are no padding bytes, and every byte was
        // initialized by `zeroed`.
        unsafe { slice::from_raw_parts((&raw const self.0).cast::<u8>(), UHID_EVENT_SIZE) }
    }

    /// Mutable access to the wire representation, used to read records in place.
    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        // Safety: as above; additionally, any bit pattern is a valid `uhid_event`.
        unsafe { slice::from_raw_parts_mut((&raw mut self.0).cast::<u8>(), UHID_EVENT_SIZE) }
    }

    /// Decodes a record sent by the kernel.
    ///
    /// Types that the kernel only accepts (and never sends) are returned as
    /// [`KernelEvent::Other`].
    pub fn decode(&self) -> Result<KernelEvent> {
        let ty = self.event_type();
        // Safety (all blocks): the union is only read as the variant selected by the type tag,
        // and all variants are plain integers anyway.
        let event = match ty {
            EventType::START => KernelEvent::Start {
                dev_flags: DevFlags(unsafe { self.0.u.start.dev_flags }),
            },
            EventType::STOP => KernelEvent::Stop,
            EventType::OPEN => KernelEvent::Open,
            EventType::CLOSE => KernelEvent::Close,
            EventType::OUTPUT => {
                let req = unsafe { &self.0.u.output };
                KernelEvent::Output {
                    report_type: ReportType(req.rtype),
                    data: report_data(&req.data, req.size)?,
                }
            }
            EventType::GET_REPORT => {
                let req = unsafe { &self.0.u.get_report };
                KernelEvent::GetReport {
                    id: req.id,
                    report_number: req.rnum,
                    report_type: ReportType(req.rtype),
                }
            }
            EventType::SET_REPORT => {
                let req = unsafe { &self.0.u.set_report };
                KernelEvent::SetReport {
                    id: req.id,
                    report_number: req.rnum,
                    report_type: ReportType(req.rtype),
                    data: report_data(&req.data, req.size)?,
                }
            }
            other => KernelEvent::Other(other),
        };
        Ok(event)
    }
}

fn check_report_len(report: &[u8]) -> Result<()> {
    if report.len() > UHID_DATA_MAX {
        return Err(Error::ReportTooLarge {
            len: report.len(),
            max: UHID_DATA_MAX,
        });
    }
    Ok(())
}

fn report_data(data: &[u8; UHID_DATA_MAX], size: u16) -> Result<Vec<u8>> {
    let size = usize::from(size);
    match data.get(..size) {
        Some(data) => Ok(data.to_vec()),
        None => Err(Error::InvalidEvent(format!(
            "report size {size} exceeds the maximum of {UHID_DATA_MAX}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Bus, touchpad};

    use super::*;

    const NAME: usize = 4;
    const RD_SIZE: usize = 260;
    const BUS: usize = 262;
    const VENDOR: usize = 264;
    const PRODUCT: usize = 268;
    const RD_DATA: usize = 280;

    #[test]
    fn create_layout() {
        let ev = UhidEvent::create(&DeviceConfig::touchpad());
        let bytes = ev.as_bytes();
        assert_eq!(bytes.len(), UHID_EVENT_SIZE);
        assert_eq!(bytes[..4], UHID_CREATE2.to_ne_bytes());
        assert_eq!(&bytes[NAME..][..13], b"uhid-touchpad");

        let rd = touchpad::REPORT_DESCRIPTOR;
        assert_eq!(bytes[RD_SIZE..][..2], (rd.len() as u16).to_ne_bytes());
        assert_eq!(bytes[BUS..][..2], Bus::USB.raw().to_ne_bytes());
        assert_eq!(bytes[VENDOR..][..4], 0x15d9_u32.to_ne_bytes());
        assert_eq!(bytes[PRODUCT..][..4], 0x0a37_u32.to_ne_bytes());
        assert_eq!(&bytes[RD_DATA..][..rd.len()], rd);

        // Everything else is zero: name terminator, phys, uniq, version, country, the unused
        // remainder of `rd_data`.
        let populated = [
            0..4,
            NAME..NAME + 13,
            RD_SIZE..RD_SIZE + 4,
            VENDOR..VENDOR + 8,
            RD_DATA..RD_DATA + rd.len(),
        ];
        for (i, b) in bytes.iter().enumerate() {
            if !populated.iter().any(|r| r.contains(&i)) {
                assert_eq!(*b, 0, "byte {i} should be zero");
            }
        }
    }

    #[test]
    fn create_is_deterministic() {
        let config = DeviceConfig::touchpad();
        assert_eq!(
            UhidEvent::create(&config).as_bytes(),
            UhidEvent::create(&config).as_bytes()
        );
    }

    #[test]
    fn create_custom_identity() -> Result<()> {
        const RD: &[u8] = &[0x05, 0x01, 0xc0];
        let config = DeviceConfig::new("test-uhid-device", RD)?
            .with_phys("phys")?
            .with_uniq("uniq")?
            .with_bus(Bus::BLUETOOTH)
            .with_ids(0x1234, 0x5678)
            .with_version(7)
            .with_country(33);
        let ev = UhidEvent::create(&config);
        let bytes = ev.as_bytes();
        assert_eq!(&bytes[NAME..][..17], b"test-uhid-device\0");
        assert_eq!(&bytes[132..][..5], b"phys\0");
        assert_eq!(&bytes[196..][..5], b"uniq\0");
        assert_eq!(bytes[RD_SIZE..][..2], 3_u16.to_ne_bytes());
        assert_eq!(bytes[BUS..][..2], 0x05_u16.to_ne_bytes());
        assert_eq!(bytes[272..][..4], 7_u32.to_ne_bytes());
        assert_eq!(bytes[276..][..4], 33_u32.to_ne_bytes());
        assert_eq!(&bytes[RD_DATA..][..4], &[0x05, 0x01, 0xc0, 0x00]);
        Ok(())
    }

    #[test]
    fn destroy_layout() {
        let ev = UhidEvent::destroy();
        let bytes = ev.as_bytes();
        assert_eq!(bytes.len(), UHID_EVENT_SIZE);
        assert_eq!(ev.event_type(), EventType::DESTROY);
        assert_eq!(bytes[..4], UHID_DESTROY.to_ne_bytes());
        assert!(bytes[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn input_layout() -> Result<()> {
        let ev = UhidEvent::input(&[4, 3, 0x10, 0x00])?;
        let bytes = ev.as_bytes();
        assert_eq!(ev.event_type(), EventType::INPUT2);
        assert_eq!(bytes[4..6], 4_u16.to_ne_bytes());
        assert_eq!(&bytes[6..11], &[4, 3, 0x10, 0x00, 0x00]);

        let err = UhidEvent::input(&[0; MAX_REPORT_SIZE + 1]).unwrap_err();
        assert!(
            matches!(err, Error::ReportTooLarge { len: 4097, max: 4096 }),
            "{err:?}"
        );
        Ok(())
    }

    #[test]
    fn replies() -> Result<()> {
        let ev = UhidEvent::get_report_reply(9, 0, &[1, 2])?;
        let bytes = ev.as_bytes();
        assert_eq!(ev.event_type(), EventType::GET_REPORT_REPLY);
        assert_eq!(bytes[4..8], 9_u32.to_ne_bytes());
        assert_eq!(bytes[8..10], 0_u16.to_ne_bytes());
        assert_eq!(bytes[10..12], 2_u16.to_ne_bytes());
        assert_eq!(&bytes[12..14], &[1, 2]);

        let ev = UhidEvent::set_report_reply(3, libc::EIO as u16);
        let bytes = ev.as_bytes();
        assert_eq!(ev.event_type(), EventType::SET_REPORT_REPLY);
        assert_eq!(bytes[4..8], 3_u32.to_ne_bytes());
        assert_eq!(bytes[8..10], (libc::EIO as u16).to_ne_bytes());
        assert!(bytes[10..].iter().all(|b| *b == 0));
        Ok(())
    }

    #[test]
    fn from_bytes_checks_length() {
        let ev = UhidEvent::destroy();
        assert_eq!(UhidEvent::from_bytes(ev.as_bytes()).unwrap(), ev);
        assert!(UhidEvent::from_bytes(&ev.as_bytes()[1..]).is_err());
        assert!(UhidEvent::from_bytes(&[0; UHID_EVENT_SIZE + 1]).is_err());
    }

    fn kernel_record(ty: u32, fill: impl FnOnce(&mut [u8])) -> UhidEvent {
        let mut bytes = vec![0; UHID_EVENT_SIZE];
        bytes[..4].copy_from_slice(&ty.to_ne_bytes());
        fill(&mut bytes[4..]);
        UhidEvent::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn decode_kernel_events() -> Result<()> {
        let ev = kernel_record(UHID_START, |p| p[..8].copy_from_slice(&5_u64.to_ne_bytes()));
        let KernelEvent::Start { dev_flags } = ev.decode()? else {
            panic!("expected START");
        };
        assert!(dev_flags.contains(DevFlags::NUMBERED_FEATURE_REPORTS));
        assert!(!dev_flags.contains(DevFlags::NUMBERED_OUTPUT_REPORTS));
        assert!(dev_flags.contains(DevFlags::NUMBERED_INPUT_REPORTS));

        assert_eq!(kernel_record(UHID_STOP, |_| {}).decode()?, KernelEvent::Stop);
        assert_eq!(kernel_record(UHID_OPEN, |_| {}).decode()?, KernelEvent::Open);
        assert_eq!(kernel_record(UHID_CLOSE, |_| {}).decode()?, KernelEvent::Close);

        let ev = kernel_record(UHID_OUTPUT, |p| {
            p[..2].copy_from_slice(&[0x02, 0x01]);
            p[UHID_DATA_MAX..][..2].copy_from_slice(&2_u16.to_ne_bytes());
            p[UHID_DATA_MAX + 2] = UHID_OUTPUT_REPORT;
        });
        assert_eq!(
            ev.decode()?,
            KernelEvent::Output {
                report_type: ReportType::OUTPUT,
                data: vec![0x02, 0x01],
            }
        );

        let ev = kernel_record(UHID_GET_REPORT, |p| {
            p[..4].copy_from_slice(&42_u32.to_ne_bytes());
            p[4] = 5;
            p[5] = UHID_FEATURE_REPORT;
        });
        assert_eq!(
            ev.decode()?,
            KernelEvent::GetReport {
                id: 42,
                report_number: 5,
                report_type: ReportType::FEATURE,
            }
        );

        let ev = kernel_record(UHID_SET_REPORT, |p| {
            p[..4].copy_from_slice(&43_u32.to_ne_bytes());
            p[4] = 5;
            p[5] = UHID_FEATURE_REPORT;
            p[6..8].copy_from_slice(&1_u16.to_ne_bytes());
            p[8] = 0x0a;
        });
        assert_eq!(
            ev.decode()?,
            KernelEvent::SetReport {
                id: 43,
                report_number: 5,
                report_type: ReportType::FEATURE,
                data: vec![0x0a],
            }
        );
        Ok(())
    }

    #[test]
    fn decode_oversized_report() {
        let ev = kernel_record(UHID_OUTPUT, |p| {
            p[UHID_DATA_MAX..][..2].copy_from_slice(&5000_u16.to_ne_bytes());
        });
        assert!(matches!(ev.decode(), Err(Error::InvalidEvent(_))));
    }

    #[test]
    fn decode_echoed_request() -> Result<()> {
        let ev = UhidEvent::create(&DeviceConfig::touchpad());
        assert_eq!(ev.decode()?, KernelEvent::Other(EventType::CREATE2));
        let ev = kernel_record(0xdead, |_| {});
        assert_eq!(ev.decode()?.event_type(), EventType::from_raw(0xdead));
        Ok(())
    }

    #[test]
    fn debug_names() {
        assert_eq!(format!("{:?}", EventType::CREATE2), "UHID_CREATE2");
        assert_eq!(format!("{:?}", EventType(99)), "EventType(99)");
        assert_eq!(format!("{:?}", ReportType::FEATURE), "UHID_FEATURE_REPORT");
        assert_eq!(
            format!("{:?}", DevFlags::from_raw(0b1001)),
            "{NUMBERED_FEATURE_REPORTS, 0x8}"
        );
        assert_eq!(
            format!("{:?}", UhidEvent::destroy()),
            "UhidEvent { type: UHID_DESTROY, .. }"
        );
    }
}
