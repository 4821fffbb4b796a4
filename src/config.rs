//! Identity and report descriptor of a virtual HID device.

use std::{
    borrow::Cow,
    fmt::{self, LowerHex},
};

use crate::{
    Bus, Error, Result,
    raw::uhid::{HID_MAX_DESCRIPTOR_SIZE, UHID_NAME_SIZE, UHID_PHYS_SIZE, UHID_UNIQ_SIZE},
    touchpad,
};

/// Everything the kernel needs to know to register a UHID device.
///
/// All values are validated when they are set, so that building a `UHID_CREATE2` request from a
/// [`DeviceConfig`] can never fail or silently truncate anything.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConfigRepr", into = "ConfigRepr")
)]
pub struct DeviceConfig {
    pub(crate) name: String,
    pub(crate) phys: String,
    pub(crate) uniq: String,
    pub(crate) report_descriptor: Cow<'static, [u8]>,
    pub(crate) bus: Bus,
    pub(crate) vendor: u32,
    pub(crate) product: u32,
    pub(crate) version: u32,
    pub(crate) country: u32,
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Hex<T: LowerHex>(T);
        impl<T: LowerHex> fmt::Debug for Hex<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#06x}", self.0)
            }
        }

        f.debug_struct("DeviceConfig")
            .field("name", &self.name)
            .field("phys", &self.phys)
            .field("uniq", &self.uniq)
            .field("bus", &self.bus)
            .field("vendor", &Hex(self.vendor))
            .field("product", &Hex(self.product))
            .field("version", &Hex(self.version))
            .field("country", &self.country)
            .field("report_descriptor_len", &self.report_descriptor.len())
            .finish()
    }
}

impl DeviceConfig {
    /// Creates a configuration with the given device name and report descriptor.
    ///
    /// The bus defaults to [`Bus::USB`], all IDs default to 0, and `phys`/`uniq` are empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `name` contains a NUL byte or doesn't fit into the
    /// 128-byte name field (including its terminator), or if `report_descriptor` is empty or
    /// longer than 4096 bytes.
    pub fn new(name: &str, report_descriptor: impl Into<Cow<'static, [u8]>>) -> Result<Self> {
        let report_descriptor = report_descriptor.into();
        check_descriptor(&report_descriptor)?;
        Ok(Self {
            name: check_str("name", name, UHID_NAME_SIZE)?,
            phys: String::new(),
            uniq: String::new(),
            report_descriptor,
            bus: Bus::USB,
            vendor: 0,
            product: 0,
            version: 0,
            country: 0,
        })
    }

    /// The built-in touchpad: `uhid-touchpad`, USB, `15d9:0a37`.
    pub fn touchpad() -> Self {
        // The constants are checked by `const` assertions in `touchpad`.
        Self {
            name: touchpad::NAME.to_string(),
            phys: String::new(),
            uniq: String::new(),
            report_descriptor: Cow::Borrowed(touchpad::REPORT_DESCRIPTOR),
            bus: Bus::USB,
            vendor: touchpad::VENDOR,
            product: touchpad::PRODUCT,
            version: 0,
            country: 0,
        }
    }

    /// Sets the physical path of the device (eg. `usb-0000:00:14.0-1/input0`).
    pub fn with_phys(mut self, phys: &str) -> Result<Self> {
        self.phys = check_str("phys", phys, UHID_PHYS_SIZE)?;
        Ok(self)
    }

    /// Sets the unique identifier (typically a serial number) of the device.
    pub fn with_uniq(mut self, uniq: &str) -> Result<Self> {
        self.uniq = check_str("uniq", uniq, UHID_UNIQ_SIZE)?;
        Ok(self)
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// Sets the vendor and product IDs.
    pub fn with_ids(mut self, vendor: u32, product: u32) -> Self {
        self.vendor = vendor;
        self.product = product;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the HID country code (`bCountryCode`). 0 means "not localized".
    pub fn with_country(mut self, country: u32) -> Self {
        self.country = country;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn phys(&self) -> &str {
        &self.phys
    }

    #[inline]
    pub fn uniq(&self) -> &str {
        &self.uniq
    }

    #[inline]
    pub fn report_descriptor(&self) -> &[u8] {
        &self.report_descriptor
    }

    #[inline]
    pub fn bus(&self) -> Bus {
        self.bus
    }

    #[inline]
    pub fn vendor(&self) -> u32 {
        self.vendor
    }

    #[inline]
    pub fn product(&self) -> u32 {
        self.product
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn country(&self) -> u32 {
        self.country
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::touchpad()
    }
}

/// Strings are copied into fixed-size fields and need room for a NUL terminator.
fn check_str(field: &str, value: &str, size: usize) -> Result<String> {
    if value.as_bytes().contains(&0) {
        return Err(Error::InvalidConfig(format!("{field} contains a NUL byte")));
    }
    if value.len() >= size {
        return Err(Error::InvalidConfig(format!(
            "{field} is {} bytes long, but must be shorter than {size} bytes",
            value.len()
        )));
    }
    Ok(value.to_string())
}

fn check_descriptor(rd: &[u8]) -> Result<()> {
    // The kernel rejects empty descriptors with `EINVAL`.
    if rd.is_empty() {
        return Err(Error::InvalidConfig("report descriptor is empty".into()));
    }
    if rd.len() > HID_MAX_DESCRIPTOR_SIZE {
        return Err(Error::InvalidConfig(format!(
            "report descriptor is {} bytes long, the maximum is {HID_MAX_DESCRIPTOR_SIZE}",
            rd.len()
        )));
    }
    Ok(())
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ConfigRepr {
    name: String,
    #[serde(default)]
    phys: String,
    #[serde(default)]
    uniq: String,
    report_descriptor: Vec<u8>,
    bus: Bus,
    vendor: u32,
    product: u32,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    country: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<ConfigRepr> for DeviceConfig {
    type Error = Error;

    fn try_from(repr: ConfigRepr) -> Result<Self> {
        Ok(DeviceConfig::new(&repr.name, repr.report_descriptor)?
            .with_phys(&repr.phys)?
            .with_uniq(&repr.uniq)?
            .with_bus(repr.bus)
            .with_ids(repr.vendor, repr.product)
            .with_version(repr.version)
            .with_country(repr.country))
    }
}

#[cfg(feature = "serde")]
impl From<DeviceConfig> for ConfigRepr {
    fn from(config: DeviceConfig) -> Self {
        Self {
            name: config.name,
            phys: config.phys,
            uniq: config.uniq,
            report_descriptor: config.report_descriptor.into_owned(),
            bus: config.bus,
            vendor: config.vendor,
            product: config.product,
            version: config.version,
            country: config.country,
        }
    }
}
