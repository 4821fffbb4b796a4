//! Identity of the built-in virtual touchpad.
//!
//! [`DeviceConfig::touchpad`][crate::DeviceConfig::touchpad] assembles these into a ready-to-use
//! configuration.

use crate::raw::uhid::{HID_MAX_DESCRIPTOR_SIZE, UHID_NAME_SIZE};

/// Device name reported to the kernel.
pub const NAME: &str = "uhid-touchpad";

pub const VENDOR: u32 = 0x15d9;
pub const PRODUCT: u32 = 0x0a37;

/// HID report ID of the touch report described by [`REPORT_DESCRIPTOR`].
pub const REPORT_ID: u8 = 4;

/// Report descriptor of the touchpad.
///
/// Describes a single-finger digitizer report (ID 4) of 12 bytes: confidence and tip bits, a
/// 4-bit contact ID, 16-bit X and Y, a 16-bit scan time, an 8-bit contact count, one button and
/// 16 constant bits. This crate treats it as opaque data.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0d, // USAGE_PAGE (Digitizers)
    0x09, 0x05, // USAGE (Touch Pad)
    0xa1, 0x01, // COLLECTION (Application)
    0x85, REPORT_ID, //   REPORT_ID (4)
    0x09, 0x22, //   USAGE (Finger)
    0xa1, 0x02, //   COLLECTION (Logical)
    0x15, 0x00, //     LOGICAL_MINIMUM (0)
    0x25, 0x01, //     LOGICAL_MAXIMUM (1)
    0x09, 0x47, //     USAGE (Confidence)
    0x09, 0x42, //     USAGE (Tip Switch)
    0x95, 0x02, //     REPORT_COUNT (2)
    0x75, 0x01, //     REPORT_SIZE (1)
    0x81, 0x02, //     INPUT (Data,Var,Abs)
    0x95, 0x02, //     REPORT_COUNT (2)
    0x81, 0x03, //     INPUT (Cnst,Var,Abs)
    0x75, 0x04, //     REPORT_SIZE (4)
    0x25, 0x0f, //     LOGICAL_MAXIMUM (15)
    0x09, 0x51, //     USAGE (Contact Identifier)
    0x95, 0x01, //     REPORT_COUNT (1)
    0x81, 0x02, //     INPUT (Data,Var,Abs)
    0x05, 0x01, //     USAGE_PAGE (Generic Desktop)
    0x26, 0xff, 0x0f, //     LOGICAL_MAXIMUM (4095)
    0x75, 0x10, //     REPORT_SIZE (16)
    0x55, 0x0e, //     UNIT_EXPONENT (-2)
    0x65, 0x11, //     UNIT (SI Linear: cm)
    0x35, 0x00, //     PHYSICAL_MINIMUM (0)
    0x46, 0x90, 0x01, //     PHYSICAL_MAXIMUM (400)
    0x09, 0x30, //     USAGE (X)
    0x81, 0x02, //     INPUT (Data,Var,Abs)
    0x46, 0x13, 0x01, //     PHYSICAL_MAXIMUM (275)
    0x09, 0x31, //     USAGE (Y)
    0x81, 0x02, //     INPUT (Data,Var,Abs)
    0xc0, //   END_COLLECTION
    0x05, 0x0d, //   USAGE_PAGE (Digitizers)
    0x55, 0x0c, //   UNIT_EXPONENT (-4)
    0x66, 0x01, 0x10, //   UNIT (Seconds)
    0x47, 0xff, 0xff, 0x00, 0x00, //   PHYSICAL_MAXIMUM (65535)
    0x27, 0xff, 0xff, 0x00, 0x00, //   LOGICAL_MAXIMUM (65535)
    0x75, 0x10, //   REPORT_SIZE (16)
    0x95, 0x01, //   REPORT_COUNT (1)
    0x09, 0x56, //   USAGE (Scan Time)
    0x81, 0x02, //   INPUT (Data,Var,Abs)
    0x65, 0x00, //   UNIT (None)
    0x55, 0x00, //   UNIT_EXPONENT (0)
    0x45, 0x00, //   PHYSICAL_MAXIMUM (0)
    0x09, 0x54, //   USAGE (Contact Count)
    0x25, 0x7f, //   LOGICAL_MAXIMUM (127)
    0x75, 0x08, //   REPORT_SIZE (8)
    0x81, 0x02, //   INPUT (Data,Var,Abs)
    0x05, 0x09, //   USAGE_PAGE (Button)
    0x09, 0x01, //   USAGE (Button 1)
    0x25, 0x01, //   LOGICAL_MAXIMUM (1)
    0x75, 0x01, //   REPORT_SIZE (1)
    0x81, 0x02, //   INPUT (Data,Var,Abs)
    0x95, 0x07, //   REPORT_COUNT (7)
    0x81, 0x03, //   INPUT (Cnst,Var,Abs)
    0x75, 0x10, //   REPORT_SIZE (16)
    0x95, 0x01, //   REPORT_COUNT (1)
    0x81, 0x03, //   INPUT (Cnst,Var,Abs)
    0xc0, // END_COLLECTION
];

const _: () = assert!(REPORT_DESCRIPTOR.len() <= HID_MAX_DESCRIPTOR_SIZE);
const _: () = assert!(NAME.len() < UHID_NAME_SIZE);
