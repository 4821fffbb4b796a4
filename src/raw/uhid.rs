//! `linux/uhid.h`.
//!
//! All structures are `__attribute__((__packed__))` in the kernel header, so the record layout
//! has no padding anywhere and is identical on every architecture (modulo endianness).

#![expect(non_camel_case_types)]
#![allow(dead_code)] // legacy constants are kept for reference

pub const UHID_DATA_MAX: usize = 4096;
/// From `linux/hid.h`.
pub const HID_MAX_DESCRIPTOR_SIZE: usize = 4096;

pub const UHID_NAME_SIZE: usize = 128;
pub const UHID_PHYS_SIZE: usize = 64;
pub const UHID_UNIQ_SIZE: usize = 64;

pub const UHID_LEGACY_CREATE: u32 = 0;
pub const UHID_DESTROY: u32 = 1;
pub const UHID_START: u32 = 2;
pub const UHID_STOP: u32 = 3;
pub const UHID_OPEN: u32 = 4;
pub const UHID_CLOSE: u32 = 5;
pub const UHID_OUTPUT: u32 = 6;
pub const UHID_LEGACY_OUTPUT_EV: u32 = 7;
pub const UHID_LEGACY_INPUT: u32 = 8;
pub const UHID_GET_REPORT: u32 = 9;
pub const UHID_GET_REPORT_REPLY: u32 = 10;
pub const UHID_CREATE2: u32 = 11;
pub const UHID_INPUT2: u32 = 12;
pub const UHID_SET_REPORT: u32 = 13;
pub const UHID_SET_REPORT_REPLY: u32 = 14;

pub const UHID_FEATURE_REPORT: u8 = 0;
pub const UHID_OUTPUT_REPORT: u8 = 1;
pub const UHID_INPUT_REPORT: u8 = 2;

pub const UHID_DEV_NUMBERED_FEATURE_REPORTS: u64 = 1 << 0;
pub const UHID_DEV_NUMBERED_OUTPUT_REPORTS: u64 = 1 << 1;
pub const UHID_DEV_NUMBERED_INPUT_REPORTS: u64 = 1 << 2;

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_create2_req {
    pub name: [u8; UHID_NAME_SIZE],
    pub phys: [u8; UHID_PHYS_SIZE],
    pub uniq: [u8; UHID_UNIQ_SIZE],
    pub rd_size: u16,
    pub bus: u16,
    pub vendor: u32,
    pub product: u32,
    pub version: u32,
    pub country: u32,
    pub rd_data: [u8; HID_MAX_DESCRIPTOR_SIZE],
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_start_req {
    pub dev_flags: u64,
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_input2_req {
    pub size: u16,
    pub data: [u8; UHID_DATA_MAX],
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_output_req {
    pub data: [u8; UHID_DATA_MAX],
    pub size: u16,
    pub rtype: u8,
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_get_report_req {
    pub id: u32,
    pub rnum: u8,
    pub rtype: u8,
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_get_report_reply_req {
    pub id: u32,
    pub err: u16,
    pub size: u16,
    pub data: [u8; UHID_DATA_MAX],
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_set_report_req {
    pub id: u32,
    pub rnum: u8,
    pub rtype: u8,
    pub size: u16,
    pub data: [u8; UHID_DATA_MAX],
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_set_report_reply_req {
    pub id: u32,
    pub err: u16,
}

// The legacy `create`, `input` and `output_ev` members are left out. They are all smaller than
// `create2`, which determines the size of the union.
#[derive(Clone, Copy)]
#[repr(C, packed)]
pub union uhid_event_union {
    pub output: uhid_output_req,
    pub get_report: uhid_get_report_req,
    pub get_report_reply: uhid_get_report_reply_req,
    pub create2: uhid_create2_req,
    pub input2: uhid_input2_req,
    pub set_report: uhid_set_report_req,
    pub set_report_reply: uhid_set_report_reply_req,
    pub start: uhid_start_req,
}

#[derive(Clone, Copy)]
#[repr(C, packed)]
pub struct uhid_event {
    pub type_: u32,
    pub u: uhid_event_union,
}

pub const UHID_EVENT_SIZE: usize = size_of::<uhid_event>();

const _: () = assert!(size_of::<uhid_create2_req>() == 4372);
const _: () = assert!(UHID_EVENT_SIZE == 4376);
