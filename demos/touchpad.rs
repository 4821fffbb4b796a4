//! Creates the virtual touchpad and drags a finger around in a circle.

use std::{f32::consts::TAU, io, thread, time::Duration};

use uhidil::{DEFAULT_PATH, DeviceConfig, KernelEvent, UhidDevice, touchpad};

const STEPS: u16 = 200;

fn touch_report(contact_id: u8, tip: bool, x: u16, y: u16, scan_time: u16) -> [u8; 12] {
    let flags = 0b01 | (u8::from(tip) << 1) | (contact_id << 4);
    let [x_lo, x_hi] = x.to_le_bytes();
    let [y_lo, y_hi] = y.to_le_bytes();
    let [t_lo, t_hi] = scan_time.to_le_bytes();
    let count = if contact_id == 0 { 1 } else { 0 };
    [touchpad::REPORT_ID, flags, x_lo, x_hi, y_lo, y_hi, t_lo, t_hi, count, 0, 0, 0]
}

fn main() -> uhidil::Result<()> {
    env_logger::init();

    let mut dev = UhidDevice::open(DEFAULT_PATH)?;
    dev.set_nonblocking(true)?;
    if let Err(e) = dev.create(&DeviceConfig::touchpad()) {
        eprintln!("failed to create touchpad: {e}");
        dev.destroy();
        return Err(e);
    }
    println!("Created device");

    for step in 0..STEPS {
        let pending = dev.events().collect::<uhidil::Result<Vec<_>>>()?;
        for ev in pending {
            match ev {
                KernelEvent::GetReport { id, .. } => {
                    dev.reply_get_report(id, Err(io::ErrorKind::Unsupported.into()))?
                }
                ev => println!("Received event: {ev:?}"),
            }
        }

        let angle = f32::from(step) / f32::from(STEPS) * TAU;
        let x = (2048.0 + 1000.0 * angle.cos()) as u16;
        let y = (2048.0 + 1000.0 * angle.sin()) as u16;
        dev.write_input(&touch_report(0, true, x, y, step.wrapping_mul(100)))?;
        thread::sleep(Duration::from_millis(10));
    }
    dev.write_input(&touch_report(0, false, 0, 0, STEPS.wrapping_mul(100)))?;

    dev.destroy();
    println!("Destroyed device");
    Ok(())
}

