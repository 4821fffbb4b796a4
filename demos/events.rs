//! Creates a device from the built-in touchpad identity and prints every request the kernel sends,
//! answering report requests.

use std::{env, io};

use uhidil::{DEFAULT_PATH, DeviceConfig, KernelEvent, UhidDevice};

fn main() -> uhidil::Result<()> {
    env_logger::init();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_PATH.to_string());
    let mut dev = UhidDevice::open(&path)?;
    dev.create(&DeviceConfig::touchpad())?;
    println!("Created device on {path}; press Ctrl+C to exit");

    loop {
        let event = dev.read_event()?;
        println!("Received event: {event:?}");
        match event {
            KernelEvent::GetReport { id, .. } => {
                dev.reply_get_report(id, Err(io::ErrorKind::Unsupported.into()))?;
            }
            KernelEvent::SetReport { id, .. } => dev.reply_set_report(id, Ok(()))?,
            KernelEvent::Stop => break,
            _ => {}
        }
    }

    dev.destroy();
    Ok(())
}
