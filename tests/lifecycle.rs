//! Device lifecycle against regular files and an in-memory transport.

use std::{
    cell::RefCell,
    env, fs,
    hash::{BuildHasher, Hasher, RandomState},
    io::{self, Read, Write},
    path::PathBuf,
    rc::Rc,
};

use uhidil::{
    DeviceConfig, Error, State, Transport, UhidDevice, UhidEvent, destroy_and_close,
    event::{EventType, UHID_EVENT_SIZE},
    open_and_create, write_event,
};

/// A regular file stands in for the device node; it records every record written to it.
struct TempNode(PathBuf);

impl TempNode {
    fn new() -> io::Result<Self> {
        let hash = RandomState::new().build_hasher().finish();
        let path = env::temp_dir().join(format!("uhidil-test-{hash}"));
        fs::write(&path, [])?;
        Ok(Self(path))
    }

    fn records(&self) -> io::Result<Vec<UhidEvent>> {
        let bytes = fs::read(&self.0)?;
        assert_eq!(bytes.len() % UHID_EVENT_SIZE, 0);
        Ok(bytes
            .chunks(UHID_EVENT_SIZE)
            .map(|chunk| UhidEvent::from_bytes(chunk).unwrap())
            .collect())
    }
}

impl Drop for TempNode {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn file_lifecycle() -> uhidil::Result<()> {
    let node = TempNode::new()?;
    let config = DeviceConfig::touchpad();

    let mut dev = open_and_create(&node.0, &config)?;
    assert_eq!(dev.state(), State::Created);
    dev.write_input(&[4, 0b11, 0x10, 0x00, 0x20, 0x00, 0, 0, 1, 0, 0, 0])?;
    destroy_and_close(dev);

    let records = node.records()?;
    let types: Vec<_> = records.iter().map(|ev| ev.event_type()).collect();
    assert_eq!(
        types,
        [EventType::CREATE2, EventType::INPUT2, EventType::DESTROY]
    );
    assert_eq!(records[0], UhidEvent::create(&config));
    assert_eq!(records[2], UhidEvent::destroy());
    Ok(())
}

#[test]
fn open_errors() {
    let err = UhidDevice::open("/nonexistent/uhid").unwrap_err();
    assert!(
        matches!(&err, Error::Open { source, .. } if source.kind() == io::ErrorKind::NotFound),
        "{err:?}"
    );

    // Directories can't be opened for writing.
    let err = open_and_create(env::temp_dir(), &DeviceConfig::touchpad()).unwrap_err();
    assert!(matches!(err, Error::Open { .. }), "{err:?}");
}

#[derive(Default)]
struct Shared {
    records: Vec<Vec<u8>>,
    accept: Option<usize>,
    closed: bool,
}

/// In-memory device node. Clones share state, so the test can observe the node after the device
/// handle has been consumed.
#[derive(Clone, Default)]
struct FakeNode(Rc<RefCell<Shared>>);

impl Write for FakeNode {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut shared = self.0.borrow_mut();
        if shared.closed {
            return Err(io::Error::from_raw_os_error(9)); // EBADF
        }
        let n = shared.accept.unwrap_or(buf.len()).min(buf.len());
        shared.records.push(buf[..n].to_vec());
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FakeNode {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::WouldBlock.into())
    }
}

impl Transport for FakeNode {
    fn close(self) -> io::Result<()> {
        self.0.borrow_mut().closed = true;
        Ok(())
    }
}

#[test]
fn fake_node_scenario() {
    let node = FakeNode::default();
    let mut dev = UhidDevice::from_transport(node.clone());
    dev.create(&DeviceConfig::touchpad()).unwrap();
    dev.destroy();

    let shared = node.0.borrow();
    assert_eq!(shared.records.len(), 2);
    let create = UhidEvent::from_bytes(&shared.records[0]).unwrap();
    assert_eq!(create.event_type(), EventType::CREATE2);
    let destroy = UhidEvent::from_bytes(&shared.records[1]).unwrap();
    assert_eq!(destroy.event_type(), EventType::DESTROY);
    assert!(shared.closed);
    drop(shared);

    let err = write_event(&mut node.clone(), &UhidEvent::destroy()).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err:?}");
}

#[test]
fn fake_node_short_write() {
    let node = FakeNode::default();
    node.0.borrow_mut().accept = Some(UHID_EVENT_SIZE - 1);
    let mut dev = UhidDevice::from_transport(node.clone());

    let err = dev.create(&DeviceConfig::touchpad()).unwrap_err();
    assert!(
        matches!(
            err,
            Error::ProtocolWrite {
                expected_size,
                actual_size,
            } if expected_size == UHID_EVENT_SIZE && actual_size == UHID_EVENT_SIZE - 1
        ),
        "{err:?}"
    );
    assert_eq!(dev.state(), State::Opened);
    assert!(!node.0.borrow().closed);

    dev.destroy();
    assert!(node.0.borrow().closed);
}
