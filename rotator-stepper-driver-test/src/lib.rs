
use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{Read, Write},
    rc::Rc,
};

// used to mock a serial interface to test the rotator driver
// the idea is that read contains bytes the controller would send and write
// bytes the driver is expected to send. once they are written/read they are
// removed from the corresponding queue. reading from an empty queue panics,
// and so does writing anything that doesn't match the front of the expected
// queue. add_read and add_write fill the queues, add_exchange does both for
// a command/response pair.
//
// a read call serves at most one line. responses from the controller arrive
// one line at a time, and serving them that way keeps a scripted response
// from being buffered away (and discarded) before the driver asks for it.
//
// don't be alarmed if you think it's slow or inefficient or anything, it
// doesn't need to be fast nor pretty nor efficient, its just for testing.
// it needs to be easy
pub struct Interface {
    read: Rc<RefCell<VecDeque<u8>>>,
    write: Rc<RefCell<VecDeque<u8>>>,
}

impl Read for Interface {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut q = self.read.as_ref().borrow_mut();
        if q.is_empty() {
            panic!("read queue was empty")
        }
        let mut n = 0;
        while n < buf.len() {
            match q.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                    if b == b'\n' {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl Write for Interface {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut q = self.write.as_ref().borrow_mut();
        if q.is_empty() {
            panic!(
                "write queue was empty, driver wrote {:?}",
                String::from_utf8_lossy(buf)
            )
        }
        for &b in buf {
            match q.pop_front() {
                Some(e) if e == b => (),
                Some(e) => panic!(
                    "driver wrote {:?}, expected write starting with {:?}",
                    String::from_utf8_lossy(buf),
                    e as char
                ),
                None => panic!(
                    "driver wrote {:?}, which is longer than what was expected",
                    String::from_utf8_lossy(buf)
                ),
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Clone for Interface {
    fn clone(&self) -> Self {
        Interface {
            read: self.read.clone(),
            write: self.write.clone(),
        }
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface {
    pub fn new() -> Self {
        Interface {
            read: Rc::new(RefCell::new(VecDeque::new())),
            write: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Queues a line the controller will send to the driver
    pub fn add_read(&mut self, buf: &[u8]) {
        self.read.as_ref().borrow_mut().extend(buf.iter().copied())
    }

    /// Queues bytes the driver is expected to write next
    pub fn add_write(&mut self, buf: &[u8]) {
        self.write.as_ref().borrow_mut().extend(buf.iter().copied())
    }

    /// Queues an expected command together with the response it triggers
    pub fn add_exchange(&mut self, cmd: &[u8], response: &[u8]) {
        self.add_write(cmd);
        self.add_read(response);
    }

    /// True once every expected write happened and every queued response
    /// was read
    pub fn is_empty(&self) -> bool {
        self.read.as_ref().borrow().is_empty() && self.write.as_ref().borrow().is_empty()
    }
}
