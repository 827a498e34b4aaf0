//! # Simple logging providers
//!
//! There is no console while the boot sequence runs. Records are therefore buffered and drained
//! later by the host, once a transport is available.

/// Logger module which logs into a ring buffer to allow deferred log handling.
pub mod rb {
    use core::cell::RefCell;
    use core::fmt::Write as _;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use critical_section::Mutex;
    use log::{LevelFilter, set_logger, set_max_level};
    use ringbuf::{
        StaticRb,
        traits::{Consumer, Observer, Producer},
    };

    /// Maximum number of buffered frames.
    pub const FRAME_QUEUE_DEPTH: usize = 32;
    /// Maximum length of a single formatted record. Longer records are truncated.
    pub const MAX_FRAME_LEN: usize = 256;
    pub const RING_BUF_SIZE: usize = 2048;

    static LOGGER_INIT_DONE: AtomicBool = AtomicBool::new(false);

    /// Logger implementation which logs frames into a ring buffer and queues the frame sizes.
    ///
    /// Records which do not fit into the ring buffer or the frame queue are dropped and counted.
    pub struct Logger {
        frame_queue: Mutex<RefCell<heapless::Deque<usize, FRAME_QUEUE_DEPTH>>>,
        data_buf: Mutex<RefCell<heapless::String<MAX_FRAME_LEN>>>,
        ring_buf: Mutex<RefCell<Option<StaticRb<u8, RING_BUF_SIZE>>>>,
        dropped: AtomicUsize,
    }

    unsafe impl Send for Logger {}
    unsafe impl Sync for Logger {}

    static LOGGER_RB: Logger = Logger::new();

    impl Default for Logger {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Logger {
        pub const fn new() -> Self {
            Self {
                frame_queue: Mutex::new(RefCell::new(heapless::Deque::new())),
                data_buf: Mutex::new(RefCell::new(heapless::String::new())),
                ring_buf: Mutex::new(RefCell::new(None)),
                dropped: AtomicUsize::new(0),
            }
        }

        /// Length of the oldest buffered frame.
        pub fn next_frame_len(&self) -> Option<usize> {
            critical_section::with(|cs| self.frame_queue.borrow(cs).borrow().front().copied())
        }

        /// Pop the oldest frame into `buf` and return the number of bytes written.
        ///
        /// The part of the frame which does not fit into `buf` is discarded.
        pub fn read_next_frame(&self, buf: &mut [u8]) -> Option<usize> {
            critical_section::with(|cs| {
                let frame_len = self.frame_queue.borrow(cs).borrow_mut().pop_front()?;
                let mut rb_opt = self.ring_buf.borrow(cs).borrow_mut();
                let rb = rb_opt.as_mut()?;
                let read_len = core::cmp::min(frame_len, buf.len());
                let read = rb.pop_slice(&mut buf[0..read_len]);
                rb.skip(frame_len - read_len);
                Some(read)
            })
        }

        /// Number of records dropped because the buffers were full.
        pub fn dropped(&self) -> usize {
            self.dropped.load(Ordering::Relaxed)
        }
    }

    impl log::Log for Logger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            critical_section::with(|cs| {
                let mut buf = self.data_buf.borrow(cs).borrow_mut();
                buf.clear();
                // Truncation is acceptable.
                let _ = writeln!(buf, "{} - {}\r", record.level(), record.args());

                let mut frame_queue = self.frame_queue.borrow(cs).borrow_mut();
                let mut rb_opt = self.ring_buf.borrow(cs).borrow_mut();
                let rb = rb_opt.get_or_insert_with(StaticRb::default);
                if frame_queue.is_full() || rb.vacant_len() < buf.len() {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                rb.push_slice(buf.as_bytes());
                let _ = frame_queue.push_back(buf.len());
            });
        }

        fn flush(&self) {}
    }

    /// Install the ring buffer logger. Subsequent calls are ignored.
    pub fn init(level: LevelFilter) {
        if LOGGER_INIT_DONE.swap(true, Ordering::Relaxed) {
            return;
        }
        if set_logger(&LOGGER_RB).is_err() {
            return;
        }
        set_max_level(level);
    }

    pub fn logger() -> &'static Logger {
        &LOGGER_RB
    }

    pub fn read_next_frame(buf: &mut [u8]) -> Option<usize> {
        LOGGER_RB.read_next_frame(buf)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use log::{Level, Log, Record};

        #[test]
        fn test_frames() {
            let logger = Logger::new();
            logger.log(
                &Record::builder()
                    .args(format_args!("early init done"))
                    .level(Level::Info)
                    .build(),
            );
            logger.log(
                &Record::builder()
                    .args(format_args!("handoff"))
                    .level(Level::Debug)
                    .build(),
            );
            assert_eq!(logger.next_frame_len(), Some("INFO - early init done\r\n".len()));

            let mut buf = [0; 64];
            let len = logger.read_next_frame(&mut buf).unwrap();
            assert_eq!(&buf[0..len], b"INFO - early init done\r\n");

            // Truncated read, the remainder of the frame is discarded.
            let len = logger.read_next_frame(&mut buf[0..5]).unwrap();
            assert_eq!(&buf[0..len], b"DEBUG");
            assert_eq!(logger.read_next_frame(&mut buf), None);
            assert_eq!(logger.dropped(), 0);
        }

        #[test]
        fn test_queue_full_drops() {
            let logger = Logger::new();
            for _ in 0..FRAME_QUEUE_DEPTH + 2 {
                logger.log(
                    &Record::builder()
                        .args(format_args!("x"))
                        .level(Level::Warn)
                        .build(),
                );
            }
            assert_eq!(logger.dropped(), 2);
        }
    }
}
