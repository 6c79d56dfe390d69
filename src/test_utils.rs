use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::ptr::NonNull;

use allocator_api2::alloc::{AllocError, Allocator, Global};

/// Asserts a list's elements, in order, and its length.
///
/// Takes either a bracketed list of byte-string expressions, which may differ in length,
/// or any expression whose items index to `[u8]`.
macro_rules! assert_contents {
    ($list:expr, [$($item:expr),* $(,)?]) => {{
        let expected: &[&[u8]] = &[$(&$item[..]),*];
        let actual: std::vec::Vec<&[u8]> = $list.iter().map(|link| link.as_bytes()).collect();
        assert_eq!(actual, expected);
        assert_eq!($list.len(), expected.len());
    }};
    ($list:expr, $expected:expr) => {{
        let items = $expected;
        let expected: std::vec::Vec<&[u8]> = items.iter().map(|item| &item[..]).collect();
        let actual: std::vec::Vec<&[u8]> = $list.iter().map(|link| link.as_bytes()).collect();
        assert_eq!(actual, expected);
        assert_eq!($list.len(), expected.len());
    }};
}

/// Serves a limited number of allocations from [`Global`], then refuses,
/// keeping count of the allocations still live.
#[derive(Debug, Default)]
pub struct Budgeted {
    remaining: Cell<usize>,
    live: Cell<usize>,
}

impl Budgeted {
    pub fn new(budget: usize) -> Self {
        Self { remaining: Cell::new(budget), live: Cell::new(0) }
    }

    /// Reset the number of allocations that will still be served.
    pub fn refill(&self, budget: usize) {
        self.remaining.set(budget);
    }

    /// Number of allocations not yet deallocated.
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

unsafe impl Allocator for Budgeted {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if self.remaining.get() == 0 {
            return Err(AllocError);
        }

        let allocation = Global.allocate(layout)?;
        self.remaining.set(self.remaining.get() - 1);
        self.live.set(self.live.get() + 1);
        Ok(allocation)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        Global.deallocate(ptr, layout);
    }
}

/// A log record as seen by [`capture_logs`].
#[derive(Debug)]
pub struct Captured {
    pub level: log::Level,
    pub file: std::string::String,
    pub message: std::string::String,
}

std::thread_local! {
    static CAPTURED: RefCell<std::vec::Vec<Captured>> = const { RefCell::new(std::vec::Vec::new()) };
}

struct CaptureLogger;

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let captured = Captured {
            level: record.level(),
            file: record.file().unwrap_or_default().into(),
            message: std::format!("{}", record.args()),
        };
        CAPTURED.with(|records| records.borrow_mut().push(captured));
    }

    fn flush(&self) {}
}

/// Runs `f`, returning its result and the records it logged on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, std::vec::Vec<Captured>) {
    // the first test to get here installs the logger for the whole binary
    let _ = log::set_logger(&CAPTURE_LOGGER);
    log::set_max_level(log::LevelFilter::Trace);

    CAPTURED.with(|records| records.borrow_mut().clear());
    let result = f();
    (result, CAPTURED.with(|records| records.take()))
}
