//! Raw keyboard access for the host platform.
//!
//! Each platform provides a keyboard that implements [`embedded_io_async::Read`]
//! (one unechoed, unbuffered byte per call) and
//! [`embedded_io_async::ReadReady`] (a non-blocking key-hit check). The
//! implementation is chosen once, at compile time, as [`SystemKeyboard`].

use crate::error::ConsoleError;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::PosixKeyboard as SystemKeyboard;
#[cfg(windows)]
pub use windows::ConsoleKeyboard as SystemKeyboard;
#[cfg(not(any(unix, windows)))]
pub use unsupported::UnsupportedKeyboard as SystemKeyboard;

/// Open the keyboard of the controlling terminal
pub fn open_keyboard() -> Result<SystemKeyboard, ConsoleError> {
    SystemKeyboard::open()
}

#[cfg(not(any(unix, windows)))]
mod unsupported {
    use embedded_io_async::{ErrorType, Read, ReadReady};

    use crate::error::ConsoleError;

    /// Stand-in for targets without a raw input primitive; it cannot be constructed
    #[derive(Debug)]
    pub enum UnsupportedKeyboard {}

    impl UnsupportedKeyboard {
        pub fn open() -> Result<Self, ConsoleError> {
            Err(ConsoleError::UnsupportedPlatform)
        }
    }

    impl ErrorType for UnsupportedKeyboard {
        type Error = std::io::Error;
    }

    impl Read for UnsupportedKeyboard {
        async fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
            match *self {}
        }
    }

    impl ReadReady for UnsupportedKeyboard {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            match *self {}
        }
    }
}
