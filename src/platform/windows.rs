use std::io;
use std::os::raw::c_int;

use embedded_io_async::{ErrorType, Read, ReadReady};

use crate::error::ConsoleError;

extern "C" {
    fn _getch() -> c_int;
    fn _kbhit() -> c_int;
}

/// Keyboard on the Windows console, read through the CRT's unechoed getch.
///
/// Arrow keys arrive as a lead byte above 127 followed by a scan code.
#[derive(Debug)]
pub struct ConsoleKeyboard {
    _private: (),
}

impl ConsoleKeyboard {
    pub fn open() -> Result<Self, ConsoleError> {
        Ok(Self { _private: () })
    }
}

impl ErrorType for ConsoleKeyboard {
    type Error = io::Error;
}

impl Read for ConsoleKeyboard {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(byte) = buf.first_mut() else {
            return Ok(0);
        };
        // SAFETY: _getch takes no arguments and only blocks on the console input queue.
        // It yields a single byte value; truncation only drops the sign.
        *byte = unsafe { _getch() } as u8;
        Ok(1)
    }
}

impl ReadReady for ConsoleKeyboard {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        // SAFETY: _kbhit takes no arguments and never blocks.
        Ok(unsafe { _kbhit() } != 0)
    }
}
