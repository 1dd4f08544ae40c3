use core::fmt;
use std::io::Write as _;

use embedded_io_async::{ErrorType, Write as AsyncWrite};

use crate::terminal::LINE_MAX;

/// Erases the character left of the cursor on terminals without cursor addressing
const ERASE_CHAR: &str = "\x08 \x08";

/// Terminal writer for the prompt, echo and dispatch log
#[derive(Debug)]
pub struct TerminalWriter<W: AsyncWrite> {
    writer: W,
}

impl<W: AsyncWrite> TerminalWriter<W> {
    /// Create a new terminal writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get a reference to the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the terminal writer, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a string
    pub async fn write_str(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_all(s.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Write a formatted string
    pub async fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), W::Error> {
        let mut buffer = heapless::String::<256>::new();
        // Output longer than the buffer is truncated.
        let _ = fmt::write(&mut buffer, args);
        self.write_str(&buffer).await
    }

    /// Write the prompt
    pub async fn write_prompt(&mut self, prompt: &str) -> Result<(), W::Error> {
        self.write_str(prompt).await
    }

    /// Echo a single typed byte
    pub async fn echo(&mut self, byte: u8) -> Result<(), W::Error> {
        self.writer.write_all(&[byte]).await?;
        self.writer.flush().await
    }

    /// Erase the last echoed character
    pub async fn erase_char(&mut self) -> Result<(), W::Error> {
        self.write_str(ERASE_CHAR).await
    }

    /// Clear the current line.
    ///
    /// Emits one backspace-space-backspace triple per possible line
    /// character, which also swallows a prompt of reasonable length.
    pub async fn clear_line(&mut self) -> Result<(), W::Error> {
        for _ in 0..LINE_MAX {
            self.writer.write_all(ERASE_CHAR.as_bytes()).await?;
        }
        self.writer.flush().await
    }

    /// Clear the line and draw the prompt followed by `line`
    pub async fn redraw(&mut self, prompt: &str, line: &str) -> Result<(), W::Error> {
        self.clear_line().await?;
        self.write_prompt(prompt).await?;
        self.write_str(line).await
    }
}

/// Process stdout as an async byte sink.
///
/// Writes block the calling thread, which is what a single-threaded console
/// driven by `block_on` expects.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ErrorType for StdoutSink {
    type Error = std::io::Error;
}

impl AsyncWrite for StdoutSink {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::stdout().write(buf)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::stdout().flush()
    }
}
