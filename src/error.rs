use embedded_io_async::ErrorKind;
use thiserror::Error;

/// Errors that can occur while collecting input or dispatching commands
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("keyboard read failed: {0:?}")]
    Keyboard(ErrorKind),

    #[error("terminal write failed: {0:?}")]
    Terminal(ErrorKind),

    #[error("transport send failed: {0:?}")]
    Transport(ErrorKind),

    #[error("keyboard input closed")]
    EndOfInput,

    #[error("interrupted")]
    Interrupted,

    #[error("failed to open the terminal for raw key input: {0}")]
    Open(#[source] std::io::Error),

    #[error("raw key input is not supported on this platform")]
    UnsupportedPlatform,

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConsoleError {
    pub(crate) fn keyboard<E: embedded_io_async::Error>(err: E) -> Self {
        ConsoleError::Keyboard(err.kind())
    }

    pub(crate) fn terminal<E: embedded_io_async::Error>(err: E) -> Self {
        ConsoleError::Terminal(err.kind())
    }

    pub(crate) fn transport<E: embedded_io_async::Error>(err: E) -> Self {
        ConsoleError::Transport(err.kind())
    }
}
