use std::io;
use std::mem;
use std::os::unix::io::RawFd;

use embedded_io_async::{ErrorType, Read, ReadReady};

use crate::error::ConsoleError;

/// Keyboard on a POSIX terminal, read through termios raw mode.
///
/// The terminal stays raw for as long as the keyboard is alive, so control
/// keys pressed between reads are queued as plain bytes instead of being
/// taken by the line discipline. Dropping the keyboard restores it.
#[derive(Debug)]
pub struct PosixKeyboard {
    raw: RawModeGuard,
}

impl PosixKeyboard {
    /// Open stdin as a raw keyboard.
    ///
    /// Fails when stdin is not a terminal or its attributes cannot be changed.
    pub fn open() -> Result<Self, ConsoleError> {
        Self::from_fd(libc::STDIN_FILENO)
    }

    /// Take over an already open terminal descriptor.
    ///
    /// The descriptor is not closed on drop, only its settings are restored.
    pub fn from_fd(fd: RawFd) -> Result<Self, ConsoleError> {
        // SAFETY: isatty only inspects the descriptor number.
        if unsafe { libc::isatty(fd) } == 0 {
            return Err(ConsoleError::Open(io::Error::other("input is not a terminal")));
        }

        let raw = RawModeGuard::enter(fd).map_err(ConsoleError::Open)?;
        Ok(Self { raw })
    }
}

impl ErrorType for PosixKeyboard {
    type Error = io::Error;
}

impl Read for PosixKeyboard {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(byte) = buf.first_mut() else {
            return Ok(0);
        };
        read_byte(self.raw.fd, byte)
    }
}

impl ReadReady for PosixKeyboard {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let mut pfd = libc::pollfd {
            fd: self.raw.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            // SAFETY: pfd is a single live pollfd and the zero timeout never blocks.
            match unsafe { libc::poll(&mut pfd, 1, 0) } {
                -1 => {
                    let err = io::Error::last_os_error();
                    if err.kind() != io::ErrorKind::Interrupted {
                        return Err(err);
                    }
                }
                0 => return Ok(false),
                _ => return Ok(pfd.revents & libc::POLLIN != 0),
            }
        }
    }
}

fn read_byte(fd: RawFd, byte: &mut u8) -> io::Result<usize> {
    loop {
        // SAFETY: byte is valid for one byte of writes for the duration of the call.
        let n = unsafe { libc::read(fd, (byte as *mut u8).cast::<libc::c_void>(), 1) };
        if n == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(n as usize);
    }
}

/// Puts the terminal in raw mode; the saved settings are restored on drop.
///
/// Only the input side is made raw. Output post-processing stays on so log
/// lines and device output keep their carriage returns.
struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    fn enter(fd: RawFd) -> io::Result<Self> {
        // SAFETY: termios is plain data; tcgetattr fills it before it is read.
        let mut original = unsafe { mem::zeroed::<libc::termios>() };
        // SAFETY: original is a valid, exclusively borrowed termios.
        if unsafe { libc::tcgetattr(fd, &mut original) } == -1 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        // TCSANOW keeps bytes typed ahead of the switch.
        // SAFETY: raw is a fully initialised termios copied from the terminal.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { fd, original })
    }
}

impl std::fmt::Debug for RawModeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawModeGuard").field("fd", &self.fd).finish()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // SAFETY: original holds the settings read from this descriptor on entry.
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSADRAIN, &self.original);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::ptr;
    use std::thread;
    use std::time::Duration;

    /// Pseudo-terminal pair; the slave end plays the user's terminal.
    struct Pty {
        master: RawFd,
        slave: RawFd,
    }

    impl Pty {
        fn open() -> Self {
            let mut master = -1;
            let mut slave = -1;
            let rc = unsafe {
                libc::openpty(
                    &mut master,
                    &mut slave,
                    ptr::null_mut(),
                    ptr::null_mut::<libc::termios>(),
                    ptr::null_mut::<libc::winsize>(),
                )
            };
            assert_eq!(rc, 0, "openpty failed: {}", io::Error::last_os_error());
            Self { master, slave }
        }

        fn type_keys(&self, bytes: &[u8]) {
            let n = unsafe { libc::write(self.master, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(n, bytes.len() as isize);
        }

        fn slave_attrs(&self) -> libc::termios {
            let mut attrs = unsafe { mem::zeroed::<libc::termios>() };
            assert_eq!(unsafe { libc::tcgetattr(self.slave, &mut attrs) }, 0);
            attrs
        }

        /// True when the terminal wrote something back, i.e. echoed a key.
        fn master_has_output(&self) -> bool {
            let mut pfd = libc::pollfd {
                fd: self.master,
                events: libc::POLLIN,
                revents: 0,
            };
            unsafe { libc::poll(&mut pfd, 1, 50) > 0 }
        }
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.slave);
                libc::close(self.master);
            }
        }
    }

    fn wait_ready(keyboard: &mut PosixKeyboard) -> bool {
        for _ in 0..200 {
            if keyboard.read_ready().unwrap() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn read_one(keyboard: &mut PosixKeyboard) -> u8 {
        let mut buf = [0u8; 1];
        assert_eq!(block_on(keyboard.read(&mut buf)).unwrap(), 1);
        buf[0]
    }

    #[test]
    fn test_terminal_restored_on_drop() {
        let pty = Pty::open();
        let before = pty.slave_attrs();
        assert_ne!(before.c_lflag & libc::ICANON, 0);

        let mut keyboard = PosixKeyboard::from_fd(pty.slave).unwrap();
        let held = pty.slave_attrs();
        assert_eq!(held.c_lflag & (libc::ICANON | libc::ECHO | libc::ISIG), 0);

        // Reads and polls leave the terminal raw.
        pty.type_keys(b"a");
        assert!(wait_ready(&mut keyboard));
        assert_eq!(read_one(&mut keyboard), b'a');
        assert_eq!(pty.slave_attrs().c_lflag, held.c_lflag);

        drop(keyboard);
        let after = pty.slave_attrs();
        assert_eq!(after.c_lflag, before.c_lflag);
        assert_eq!(after.c_iflag, before.c_iflag);
        assert_eq!(after.c_oflag, before.c_oflag);
    }

    #[test]
    fn test_read_ready_tracks_pending_input() {
        let pty = Pty::open();
        let mut keyboard = PosixKeyboard::from_fd(pty.slave).unwrap();

        assert!(!keyboard.read_ready().unwrap());

        pty.type_keys(b"i");
        assert!(wait_ready(&mut keyboard));
        assert_eq!(read_one(&mut keyboard), b'i');
        assert!(!keyboard.read_ready().unwrap());
    }

    #[test]
    fn test_control_keys_between_reads_arrive_verbatim() {
        let pty = Pty::open();
        let mut keyboard = PosixKeyboard::from_fd(pty.slave).unwrap();
        assert!(!keyboard.read_ready().unwrap());

        // Typed while the console is pausing, not inside a read.
        thread::sleep(Duration::from_millis(10));
        pty.type_keys(&[0x04, 0x03]);
        thread::sleep(Duration::from_millis(10));

        assert!(wait_ready(&mut keyboard));
        assert_eq!(read_one(&mut keyboard), 0x04);
        assert_eq!(read_one(&mut keyboard), 0x03);
    }

    #[test]
    fn test_keys_are_not_echoed() {
        let pty = Pty::open();
        let mut keyboard = PosixKeyboard::from_fd(pty.slave).unwrap();

        pty.type_keys(b"i");
        thread::sleep(Duration::from_millis(10));
        assert!(!pty.master_has_output());

        assert!(wait_ready(&mut keyboard));
        assert_eq!(read_one(&mut keyboard), b'i');
    }

    #[test]
    fn test_rejects_non_terminal() {
        let mut fds = [0 as RawFd; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

        let result = PosixKeyboard::from_fd(fds[0]);
        assert!(matches!(result, Err(ConsoleError::Open(_))));

        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
