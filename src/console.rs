use std::time::Duration;

use embedded_io_async::{Read, ReadReady, Write as AsyncWrite};
use tracing::{debug, info, warn};

use crate::completion::complete;
use crate::delay::{Pause, ThreadSleep};
use crate::drive::DriveCommand;
use crate::error::ConsoleError;
use crate::history::History;
use crate::terminal::{KeyCode, Line, Terminal, TerminalEvent, LINE_MAX};
use crate::writer::TerminalWriter;

/// Returned by [`Console::input`] when the control keystroke (Ctrl-D) asks
/// the caller to toggle the input mode
pub const MODE_SWITCH: &str = "uart_switch";

/// Commands offered for tab completion when none are configured
pub const DEFAULT_COMMANDS: [&str; 4] = ["help", "cpu_reset", "cpu_resume", "cpu_pause"];

const CTRL_D: u8 = 0x04;

/// Input mode of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Prompted, blocking keystroke loop
    #[default]
    LineEditing,
    /// Non-blocking, at most one key per call
    RawSingleKey,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::LineEditing => Mode::RawSingleKey,
            Mode::RawSingleKey => Mode::LineEditing,
        }
    }
}

/// What keystrokes mean in [`Mode::LineEditing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineDiscipline {
    /// Drive keys and arrow keys are dispatched to the device as they are pressed
    #[default]
    DriveKeys,
    /// Keys edit a line with history recall and tab completion; Enter accepts it
    FreeText,
}

/// Configuration for the console
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Prompt printed at the start of every line-editing call
    pub prompt: String,
    /// Known commands, used for tab completion
    pub vocabulary: Vec<String>,
    pub discipline: LineDiscipline,
    /// Pause after each dispatched drive command
    pub dispatch_delay: Duration,
    /// Pause when a raw-mode poll finds no key waiting
    pub idle_poll_interval: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            vocabulary: DEFAULT_COMMANDS.iter().map(|c| c.to_string()).collect(),
            discipline: LineDiscipline::default(),
            dispatch_delay: Duration::from_millis(100),
            idle_poll_interval: Duration::from_millis(10),
        }
    }
}

fn mode_switch() -> Line {
    let mut line = Line::new();
    // Always fits: the sentinel is shorter than LINE_MAX.
    let _ = line.push_str(MODE_SWITCH);
    line
}

/// Keystroke multiplexer between the local terminal and the device.
///
/// `K` is the raw keyboard, `W` the terminal output, `T` the transport to the
/// device and `P` the pause used to throttle dispatch and idle polling.
#[derive(Debug)]
pub struct Console<K, W: AsyncWrite, T, P = ThreadSleep> {
    config: ConsoleConfig,
    keyboard: K,
    writer: TerminalWriter<W>,
    transport: T,
    pause: P,
    terminal: Terminal<LINE_MAX>,
    history: History<LINE_MAX>,
    mode: Mode,
    line_count: u64,
}

impl<K, W, T> Console<K, W, T, ThreadSleep>
where
    K: Read + ReadReady,
    W: AsyncWrite,
    T: AsyncWrite,
{
    /// Create a console that sleeps the thread between dispatches
    pub fn new(config: ConsoleConfig, keyboard: K, writer: W, transport: T) -> Self {
        Self::with_pause(config, keyboard, writer, transport, ThreadSleep)
    }
}

impl<K, W, T, P> Console<K, W, T, P>
where
    K: Read + ReadReady,
    W: AsyncWrite,
    T: AsyncWrite,
    P: Pause,
{
    pub fn with_pause(config: ConsoleConfig, keyboard: K, writer: W, transport: T, pause: P) -> Self {
        Self {
            config,
            keyboard,
            writer: TerminalWriter::new(writer),
            transport,
            pause,
            terminal: Terminal::new(),
            history: History::new(),
            mode: Mode::default(),
            line_count: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Flip between line editing and raw single-key mode, returning the new mode
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        info!(mode = ?self.mode, "switched input mode");
        self.mode
    }

    /// Number of drive commands dispatched so far
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn history(&self) -> &History<LINE_MAX> {
        &self.history
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Collect one input according to the current mode.
    ///
    /// Returns the accepted line, an empty line when raw mode found nothing
    /// to read, or [`MODE_SWITCH`] when the control keystroke was pressed.
    ///
    /// # Errors
    ///
    /// Keyboard, terminal and transport failures are returned as they occur;
    /// Ctrl-C in line-editing mode returns [`ConsoleError::Interrupted`].
    pub async fn input(&mut self) -> Result<Line, ConsoleError> {
        match self.mode {
            Mode::LineEditing => self.input_line().await,
            Mode::RawSingleKey => self.input_raw().await,
        }
    }

    /// Write bytes to the device and flush them
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.transport
            .write_all(bytes)
            .await
            .map_err(ConsoleError::transport)?;
        self.transport.flush().await.map_err(ConsoleError::transport)
    }

    async fn input_line(&mut self) -> Result<Line, ConsoleError> {
        self.terminal.clear_buffer();
        self.history.reset_position();
        self.writer
            .write_prompt(&self.config.prompt)
            .await
            .map_err(ConsoleError::terminal)?;

        let line = match self.config.discipline {
            LineDiscipline::DriveKeys => self.drive_keys().await?,
            LineDiscipline::FreeText => self.free_text().await?,
        };

        if !line.is_empty() && line != MODE_SWITCH {
            self.history.add(&line);
        }
        Ok(line)
    }

    async fn drive_keys(&mut self) -> Result<Line, ConsoleError> {
        loop {
            let byte = self.read_byte().await?;
            for key in self.terminal.process_byte(byte) {
                match key {
                    KeyCode::CtrlD => return Ok(mode_switch()),
                    KeyCode::CtrlC => return Err(ConsoleError::Interrupted),
                    key => {
                        if let Some(command) = DriveCommand::from_key(key) {
                            self.dispatch(command).await?;
                        }
                    }
                }
            }
        }
    }

    async fn free_text(&mut self) -> Result<Line, ConsoleError> {
        loop {
            let byte = self.read_byte().await?;
            for key in self.terminal.process_byte(byte) {
                if let Some(line) = self.edit(key).await? {
                    return Ok(line);
                }
            }
        }
    }

    /// Apply one key to the line being edited; `Some` ends the call.
    async fn edit(&mut self, key: KeyCode) -> Result<Option<Line>, ConsoleError> {
        match self.terminal.handle_key(key) {
            TerminalEvent::CommandReady => {
                self.writer.write_str("\r\n").await.map_err(ConsoleError::terminal)?;
                return Ok(Some(self.terminal.take_command()));
            }
            TerminalEvent::EmptyCommand => {
                self.writer.write_str("\r\n").await.map_err(ConsoleError::terminal)?;
                self.writer
                    .write_prompt(&self.config.prompt)
                    .await
                    .map_err(ConsoleError::terminal)?;
            }
            TerminalEvent::Inserted(byte) => {
                self.writer.echo(byte).await.map_err(ConsoleError::terminal)?;
            }
            TerminalEvent::Erased => {
                self.writer.erase_char().await.map_err(ConsoleError::terminal)?;
            }
            TerminalEvent::CompletionRequested => {
                let extension = complete(self.terminal.buffer_str(), &self.config.vocabulary);
                let appended = self.terminal.append(extension);
                if !appended.is_empty() {
                    self.writer.write_str(appended).await.map_err(ConsoleError::terminal)?;
                }
            }
            TerminalEvent::HistoryPrevious => {
                if let Some(entry) = self.history.previous() {
                    self.terminal.set_buffer(entry);
                    self.redraw().await?;
                }
            }
            TerminalEvent::HistoryNext => {
                if self.history.is_navigating() {
                    let entry = self.history.next().unwrap_or_default();
                    self.terminal.set_buffer(entry);
                    self.redraw().await?;
                }
            }
            TerminalEvent::ModeSwitch => return Ok(Some(mode_switch())),
            TerminalEvent::Interrupt => return Err(ConsoleError::Interrupted),
            TerminalEvent::BufferFull | TerminalEvent::None => {}
        }
        Ok(None)
    }

    async fn input_raw(&mut self) -> Result<Line, ConsoleError> {
        let byte = if self.keyboard.read_ready().map_err(ConsoleError::keyboard)? {
            self.read_byte().await?
        } else {
            self.pause.pause(self.config.idle_poll_interval);
            embassy_futures::yield_now().await;
            0
        };

        let mut line = Line::new();
        match byte {
            0 => {}
            CTRL_D => return Ok(mode_switch()),
            // Bytes above 127 have no single-character form and are dropped.
            byte if byte.is_ascii() => {
                let _ = line.push(char::from(byte));
            }
            _ => {}
        }
        Ok(line)
    }

    async fn dispatch(&mut self, command: DriveCommand) -> Result<(), ConsoleError> {
        // Counted before sending: a failed send still consumes a number.
        self.line_count += 1;
        let count = self.line_count;

        self.writer
            .write_fmt(format_args!("{} {}\r\n", count, command.name()))
            .await
            .map_err(ConsoleError::terminal)?;
        debug!(count, command = command.name(), "dispatching drive command");

        if let Err(err) = self.send(command.wire()).await {
            warn!(count, command = command.name(), error = %err, "drive command not sent");
            return Err(err);
        }

        self.pause.pause(self.config.dispatch_delay);
        Ok(())
    }

    async fn read_byte(&mut self) -> Result<u8, ConsoleError> {
        let mut byte = [0u8; 1];
        match self.keyboard.read(&mut byte).await.map_err(ConsoleError::keyboard)? {
            0 => Err(ConsoleError::EndOfInput),
            _ => Ok(byte[0]),
        }
    }

    async fn redraw(&mut self) -> Result<(), ConsoleError> {
        self.writer
            .redraw(&self.config.prompt, self.terminal.buffer_str())
            .await
            .map_err(ConsoleError::terminal)
    }
}
