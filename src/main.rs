use std::io::Write as _;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use embassy_futures::block_on;
use tracing::info;
use tracing_subscriber::EnvFilter;

use esp_remote_console::console::DEFAULT_COMMANDS;
use esp_remote_console::prelude::*;

#[derive(Parser)]
#[command(name = "esp-console", about = "Drive an ESP8266 over TCP from the keyboard")]
#[command(version)]
struct Cli {
    /// Device address
    #[arg(long, default_value = "192.168.4.1")]
    host: String,

    /// Device port
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Prompt shown in line-editing mode
    #[arg(long, default_value = "")]
    prompt: String,

    /// Pause after each drive command, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    #[arg(long, default_value_t = 5)]
    connect_timeout_secs: u64,

    /// Edit whole lines with history and tab completion instead of driving with single keys
    #[arg(long)]
    free_text: bool,

    /// Command offered for tab completion (repeatable)
    #[arg(long = "command", value_name = "NAME")]
    commands: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

type SystemConsole = Console<SystemKeyboard, StdoutSink, TcpTransport>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let keyboard = open_keyboard().context("raw keyboard input unavailable")?;
    let endpoint = format!("{}:{}", cli.host, cli.port);
    let transport =
        TcpTransport::connect(&endpoint, Duration::from_secs(cli.connect_timeout_secs))?;

    let vocabulary = if cli.commands.is_empty() {
        DEFAULT_COMMANDS.iter().map(|c| c.to_string()).collect()
    } else {
        cli.commands
    };
    let config = ConsoleConfig {
        prompt: cli.prompt,
        vocabulary,
        discipline: if cli.free_text {
            LineDiscipline::FreeText
        } else {
            LineDiscipline::DriveKeys
        },
        dispatch_delay: Duration::from_millis(cli.delay_ms),
        ..Default::default()
    };
    let mut console = Console::new(config, keyboard, StdoutSink, transport);

    println!("Press arrow keys to drive. Space stops, ctrl-d switches modes, ctrl-c exits.");
    run(&mut console)
}

fn run(console: &mut SystemConsole) -> Result<()> {
    let mut incoming = [0u8; 512];

    loop {
        let line = match block_on(console.input()) {
            Ok(line) => line,
            Err(ConsoleError::Interrupted) => {
                info!("interrupted, closing console");
                return Ok(());
            }
            Err(err) => return Err(err).context("console input failed"),
        };

        if line == MODE_SWITCH {
            match console.toggle_mode() {
                Mode::LineEditing => println!("\r\n[line editing]"),
                Mode::RawSingleKey => println!("\r\n[raw keys]"),
            }
            continue;
        }

        match console.mode() {
            Mode::RawSingleKey => {
                if !line.is_empty() {
                    block_on(console.send(line.as_bytes())).context("forwarding key to device")?;
                }

                let n = console
                    .transport_mut()
                    .drain_incoming(&mut incoming)
                    .context("reading from device")?;
                if n > 0 {
                    let mut out = std::io::stdout().lock();
                    out.write_all(&incoming[..n])?;
                    out.flush()?;
                }
            }
            Mode::LineEditing => {
                if !line.is_empty() {
                    block_on(console.send(line.as_bytes())).context("sending line to device")?;
                    block_on(console.send(b"\r\n")).context("sending line to device")?;
                }
            }
        }
    }
}
