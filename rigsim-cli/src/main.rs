//! rigsim - serial device emulator for amateur radio peripherals
//!
//! Emulates a Yaesu FT-991A CAT interface, a G-5500 rotator controller, and
//! an NMEA GPS receiver on host serial ports so control software can be
//! developed without hardware.
//!
//! ```text
//! rigsim [--uarts <count>] [--uart <n>=<path>]... [--config <file>]
//! ```
//!
//! UARTs mapped with `--uart` use the named host serial device; unmapped
//! UARTs get in-memory loopback ports. The main loop is cooperative: console
//! input and every running device are polled from a single thread.

mod console;
mod serial_io;
mod settings;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use rigsim_core::{restore_config, DeviceManager};
use rigsim_devices::register_builtin_factories;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::Console;
use serial_io::SystemSerialProvider;

/// Parsed command line
struct Args {
    uart_count: u8,
    uart_paths: Vec<(u8, String)>,
    config_path: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        uart_count: 4,
        uart_paths: Vec::new(),
        config_path: PathBuf::from("rigsim.json"),
    };

    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--uarts" => {
                let value = argv.next().context("--uarts requires a count")?;
                args.uart_count = value.parse().context("invalid UART count")?;
            }
            "--uart" => {
                let value = argv.next().context("--uart requires <n>=<path>")?;
                let (index, path) = value
                    .split_once('=')
                    .context("--uart mapping must be <n>=<path>")?;
                let index: u8 = index.parse().context("invalid UART index")?;
                args.uart_paths.push((index, path.to_string()));
            }
            "--config" => {
                let value = argv.next().context("--config requires a path")?;
                args.config_path = PathBuf::from(value);
            }
            "--help" | "-h" => {
                println!("Usage: rigsim [--uarts <count>] [--uart <n>=<path>]... [--config <file>]");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let mut provider = SystemSerialProvider::new(args.uart_count);
    for (index, path) in &args.uart_paths {
        if !provider.map_uart(*index, path.clone()) {
            bail!("UART index {} out of range (1-{})", index, args.uart_count);
        }
    }

    let mut manager = DeviceManager::new(Box::new(provider));
    register_builtin_factories(&mut manager)
        .map_err(|e| anyhow::anyhow!("factory registration failed: {}", e))?;

    // Restore and start any saved devices
    let stored = settings::load(&args.config_path);
    if !stored.is_empty() {
        let restored = restore_config(&mut manager, &stored);
        info!("restored {} device(s) from {}", restored, args.config_path.display());
        let ids: Vec<_> = manager.devices().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(device) = manager.device_mut(id) {
                if let Err(e) = device.begin() {
                    tracing::warn!("failed to start device {}: {}", id, e);
                }
            }
        }
    }

    let console = Console::new(args.config_path);

    // Stdin is read on a helper thread; the manager is only ever touched
    // from this loop
    let lines = spawn_stdin_reader();

    println!("rigsim - serial device emulator");
    println!("{} UART(s) available. Type 'help' for commands.", manager.uart_count());
    prompt();

    loop {
        match lines.try_recv() {
            Ok(line) => {
                let (keep_running, output) = console.execute(&mut manager, &line);
                if !output.is_empty() {
                    println!("{}", output);
                }
                if !keep_running {
                    break;
                }
                prompt();
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }

        manager.update_all();
        thread::sleep(Duration::from_millis(2));
    }

    info!("shutting down");
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}
