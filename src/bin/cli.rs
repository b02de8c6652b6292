//! adblink CLI
//!
//! Command-line interface over the adb host services.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use adblink::{Adb, ServerConfig};

/// adblink CLI
#[derive(Parser, Debug)]
#[command(name = "adblink")]
#[command(about = "Client for the adb host-server protocol")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'P', long, default_value_t = 5037)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List attached devices
    Devices {
        /// Show state and attributes for each device
        #[arg(short, long)]
        long: bool,
    },

    /// Print the server's internal version number
    Version,

    /// Start the server if it is not running
    StartServer,

    /// Tell the server to quit
    KillServer,

    /// Connect to a device over TCP/IP
    Connect { host: String, port: u16 },

    /// Restart a device's adbd listening on TCP
    Tcpip { serial: String, port: u16 },

    /// Forward a local TCP port to a device port
    Forward {
        serial: String,
        local_port: u16,
        device_port: u16,
    },

    /// Watch the device set and print change events as they happen
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 750)]
        interval_ms: u64,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adblink=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let config = ServerConfig::builder()
        .host(args.host)
        .port(args.port)
        .build();
    let client = Adb::with_config(config);

    if let Err(e) = run(&client, args.command) {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(client: &Adb, command: Commands) -> adblink::Result<()> {
    match command {
        Commands::Devices { long: false } => {
            for serial in client.list_device_serials()? {
                println!("{}", serial);
            }
        }
        Commands::Devices { long: true } => {
            for device in client.list_devices()? {
                let attrs = device
                    .attributes
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, v))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{}\t{}\t{}", device.serial, device.state, attrs);
            }
        }
        Commands::Version => {
            println!("{}", client.server_version()?);
        }
        Commands::StartServer => {
            client.start_server()?;
        }
        Commands::KillServer => {
            client.kill_server()?;
        }
        Commands::Connect { host, port } => {
            client.connect(&host, port)?;
        }
        Commands::Tcpip { serial, port } => {
            client.restart_tcpip(&serial, port)?;
        }
        Commands::Forward {
            serial,
            local_port,
            device_port,
        } => {
            client.forward_device(&serial, local_port, device_port)?;
        }
        Commands::Watch { interval_ms } => {
            watch(client, interval_ms);
        }
    }
    Ok(())
}

/// Run a watcher until interrupted, printing one line per change
fn watch(client: &Adb, interval_ms: u64) {
    let watcher =
        client.device_watcher_with_interval(std::time::Duration::from_millis(interval_ms));
    let events = watcher.events();
    let errors = watcher.errors();
    watcher.start();

    loop {
        crossbeam::select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    for device in &event.removed {
                        println!("- {}\t{}", device.serial, device.state);
                    }
                    for device in &event.added {
                        println!("+ {}\t{}", device.serial, device.state);
                    }
                }
                Err(_) => break,
            },
            recv(errors) -> error => {
                if let Ok(e) = error {
                    tracing::warn!("poll failed: {}", e);
                }
            }
        }
    }
}
