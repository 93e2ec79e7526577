use clap::{Parser, Subcommand};
use loadcell_rs::util::format_hex_compact;
use loadcell_rs::{
    address_change_command, id_read_command, init_logger, log_info, param_read_command,
    weight_read_command, zero_set_command, DecodedEvent, LoadCellHandle, ProtocolEngine,
    SerialConfig,
};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "loadcell-cli")]
#[command(about = "CLI tool for the load-cell bus protocol")]
struct Cli {
    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value = "115200")]
    baudrate: u32,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll weight continuously and print every device's readings
    Monitor {
        /// Polling interval in milliseconds
        #[arg(long, default_value = "200")]
        interval_ms: u64,
    },
    /// One weight broadcast; print whoever answers
    ReadWeight,
    /// Read the device identifier
    ReadId,
    /// Read the parameter block
    ReadParams,
    /// Poll for a while and report which addresses answer, with counts
    Scan {
        /// How long to listen, in seconds
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
    /// Tare the scale at the device
    ZeroSet,
    /// Assign a new bus address (attach only one device when using this)
    ChangeAddress { address: u8 },
}

fn print_event(event: &DecodedEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        DecodedEvent::Weight { address, sample } => {
            println!(
                "0x{address:02X}: {:10.1} g  (raw {}, resolution {} g, status 0x{:02X})",
                sample.weight_grams, sample.raw_magnitude, sample.resolution_grams, sample.status
            );
        }
        DecodedEvent::Ident { address, ident } => {
            println!("0x{address:02X}: id {}", ident.display());
        }
        DecodedEvent::Params { address, params } => {
            println!(
                "0x{address:02X}: resolution {} g, max {} g, mode {}, zero range {}, settling {}",
                params.resolution_grams,
                params.max_weight_grams,
                params.kind_name,
                params.zero_range,
                params.down_range
            );
        }
    }
    Ok(())
}

async fn one_shot(
    handle: &mut LoadCellHandle,
    engine: &mut ProtocolEngine,
    command: &[u8],
    json: bool,
) -> anyhow::Result<()> {
    let events = handle.transact(engine, command).await?;
    if events.is_empty() {
        println!("no response");
    }
    for event in &events {
        print_event(event, json)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = SerialConfig {
        baudrate: cli.baudrate,
        ..SerialConfig::default()
    };
    let mut handle = LoadCellHandle::connect_with_config(&cli.port, config).await?;
    let mut engine = ProtocolEngine::new();

    match cli.command {
        Commands::Monitor { interval_ms } => {
            let (tx, mut rx) = mpsc::channel(64);
            let interval = Duration::from_millis(interval_ms);
            let task = tokio::spawn(async move {
                handle
                    .monitor(&mut engine, &weight_read_command(), interval, tx)
                    .await
            });
            while let Some(event) = rx.recv().await {
                print_event(&event, cli.json)?;
            }
            task.await??;
        }
        Commands::ReadWeight => {
            one_shot(&mut handle, &mut engine, &weight_read_command(), cli.json).await?;
        }
        Commands::ReadId => {
            one_shot(&mut handle, &mut engine, &id_read_command(), cli.json).await?;
        }
        Commands::ReadParams => {
            one_shot(&mut handle, &mut engine, &param_read_command(), cli.json).await?;
        }
        Commands::Scan { seconds } => {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
            while tokio::time::Instant::now() < deadline {
                handle.transact(&mut engine, &weight_read_command()).await?;
            }
            let snapshot = engine.registry().snapshot();
            if snapshot.is_empty() {
                println!("no devices answered");
            }
            for device in snapshot {
                println!(
                    "0x{:02X}: {} samples, last {:.1} g",
                    device.address, device.sample_count, device.last_raw_weight
                );
            }
        }
        Commands::ZeroSet => {
            let command = zero_set_command();
            handle.transact(&mut engine, &command).await?;
            log_info(&format!("sent zero-set: {}", format_hex_compact(&command)));
            println!("zero-set broadcast sent");
        }
        Commands::ChangeAddress { address } => {
            let command = address_change_command(address)?;
            handle.transact(&mut engine, &command).await?;
            println!(
                "address change to {address} sent: {}",
                format_hex_compact(&command)
            );
        }
    }

    Ok(())
}
