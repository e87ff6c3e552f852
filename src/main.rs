//! IoT Sensor Simulator Binary
//!
//! Reads the simulated sensors at a fixed interval, appends every reading to
//! an NDJSON log and publishes it over MQTT.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use iot_sensor_sim::{
    bus::BusEvent, config::generate_client_id, sensors, Bus, LoopSettings, MqttBus, NdjsonLog,
    PublishLoop, QosLevel, ReadingRecord, Sensor, SimulatorConfig, DEFAULT_BROKER_PORT,
    DEFAULT_INTERVAL_SECS, DEFAULT_KEEPALIVE_SECS, DEFAULT_LOG_FILE,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "iot_sensor_sim")]
#[command(about = "IoT Sensor Simulator (with JSON logging)")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Publishes simulated temperature, humidity and GPS readings to an MQTT broker and appends them to an NDJSON file")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// MQTT broker host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// MQTT broker port
    #[arg(short, long, default_value_t = DEFAULT_BROKER_PORT)]
    port: u16,

    /// Publish interval in seconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: f64,

    /// Temperature center value in C
    #[arg(long, default_value_t = 22.0, allow_negative_numbers = true)]
    temp_center: f64,

    /// MQTT QoS for sensor messages
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    qos: u8,

    /// NDJSON log file path
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    /// MQTT keepalive in seconds
    #[arg(long, default_value_t = DEFAULT_KEEPALIVE_SECS)]
    keepalive: u64,

    /// MQTT client id (generated when omitted)
    #[arg(long)]
    client_id: Option<String>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the publish loop (default)
    Run,

    /// Read every sensor once and print the readings
    Sample(SampleArgs),
}

#[derive(Args)]
struct SampleArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = build_config(&cli)?;

    match &cli.command {
        Some(Commands::Sample(args)) => sample_command(&config, args),
        Some(Commands::Run) | None => run_command(config).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<SimulatorConfig> {
    let config = SimulatorConfig::new(&cli.host, cli.port)
        .with_interval_secs(cli.interval)
        .with_temp_center(cli.temp_center)
        .with_qos(QosLevel::try_from(cli.qos)?)
        .with_log_file(&cli.log_file)
        .with_keepalive_secs(cli.keepalive)
        .with_client_id(cli.client_id.clone().unwrap_or_else(generate_client_id))
        .with_max_cycles(cli.cycles);

    config.validate()?;
    Ok(config)
}

async fn run_command(config: SimulatorConfig) -> anyhow::Result<()> {
    info!("Starting IoT sensor simulator...");
    info!("Configuration:");
    info!("  - Broker: {}", config.broker_address());
    info!("  - Client id: {}", config.client_id);
    info!("  - Interval: {}s", config.interval_secs);
    info!("  - QoS: {}", config.qos);
    info!("  - Log file: {}", config.log_file.display());

    let sensors = sensors::standard_suite(&config)?;
    let bus = MqttBus::from_config(&config);
    tokio::spawn(report_bus_events(bus.events()));

    let log = NdjsonLog::open(&config.log_file)
        .with_context(|| format!("opening {}", config.log_file.display()))?;

    let cancel = CancellationToken::new();
    tokio::spawn(watch_for_interrupt(cancel.clone()));

    let settings = LoopSettings::try_from(&config)?;
    let publisher = PublishLoop::new(sensors, log, bus, settings);
    let stats = publisher.run(cancel).await?;

    info!(
        "Run finished: {} cycles, {} records logged, {} published, {} publish failures",
        stats.cycles, stats.records_logged, stats.published, stats.publish_failures
    );
    Ok(())
}

async fn watch_for_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            println!("Stopping simulator...");
            cancel.cancel();
        }
        Err(e) => error!("Unable to listen for interrupt signal: {}", e),
    }
}

async fn report_bus_events(mut events: broadcast::Receiver<BusEvent>) {
    loop {
        match events.recv().await {
            Ok(BusEvent::Connected) => info!("Broker connection up"),
            Ok(BusEvent::Disconnected { reason }) => warn!("Broker connection lost: {}", reason),
            Ok(BusEvent::ConnectionRefused { reason }) => {
                error!("Broker refused connection: {}", reason)
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Missed {} bus events", missed)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn sample_command(config: &SimulatorConfig, args: &SampleArgs) -> anyhow::Result<()> {
    let mut sensors = sensors::standard_suite(config)?;
    let records: Vec<ReadingRecord> = sensors.iter_mut().map(|sensor| sensor.read()).collect();

    match args.format.as_str() {
        "json" => {
            for record in &records {
                println!("{}", record.to_json()?);
            }
        }
        "pretty" => print_pretty_records(&records),
        other => anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

fn print_pretty_records(records: &[ReadingRecord]) {
    println!("Sensor Sample");
    println!("=============");
    for record in records {
        let reading = match (record.value(), record.lat_lon()) {
            (Some(value), _) => format!("{:.2} {}", value, record.unit.as_deref().unwrap_or("")),
            (None, Some((lat, lon))) => format!("{:.6}, {:.6}", lat, lon),
            (None, None) => String::new(),
        };
        println!(
            "  {:<12} {:<24} {}",
            record.sensor,
            reading,
            record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC")
        );
    }
}
