//! Field OSC demo
//!
//! Binds a small config model under `/config` and mirrors it over OSC, or
//! sends a few test values to another instance with `--send`.

use anyhow::{Context, Result};
use clap::Parser;
use field_osc::{
    DataField, Endpoints, OscEndpoint, OscModel, OscService, OutboundSink, ServiceConfig, UdpSink,
};
use rosc::{OscMessage, OscType};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Field OSC - bind observable fields to OSC endpoints
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML service configuration
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address and target host (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Inbound port
    #[arg(long)]
    in_port: Option<u16>,

    /// Outbound port
    #[arg(long)]
    out_port: Option<u16>,

    /// Disable the inbound listener
    #[arg(long)]
    no_receive: bool,

    /// Disable the outbound client
    #[arg(long)]
    no_send: bool,

    /// Re-emit received values to the peer
    #[arg(long)]
    send_on_receive: bool,

    /// Push the current model state once the service is running
    #[arg(long)]
    refresh: bool,

    /// Print the registered endpoints
    #[arg(long)]
    describe: bool,

    /// Print endpoints as JSON (with --describe)
    #[arg(long)]
    json: bool,

    /// Send test messages to /config/age instead of serving
    #[arg(long)]
    send: bool,

    /// Target host for --send
    #[arg(long, default_value = "127.0.0.1")]
    target_host: String,

    /// Target port for --send
    #[arg(long, default_value = "8000")]
    target_port: u16,

    /// Number of messages for --send
    #[arg(long, default_value = "5")]
    count: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Demo model; `enabled` is deliberately not exposed over OSC
struct DemoConfig {
    name: DataField<String>,
    age: DataField<i32>,
    enabled: DataField<bool>,
}

impl DemoConfig {
    fn new() -> Self {
        Self {
            name: DataField::new("Cat".to_string()),
            age: DataField::new(21),
            enabled: DataField::new(true),
        }
    }

    fn print_changes(&self) {
        self.name
            .on_change(|v| println!("[{}] name → {}", timestamp(), v));
        self.age
            .on_change(|v| println!("[{}] age → {}", timestamp(), v));
        self.enabled
            .on_change(|v| println!("[{}] enabled → {}", timestamp(), v));
    }
}

impl OscModel for DemoConfig {
    fn endpoints(&self) -> Endpoints {
        Endpoints::new()
            .bind("name", &self.name, OscEndpoint::default())
            .bind("age", &self.age, OscEndpoint::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.send {
        return send_test_values(&args).await;
    }

    let config = load_config(&args).await?;
    info!("Starting Field OSC on {}...", config.host);

    let model = DemoConfig::new();
    model.print_changes();

    let service = OscService::new(config);
    service.add_route("/config", &model)?;
    service.run(false)?;

    if args.describe {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&service.describe_json())?);
        } else {
            println!("{}", service.describe());
        }
    }

    if args.refresh {
        let fired = service.refresh();
        info!("Sent initial state for {} endpoint(s)", fired);
    }

    shutdown_signal().await;

    service.stop();
    info!(
        "Final state: name={}, age={}, enabled={}",
        model.name.value(),
        model.age.value(),
        model.enabled.value()
    );
    info!("Field OSC shutdown complete");
    Ok(())
}

async fn load_config(args: &Args) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            ServiceConfig::load(path).await?
        }
        None => ServiceConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.in_port {
        config.in_port = Some(port);
    }
    if let Some(port) = args.out_port {
        config.out_port = Some(port);
    }
    if args.no_receive {
        config.in_port = None;
    }
    if args.no_send {
        config.out_port = None;
    }
    if args.send_on_receive {
        config.send_on_receive = true;
    }

    config.validate()?;
    Ok(config)
}

/// Send `--count` values to `/config/age`, one per second
async fn send_test_values(args: &Args) -> Result<()> {
    let sink = UdpSink::connect(&args.target_host, args.target_port, false)
        .with_context(|| format!("Failed to open OSC client for {}:{}", args.target_host, args.target_port))?;
    info!("📤 Sending {} value(s) to {}", args.count, sink.target());

    for i in 0..args.count {
        if i > 0 {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        let age = 1 + (chrono::Local::now().timestamp_subsec_millis() % 100) as i32;
        let message = OscMessage {
            addr: "/config/age".to_string(),
            args: vec![OscType::Int(age)],
        };

        match sink.send(&message) {
            Ok(()) => println!("[{}] /config/age {}", timestamp(), age),
            Err(e) => warn!("Failed to send test value: {}", e),
        }
    }

    Ok(())
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
    }
    info!("Shutdown signal received");
}
