//! PLC field sender CLI.
//!
//! Connects to a PLC, sends the sample vehicle record one field at a time
//! and reads the one-byte acknowledgement.
//!
//! ```text
//! plc-send                       # 127.0.0.1:9600, 5000ms
//! plc-send 192.168.250.1 9600 3000
//! ```

use std::time::Duration;

use clap::Parser;
use plc_field_link::{
    exchange, ConnectionParameters, Transmitter, VehicleAttributes, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TIMEOUT,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "plc-send")]
#[command(version)]
#[command(about = "Send an ordered set of field values to a PLC over TCP", long_about = None)]
struct Cli {
    /// PLC host name or IP address
    #[arg(requires = "port")]
    host: Option<String>,

    /// PLC TCP port
    #[arg(requires = "timeout_ms", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Connect and read timeout in milliseconds (0 = no bound)
    timeout_ms: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    json: bool,

    /// Log per-field bytes
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn parameters(&self) -> ConnectionParameters {
        ConnectionParameters::new(
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
            self.timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
        )
    }
}

fn sample_record() -> VehicleAttributes {
    VehicleAttributes {
        model: "DUMMY-MODEL-12345".into(),
        engine: "TEST-ENG".into(),
        displacement: "9999".into(),
        vin: "DUMMY-VIN-TEST-001".into(),
        color: "0000".into(),
        trim: "XX00".into(),
        gvm: "0000".into(),
        transmission: "TEST-TRANS".into(),
        axle: "T00T".into(),
        plant: "T00".into(),
        built: "000000".into(),
    }
}

fn init_tracing(json: bool, verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    let params = cli.parameters();
    info!("=== TCP/IP PLC Connection === {params}");

    let fields = sample_record().to_fields();
    let report = exchange(&params, &fields, &Transmitter::new());

    for err in [&report.connect, &report.disconnect].into_iter().flatten() {
        error!(kind = ?err.kind(), "{err}");
    }
    match report.acknowledgement() {
        Some(byte) => info!("PLC acknowledged with 0x{byte:02X}"),
        None => info!("no acknowledgement byte received"),
    }
}
