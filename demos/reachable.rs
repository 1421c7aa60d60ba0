//! Probe a host the way the firewall's liveness check does.
//!
//! Needs CAP_NET_RAW:
//!   sudo RUST_LOG=debug cargo run --example reachable -- 192.168.1.1 4 250

use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use iptools::probe::probe_with_config;
use iptools::ProbeConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(host) = args.next().and_then(|h| h.parse::<Ipv4Addr>().ok()) else {
        eprintln!("usage: reachable <ipv4> [count] [timeout-ms]");
        return ExitCode::from(2);
    };

    let mut config = ProbeConfig::default();
    if let Some(count) = args.next().and_then(|c| c.parse().ok()) {
        config = config.with_count(count);
    }
    if let Some(ms) = args.next().and_then(|t| t.parse().ok()) {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    match probe_with_config(host, &config) {
        Ok(true) => {
            println!("{host} is reachable");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("{host} is unreachable");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(2)
        }
    }
}
