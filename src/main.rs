use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use smtc::{
    acquisition::{self, Event},
    config::MonitorConfig,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => MonitorConfig::load(&path)
            .with_context(|| format!("failed to load config from {path:?}"))?,
        None => MonitorConfig::default(),
    };

    info!(
        "monitoring {} board(s) on /dev/i2c-{}",
        config.boards.len(),
        config.bus
    );

    let ct = CancellationToken::new();
    let handler_ct = ct.clone();

    ctrlc::set_handler(move || {
        info!("received ctrl+c, exiting");
        handler_ct.cancel();
    })?;

    let (evt_tx, evt_rx) = flume::bounded(256);

    let acq_join = acquisition::spawn_thread(ct, config, evt_tx);

    // the worker owns the only sender, so this ends when it exits
    for evt in evt_rx.iter() {
        match evt {
            Event::Detected {
                stack,
                address,
                firmware,
            } => match firmware {
                Some(fw) => info!("board {stack} found at {address:#04x}, firmware {fw}"),
                None => info!("board {stack} found at {address:#04x}"),
            },
            Event::Missing { stack, address } => {
                warn!("board {stack} did not respond at {address:#04x}")
            }
            Event::Reading(r) => match r.millivolts {
                Some(mv) => info!(
                    "board {} ch {}: {:.1} °C ({:.2} mV)",
                    r.stack, r.channel, r.celsius, mv
                ),
                None => info!("board {} ch {}: {:.1} °C", r.stack, r.channel, r.celsius),
            },
            Event::ReadFailed {
                stack,
                channel,
                error,
            } => warn!("board {stack} ch {channel}: {error}"),
        }
    }

    acq_join
        .join()
        .map_err(|_| anyhow::anyhow!("acquisition thread panicked"))??;

    info!("exit");

    Ok(())
}
