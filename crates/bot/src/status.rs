//! Liveness endpoint and trade counters.
//!
//! The listener exists so an operator (or a supervisor) can confirm the
//! process is alive while it sits in the polling loop. Any HTTP client
//! hitting the port gets a 200 with the counter snapshot; nothing in the
//! trading flow depends on the body.

use alloy::primitives::Address;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, Opts};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use wasp_core::metrics::Metrics;

pub struct BotMetrics {
    metrics: Metrics,
    pub polls_total: IntCounter,
    pub pair_missing_total: IntCounter,
    pub insufficient_total: IntCounter,
    pub purchases_total: IntCounter,
    pub failures_total: IntCounterVec,
}

impl BotMetrics {
    pub fn new() -> Result<Self> {
        let metrics = Metrics::new();
        let registry = metrics.registry();
        let polls_total = IntCounter::with_opts(Opts::new(
            "wasp_polls_total",
            "Total liquidity polls performed",
        ))?;
        registry.register(Box::new(polls_total.clone()))?;
        let pair_missing_total = IntCounter::with_opts(Opts::new(
            "wasp_pair_missing_total",
            "Polls where the factory had no pair registered yet",
        ))?;
        registry.register(Box::new(pair_missing_total.clone()))?;
        let insufficient_total = IntCounter::with_opts(Opts::new(
            "wasp_insufficient_total",
            "Polls where the pool sat at or below the liquidity threshold",
        ))?;
        registry.register(Box::new(insufficient_total.clone()))?;
        let purchases_total = IntCounter::with_opts(Opts::new(
            "wasp_purchases_total",
            "Total confirmed entry purchases",
        ))?;
        registry.register(Box::new(purchases_total.clone()))?;
        let failures_total = IntCounterVec::new(
            Opts::new("wasp_failures_total", "Total trade cycle failures by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(failures_total.clone()))?;

        Ok(Self {
            metrics,
            polls_total,
            pair_missing_total,
            insufficient_total,
            purchases_total,
            failures_total,
        })
    }

    pub fn render(&self) -> String {
        self.metrics.render()
    }
}

/// Binds the status listener and serves it from a plain thread. Returns
/// the bound address so callers can report (or, in tests, probe) it.
pub fn spawn_status_server(
    port: u16,
    token_out: Address,
    metrics: Arc<BotMetrics>,
) -> Result<SocketAddr> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = handle_connection(stream, &metrics) {
                        warn!(?err, "status server connection failed");
                    }
                }
                Err(err) => {
                    warn!(?err, "status server accept failed");
                }
            }
        }
    });
    info!(%addr, token = %token_out, "status server listening; bot is hunting");
    Ok(addr)
}

fn handle_connection(mut stream: TcpStream, metrics: &BotMetrics) -> Result<()> {
    let mut buffer = [0u8; 512];
    let _ = stream.read(&mut buffer);
    let body = metrics.render();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    Ok(())
}
