use anyhow::{bail, Context, Result};
use shared::SimConfig;
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TICK_HZ: f32 = 20.0;

/// Runtime settings for the server process
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Simulation ticks per wall-clock second
    pub tick_hz: f32,
    pub sim: SimConfig,
}

impl Settings {
    /// Read `COLONY_CONFIG` (path to a JSON `SimConfig`), `BIND_ADDR` and `TICK_HZ`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sim = match lookup("COLONY_CONFIG") {
            Some(path) => load_config(Path::new(&path))?,
            None => SimConfig::default(),
        };
        sim.validate().context("Invalid simulation config")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let tick_hz = match lookup("TICK_HZ") {
            Some(raw) => raw.parse().context("TICK_HZ is not a number")?,
            None => DEFAULT_TICK_HZ,
        };
        if !(tick_hz.is_finite() && tick_hz > 0.0) {
            bail!("TICK_HZ must be positive, got {}", tick_hz);
        }

        Ok(Self {
            bind_addr,
            tick_hz,
            sim,
        })
    }
}

/// Load a JSON config; missing fields keep their defaults
pub fn load_config(path: &Path) -> Result<SimConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
}
