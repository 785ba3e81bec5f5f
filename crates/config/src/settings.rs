use crate::secret::Secret;
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// All configuration enumerated in §6, parsed from CLI flags or their
/// matching environment variables (derived automatically by `clap`'s `env`
/// attribute, following the sibling `alerter`/`autopilot` binaries'
/// `Arguments` convention).
#[derive(Debug, Parser)]
pub struct Settings {
    /// JSON-RPC endpoint of the chain node. Required.
    #[clap(long, env)]
    pub solana_rpc_url: Url,

    /// WebSocket endpoint for log subscriptions. Derived from
    /// `solana_rpc_url` (http(s) -> ws(s)) when absent.
    #[clap(long, env)]
    pub solana_ws_url: Option<Url>,

    /// Base URL of the DEX-aggregator HTTP API behind C1 (§6 "Aggregator
    /// HTTP port"). Defaults to the public Dexscreener API.
    #[clap(long, env, default_value = "https://api.dexscreener.com/")]
    pub aggregator_base_url: Url,

    /// Bot token used by the downstream chat sink. Supports the `%VAR`
    /// indirection documented on [`Secret`].
    #[clap(long, env)]
    pub telegram_bot_token: Option<Secret>,

    #[clap(long, env)]
    pub telegram_chat_id: Option<String>,

    #[clap(long, env, default_value = "1000")]
    pub min_liquidity_usd: f64,

    #[clap(long, env, default_value = "0")]
    pub min_risk_score: u8,

    #[clap(long, env, default_value = "true")]
    pub raydium_enabled: bool,

    #[clap(long, env, default_value = "true")]
    pub pumpfun_enabled: bool,

    #[clap(long, env, default_value = "10000ms", value_parser = humantime::parse_duration)]
    pub pumpfun_poll_interval: Duration,

    #[clap(long, env, default_value = "true")]
    pub jupiter_enabled: bool,

    #[clap(long, env, default_value = "30000ms", value_parser = humantime::parse_duration)]
    pub jupiter_poll_interval: Duration,

    #[clap(long, env, default_value = "60")]
    pub max_requests_per_minute: u32,

    /// Comma-separated mints that are always analyzed regardless of the
    /// liquidity prefilter (the `WATCHLIST_*` family in §6).
    #[clap(long, env, value_delimiter = ',')]
    pub watchlist_tokens: Vec<String>,

    #[clap(long, env, default_value = "30")]
    pub token_cooldown_minutes: u64,

    #[clap(long, env, default_value = "20")]
    pub max_alerts_per_hour: u32,

    #[clap(long, env, default_value = "data")]
    pub data_dir: PathBuf,

    #[clap(long, env, default_value = "9588")]
    pub metrics_port: u16,

    #[clap(long, env, default_value = "postgresql://")]
    pub database_url: Url,

    /// Comma-separated wallet addresses to watch for buy/sell/transfer
    /// activity (C10, §6). Empty by default: wallet monitoring is opt-in.
    #[clap(long, env, value_delimiter = ',')]
    pub tracked_wallets: Vec<String>,

    /// Program id whose logs the Raydium subscription adapter follows.
    /// Defaults to the Raydium AMM v4 program (C2, §4.2).
    #[clap(
        long,
        env,
        default_value = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8"
    )]
    pub raydium_program_id: String,

    /// Quote-side mint every discovered pool is measured against. Defaults
    /// to wrapped SOL.
    #[clap(
        long,
        env,
        default_value = "So11111111111111111111111111111111111111112"
    )]
    pub quote_mint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("solana_rpc_url must use http or https scheme, got {0}")]
    InvalidRpcScheme(String),
}

impl Settings {
    /// Returns the effective websocket URL: the explicit override if given,
    /// otherwise `solana_rpc_url` with its scheme swapped for its websocket
    /// equivalent (§6: "derived if absent").
    pub fn websocket_url(&self) -> Result<Url, SettingsError> {
        if let Some(ws) = &self.solana_ws_url {
            return Ok(ws.clone());
        }
        let mut derived = self.solana_rpc_url.clone();
        let scheme = match self.solana_rpc_url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => return Err(SettingsError::InvalidRpcScheme(other.to_string())),
        };
        derived
            .set_scheme(scheme)
            .expect("ws/wss are valid schemes for any url that already had http/https");
        Ok(derived)
    }

    pub fn token_cooldown(&self) -> Duration {
        Duration::from_secs(self.token_cooldown_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings(rpc: &str) -> Settings {
        Settings::parse_from(["sniper", "--solana-rpc-url", rpc])
    }

    #[test]
    fn derives_wss_from_https() {
        let settings = base_settings("https://rpc.example.com");
        assert_eq!(
            settings.websocket_url().unwrap().as_str(),
            "wss://rpc.example.com/"
        );
    }

    #[test]
    fn derives_ws_from_http() {
        let settings = base_settings("http://rpc.example.com");
        assert_eq!(
            settings.websocket_url().unwrap().as_str(),
            "ws://rpc.example.com/"
        );
    }

    #[test]
    fn explicit_ws_url_overrides_derivation() {
        let mut settings = base_settings("https://rpc.example.com");
        settings.solana_ws_url = Some("wss://override.example.com".parse().unwrap());
        assert_eq!(
            settings.websocket_url().unwrap().as_str(),
            "wss://override.example.com/"
        );
    }

    #[test]
    fn defaults_match_spec_table() {
        let settings = base_settings("https://rpc.example.com");
        assert_eq!(settings.min_liquidity_usd, 1000.0);
        assert_eq!(settings.min_risk_score, 0);
        assert!(settings.raydium_enabled);
        assert!(settings.pumpfun_enabled);
        assert!(settings.jupiter_enabled);
        assert_eq!(settings.max_requests_per_minute, 60);
        assert_eq!(settings.token_cooldown_minutes, 30);
        assert_eq!(settings.max_alerts_per_hour, 20);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }
}
