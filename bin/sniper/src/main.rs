mod cli;
mod control;
mod liveness;
mod shutdown;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use domain::{
    Address, Alert, AlertCategory, AlertPriority, EnrichmentFacts, PoolEvent, PoolSource,
    RiskLevel, RiskVerdict, WalletActivity,
};
use futures::future::BoxFuture;
use ports::{AggregatorPort, ChainRpcPort, ParsedTransaction, PersistencePort};
use std::{
    collections::HashSet,
    process::ExitCode,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use cli::{Cli, Command};
use control::ControlDir;
use liveness::Liveness;

const DEFAULT_LOG_FILTER: &str = "sniper=info,warn";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Start { settings } => run_start(*settings).await,
        Command::Stop { data_dir } => run_stop(&data_dir),
        Command::Health { settings } => run_health(*settings).await,
    }
}

fn run_stop(data_dir: &std::path::Path) -> ExitCode {
    let control = ControlDir::new(data_dir);
    match control.request_stop() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("failed to request stop: {e}");
            ExitCode::from(2)
        }
    }
}

async fn run_health(settings: config::Settings) -> ExitCode {
    let control = ControlDir::new(&settings.data_dir);
    if control.is_running() {
        let url = format!("http://127.0.0.1:{}/health", settings.metrics_port);
        return match reqwest::get(&url).await {
            Ok(response) if response.status().is_success() => ExitCode::from(0),
            Ok(response) => {
                eprintln!("running instance reports unhealthy: {}", response.status());
                ExitCode::from(3)
            }
            Err(e) => {
                eprintln!("failed to reach running instance's health endpoint: {e}");
                ExitCode::from(3)
            }
        };
    }

    match validate_settings(&settings) {
        Ok(()) => {
            println!("configuration OK (no running instance detected)");
            ExitCode::from(0)
        }
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Eager startup validation (§12 "validated eagerly at startup"). Anything
/// caught here maps to exit code 1, never 2 or 3.
fn validate_settings(settings: &config::Settings) -> anyhow::Result<()> {
    settings
        .websocket_url()
        .context("invalid solana_rpc_url scheme")?;
    if settings.telegram_chat_id.is_some() && settings.telegram_bot_token.is_none() {
        bail!("telegram_chat_id is set but telegram_bot_token is not");
    }
    Address::from_str(&settings.quote_mint).context("invalid quote_mint")?;
    Address::from_str(&settings.raydium_program_id).context("invalid raydium_program_id")?;
    for wallet in &settings.tracked_wallets {
        Address::from_str(wallet)
            .with_context(|| format!("invalid tracked_wallets entry: {wallet}"))?;
    }
    Ok(())
}

/// Process-local classification of a fatal `start` failure onto the exit
/// codes documented in §6/§15.
enum StartupError {
    Config(anyhow::Error),
    Startup(anyhow::Error),
    Dependency(anyhow::Error),
}

async fn run_start(settings: config::Settings) -> ExitCode {
    telemetry::initialize(DEFAULT_LOG_FILTER);
    telemetry::panic_hook::install();

    if let Err(e) = validate_settings(&settings) {
        tracing::error!(error = %e, "configuration error");
        return ExitCode::from(1);
    }

    let control = ControlDir::new(&settings.data_dir);
    if let Err(e) = control.mark_running() {
        tracing::error!(error = %e, "failed to initialize control directory");
        return ExitCode::from(2);
    }

    let result = run(&settings, &control).await;
    control.mark_stopped();

    match result {
        Ok(()) => ExitCode::from(0),
        Err(StartupError::Config(e)) => {
            tracing::error!(error = %e, "configuration error");
            ExitCode::from(1)
        }
        Err(StartupError::Startup(e)) => {
            tracing::error!(error = %e, "fatal startup error");
            ExitCode::from(2)
        }
        Err(StartupError::Dependency(e)) => {
            tracing::error!(error = %e, "unrecoverable dependency failure");
            ExitCode::from(3)
        }
    }
}

async fn run(settings: &config::Settings, control: &ControlDir) -> Result<(), StartupError> {
    let quote_mint = Address::from_str(&settings.quote_mint)
        .map_err(|e| StartupError::Config(anyhow::anyhow!(e).context("quote_mint")))?;
    let raydium_program_id = Address::from_str(&settings.raydium_program_id)
        .map_err(|e| StartupError::Config(anyhow::anyhow!(e).context("raydium_program_id")))?;

    let persistence = storage::PgPersistence::connect(settings.database_url.as_str())
        .await
        .context("connecting to the persistence database")
        .map_err(StartupError::Dependency)?;
    persistence
        .migrate()
        .await
        .context("running persistence schema migration")
        .map_err(StartupError::Dependency)?;
    let persistence: Arc<dyn PersistencePort> = Arc::new(persistence);

    let chain: Arc<dyn ChainRpcPort> = Arc::new(chain_rpc::RpcClient::new(settings.solana_rpc_url.clone()));

    let aggregator_http = aggregator_client::default_client(settings.aggregator_base_url.clone());
    let aggregator: Arc<dyn AggregatorPort> =
        Arc::new(aggregator_client::AggregatorClient::new(aggregator_http));

    let enricher = Arc::new(enrichment::Enricher::new(
        chain.clone(),
        aggregator.clone(),
        enrichment::EnrichmentTimeouts::default(),
    ));

    let alert_guard = Arc::new(alert_guard::AlertGuard::new(
        settings.token_cooldown(),
        settings.max_alerts_per_hour,
    ));

    let mut sinks: Vec<Arc<dyn ports::Sink>> = Vec::new();
    if let Some(token) = &settings.telegram_bot_token {
        sinks.push(Arc::new(telegram_sink::TelegramSink::new(
            reqwest::Client::new(),
            token.expose(),
        )));
    }
    let alerts_enabled = !sinks.is_empty();
    let dispatcher = Arc::new(alert_sinks::AlertDispatcher::new(sinks));
    let chat_id = settings.telegram_chat_id.clone().unwrap_or_default();

    let watchlist: HashSet<Address> = settings
        .watchlist_tokens
        .iter()
        .filter_map(|raw| Address::from_str(raw).ok())
        .collect();

    let alert_filter_cfg = alert_filter::AlertFilterConfig {
        min_liquidity_usd: settings.min_liquidity_usd,
        min_risk_score: settings.min_risk_score,
        ..alert_filter::AlertFilterConfig::default()
    };

    let outcome_tracker = Arc::new(outcome_tracker::OutcomeTracker::new(
        outcome_tracker::OutcomeTrackerConfig::default(),
        aggregator.clone(),
        persistence.clone(),
    ));

    let pipeline = Arc::new(AlertPipeline {
        enricher: enricher.clone(),
        persistence: persistence.clone(),
        alert_guard: alert_guard.clone(),
        dispatcher: dispatcher.clone(),
        outcome_tracker: outcome_tracker.clone(),
        alert_filter_cfg,
        chat_id: chat_id.clone(),
        watchlist,
    });

    let queue = Arc::new(analysis_queue::AnalysisQueue::new(
        analysis_queue::QueueConfig::default(),
    ));

    let hooks = {
        let alert_guard = alert_guard.clone();
        let chat_id = chat_id.clone();
        let can_send_alert = {
            let alert_guard = alert_guard.clone();
            let chat_id = chat_id.clone();
            Arc::new(move |mint: Address| -> BoxFuture<'static, bool> {
                let alert_guard = alert_guard.clone();
                let chat_id = chat_id.clone();
                Box::pin(async move {
                    if !alerts_enabled {
                        return true;
                    }
                    alert_guard.can_send_alert(&chat_id, mint, Utc::now()).await
                })
            })
        };
        let can_send_any_alert = Arc::new(move || -> BoxFuture<'static, bool> {
            let alert_guard = alert_guard.clone();
            let chat_id = chat_id.clone();
            Box::pin(async move {
                if !alerts_enabled {
                    return true;
                }
                alert_guard.can_send_any_alert(&chat_id, Utc::now()).await
            })
        });
        let process: analysis_queue::Job = {
            let pipeline = pipeline.clone();
            Arc::new(move |event: PoolEvent| {
                let pipeline = pipeline.clone();
                Box::pin(async move {
                    pipeline.process_pool_event(event).await;
                })
            })
        };
        analysis_queue::QueueHooks {
            can_send_alert,
            can_send_any_alert,
            process,
        }
    };

    tokio::spawn(queue.clone().run(hooks));
    tokio::spawn(outcome_tracker.clone().run());

    let pool_sources_alive = Arc::new(AtomicBool::new(true));

    if settings.raydium_enabled {
        let adapter = Arc::new(pool_source::SubscriptionAdapter::new(
            PoolSource::RaydiumSubscription,
            chain.clone(),
            raydium_program_id,
            raydium_tx_parser(quote_mint),
            Some(settings.min_liquidity_usd),
        ));
        spawn_pool_source(adapter, queue.clone(), persistence.clone());
    }
    if settings.pumpfun_enabled {
        let adapter = Arc::new(pool_source::PollingAdapter::new(
            PoolSource::PumpfunPolling,
            aggregator.clone(),
            settings.pumpfun_poll_interval,
            settings.min_liquidity_usd,
            quote_mint,
        ));
        spawn_pool_source(adapter, queue.clone(), persistence.clone());
    }
    if settings.jupiter_enabled {
        let adapter = Arc::new(pool_source::PollingAdapter::new(
            PoolSource::JupiterPolling,
            aggregator.clone(),
            settings.jupiter_poll_interval,
            settings.min_liquidity_usd,
            quote_mint,
        ));
        spawn_pool_source(adapter, queue.clone(), persistence.clone());
    }

    let mut wallet_monitors = Vec::new();
    let mut dex_program_ids = HashSet::new();
    dex_program_ids.insert(raydium_program_id);
    for raw in &settings.tracked_wallets {
        let wallet = Address::from_str(raw)
            .with_context(|| format!("invalid tracked wallet: {raw}"))
            .map_err(StartupError::Config)?;
        let monitor = Arc::new(wallet_monitor::WalletMonitor::new(
            wallet,
            chain.clone(),
            wallet_monitor::WalletMonitorConfig {
                dex_program_ids: dex_program_ids.clone(),
                ..wallet_monitor::WalletMonitorConfig::default()
            },
        ));
        wallet_monitors.push(monitor.clone());

        let emit = wallet_activity_emit(pipeline.clone());
        let monitor_for_task = monitor.clone();
        tokio::spawn(async move { monitor_for_task.start(emit).await });
    }

    let liveness: Arc<dyn telemetry::metrics::LivenessChecking> =
        Arc::new(Liveness::new(pool_sources_alive.clone(), wallet_monitors.clone()));
    tokio::spawn(telemetry::metrics::serve_with_liveness(
        settings.metrics_port,
        liveness,
    ));

    shutdown::wait(control).await;

    queue.shutdown();
    pool_sources_alive.store(false, Ordering::SeqCst);
    for monitor in &wallet_monitors {
        monitor.stop();
    }

    Ok(())
}

fn spawn_pool_source(
    adapter: Arc<dyn pool_source::PoolSourceAdapter>,
    queue: Arc<analysis_queue::AnalysisQueue>,
    persistence: Arc<dyn PersistencePort>,
) {
    let emit: pool_source::Emit = Arc::new(move |event: PoolEvent| {
        let queue = queue.clone();
        let persistence = persistence.clone();
        tokio::spawn(async move {
            let record = ports::PoolDiscoveryRecord::from(&event);
            if let Err(e) = persistence.save_pool_discovery(&record).await {
                tracing::warn!(mint = %event.token_mint, error = %e, "failed to persist pool discovery");
            }
            queue.enqueue(event).await;
        });
    });
    tokio::spawn(async move { adapter.start(emit).await });
}

/// Turns a parsed transaction touching the Raydium program into a
/// [`PoolEvent`] for a freshly seen mint. Mirrors the simplification already
/// documented on [`pool_source::PollingAdapter`]: without a grounded AMM
/// account-layout decoder, the new mint itself stands in for its own
/// pool/base address (§4.2, REDESIGN FLAGS).
fn raydium_tx_parser(quote_mint: Address) -> pool_source::TxParser {
    Arc::new(move |tx: &ParsedTransaction| {
        let candidate = tx.post_token_balances.iter().find(|balance| {
            balance.mint != quote_mint
                && !tx
                    .pre_token_balances
                    .iter()
                    .any(|pre| pre.mint == balance.mint)
        })?;
        let mint = candidate.mint;
        let discovered_at = tx.block_time.unwrap_or_else(Utc::now);
        PoolEvent::new(
            mint,
            mint,
            mint,
            quote_mint,
            PoolSource::RaydiumSubscription,
            discovered_at,
        )
        .ok()
    })
}

fn wallet_activity_emit(pipeline: Arc<AlertPipeline>) -> wallet_monitor::ActivityEmit {
    Arc::new(move |activity: WalletActivity| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline.process_wallet_activity(activity).await;
        });
    })
}

/// Maps a classified [`RiskLevel`] onto the urgency scale C7's
/// `min_priority` filter operates over. The safest tokens (best buy
/// opportunities) and outright honeypots (active scam warnings) are both
/// worth surfacing immediately; the muddier middle bands taper down.
fn alert_priority(level: RiskLevel) -> AlertPriority {
    match level {
        RiskLevel::Low => AlertPriority::Critical,
        RiskLevel::Medium => AlertPriority::High,
        RiskLevel::High => AlertPriority::Normal,
        RiskLevel::VeryHigh => AlertPriority::Low,
        RiskLevel::Extreme => AlertPriority::Critical,
    }
}

fn format_new_token_message(event: &PoolEvent, facts: &EnrichmentFacts, verdict: &RiskVerdict) -> String {
    format!(
        "New pool discovered\nToken: {}\nSource: {:?}\nRisk: {}/100 ({:?})\nLiquidity: ${:.0}\nHolders: {}",
        event.token_mint,
        event.source,
        verdict.score,
        verdict.level,
        facts.liquidity.total_liquidity_usd,
        facts.holders.total_holders,
    )
}

fn format_wallet_activity_message(activity: &WalletActivity, verdict: &RiskVerdict) -> String {
    format!(
        "Tracked wallet {}: {:?} {} (token {})\nRisk: {}/100 ({:?})",
        activity.wallet,
        activity.kind,
        activity.amount,
        activity.token_mint,
        verdict.score,
        verdict.level,
    )
}

/// Bundles the collaborators every alert-worthy event (new pool, tracked
/// wallet activity) routes through: enrich -> classify -> persist -> filter
/// -> dispatch -> record (§4.5-§4.8).
struct AlertPipeline {
    enricher: Arc<enrichment::Enricher>,
    persistence: Arc<dyn PersistencePort>,
    alert_guard: Arc<alert_guard::AlertGuard>,
    dispatcher: Arc<alert_sinks::AlertDispatcher>,
    outcome_tracker: Arc<outcome_tracker::OutcomeTracker>,
    alert_filter_cfg: alert_filter::AlertFilterConfig,
    chat_id: String,
    watchlist: HashSet<Address>,
}

impl AlertPipeline {
    async fn process_pool_event(&self, event: PoolEvent) {
        let now = Utc::now();
        let facts = self.enricher.enrich(event.token_mint).await;
        let verdict = risk::classify(&facts);

        if let Err(e) = self
            .persistence
            .save_analysis(&ports::AnalysisRecord {
                pool_address: event.pool_address,
                token_mint: event.token_mint,
                facts: facts.clone(),
                verdict: verdict.clone(),
                analyzed_at: now,
            })
            .await
        {
            tracing::warn!(mint = %event.token_mint, error = %e, "failed to persist analysis");
        }

        let on_watchlist = self.watchlist.contains(&event.token_mint);
        if on_watchlist || facts.liquidity.total_liquidity_usd >= self.alert_filter_cfg.min_liquidity_usd {
            self.track(event.token_mint, &facts, &verdict, now).await;
        }

        self.maybe_alert(
            event.token_mint,
            AlertCategory::NewToken,
            &facts,
            &verdict,
            format_new_token_message(&event, &facts, &verdict),
            now,
        )
        .await;
    }

    async fn process_wallet_activity(&self, activity: WalletActivity) {
        let now = Utc::now();
        let facts = self.enricher.enrich(activity.token_mint).await;
        let verdict = risk::classify(&facts);
        let message = format_wallet_activity_message(&activity, &verdict);

        self.maybe_alert(
            activity.token_mint,
            AlertCategory::WalletActivity,
            &facts,
            &verdict,
            message,
            now,
        )
        .await;
    }

    async fn track(&self, mint: Address, facts: &EnrichmentFacts, verdict: &RiskVerdict, now: DateTime<Utc>) {
        let symbol = mint.to_string();
        if let Err(e) = self
            .outcome_tracker
            .track_token(
                mint,
                symbol,
                0.0,
                facts.liquidity.total_liquidity_usd,
                verdict.score,
                facts.holders.total_holders,
                now,
            )
            .await
        {
            tracing::debug!(%mint, error = ?e, "outcome tracker did not register token");
        }
    }

    async fn maybe_alert(
        &self,
        mint: Address,
        category: AlertCategory,
        facts: &EnrichmentFacts,
        verdict: &RiskVerdict,
        message: String,
        now: DateTime<Utc>,
    ) {
        if self.chat_id.is_empty() {
            return;
        }
        let priority = alert_priority(verdict.level);
        if !alert_filter::should_alert(verdict, facts, mint, category, priority, &self.alert_filter_cfg, now) {
            return;
        }
        if !self.alert_guard.can_send_alert(&self.chat_id, mint, now).await {
            return;
        }

        let alert = Alert {
            token_mint: mint,
            chat_id: self.chat_id.clone(),
            category,
            priority,
            verdict: verdict.clone(),
            message,
            created_at: now,
        };

        let (primary_delivered, _results) = self.dispatcher.dispatch(&alert).await;
        if primary_delivered {
            self.alert_guard.mark_alert_sent(&self.chat_id, mint, now).await;
            let alert_type = format!("{category:?}");
            if let Err(e) = self
                .persistence
                .save_alert(&ports::AlertRecord {
                    token_mint: mint,
                    chat_id: self.chat_id.clone(),
                    alert_type,
                    sent_at: now,
                })
                .await
            {
                tracing::warn!(%mint, error = %e, "failed to persist alert record");
            }
        }
    }
}
