//! `tavern-bot` -- Discord gateway process.
//!
//! Awards roleplay XP for messages in configured channels, announces
//! level-ups, and serves the character/DM/configuration slash commands.
//! See [`BotConfig::from_env`] for the environment variables it reads.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use serenity::all::{Client, GatewayIntents, Http};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tavern_bot::accrual::AccrualOrchestrator;
use tavern_bot::commands::CommandContext;
use tavern_bot::config::BotConfig;
use tavern_bot::handler::{CommandSync, Handler};
use tavern_bot::ledger::PgLedger;
use tavern_events::{DiscordDelivery, EventBus, LevelUpDispatcher};

/// How long shutdown waits for pending level-up deliveries.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tavern_bot=debug,tavern_events=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = BotConfig::from_env();
    tracing::info!(
        env = %config.env,
        guild_id = config.guild_id,
        reset_offset_minutes = config.day_boundary.offset_minutes(),
        max_level = config.levels.max_level(),
        "Loaded bot configuration"
    );

    // --- Database ---
    let pool = tavern_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tavern_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tavern_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Level-up notifications ---
    let event_bus = Arc::new(EventBus::default());
    let http = Arc::new(Http::new(&config.discord_token));
    let delivery = DiscordDelivery::new(Arc::clone(&http))
        .with_default_image(config.default_character_image.clone());
    let dispatcher = LevelUpDispatcher::new(Arc::new(delivery)).with_timeout(config.notify_timeout);
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    // --- Accrual and commands ---
    let levels = Arc::new(config.levels.clone());
    let ledger = Arc::new(PgLedger::new(pool.clone(), Arc::clone(&levels)));
    let orchestrator = Arc::new(AccrualOrchestrator::new(
        ledger,
        Arc::clone(&event_bus),
        config.day_boundary,
    ));
    let command_context = CommandContext {
        pool,
        levels,
        boundary: config.day_boundary,
    };
    let handler = Handler::new(
        orchestrator,
        command_context,
        CommandSync::from_env(config.is_dev(), config.guild_id),
    );

    // --- Gateway ---
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        shutdown_signal().await;
        shard_manager.shutdown_all().await;
    });

    tracing::info!("Starting Discord gateway");
    client.start().await.context("Discord client error")?;

    // --- Post-shutdown cleanup ---
    // Dropping the client releases the orchestrator's bus handle; dropping
    // ours closes the channel so the dispatcher finishes in-flight deliveries
    // and exits.
    drop(client);
    drop(event_bus);
    match tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, dispatcher_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Level-up dispatcher task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = SHUTDOWN_DRAIN_TIMEOUT.as_secs(),
            "Timed out waiting for level-up deliveries, some notifications may be lost"
        ),
    }
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
