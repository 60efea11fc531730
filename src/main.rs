use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::{webhooks, Polling};

use contest_bot::cli::{entry_from_args, Cli, Commands, GenreArg, LeagueArg};
use contest_bot::conversation::{Conversation, SessionStore, Submitter};
use contest_bot::core::{config, init_logger, log_startup_configuration, LinkValidator, LinkVerdict};
use contest_bot::recording::{build_recorder, Submission};
use contest_bot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the contest bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Log panics instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::CheckLink { text }) => {
            run_check_link(&text);
            Ok(())
        }
        Some(Commands::TestRecord { league, genre, link }) => run_test_record(league, genre, link).await,
        None => {
            // No command specified - default to running the bot
            log::info!("No command specified, running bot in default mode");
            run_bot(false).await
        }
    }
}

/// Prints the verdict of the configured link policy for `text`
fn run_check_link(text: &str) {
    let validator = LinkValidator::from_config();
    match validator.check(text) {
        LinkVerdict::Accepted(link) => println!("accepted: {}", link),
        LinkVerdict::NoLink => println!("no link found ({} policy)", validator.policy()),
        LinkVerdict::Rejected(url) => println!(
            "rejected: {} (allowed: {})",
            url,
            validator.allowed_domains().join(", ")
        ),
    }
}

/// Records one synthetic submission to verify recorder credentials
async fn run_test_record(league: LeagueArg, genre: GenreArg, link: String) -> Result<()> {
    let bot = create_bot()?;
    let recorder = build_recorder(&bot)?;

    let submitter = Submitter::new(0, Some("contest_bot_test".to_string()));
    let submission = Submission::new(&submitter, entry_from_args(league, genre), link);

    recorder.record(&submission).await?;
    println!(
        "recorded via {}: {} / {} / {}",
        recorder.name(),
        submission.league,
        submission.genre_label(),
        submission.link
    );
    Ok(())
}

/// Runs the dispatcher with long polling or a webhook listener
async fn run_bot(use_webhook: bool) -> Result<()> {
    log_startup_configuration();

    let bot = create_bot()?;
    let recorder = build_recorder(&bot)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let sessions = Arc::new(SessionStore::from_config());
    if let Some(ttl) = sessions.ttl() {
        log::info!("Unfinished conversations expire after {:?}", ttl);
        Arc::clone(&sessions).spawn_cleanup_task(config::session::cleanup_interval());
    }

    let conversation = Conversation::new(sessions, LinkValidator::from_config(), recorder)
        .with_error_reports(*config::recording::REPORT_ERRORS);
    let handler = schema(HandlerDeps::with_configured_copy(Arc::new(conversation)));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .enable_ctrlc_handler()
        .build();

    // Check if webhook mode is enabled
    let webhook_url = if use_webhook { config::WEBHOOK_URL.clone() } else { None };

    match webhook_url {
        Some(url) => {
            let url = url::Url::parse(&url)?;
            let address: std::net::SocketAddr = ([0, 0, 0, 0], *config::WEBHOOK_PORT).into();
            log::info!("Starting bot in webhook mode at {} (listening on {})", url, address);

            let listener = webhooks::axum(bot, webhooks::Options::new(address, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            if use_webhook {
                log::warn!("--webhook given but WEBHOOK_URL is not set, falling back to long polling");
            }
            log::info!("Starting bot in long polling mode");

            let listener = Polling::builder(bot).delete_webhook().await.build();
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
