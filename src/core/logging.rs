//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary logged once at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    let config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Secrets are never printed; only whether they are present.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🎵 Contest bot configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match config::recording::kind() {
        Ok(kind) => log::info!("Recorder: {}", kind),
        Err(e) => log::error!("❌ Recorder: {}", e),
    }

    match &*config::moderation::ADMIN_CHAT_ID {
        Ok(Some(chat_id)) => log::info!("Moderation chat: {}", chat_id),
        Ok(None) => log::info!("Moderation chat: not set"),
        Err(e) => log::error!("❌ Moderation chat: {}", e),
    }

    if config::sheets::SPREADSHEET_ID.is_some() {
        log::info!("Spreadsheet: by id");
    } else {
        log::info!("Spreadsheet: '{}' (looked up by name)", *config::sheets::SPREADSHEET_NAME);
    }

    let credentials = if config::sheets::CREDENTIALS_JSON.is_some() {
        "inline JSON"
    } else if config::sheets::CREDENTIALS_FILE.is_some() {
        "key file"
    } else {
        "not set"
    };
    log::info!("Google credentials: {}", credentials);

    log::info!(
        "Link policy: {} (allowed: {})",
        *config::links::POLICY,
        config::links::ALLOWED_DOMAINS.join(", ")
    );
    log::info!(
        "Record attempts: {}, dedupe window: {}s",
        *config::recording::MAX_ATTEMPTS,
        *config::recording::DEDUPE_WINDOW_SECS
    );

    match config::session::ttl() {
        Some(ttl) => log::info!("Session TTL: {}s", ttl.as_secs()),
        None => log::warn!("⚠️  Session expiry disabled (SESSION_TTL_SECS=0)"),
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
