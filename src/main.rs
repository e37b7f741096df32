//! Console driver for the translation engine.
//!
//! Stands in for the hook layer: each stdin line is a dialogue line
//! (`name<TAB>message` or just `message`) translated the way a hooked call
//! would be. Lines starting with `:` are commands.

use std::io::{
    self,
    BufRead,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use retouch_tl::config::ConfigManager;
use retouch_tl::encoding;
use retouch_tl::watch::ReloadTriggers;
use retouch_tl::Engine;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// ゲームディレクトリに出力するログファイル
const LOG_FILE_NAME: &str = "retouch-tl.log";

/// stderr とログファイルの両方に出力する
fn init_logging(game_dir: &Path) -> WorkerGuard {
    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(game_dir, LOG_FILE_NAME));

    tracing_subscriber::registry()
        .with(EnvFilter::builder().with_default_directive(tracing::Level::INFO.into()).from_env_lossy())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    guard
}

/// 1 行分のコマンドを処理する。終了する場合は `false`
fn handle_line(engine: &Engine, line: &str, out: &mut impl Write) -> io::Result<bool> {
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        ":quit" | ":q" => return Ok(false),
        ":reload" => match engine.reload() {
            Ok(summary) => writeln!(out, "reloaded: {summary}")?,
            Err(error) => writeln!(out, "reload failed: {error}")?,
        },
        ":stats" => write!(out, "{}", engine.print_stats())?,
        ":label" => {
            let translated = engine.resolve_text(engine.find_label(&encoding::to_legacy(argument)));
            writeln!(out, "{}", translated.as_deref().unwrap_or(argument))?;
        }
        ":asset" => match engine.find_replacement_asset(argument) {
            Some(path) => writeln!(out, "{}", path.display())?,
            None => writeln!(out, "{argument}")?,
        },
        _ => {
            let (name, message) = match line.split_once('\t') {
                Some((name, message)) => (Some(name), message),
                None => (None, line),
            };
            let name_bytes = name.map(encoding::to_legacy);
            let dialogue =
                engine.translate_dialogue(name_bytes.as_deref(), Some(encoding::to_legacy(message).as_slice()));

            let message = engine.resolve_text(dialogue.message).unwrap_or_else(|| message.to_string());
            match name {
                Some(name) => {
                    let name = engine.resolve_text(dialogue.name).unwrap_or_else(|| name.to_string());
                    writeln!(out, "{name}: {message}")?;
                }
                None => writeln!(out, "{message}")?,
            }
        }
    }
    Ok(true)
}

fn main() -> io::Result<()> {
    let game_dir = std::env::args().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);
    let _guard = init_logging(&game_dir);

    let mut config = ConfigManager::new(game_dir.clone());
    if let Err(error) = config.load_settings(game_dir.clone()) {
        tracing::error!(%error, "Invalid settings; using defaults");
    }

    let engine = Arc::new(Engine::open(&config));
    engine.set_scene_callback(Box::new(|scene: &str| tracing::info!(scene, "Scene changed")));

    let triggers = match ReloadTriggers::start(&engine, &config.get_settings().hot_reload, &game_dir, None) {
        Ok(triggers) => Some(triggers),
        Err(error) => {
            tracing::warn!(%error, "Hot reload disabled");
            None
        }
    };

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if !handle_line(&engine, line, &mut out)? {
            break;
        }
        out.flush()?;
    }

    if let Some(triggers) = triggers
        && !triggers.shutdown()
    {
        tracing::warn!("Some reload triggers did not stop in time");
    }
    engine.print_stats();
    engine.close();
    Ok(())
}
