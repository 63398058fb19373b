//! Sortline CLI - operator console for a conveyor sorting line.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use sortline::cli::{
    Cli, Commands, ConfigCommands, CountCommands, MaintenanceCommands, QueueCommands,
    RelayCommands,
};
use sortline::commands::{self, Output, lane_index};
use sortline::config::{ConsoleSettings, SettingsOverrides};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "SORTLINE_LOG";

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let interactive = matches!(cli.command, None | Some(Commands::Console));
    let _guard = init_logging(interactive);

    if let Err(e) = run(cli, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// One-shot commands log to stderr; the interactive console owns the
/// terminal, so it logs to a daily file instead.
fn init_logging(interactive: bool) -> Option<WorkerGuard> {
    let default_level = if interactive { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    if interactive {
        let dir = log_dir()?;
        if std::fs::create_dir_all(&dir).is_err() {
            return None;
        }
        let appender = tracing_appender::rolling::daily(dir, "sortline.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init();
        Some(guard)
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        None
    }
}

fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("sortline").join("logs"))
}

fn run(cli: Cli, human: bool) -> Result<(), sortline::Error> {
    let mut overrides = SettingsOverrides::new();
    if let Some(host) = cli.host {
        overrides = overrides.with_host(host);
    }
    if let Some(port) = cli.port {
        overrides = overrides.with_port(port);
    }
    if let Some(path) = cli.config_path {
        overrides = overrides.with_config_path(path);
    }
    let settings = ConsoleSettings::resolve(&overrides)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| sortline::Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(run_command(cli.command, &settings, human))
}

async fn run_command(
    command: Option<Commands>,
    settings: &ConsoleSettings,
    human: bool,
) -> Result<(), sortline::Error> {
    let timeout = settings.request_timeout();

    match command {
        None | Some(Commands::Console) => run_console(settings).await?,
        Some(Commands::Status { timeout_secs }) => {
            let summary =
                commands::status(settings, std::time::Duration::from_secs(timeout_secs)).await?;
            output(&summary, human);
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Get => output(&commands::config_get(settings).await?, human),
            ConfigCommands::Push { file } => {
                output(&commands::config_push(settings, &file).await?, human)
            }
            ConfigCommands::Settings => output(&commands::settings_report(settings), human),
        },
        Some(Commands::Maintenance {
            command: MaintenanceCommands::Reset,
        }) => output(&commands::maintenance_reset(settings).await?, human),
        Some(Commands::Queue {
            command: QueueCommands::Reset,
        }) => output(&commands::queue_reset(settings).await?, human),
        Some(Commands::Mock { lane, state }) => {
            let result = commands::mock_sensor(settings, lane_index(lane)?, state.is_active()).await?;
            output(&result, human);
        }
        Some(Commands::Relay { command }) => {
            let result = match command {
                RelayCommands::Test { lane, action } => {
                    commands::relay_test(settings, lane_index(lane)?, action.into(), timeout)
                        .await?
                }
                RelayCommands::TestAll => commands::relay_test_all(settings, timeout).await?,
            };
            output(&result, human);
        }
        Some(Commands::Count {
            command: CountCommands::Reset { lane },
        }) => {
            let result = commands::count_reset(settings, lane_index(lane)?, timeout).await?;
            output(&result, human);
        }
        Some(Commands::Autotest { mode }) => {
            output(&commands::autotest(settings, mode.enabled(), timeout).await?, human)
        }
        Some(Commands::SortLog { days }) => output(&commands::sort_log(settings, days).await?, human),
    }

    Ok(())
}

#[cfg(feature = "tui")]
async fn run_console(settings: &ConsoleSettings) -> Result<(), sortline::Error> {
    sortline::tui::run_tui(settings.clone()).await
}

#[cfg(not(feature = "tui"))]
async fn run_console(_settings: &ConsoleSettings) -> Result<(), sortline::Error> {
    Err(sortline::Error::Other(
        "This build has no terminal console (enable the `tui` feature)".to_string(),
    ))
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
