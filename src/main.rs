//! SkyCast CLI
//!
//! Weather dashboard for the terminal: current conditions, air quality and a
//! history + forecast timeline for a city or the current position.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skycast_core::{App, AppError};
use skycast_dashboard::{
    Autocomplete, CycleOutcome, Dashboard, DashboardState, PendingCycle, Renderer,
};
use skycast_weather::{CityLookupClient, LocationQuery};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "skycast")]
#[command(author, version, about = "Terminal weather dashboard", long_about = None)]
struct Cli {
    /// Path to config.toml (default: the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard once
    ///
    /// Without a city or coordinates the current position is used, falling
    /// back to the default city.
    Show {
        /// City name
        city: Option<String>,

        /// Latitude (requires --lon)
        #[arg(long, requires = "lon", conflicts_with = "city", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude (requires --lat)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List city suggestions for a name prefix
    Search {
        /// Beginning of a city name
        prefix: String,
    },

    /// Interactive mode: each line on stdin selects a city
    ///
    /// `?prefix` shows suggestions, `:retry` retries, `:home` returns to the
    /// default city, `:quit` exits.
    Watch,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    skycast_core::init_tracing(cli.verbose);

    let app = App::new(cli.config.as_deref()).context("Failed to load configuration")?;

    let config = app.config();
    let renderer = Renderer::from(&config.ui);

    let code = match cli.command {
        Commands::Show { city, lat, lon } => {
            let dashboard = Dashboard::from_config(&config).map_err(AppError::from)?;
            let cycle = show_cycle(&dashboard, city, lat, lon);
            let outcome = dashboard.run(cycle).await;
            let state = outcome.state().cloned().unwrap_or_else(|| dashboard.state());
            print_state(&state, renderer, cli.json)?;
            exit_code(&state)
        }
        Commands::Search { prefix } => {
            let client = CityLookupClient::from_config(&config.lookup)?;
            match client.search(&prefix).await {
                Ok(suggestions) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&suggestions)?);
                    ExitCode::SUCCESS
                }
                Ok(suggestions) => {
                    for suggestion in suggestions {
                        println!("{}", suggestion.label);
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let error = AppError::from(e);
                    tracing::debug!(error = %error, "Search failed");
                    eprintln!("{}", error.user_message());
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Watch => {
            let dashboard = Arc::new(Dashboard::from_config(&config).map_err(AppError::from)?);
            let lookup = Arc::new(CityLookupClient::from_config(&config.lookup)?);
            watch(dashboard, lookup, config.lookup.debounce(), renderer, cli.json).await?;
            ExitCode::SUCCESS
        }
    };

    app.shutdown();
    Ok(code)
}

/// Start the `show` cycle: coordinates win over a city, and a city given as
/// a suggestion label ("Pune, IN") is reduced to its name.
fn show_cycle(
    dashboard: &Dashboard,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> PendingCycle {
    match (city, lat, lon) {
        (_, Some(lat), Some(lon)) => dashboard.begin_fetch(LocationQuery::coordinates(lat, lon)),
        (Some(city), _, _) => dashboard.begin_select(skycast_weather::city_from_suggestion(&city)),
        _ => dashboard.begin_initialize(),
    }
}

fn print_state(state: &DashboardState, renderer: Renderer, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        print!("{}", renderer.render(state));
    }
    Ok(())
}

fn exit_code(state: &DashboardState) -> ExitCode {
    if state.phase.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

enum WatchCommand {
    Quit,
    Retry,
    Home,
    Suggest(String),
    City(String),
}

impl WatchCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            ":quit" | ":q" => Some(Self::Quit),
            ":retry" => Some(Self::Retry),
            ":home" => Some(Self::Home),
            _ => match line.strip_prefix('?') {
                Some(prefix) => Some(Self::Suggest(prefix.to_string())),
                None => Some(Self::City(line.to_string())),
            },
        }
    }
}

async fn watch(
    dashboard: Arc<Dashboard>,
    lookup: Arc<CityLookupClient>,
    debounce: std::time::Duration,
    renderer: Renderer,
    json: bool,
) -> Result<()> {
    let (mut autocomplete, mut updates) = Autocomplete::new(lookup, debounce);
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            match update.result {
                Ok(suggestions) => {
                    for suggestion in suggestions {
                        println!("  {}", suggestion.label);
                    }
                }
                Err(e) => println!("  {}", e.user_message()),
            }
        }
    });

    if !json {
        let mut selection = dashboard.session().subscribe();
        tokio::spawn(async move {
            while selection.changed().await.is_ok() {
                match selection.borrow_and_update().as_deref() {
                    Some(city) => println!("→ {}", city),
                    None => println!("→ default city"),
                }
            }
        });
    }

    // Cycles begin here on the reader so a later line always supersedes an
    // earlier one, however the spawned tasks get scheduled.
    spawn_cycle(&dashboard, dashboard.begin_initialize(), renderer, json);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cycle = match WatchCommand::parse(&line) {
            None => continue,
            Some(WatchCommand::Quit) => break,
            Some(WatchCommand::Suggest(prefix)) => {
                autocomplete.input(&prefix);
                continue;
            }
            Some(WatchCommand::Retry) => dashboard.begin_retry(),
            Some(WatchCommand::Home) => dashboard.begin_home(),
            Some(WatchCommand::City(city)) => {
                dashboard.begin_select(skycast_weather::city_from_suggestion(&city))
            }
        };
        spawn_cycle(&dashboard, cycle, renderer, json);
    }

    autocomplete.cancel();
    Ok(())
}

/// Run one started cycle in the background; superseded cycles print nothing.
fn spawn_cycle(dashboard: &Arc<Dashboard>, cycle: PendingCycle, renderer: Renderer, json: bool) {
    let dashboard = dashboard.clone();
    tokio::spawn(async move {
        if let CycleOutcome::Committed(state) = dashboard.run(cycle).await {
            if let Err(e) = print_state(&state, renderer, json) {
                tracing::error!(error = %e, "Failed to print dashboard");
            }
        }
    });
}
