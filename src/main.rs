use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use skyboard::{
    api::{self, FlightProvider, FlightSource, Geocoder, WeatherProvider, WeatherSource},
    app::{App, Command},
    config::{Config, DEFAULT_CONFIG_PATH},
    events::{Event, EventHandler},
    location, logging, server, ui, weather,
};
use std::{io, path::PathBuf, sync::Arc, time::Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "skyboard", about = "Live flights and weather dashboard")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Terminal dashboard (default)
    Tui,
    /// Proxy/cache endpoint and HTML dashboard
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Serve { port } => {
            logging::initialize_server_logging();
            color_eyre::install()?;
            let mut config = Config::load(&cli.config);
            if let Some(port) = port {
                config.server.port = port;
            }
            server::start_server(&config).await
        }
        Commands::Tui => {
            // Instrumentation and safety
            let _log_guard = logging::initialize_logging();
            install_panic_hook();
            color_eyre::install()?;
            let config = Config::load(&cli.config);
            run_tui(config).await
        }
    }
}

struct Providers {
    flights: Arc<dyn FlightSource>,
    weather: Arc<dyn WeatherSource>,
}

// Each fetch runs on its own task and reports back with the token it was issued.
fn dispatch(command: Command, providers: &Providers, tx: &UnboundedSender<Event>) {
    match command {
        Command::FetchFlights { token } => {
            let source = providers.flights.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let (flights, is_success) = api::states_or_empty(source.as_ref()).await;
                let _ = tx.send(Event::FlightUpdate {
                    token,
                    flights,
                    timestamp: Instant::now(),
                    is_success,
                });
            });
        }
        Command::FetchWeather { token, city } => {
            let source = providers.weather.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let data = match source.fetch_weather(city.latitude, city.longitude).await {
                    Ok(data) => Some(data),
                    Err(e) => {
                        warn!("Weather loading error for {}: {}", city.name, e);
                        None
                    }
                };
                let _ = tx.send(Event::WeatherUpdate { token, data });
            });
        }
    }
}

async fn run_tui(config: Config) -> Result<()> {
    let providers = Providers {
        flights: Arc::new(FlightProvider::new(&config.flights)?),
        weather: Arc::new(WeatherProvider::new(&config.weather)?),
    };

    let mut cities = weather::cities();
    if config.weather.auto_locate {
        let geocoder = Geocoder::new(&config.weather)?;
        cities.insert(0, location::current_location(&geocoder).await);
    }

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(&config, cities, Utc::now().date_naive());
    let mut events = EventHandler::new(config.ui.tick_rate_ms);
    let tx = events.tx.clone();

    for command in app.start(Instant::now()) {
        dispatch(command, &providers, &tx);
    }
    info!("Dashboard started");

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        let Some(event) = events.next().await else {
            break;
        };
        let command = match event {
            Event::Tick => app.on_tick(Instant::now()),
            Event::Input(key) => app.handle_key(key, Instant::now()),
            Event::FlightUpdate {
                token,
                flights,
                timestamp,
                is_success,
            } => {
                app.apply_flights(token, flights, is_success, timestamp);
                None
            }
            Event::WeatherUpdate { token, data } => {
                app.apply_weather(token, data);
                None
            }
        };
        if let Some(command) = command {
            dispatch(command, &providers, &tx);
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
