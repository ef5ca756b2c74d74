use crate::config::Config;
use crate::filter;
use crate::models::{City, StateVector, WeatherResponse};
use crate::render::FLIGHT_LOAD_FAILED;
use chrono::{DateTime, Days, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};
use tracing::debug;

/// Monotonic request counter for one stream of fetches.
///
/// Every fetch takes a fresh token; a result is applied only if its token is
/// still the latest one issued, so a slow response can't overwrite a newer one.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

/// Work the event loop should start on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchFlights { token: u64 },
    FetchWeather { token: u64, city: City },
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum FilterMode {
    #[default]
    All,
    Date,
    Destination,
}

impl FilterMode {
    fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Date,
            FilterMode::Date => FilterMode::Destination,
            FilterMode::Destination => FilterMode::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Date => "By date",
            FilterMode::Destination => "By destination",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPanel {
    Loading,
    Ready(WeatherResponse),
    Failed,
}

pub struct App {
    pub cities: Vec<City>,
    pub city_index: usize,
    pub weather: WeatherPanel,
    pub weather_tokens: RequestTokens,
    pub weather_requested_at: Option<Instant>,
    pub weather_refresh: Duration,

    /// Last fetched snapshot. Filters read it, nothing writes it but a fetch result.
    pub flights: Vec<StateVector>,
    pub flight_tokens: RequestTokens,
    pub filter_mode: FilterMode,
    pub date: NaiveDate,
    pub destination_index: usize,
    pub selected_index: usize,
    pub row_limit: Option<usize>,
    pub show_status: bool,

    pub status: String,
    pub last_update: Option<Instant>,
    pub last_update_success: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config, cities: Vec<City>, today: NaiveDate) -> Self {
        let city_index = cities
            .iter()
            .position(|c| c.key == config.weather.default_city)
            .unwrap_or(0);

        Self {
            cities,
            city_index,
            weather: WeatherPanel::Loading,
            weather_tokens: RequestTokens::default(),
            weather_requested_at: None,
            weather_refresh: Duration::from_secs(
                config.weather.refresh_minutes.max(1).saturating_mul(60),
            ),
            flights: Vec::new(),
            flight_tokens: RequestTokens::default(),
            filter_mode: FilterMode::All,
            date: today,
            destination_index: 0,
            selected_index: 0,
            row_limit: config.flights.row_limit,
            show_status: config.flights.show_status,
            status: String::new(),
            last_update: None,
            last_update_success: false,
            should_quit: false,
        }
    }

    pub fn selected_city(&self) -> Option<&City> {
        self.cities.get(self.city_index)
    }

    /// Commands issued on startup: one flight load and one weather load.
    pub fn start(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = vec![self.request_flights()];
        commands.extend(self.request_weather(now));
        commands
    }

    pub fn request_flights(&mut self) -> Command {
        self.status = "Loading flight data...".to_string();
        Command::FetchFlights {
            token: self.flight_tokens.issue(),
        }
    }

    pub fn request_weather(&mut self, now: Instant) -> Option<Command> {
        let city = self.selected_city()?.clone();
        self.weather = WeatherPanel::Loading;
        self.weather_requested_at = Some(now);
        Some(Command::FetchWeather {
            token: self.weather_tokens.issue(),
            city,
        })
    }

    pub fn on_tick(&mut self, now: Instant) -> Option<Command> {
        let due = self
            .weather_requested_at
            .is_some_and(|at| now.duration_since(at) >= self.weather_refresh);
        if due {
            debug!("Weather refresh interval elapsed");
            self.request_weather(now)
        } else {
            None
        }
    }

    pub fn apply_flights(&mut self, token: u64, flights: Vec<StateVector>, is_success: bool, at: Instant) {
        if !self.flight_tokens.is_current(token) {
            debug!("Dropping stale flight result (token {})", token);
            return;
        }
        self.flights = flights;
        self.last_update = Some(at);
        self.last_update_success = is_success;
        self.status = if is_success {
            String::new()
        } else {
            FLIGHT_LOAD_FAILED.to_string()
        };
        self.selected_index = 0;
        self.destination_index = self
            .destination_index
            .min(self.destinations().len().saturating_sub(1));
    }

    pub fn apply_weather(&mut self, token: u64, result: Option<WeatherResponse>) {
        if !self.weather_tokens.is_current(token) {
            debug!("Dropping stale weather result (token {})", token);
            return;
        }
        self.weather = match result {
            Some(data) => WeatherPanel::Ready(data),
            None => WeatherPanel::Failed,
        };
    }

    pub fn destinations(&self) -> Vec<String> {
        filter::destinations(&self.flights)
    }

    pub fn selected_destination(&self) -> Option<String> {
        self.destinations().get(self.destination_index).cloned()
    }

    /// The rows currently on screen, derived fresh from the snapshot.
    pub fn visible_flights(&self, now: DateTime<Utc>) -> Vec<StateVector> {
        let rows = match self.filter_mode {
            FilterMode::All => self.flights.clone(),
            FilterMode::Date => {
                let day = self.date.format("%Y-%m-%d").to_string();
                filter::by_date(&self.flights, &day).unwrap_or_default()
            }
            FilterMode::Destination => match self.selected_destination() {
                Some(dest) => filter::by_destination(&self.flights, &dest, now),
                None => Vec::new(),
            },
        };
        match self.row_limit {
            Some(limit) => rows.into_iter().take(limit).collect(),
            None => rows,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('s') | KeyCode::Enter => Some(self.request_flights()),
            KeyCode::Right | KeyCode::Char('l') => {
                if self.cities.is_empty() {
                    return None;
                }
                self.city_index = (self.city_index + 1) % self.cities.len();
                self.request_weather(now)
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.cities.is_empty() {
                    return None;
                }
                self.city_index = self
                    .city_index
                    .checked_sub(1)
                    .unwrap_or(self.cities.len() - 1);
                self.request_weather(now)
            }
            KeyCode::Char('f') => {
                self.filter_mode = self.filter_mode.next();
                self.selected_index = 0;
                None
            }
            KeyCode::Char(']') => {
                self.step_criterion(true);
                None
            }
            KeyCode::Char('[') => {
                self.step_criterion(false);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.visible_flights(Utc::now()).len();
                if len > 0 {
                    self.selected_index = (self.selected_index + 1) % len;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.visible_flights(Utc::now()).len();
                if len > 0 {
                    self.selected_index = self.selected_index.checked_sub(1).unwrap_or(len - 1);
                }
                None
            }
            _ => None,
        }
    }

    // Moves the date by a day or the destination by one entry.
    fn step_criterion(&mut self, forward: bool) {
        match self.filter_mode {
            FilterMode::All => {}
            FilterMode::Date => {
                let stepped = if forward {
                    self.date.checked_add_days(Days::new(1))
                } else {
                    self.date.checked_sub_days(Days::new(1))
                };
                if let Some(d) = stepped {
                    self.date = d;
                }
            }
            FilterMode::Destination => {
                let len = self.destinations().len();
                if len == 0 {
                    return;
                }
                self.destination_index = if forward {
                    (self.destination_index + 1) % len
                } else {
                    self.destination_index.checked_sub(1).unwrap_or(len - 1)
                };
            }
        }
        self.selected_index = 0;
    }
}
