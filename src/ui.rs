//! Terminal rendering for the dashboard.
//!
//! Draws the flight table on the left, the weather widget on the right and a
//! status/help bar underneath, all from the current [`App`] snapshot.

use crate::airlines::airline_name;
use crate::app::{App, FilterMode, WeatherPanel};
use crate::models::City;
use crate::render::{display_date, whole, WEATHER_FAILED};
use crate::weather::{describe, wind_direction};
use chrono::Utc;
use ratatui::{prelude::*, widgets::*};

/// Renders one frame of the dashboard.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[0]);

    render_flights(f, app, columns[0]);
    render_weather(f, app, columns[1]);
    render_status_bar(f, app, rows[1]);
}

fn filter_title(app: &App) -> String {
    match app.filter_mode {
        FilterMode::All => " Flights ".to_string(),
        FilterMode::Date => format!(" Flights │ {} ", app.date.format("%Y-%m-%d")),
        FilterMode::Destination => format!(
            " Flights │ to {} ",
            app.selected_destination().as_deref().unwrap_or("—")
        ),
    }
}

fn render_flights(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(filter_title(app))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let flights = app.visible_flights(Utc::now());
    if flights.is_empty() {
        let msg = Paragraph::new("No flights found.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut header = vec![
        Cell::from("Airline"),
        Cell::from("Callsign"),
        Cell::from("From"),
    ];
    if app.show_status {
        header.push(Cell::from("Status"));
    }

    let table_rows: Vec<Row> = flights
        .iter()
        .enumerate()
        .map(|(i, fl)| {
            let style = if i == app.selected_index {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut cells = vec![
                Cell::from(airline_name(fl.callsign.as_deref())),
                Cell::from(fl.callsign.clone().unwrap_or_else(|| "N/A".to_string()))
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(fl.origin_country.clone().unwrap_or_else(|| "N/A".to_string())),
            ];
            if app.show_status {
                cells.push(Cell::from(fl.status().label()));
            }
            Row::new(cells).style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(32),
        Constraint::Percentage(18),
        Constraint::Percentage(32),
        Constraint::Percentage(18),
    ];
    let table = Table::new(table_rows, widths)
        .header(Row::new(header).style(bold).bottom_margin(1))
        .block(block);
    f.render_widget(table, area);
}

fn weather_lines<'a>(city: Option<&'a City>, panel: &'a WeatherPanel) -> Vec<Line<'a>> {
    let label = |s: &'a str| Span::styled(s, Style::default().add_modifier(Modifier::BOLD));
    let mut lines = vec![
        Line::from(Span::styled(
            city.map(|c| c.name.as_str()).unwrap_or("Unknown Location"),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            display_date(Utc::now().date_naive()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    match panel {
        WeatherPanel::Loading => lines.push(Line::from("Loading weather...")),
        WeatherPanel::Failed => lines.push(Line::from(Span::styled(
            WEATHER_FAILED,
            Style::default().fg(Color::Red),
        ))),
        WeatherPanel::Ready(data) => {
            let current = &data.current;
            let code = describe(current.weather_code);
            lines.extend([
                Line::from(vec![
                    Span::styled(
                        format!("{}°  ", whole(current.temperature)),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("{} {}", code.icon, code.description)),
                ]),
                Line::from(""),
                Line::from(vec![
                    label("Feels Like:     "),
                    Span::raw(format!("{}°", whole(current.apparent_temperature))),
                ]),
                Line::from(vec![
                    label("Humidity:       "),
                    Span::raw(format!("{}%", current.humidity)),
                ]),
                Line::from(vec![
                    label("Wind Speed:     "),
                    Span::raw(format!("{} mph", whole(current.wind_speed))),
                ]),
                Line::from(vec![
                    label("Wind Direction: "),
                    Span::raw(wind_direction(current.wind_direction)),
                ]),
            ]);
        }
    }
    lines
}

fn render_weather(f: &mut Frame, app: &App, area: Rect) {
    let p = Paragraph::new(weather_lines(app.selected_city(), &app.weather))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Weather ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::new(2, 2, 1, 1)),
        );
    f.render_widget(p, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let seconds_ago = app
        .last_update
        .map(|inst| inst.elapsed().as_secs().to_string() + "s ago")
        .unwrap_or_else(|| "never".to_string());
    let network = if app.last_update_success {
        Span::styled("ONLINE", Style::default().fg(Color::Green))
    } else {
        Span::styled("OFFLINE", Style::default().fg(Color::Red))
    };

    let line = Line::from(vec![
        Span::styled(" NETWORK: ", Style::default().add_modifier(Modifier::BOLD)),
        network,
        Span::raw(format!(" ({})  │  ", seconds_ago)),
        Span::styled("FILTER: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.filter_mode.label()),
        Span::raw("  │  "),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        Span::styled(
            "  s search · f filter · [ ] step · ←/→ city · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
