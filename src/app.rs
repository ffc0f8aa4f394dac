use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::info;

use crate::fetcher::{Completion, Fetcher, Outcome};
use crate::units::Units;
use crate::weather::WeatherSnapshot;
use crate::widget::{Status, Widget};

const MISSING: &str = "--";
const TICK: Duration = Duration::from_millis(100);
const ATTRIBUTION: &str = " Powered by WeatherAPI.com";
const HINTS: &str = "Enter search · Tab units · ^R refresh · Esc quit ";

pub struct App {
    widget: Widget,
    fetcher: Fetcher,
    units: Units,
    area: Rect,
    should_quit: bool,
}

impl App {
    pub fn new(fetcher: Fetcher, units: Units) -> Self {
        Self {
            widget: Widget::new(),
            fetcher,
            units,
            area: Rect::default(),
            should_quit: false,
        }
    }

    /// Runs once per application start: search for `place`, or look up the
    /// position when a locator is configured.
    pub fn start(&mut self, place: Option<&str>) {
        if let Some(place) = place {
            place.chars().for_each(|c| self.widget.push_char(c));
            self.search();
        } else if self.fetcher.can_locate() {
            let id = self.widget.start_locate();
            self.fetcher.locate(id);
        }
    }

    fn search(&mut self) {
        if let Some((id, query)) = self.widget.submit_search() {
            self.fetcher.fetch(id, query);
        }
    }

    fn refresh(&mut self) {
        if let Some((id, query)) = self.widget.refresh() {
            self.fetcher.fetch(id, query);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('u') if ctrl => self.widget.clear_query(),
            KeyCode::Char('r') if ctrl => self.refresh(),
            KeyCode::Char(c) if !ctrl => self.widget.push_char(c),
            KeyCode::Backspace => self.widget.pop_char(),
            KeyCode::Enter => self.search(),
            KeyCode::Tab => {
                self.units = self.units.toggle();
                info!("Showing {:?} units", self.units);
            }
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let button = areas(self.area).button;
            if button.contains(Position::new(mouse.column, mouse.row)) {
                self.search();
            }
        }
    }

    /// Feeds every finished request to the widget.
    pub fn drain(&mut self) {
        while let Some(Completion { id, outcome }) = self.fetcher.try_recv() {
            match outcome {
                Outcome::Position(result) => {
                    if let Some((id, query)) = self.widget.locate_finished(id, result) {
                        self.fetcher.fetch(id, query);
                    }
                }
                Outcome::Weather(result) => {
                    self.widget.fetch_finished(id, result);
                }
            }
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        self.area = f.area();
        ui(f, &self.widget, self.units);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        app.drain();
        if app.should_quit {
            return Ok(());
        }
    }
}

struct Areas {
    input: Rect,
    button: Rect,
    headline: Rect,
    body: Rect,
    footer: Rect,
}

fn areas(area: Rect) -> Areas {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    let search = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(vert_layout[0]);

    Areas {
        input: search[0],
        button: search[1],
        headline: vert_layout[1],
        body: vert_layout[2],
        footer: vert_layout[3],
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_search(query: &str) -> Paragraph<'_> {
    let text = if query.is_empty() {
        Span::styled("Enter location", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(query)
    };
    Paragraph::new(Line::from(vec![Span::raw(" "), text])).block(panel("Search"))
}

fn display_button() -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        "⌕",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_headline(snapshot: Option<&WeatherSnapshot>) -> Paragraph<'_> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded);

    let Some(snapshot) = snapshot else {
        return Paragraph::new(vec![Line::from(format!(" {MISSING}")), Line::from("")]).block(block);
    };

    let location = &snapshot.location;
    let place = if location.region.is_empty() {
        location.country.clone()
    } else {
        format!("{}, {}", location.region, location.country)
    };
    let time = match location.local_time() {
        Some(time) => time.format("%d-%m-%Y %H:%M").to_string(),
        None => MISSING.to_string(),
    };
    Paragraph::new(vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                location.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" : "),
            Span::styled(place, Style::default().fg(Color::Blue)),
        ]),
        Line::from(format!(
            " {} ({})  {:.2}, {:.2}",
            time, location.tz_id, location.lat, location.lon
        )),
    ])
    .block(block)
}

fn display_current_conditions(snapshot: &WeatherSnapshot, units: Units) -> Table<'_> {
    let current = &snapshot.current;
    let value = |text: String| Cell::from(text).style(Style::default().fg(Color::Green));

    let condition = if current.condition.text.is_empty() {
        MISSING.to_string()
    } else {
        format!("{} {}", current.condition.glyph(), current.condition.text)
    };

    let rows = vec![
        Row::new(vec![Cell::from("")]),
        Row::new(vec![Cell::from(" Conditions"), value(condition)]),
        Row::new(vec![
            Cell::from(" Temperature"),
            value(units.temperature(current)),
        ]),
        Row::new(vec![
            Cell::from(" Humidity"),
            value(format!("{}%", current.humidity)),
        ]),
        Row::new(vec![Cell::from(" Wind"), value(units.wind(current))]),
        Row::new(vec![
            Cell::from(" Updated"),
            value(current.last_updated.clone()),
        ]),
        Row::new(vec![
            Cell::from(" Icon"),
            Cell::from(current.condition.icon_url()).style(Style::default().fg(Color::DarkGray)),
        ]),
    ];

    Table::new(rows, [Constraint::Length(13), Constraint::Min(15)])
        .block(panel("Current Conditions"))
}

fn display_message(text: &str) -> Paragraph<'_> {
    Paragraph::new(vec![Line::from(""), Line::from(format!(" {text}"))])
        .block(panel("Current Conditions"))
}

fn display_error(message: &str) -> Paragraph<'_> {
    let message = if message.is_empty() {
        "something went wrong"
    } else {
        message
    };
    Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(message, Style::default().fg(Color::Red)),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Error ", Style::default().fg(Color::Red)))
            .border_style(Style::default().fg(Color::Red))
            .border_type(BorderType::Rounded),
    )
}

fn display_footer() -> Line<'static> {
    Line::from(vec![
        Span::styled(ATTRIBUTION, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(HINTS, Style::default().fg(Color::DarkGray)),
    ])
}

/// Cursor cell after the typed text, or `None` once the text fills the field.
fn cursor_position(input: Rect, query: &str) -> Option<Position> {
    let width = u16::try_from(Span::raw(query).width()).unwrap_or(u16::MAX);
    let x = input.x.saturating_add(2).saturating_add(width);
    (x < input.right().saturating_sub(1)).then(|| Position::new(x, input.y + 1))
}

fn ui(f: &mut Frame, widget: &Widget, units: Units) {
    let areas = areas(f.area());

    f.render_widget(display_search(widget.query()), areas.input);
    f.render_widget(display_button(), areas.button);
    if let Some(cursor) = cursor_position(areas.input, widget.query()) {
        f.set_cursor_position(cursor);
    }

    let shown = match widget.status() {
        Status::Ready | Status::Failed(_) => widget.snapshot(),
        _ => None,
    };
    f.render_widget(display_headline(shown), areas.headline);

    match widget.status() {
        Status::Idle => f.render_widget(
            display_message("Type a place and press Enter"),
            areas.body,
        ),
        Status::Locating => f.render_widget(display_message("Locating…"), areas.body),
        Status::Loading => f.render_widget(display_message("Loading…"), areas.body),
        Status::Ready => match shown {
            Some(snapshot) => f.render_widget(display_current_conditions(snapshot, units), areas.body),
            None => f.render_widget(display_message(MISSING), areas.body),
        },
        Status::Failed(message) => match shown {
            Some(snapshot) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(9), Constraint::Length(4)])
                    .split(areas.body);
                f.render_widget(display_current_conditions(snapshot, units), chunks[0]);
                f.render_widget(display_error(message), chunks[1]);
            }
            None => f.render_widget(display_error(message), areas.body),
        },
    }

    f.render_widget(display_footer(), areas.footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::{FailingLocator, FakeWeather};
    use crate::geolocate::{Coordinates, FixedLocator};
    use crate::weatherapi::Query;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use std::thread;

    fn settle(app: &mut App) {
        for _ in 0..500 {
            app.drain();
            if !matches!(app.widget.status(), Status::Loading | Status::Locating) {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("requests did not settle: {:?}", app.widget.status());
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn type_text(app: &mut App, text: &str) {
        app.on_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        for c in text.chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn located_app(weather: Arc<FakeWeather>) -> App {
        let locator = FixedLocator(Coordinates { lat: 51.5, lon: -0.12 });
        let mut app = App::new(Fetcher::new(weather, Some(Arc::new(locator))), Units::Metric);
        app.start(None);
        settle(&mut app);
        app
    }

    #[test]
    fn test_located_weather_is_rendered() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = located_app(weather.clone());

        assert_eq!(
            weather.calls.lock().unwrap().as_slice(),
            [Query::Coordinates { lat: 51.5, lon: -0.12 }]
        );
        let screen = render(&mut app);
        assert!(screen.contains("London"));
        assert!(screen.contains("4.0°C"));
        assert!(screen.contains("81%"));
        assert!(screen.contains("13.0 km/h"));
        assert!(screen.contains("Powered by WeatherAPI.com"));
    }

    #[test]
    fn test_search_replaces_display() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = located_app(weather.clone());

        type_text(&mut app, "Paris");
        assert_eq!(weather.calls.lock().unwrap().len(), 1);
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        let screen = render(&mut app);
        assert!(screen.contains("Paris"));
        assert!(!screen.contains("London :"));
    }

    #[test]
    fn test_blank_search_issues_nothing() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = App::new(Fetcher::new(weather.clone(), None), Units::Metric);
        app.start(None);
        assert_eq!(app.widget.status(), &Status::Idle);

        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        app.drain();

        assert!(weather.calls.lock().unwrap().is_empty());
        assert_eq!(app.widget.status(), &Status::Idle);
        assert!(render(&mut app).contains("Type a place"));
    }

    #[test]
    fn test_failed_search_shows_error_and_keeps_snapshot() {
        let weather = Arc::new(FakeWeather {
            failing: vec!["Atlantis".to_string()],
            ..Default::default()
        });
        let mut app = located_app(weather);

        type_text(&mut app, "Atlantis");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert_eq!(app.widget.snapshot().unwrap().location.name, "London");
        let screen = render(&mut app);
        assert!(screen.contains("Error"));
        assert!(screen.contains("No matching location found."));
        assert!(screen.contains("London"));
    }

    #[test]
    fn test_overlapping_searches_show_latest() {
        let weather = Arc::new(FakeWeather {
            delays: vec![("London".to_string(), Duration::from_millis(150))],
            ..Default::default()
        });
        let mut app = App::new(Fetcher::new(weather.clone(), None), Units::Metric);

        type_text(&mut app, "London");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Berlin");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        thread::sleep(Duration::from_millis(300));
        app.drain();

        assert_eq!(weather.calls.lock().unwrap().len(), 2);
        assert_eq!(app.widget.snapshot().unwrap().location.name, "Berlin");
    }

    #[test]
    fn test_locate_failure_shows_error() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = App::new(
            Fetcher::new(weather.clone(), Some(Arc::new(FailingLocator))),
            Units::Metric,
        );
        app.start(None);
        settle(&mut app);

        assert!(weather.calls.lock().unwrap().is_empty());
        let screen = render(&mut app);
        assert!(screen.contains("unable to determine your location"));
    }

    #[test]
    fn test_start_with_place() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = App::new(
            Fetcher::new(weather.clone(), Some(Arc::new(FailingLocator))),
            Units::Imperial,
        );
        app.start(Some("Paris"));
        settle(&mut app);

        assert_eq!(
            weather.calls.lock().unwrap().as_slice(),
            [Query::Place("Paris".to_string())]
        );
        assert!(render(&mut app).contains("°F"));
    }

    #[test]
    fn test_keys() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = located_app(weather.clone());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.units, Units::Imperial);
        assert!(render(&mut app).contains("8.1 mph"));

        app.on_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        settle(&mut app);
        assert_eq!(weather.calls.lock().unwrap().len(), 2);

        type_text(&mut app, "Lyonx");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.widget.query(), "Lyon");

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_cursor_follows_text() {
        let input = Rect::new(1, 1, 20, 3);
        assert_eq!(cursor_position(input, ""), Some(Position::new(3, 2)));
        assert_eq!(cursor_position(input, "Paris"), Some(Position::new(8, 2)));
        // wide glyphs take two cells
        assert_eq!(cursor_position(input, "東京"), Some(Position::new(7, 2)));
        assert_eq!(cursor_position(input, &"x".repeat(20)), None);
    }

    #[test]
    fn test_very_long_query_renders() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = App::new(Fetcher::new(weather, None), Units::Metric);
        let long = "a".repeat(70_000);
        long.chars().for_each(|c| app.widget.push_char(c));

        assert_eq!(cursor_position(Rect::new(1, 1, 20, 3), &long), None);
        assert!(render(&mut app).contains("aaaa"));
    }

    #[test]
    fn test_click_on_search_glyph() {
        let weather = Arc::new(FakeWeather::default());
        let mut app = App::new(Fetcher::new(weather.clone(), None), Units::Metric);
        render(&mut app);
        type_text(&mut app, "Paris");

        let button = areas(app.area).button;
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: button.x + 2,
            row: button.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        settle(&mut app);

        assert_eq!(app.widget.snapshot().unwrap().location.name, "Paris");
    }
}
