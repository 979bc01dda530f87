//! Ratatui-based terminal UI.
//!
//! Three panels share the screen: the 52-week low ranking table, the industry
//! chart panel for the selected stock, and the analysis panel. Requests run on
//! worker threads; each panel settles only from its latest request.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::view::{RequestFence, ViewState};
use crate::data::StocksClient;
use crate::domain::{AnalyzeOutcome, IndustryCharts, YearLowRecord};
use crate::error::AppError;
use crate::report::format_price;

mod candle_chart;
mod worker;

use candle_chart::CandleChart;
use worker::{Worker, WorkerEvent};

/// Start the TUI.
pub fn run(client: StocksClient) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::config(format!("Failed to initialize terminal: {e}")))?;

    let (worker, events) = Worker::new(client);
    let mut app = App::new(worker, events);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::config(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::config(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    worker: Worker,
    events: Receiver<WorkerEvent>,
    base_url: String,

    ranking: ViewState<Vec<YearLowRecord>>,
    ranking_fence: RequestFence,
    selected_row: usize,

    industry: ViewState<IndustryCharts>,
    industry_fence: RequestFence,
    industry_code: Option<String>,
    panel_index: usize,

    analysis: ViewState<AnalyzeOutcome>,
    analysis_fence: RequestFence,
    analysis_ticker: String,
    ticker_input: Option<String>,

    status: String,
}

impl App {
    fn new(worker: Worker, events: Receiver<WorkerEvent>) -> Self {
        let base_url = worker.base_url();
        Self {
            worker,
            events,
            base_url,
            ranking: ViewState::Idle,
            ranking_fence: RequestFence::default(),
            selected_row: 0,
            industry: ViewState::Idle,
            industry_fence: RequestFence::default(),
            industry_code: None,
            panel_index: 0,
            analysis: ViewState::Idle,
            analysis_fence: RequestFence::default(),
            analysis_ticker: String::new(),
            ticker_input: None,
            status: "Press y to load the 52-week low ranking.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_worker_events() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::config(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::config(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::config(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The ranking and industry fetches share one busy flag.
    fn busy(&self) -> bool {
        self.ranking.is_loading() || self.industry.is_loading()
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.ticker_input.is_some() {
            self.handle_ticker_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('y') => {
                if self.busy() {
                    self.status = "Still loading...".to_string();
                } else {
                    self.request_year_low();
                }
            }
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                let rows = self.ranking.loaded().map_or(0, Vec::len);
                if self.selected_row + 1 < rows {
                    self.selected_row += 1;
                }
            }
            KeyCode::Enter => {
                if self.busy() {
                    self.status = "Still loading...".to_string();
                } else if let Some(code) = self.selected_code() {
                    self.request_industry(code);
                }
            }
            KeyCode::Left => self.cycle_panel(-1),
            KeyCode::Right => self.cycle_panel(1),
            KeyCode::Char('a') => {
                if self.analysis.is_loading() {
                    self.status = "Analysis still running...".to_string();
                } else {
                    self.ticker_input = Some(self.selected_code().unwrap_or_default());
                    self.status = "Type a ticker. Enter to analyze, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('e') => self.export_industry(),
            _ => {}
        }

        false
    }

    fn handle_ticker_edit(&mut self, code: KeyCode) {
        let Some(input) = self.ticker_input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.ticker_input = None;
                self.status = "Analysis canceled.".to_string();
            }
            KeyCode::Enter => {
                let ticker = input.trim().to_string();
                if ticker.is_empty() {
                    self.status = "Ticker must not be empty.".to_string();
                } else {
                    self.ticker_input = None;
                    self.request_analysis(ticker);
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => input.push(c),
            _ => {}
        }
    }

    fn selected_code(&self) -> Option<String> {
        self.ranking
            .loaded()
            .and_then(|rows| rows.get(self.selected_row))
            .map(|r| r.code.clone())
    }

    fn cycle_panel(&mut self, delta: isize) {
        let Some(charts) = self.industry.loaded() else {
            return;
        };
        let n = charts.panels.len();
        if n == 0 {
            return;
        }
        self.panel_index = (self.panel_index as isize + delta).rem_euclid(n as isize) as usize;
    }

    fn request_year_low(&mut self) {
        let token = self.ranking_fence.issue();
        self.ranking = ViewState::Loading;
        self.selected_row = 0;
        // A new ranking clears the chart panel, including any chart still in flight.
        self.industry = ViewState::Idle;
        self.industry_fence.reset();
        self.industry_code = None;
        self.status = "Fetching the 52-week low ranking...".to_string();
        self.worker.year_low(token);
    }

    fn request_industry(&mut self, code: String) {
        let token = self.industry_fence.issue();
        self.industry = ViewState::Loading;
        self.panel_index = 0;
        self.status = format!("Fetching industry peers of {code}...");
        self.industry_code = Some(code.clone());
        self.worker.industry(token, code);
    }

    fn request_analysis(&mut self, ticker: String) {
        let token = self.analysis_fence.issue();
        self.analysis = ViewState::Loading;
        self.status = format!("Analyzing {ticker}...");
        self.analysis_ticker = ticker.clone();
        self.worker.analysis(token, ticker);
    }

    /// Apply finished requests; returns `true` when anything changed.
    fn drain_worker_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed |= self.apply(event);
        }
        changed
    }

    fn apply(&mut self, event: WorkerEvent) -> bool {
        match event {
            WorkerEvent::YearLow(token, result) => {
                if !self.ranking_fence.accepts(token) {
                    log::debug!("discarding stale ranking response");
                    return false;
                }
                self.status = match &result {
                    Ok(rows) => format!("{} stock(s) near their 52-week low.", rows.len()),
                    Err(_) => "Ranking request failed.".to_string(),
                };
                self.ranking = ViewState::settle(result);
            }
            WorkerEvent::Industry(token, code, result) => {
                if !self.industry_fence.accepts(token) {
                    log::debug!("discarding stale industry response for {code}");
                    return false;
                }
                self.status = match &result {
                    Ok(charts) => format!("{}: {} instrument(s).", code, charts.panels.len()),
                    Err(_) => format!("Industry request for {code} failed."),
                };
                self.industry = ViewState::settle(result);
            }
            WorkerEvent::Analysis(token, ticker, result) => {
                if !self.analysis_fence.accepts(token) {
                    log::debug!("discarding stale analysis response for {ticker}");
                    return false;
                }
                self.status = match &result {
                    Ok(_) => format!("Analysis of {ticker} ready."),
                    Err(_) => format!("Analysis of {ticker} failed."),
                };
                self.analysis = ViewState::settle(result);
            }
        }
        true
    }

    fn export_industry(&mut self) {
        let Some(charts) = self.industry.loaded() else {
            self.status = "No industry charts to export.".to_string();
            return;
        };
        let code = self.industry_code.as_deref().unwrap_or("industry");
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = export_path(code, &ts.to_string());
        self.status = match crate::io::write_charts_json(&path, charts) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let busy = if self.busy() || self.analysis.is_loading() {
            Span::styled("  loading...", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        };
        let line = Line::from(vec![
            Span::styled("lowscan", Style::default().fg(Color::Cyan)),
            Span::raw(" | 52-week low screener | "),
            Span::styled(self.base_url.as_str(), Style::default().fg(Color::Gray)),
            busy,
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        self.draw_ranking(frame, top[0]);
        self.draw_industry(frame, top[1]);
        self.draw_analysis(frame, rows[1]);
    }

    fn draw_ranking(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("52-week lows").borders(Borders::ALL);

        let rows = match &self.ranking {
            ViewState::Loaded(rows) if !rows.is_empty() => rows,
            state => {
                let msg = match state {
                    ViewState::Loading => "Loading...",
                    ViewState::Loaded(_) => "No stocks in the ranking.",
                    _ => "Press y to load.",
                };
                let p = Paragraph::new(msg)
                    .style(Style::default().fg(Color::Yellow))
                    .block(block);
                frame.render_widget(p, area);
                return;
            }
        };

        let header = Row::new(["#", "code", "name", "market", "price", "52w low", "low date", "prev"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let body = rows.iter().map(|r| {
            Row::new(vec![
                Cell::from(r.rank.to_string()),
                Cell::from(r.code.as_str()),
                Cell::from(r.name.as_str()),
                Cell::from(r.market.as_str()),
                Cell::from(format_price(r.current_price)),
                Cell::from(format_price(r.year_low_price)),
                Cell::from(r.year_low_date.as_str()),
                Cell::from(format_price(r.prev_close)),
            ])
        });
        let widths = [
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(9),
        ];

        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = TableState::default().with_selected(Some(self.selected_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_industry(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let charts = match &self.industry {
            ViewState::Loaded(charts) => charts,
            state => {
                let msg = match state {
                    ViewState::Loading => "Loading...",
                    ViewState::Failed(_) => "-",
                    _ => "Select a stock and press Enter.",
                };
                let p = Paragraph::new(msg)
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().title("Industry").borders(Borders::ALL));
                frame.render_widget(p, area);
                return;
            }
        };

        let Some(panel) = charts.panels.get(self.panel_index) else {
            let p = Paragraph::new("No instruments returned.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Industry").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        };

        let title = format!(
            "Industry: {} | {} - {} ({}/{})",
            charts.industry,
            panel.code,
            panel.name,
            self.panel_index + 1,
            charts.panels.len()
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        frame.render_widget(CandleChart { spec: &panel.spec }, inner);
    }

    fn draw_analysis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some(input) = &self.ticker_input {
            let p = Paragraph::new(Line::from(vec![
                Span::raw("Ticker: "),
                Span::styled(format!("{input}_"), Style::default().add_modifier(Modifier::BOLD)),
            ]))
            .block(Block::default().title("Analyze").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let title = if self.analysis_ticker.is_empty() {
            "Analysis".to_string()
        } else {
            format!("Analysis: {}", self.analysis_ticker)
        };

        let text = match &self.analysis {
            ViewState::Idle => Text::from("Press a to analyze a ticker."),
            ViewState::Loading => Text::from("Analyzing..."),
            ViewState::Failed(_) => Text::from("-"),
            ViewState::Loaded(AnalyzeOutcome::Text(text)) => Text::from(text.as_str()),
            ViewState::Loaded(AnalyzeOutcome::Message(message)) => Text::from(message.as_str()),
            ViewState::Loaded(AnalyzeOutcome::Listing(rows)) => {
                if rows.is_empty() {
                    Text::from("No matching stocks.")
                } else {
                    Text::from(
                        rows.iter()
                            .map(|r| {
                                Line::from(format!(
                                    "{}  {}  {}  ({})",
                                    r.code,
                                    r.name,
                                    format_price(r.price),
                                    r.report_date
                                ))
                            })
                            .collect::<Vec<_>>(),
                    )
                }
            }
        };

        let p = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "y ranking  ↑/↓ select  Enter industry  ←/→ chart  a analyze  e export  q quit";
        let mut lines = vec![Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow)),
        ])];

        if let Some(err) = self.first_error() {
            lines.push(Line::from(Span::styled(
                format!("Error: {err}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn first_error(&self) -> Option<&str> {
        self.ranking
            .error()
            .or_else(|| self.industry.error())
            .or_else(|| self.analysis.error())
    }
}

/// Export file name in the working directory. Instrument codes are opaque
/// backend strings, so anything outside `[A-Za-z0-9_-]` becomes `_`.
fn export_path(code: &str, stamp: &str) -> PathBuf {
    let safe: String = code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    PathBuf::from(format!("lowscan_{safe}_{stamp}.json"))
}
