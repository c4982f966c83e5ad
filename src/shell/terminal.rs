use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use time::OffsetDateTime;

use super::ContentView;
use crate::launch::{DocumentLocation, LoadStatus};

const HISTORY_LIMIT: usize = 200;

/// Full-screen status panel. Owns the terminal until dropped.
pub struct TerminalView {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    remote: String,
    data_dir: PathBuf,
    status: Option<LoadStatus>,
    url: Option<String>,
    document: Option<PathBuf>,
    history: Vec<String>,
}

impl TerminalView {
    pub fn enter(remote: &str, data_dir: &Path) -> Result<Self> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            anyhow::bail!("terminal view requires an interactive terminal (TTY)");
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("enable raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;
        terminal.clear().ok();

        let mut view = Self {
            terminal,
            remote: remote.to_string(),
            data_dir: data_dir.to_path_buf(),
            status: None,
            url: None,
            document: None,
            history: Vec::new(),
        };
        view.draw()?;
        Ok(view)
    }

    fn push_history(&mut self, line: String) {
        let now = OffsetDateTime::now_utc();
        let ts = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());
        self.history.push(format!("{} {}", ts, line));
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    fn draw(&mut self) -> Result<()> {
        let remote = self.remote.clone();
        let data_dir = self.data_dir.display().to_string();
        let status = self.status.clone();
        let url = self.url.clone();
        let document = self.document.as_ref().map(|p| p.display().to_string());
        let history = self.history.clone();

        self.terminal
            .draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(4),
                        Constraint::Length(3),
                        Constraint::Length(4),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ])
                    .split(f.area());

                let header = Paragraph::new(vec![
                    Line::from(vec![
                        Span::styled("remote ", Style::default().fg(Color::DarkGray)),
                        Span::raw(remote),
                    ]),
                    Line::from(vec![
                        Span::styled("data   ", Style::default().fg(Color::DarkGray)),
                        Span::raw(data_dir),
                    ]),
                ])
                .block(Block::default().borders(Borders::ALL).title("mirrorview"));
                f.render_widget(header, chunks[0]);

                let status_style = match &status {
                    Some(s) if s.is_error() => Style::default().fg(Color::Red),
                    Some(LoadStatus::Updated { .. }) | Some(LoadStatus::UpToDate) => {
                        Style::default().fg(Color::Green)
                    }
                    Some(LoadStatus::Offline { .. }) => Style::default().fg(Color::Yellow),
                    _ => Style::default(),
                };
                let status_text = status
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Starting...".to_string());
                let status_widget = Paragraph::new(Span::styled(status_text, status_style))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).title("status"));
                f.render_widget(status_widget, chunks[1]);

                let doc_lines = match (&url, &document) {
                    (Some(url), Some(path)) => vec![
                        Line::from(Span::styled(
                            url.clone(),
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::UNDERLINED),
                        )),
                        Line::from(Span::styled(
                            path.clone(),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ],
                    _ => vec![Line::from(Span::styled(
                        "(no content yet)",
                        Style::default().fg(Color::DarkGray),
                    ))],
                };
                let doc_widget = Paragraph::new(doc_lines)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title("document"));
                f.render_widget(doc_widget, chunks[2]);

                let visible = chunks[3].height.saturating_sub(2) as usize;
                let start = history.len().saturating_sub(visible);
                let items = history[start..]
                    .iter()
                    .map(|l| ListItem::new(l.as_str()))
                    .collect::<Vec<_>>();
                let list =
                    List::new(items).block(Block::default().borders(Borders::ALL).title("log"));
                f.render_widget(list, chunks[3]);

                let footer = Paragraph::new(Span::styled(
                    "q/Esc quit",
                    Style::default().fg(Color::DarkGray),
                ));
                f.render_widget(footer, chunks[4]);
            })
            .context("draw")?;
        Ok(())
    }
}

impl ContentView for TerminalView {
    fn show_status(&mut self, status: &LoadStatus) -> Result<()> {
        self.push_history(status.to_string());
        self.status = Some(status.clone());
        self.draw()
    }

    fn show_document(&mut self, url: &str, location: &DocumentLocation) -> Result<()> {
        self.push_history(format!("open {}", url));
        self.url = Some(url.to_string());
        self.document = Some(location.path.clone());
        self.draw()
    }

    fn poll_quit(&mut self, timeout: Duration) -> Result<bool> {
        if !event::poll(timeout).context("poll")? {
            return Ok(false);
        }
        match event::read().context("read event")? {
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                let quit = matches!(k.code, KeyCode::Char('q') | KeyCode::Esc)
                    || (k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL));
                Ok(quit)
            }
            Event::Resize(_, _) => {
                self.draw()?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}
