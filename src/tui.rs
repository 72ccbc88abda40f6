use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{JobSource, JobsClient};
use crate::controller::{DetailController, Ticket};
use crate::models::JobPayload;
use crate::view::{self, View};

type Outcome = (Ticket, Result<JobPayload>);

#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Fetch(Ticket),
}

struct AppState {
    controller: DetailController,
    history: Vec<String>,
    selected: usize,
    scroll_offset: u16,
}

impl AppState {
    fn new() -> Self {
        Self {
            controller: DetailController::new(),
            history: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    fn open(&mut self, id: &str) -> Action {
        match self.controller.navigate(id) {
            Some(ticket) => {
                self.selected = 0;
                self.scroll_offset = 0;
                Action::Fetch(ticket)
            }
            None => Action::None,
        }
    }

    fn open_selected(&mut self) -> Action {
        let Some(job) = self.controller.similar_jobs().get(self.selected) else {
            return Action::None;
        };
        let next = job.id.clone();
        let current = self.controller.current_id().map(str::to_string);

        let action = self.open(&next);
        if let (Action::Fetch(_), Some(current)) = (&action, current) {
            self.history.push(current);
        }
        action
    }

    fn back(&mut self) -> Action {
        match self.history.pop() {
            Some(id) => self.open(&id),
            None => Action::None,
        }
    }

    fn next(&mut self) {
        let len = self.controller.similar_jobs().len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.prev();
                Action::None
            }
            KeyCode::Char('J') | KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(3);
                Action::None
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(3);
                Action::None
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Backspace => self.back(),
            KeyCode::Char('r') => match self.controller.retry() {
                Some(ticket) => Action::Fetch(ticket),
                None => Action::None,
            },
            _ => Action::None,
        }
    }
}

/// Owns the in-flight request; issuing a new one aborts the previous task.
struct Fetcher {
    client: JobsClient,
    tx: mpsc::UnboundedSender<Outcome>,
    in_flight: Option<JoinHandle<()>>,
}

impl Fetcher {
    fn issue(&mut self, ticket: Ticket) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = client.fetch_job(&ticket.id).await;
            let _ = tx.send((ticket, outcome));
        }));
    }
}

pub async fn run_browse(client: JobsClient, id: &str) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut fetcher = Fetcher {
        client,
        tx,
        in_flight: None,
    };

    let mut state = AppState::new();
    if let Action::Fetch(ticket) = state.open(id) {
        fetcher.issue(ticket);
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, &mut fetcher, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    if let Some(handle) = fetcher.in_flight.take() {
        handle.abort();
    }
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    fetcher: &mut Fetcher,
    rx: &mut mpsc::UnboundedReceiver<Outcome>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        while let Ok((ticket, outcome)) = rx.try_recv() {
            state.controller.complete(&ticket, outcome);
        }

        list_state.select(if state.controller.similar_jobs().is_empty() {
            None
        } else {
            Some(state.selected)
        });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key.code) {
                Action::Quit => break,
                Action::Fetch(ticket) => fetcher.issue(ticket),
                Action::None => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let title = format!(
        " Job {} ",
        state.controller.current_id().unwrap_or_default()
    );
    let page = state.controller.view();

    match &page {
        View::Detail { similar_jobs, .. } => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(rows[0]);

            let width = chunks[0].width.saturating_sub(2).max(20) as usize;
            let detail = view::view_text(&page, state.controller.fetched_at(), width);
            let detail_widget = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: false })
                .scroll((state.scroll_offset, 0));
            frame.render_widget(detail_widget, chunks[0]);

            let items: Vec<ListItem> = similar_jobs
                .iter()
                .map(|job| {
                    ListItem::new(vec![
                        Line::from(job.title.as_str()),
                        Line::from(Span::styled(
                            format!("* {}  {} | {}", job.rating, job.location, job.employment_type),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(format!(
                    " Similar Jobs ({}) ",
                    similar_jobs.len()
                )))
                .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[1], list_state);
        }
        _ => {
            let width = rows[0].width.saturating_sub(2).max(20) as usize;
            let body = Paragraph::new(view::view_text(&page, None, width))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: false });
            frame.render_widget(body, rows[0]);
        }
    }

    let help = match page {
        View::Failure => " r:retry  backspace:back  q:quit",
        View::Detail { .. } => " j/k:select  enter:open  backspace:back  J/K:scroll  q:quit",
        _ => " q:quit",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, parse_payload, SimilarJob};
    use anyhow::anyhow;

    fn similar(id: &str) -> SimilarJob {
        SimilarJob {
            id: id.to_string(),
            title: format!("Job {}", id),
            rating: 4.0,
            location: "Hyderabad".to_string(),
            employment_type: "Full Time".to_string(),
            description: String::new(),
            company_logo_url: String::new(),
        }
    }

    fn ready(state: &mut AppState, id: &str, similar_ids: &[&str]) {
        let ticket = match state.open(id) {
            Action::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {:?}", other),
        };
        let mut payload = parse_payload(id, &fixtures::job_body(Some("SDE"))).unwrap();
        payload.similar_jobs = similar_ids.iter().map(|s| similar(s)).collect();
        assert!(state.controller.complete(&ticket, Ok(payload)));
    }

    #[test]
    fn test_enter_opens_selected_similar_job_and_backspace_returns() {
        let mut state = AppState::new();
        ready(&mut state, "1", &["a", "b"]);

        state.handle_key(KeyCode::Char('j'));
        let action = state.handle_key(KeyCode::Enter);
        match action {
            Action::Fetch(ticket) => assert_eq!(ticket.id, "b"),
            other => panic!("expected fetch, got {:?}", other),
        }
        assert_eq!(state.controller.current_id(), Some("b"));
        assert_eq!(state.selected, 0);
        assert_eq!(state.history, vec!["1".to_string()]);

        match state.handle_key(KeyCode::Backspace) {
            Action::Fetch(ticket) => assert_eq!(ticket.id, "1"),
            other => panic!("expected fetch, got {:?}", other),
        }
        assert!(state.history.is_empty());
        assert_eq!(state.handle_key(KeyCode::Backspace), Action::None);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut state = AppState::new();
        ready(&mut state, "1", &["a", "b"]);

        for _ in 0..5 {
            state.handle_key(KeyCode::Down);
        }
        assert_eq!(state.selected, 1);
        for _ in 0..5 {
            state.handle_key(KeyCode::Up);
        }
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_retry_key_only_acts_on_failure() {
        let mut state = AppState::new();
        ready(&mut state, "1", &[]);
        assert_eq!(state.handle_key(KeyCode::Char('r')), Action::None);

        let ticket = state.controller.load("1");
        state.controller.complete(&ticket, Err(anyhow!("status 404")));

        match state.handle_key(KeyCode::Char('r')) {
            Action::Fetch(ticket) => assert_eq!(ticket.id, "1"),
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_enter_without_similar_jobs_does_nothing() {
        let mut state = AppState::new();
        ready(&mut state, "1", &[]);
        assert_eq!(state.handle_key(KeyCode::Enter), Action::None);
        assert_eq!(state.handle_key(KeyCode::Char('q')), Action::Quit);
    }
}
