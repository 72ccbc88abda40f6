use chrono::{DateTime, Local};
use ratatui::prelude::*;

use crate::models::{JobDetails, SimilarJob};

pub const FAILURE_IMAGE_URL: &str = "https://assets.ccbp.in/frontend/react-js/failure-img.png";
pub const FAILURE_HEADING: &str = "Oops! Something Went Wrong";
pub const FAILURE_MESSAGE: &str = "We cannot seem to find the page you are looking for.";

/// What the page shows for the current fetch state.
#[derive(Debug, PartialEq)]
pub enum View<'a> {
    Empty,
    Loading,
    Failure,
    Detail {
        job: &'a JobDetails,
        similar_jobs: &'a [SimilarJob],
    },
}

pub fn loading_text() -> Text<'static> {
    Text::from(Line::from(Span::styled(
        "Loading job details...",
        Style::default().fg(Color::Yellow),
    )))
}

pub fn failure_text() -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(
            format!("[image: {}]", FAILURE_IMAGE_URL),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            FAILURE_HEADING,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(FAILURE_MESSAGE),
        Line::from(""),
        Line::from(Span::styled(
            "[ Retry ]",
            Style::default().add_modifier(Modifier::REVERSED),
        )),
    ])
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
}

fn wrapped<'a>(lines: &mut Vec<Line<'a>>, text: &str, width: usize, indent: &str) {
    for line in textwrap::fill(text, width).lines() {
        lines.push(Line::from(format!("{}{}", indent, line)));
    }
}

pub fn detail_text<'a>(
    job: &'a JobDetails,
    similar_jobs: &'a [SimilarJob],
    fetched_at: Option<DateTime<Local>>,
    width: usize,
) -> Text<'a> {
    let mut lines: Vec<Line> = Vec::new();
    let dim = Style::default().fg(Color::DarkGray);

    // Header
    lines.push(Line::from(Span::styled(format!("[logo: {}]", job.company_logo_url), dim)));
    lines.push(Line::from(Span::styled(
        job.title.as_deref().unwrap_or_default(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("* {}", job.rating),
        Style::default().fg(Color::Yellow),
    )));
    lines.push(Line::from(format!(
        "{}  |  {}  |  {}",
        job.location, job.employment_type, job.package_per_annum
    )));
    if let Some(at) = fetched_at {
        lines.push(Line::from(Span::styled(
            format!("Fetched {}", at.format("%Y-%m-%d %H:%M:%S")),
            dim,
        )));
    }

    lines.push(Line::from("-".repeat(width.min(60))));

    // Description
    lines.push(Line::from(vec![
        Span::styled("Description", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("Visit: {}", job.company_website_url),
            Style::default().fg(Color::Cyan),
        ),
    ]));
    wrapped(&mut lines, &job.description, width, "");
    lines.push(Line::from(""));

    lines.push(heading("Skills"));
    for skill in &job.skills {
        lines.push(Line::from(vec![
            Span::raw(format!("  - {}", skill.name)),
            Span::styled(format!("  [{}]", skill.image_url), dim),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(heading("Life at Company"));
    wrapped(&mut lines, &job.life_at_company.description, width, "  ");
    lines.push(Line::from(Span::styled(
        format!("  [image: {}]", job.life_at_company.image_url),
        dim,
    )));
    lines.push(Line::from(""));

    lines.push(heading("Similar Jobs"));
    if similar_jobs.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", dim)));
    }
    for similar in similar_jobs {
        lines.push(Line::from(format!(
            "  #{} {} (* {})",
            similar.id, similar.title, similar.rating
        )));
        lines.push(Line::from(Span::styled(
            format!("     {} | {}", similar.location, similar.employment_type),
            dim,
        )));
    }

    Text::from(lines)
}

/// Renders any view as text. `Empty` yields no lines.
pub fn view_text<'a>(
    view: &View<'a>,
    fetched_at: Option<DateTime<Local>>,
    width: usize,
) -> Text<'a> {
    match view {
        View::Empty => Text::default(),
        View::Loading => loading_text(),
        View::Failure => failure_text(),
        View::Detail { job, similar_jobs } => detail_text(*job, *similar_jobs, fetched_at, width),
    }
}

/// Flattens styled text into plain lines for non-interactive output.
pub fn plain_lines(text: &Text) -> Vec<String> {
    text.lines
        .iter()
        .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
        .collect()
}
