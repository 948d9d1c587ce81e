//! Three-panel terminal layout, one column per channel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use triptych::NUM_CHANNELS;

/// Everything a frame draw needs, lifted out of the engine lock.
pub struct Snapshot {
    pub panels: [Vec<String>; NUM_CHANNELS],
    pub names: [&'static str; NUM_CHANNELS],
    /// Last CV-pair output per channel, volts-ish.
    pub levels: [f32; NUM_CHANNELS],
    pub gates: [bool; NUM_CHANNELS],
    pub cv_in: [u16; NUM_CHANNELS],
    pub selected: usize,
    pub sample_rate: u32,
}

pub fn render(frame: &mut Frame, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Channel columns
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_title(frame, chunks[0], snapshot);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); NUM_CHANNELS])
        .split(chunks[1]);
    for channel in 0..NUM_CHANNELS {
        render_channel(frame, columns[channel], snapshot, channel);
    }

    let help = Paragraph::new(
        " 1-3 channel | arrows rotate | e click | E hold | t top | g gate | [ ] cv | q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}

fn render_title(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default().title(" triptych ").borders(Borders::ALL);
    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1} kHz  ", snapshot.sample_rate as f32 / 1_000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("channel {}", snapshot.selected + 1),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_channel(frame: &mut Frame, area: Rect, snapshot: &Snapshot, channel: usize) {
    let selected = channel == snapshot.selected;
    let border_style = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let gate_mark = if snapshot.gates[channel] { "*" } else { " " };
    let block = Block::default()
        .title(format!(
            " {} {} {}",
            channel + 1,
            snapshot.names[channel],
            gate_mark
        ))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Module display lines
            Constraint::Length(1), // CV input readout
            Constraint::Length(1), // Output level gauge
        ])
        .split(inner);

    let lines: Vec<Line> = snapshot.panels[channel]
        .iter()
        .map(|text| Line::from(text.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[0]);

    let cv_ratio = snapshot.cv_in[channel] as f32 / 0x0FFF as f32;
    let cv_line = Paragraph::new(format!("cv in {:>4.0}%", cv_ratio * 100.0))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(cv_line, rows[1]);

    // Outputs span a few volts; normalize against the CV-pair rail.
    let ratio = (snapshot.levels[channel] / 5.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio as f64)
        .label(format!("{:+.2} V", snapshot.levels[channel]));
    frame.render_widget(gauge, rows[2]);
}
