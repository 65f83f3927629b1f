use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use codeknight::battle::{Mode, ParticleKind};

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Menu => render_menu(self, area, buf),
            Screen::Playing => render_battle(self, area, buf),
            Screen::GameOver { new_best } => render_game_over(self, new_best, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("CODE KNIGHT", bold().fg(Color::Cyan))),
        Line::from(Span::styled(
            "defeat enemies by typing code",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "High Score: {}   Best Combo: {}",
                app.board.high_score, app.board.best_combo
            ),
            bold(),
        )),
    ];

    if let Some(last) = app.board.last_played {
        if let Ok(elapsed) = Local::now().signed_duration_since(last).to_std() {
            lines.push(Line::from(Span::styled(
                format!(
                    "last played {}",
                    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
                ),
                dim_bold(),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "[enter] battle   [p] practice   [m] sound: {}   [esc] quit",
            if app.config.muted { "off" } else { "on" }
        ),
        dim_bold(),
    )));

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_battle(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.battle.session;

    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);
    let underlined_dim_bold = dim_bold().add_modifier(Modifier::UNDERLINED);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = session.snippet.text.width();
    let mut prompt_lines = ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if prompt_width <= max_chars_per_line as usize {
        prompt_lines = 1;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(1),            // enemy name + avatar
            Constraint::Length(1),            // enemy health
            Constraint::Length(1),            // streak banner
            Constraint::Length(1),            // countdown
            Constraint::Length(prompt_lines), // snippet
            Constraint::Length(1),            // hint
            Constraint::Length(1),            // typing progress
            Constraint::Min(0),               // spacer
            Constraint::Length(1),            // player health
            Constraint::Length(1),            // level / score / combo
        ])
        .split(area);

    let enemy_line = Paragraph::new(Line::from(Span::styled(
        format!("{} {}", session.enemy.avatar, session.enemy.name),
        bold(),
    )))
    .alignment(Alignment::Center);
    enemy_line.render(chunks[0], buf);

    let enemy_style = if app.pulse_enemy > 0 {
        Style::default().fg(Color::LightRed).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Red)
    };
    Gauge::default()
        .gauge_style(enemy_style)
        .ratio(session.enemy_health_ratio())
        .label(format!(
            "{}/{}",
            session.enemy_health.max(0),
            session.enemy.max_health
        ))
        .render(chunks[1], buf);

    if let Some((label, _)) = &app.streak_flash {
        Paragraph::new(Span::styled(label.clone(), bold().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    if let Some(remaining) = app.battle.timers.remaining_secs() {
        Paragraph::new(Span::styled(format!("{remaining:.1}"), dim_bold()))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    let mut spans: Vec<Span> = Vec::with_capacity(session.snippet_len());
    for (idx, c) in session.snippet.text.chars().enumerate() {
        let span = if idx < session.cursor {
            Span::styled(c.to_string(), green_bold)
        } else if idx == session.cursor && session.mistake_pending {
            Span::styled(
                match c {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold,
            )
        } else if idx == session.cursor {
            Span::styled(c.to_string(), underlined_dim_bold)
        } else {
            Span::styled(c.to_string(), dim_bold())
        };
        spans.push(span);
    }

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        session.snippet.hint.clone(),
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(session.progress_ratio())
        .label(format!("{}/{}", session.cursor, session.snippet_len()))
        .render(chunks[6], buf);

    let player_style = if app.pulse_player > 0 {
        Style::default().fg(Color::LightRed).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green)
    };
    Gauge::default()
        .gauge_style(player_style)
        .ratio(session.player_health_ratio())
        .label(format!("HP {}", session.player_health.max(0)))
        .render(chunks[8], buf);

    let mut hud_spans = vec![
        Span::styled(format!("Level {}", session.level), bold()),
        Span::raw("   "),
        Span::styled(format!("Score {}", session.score), bold()),
    ];
    // persistent streak label, recomputed on every refresh
    if let Some(label) = session.combo.streak_label() {
        hud_spans.push(Span::raw("   "));
        hud_spans.push(Span::styled(label, bold().fg(Color::Magenta)));
    }
    if session.mode == Mode::Practice {
        hud_spans.push(Span::raw("   "));
        hud_spans.push(Span::styled("practice".to_string(), dim_bold()));
    }
    Paragraph::new(Line::from(hud_spans))
        .alignment(Alignment::Center)
        .render(chunks[9], buf);

    render_particles(app, area, buf);
}

fn render_particles(app: &App, area: Rect, buf: &mut Buffer) {
    for particle in app.particles.iter() {
        let x = particle.x.round() as i64;
        let y = particle.y.round() as i64;
        let inside = x >= i64::from(area.left())
            && x < i64::from(area.right())
            && y >= i64::from(area.top())
            && y < i64::from(area.bottom());
        if !inside {
            continue;
        }
        if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
            cell.set_char(particle.symbol());
            cell.set_fg(match particle.kind {
                ParticleKind::Slash => Color::Green,
                ParticleKind::Spark => Color::Red,
            });
        }
    }
}

fn render_game_over(app: &App, new_best: bool, area: Rect, buf: &mut Buffer) {
    let (title, title_style) = if app.outcome_victory {
        ("Victory!", bold().fg(Color::Green))
    } else {
        ("Game Over", bold().fg(Color::Red))
    };

    let mut high_score_line = format!("High Score: {}", app.board.high_score);
    if new_best {
        high_score_line.push_str("  new best!");
    }

    let lines = vec![
        Line::from(Span::styled(title, title_style)),
        Line::default(),
        Line::from(Span::styled(format!("Score: {}", app.final_score), bold())),
        Line::from(Span::styled(
            format!("Max Combo: {}", app.battle.session.combo.max_combo()),
            bold(),
        )),
        Line::from(Span::styled(high_score_line, bold().fg(Color::Yellow))),
        Line::default(),
        Line::from(Span::styled(
            "[r] play again   [m] menu   [esc] quit",
            dim_bold(),
        )),
    ];

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}
