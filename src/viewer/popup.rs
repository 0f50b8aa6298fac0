use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::viewer::session::ViewerSession;

/// Modal overlay for an open viewer session. No pixels are decoded here;
/// the image area is a framed stand-in whose size tracks the zoom factor
/// and whose position tracks the pan offset, which is enough to exercise
/// and demonstrate the gesture engine in a terminal.
pub struct ViewerPopup;

/// Pan units per terminal cell, also used to translate mouse cell
/// coordinates into gesture pointer positions. Cells are roughly twice as
/// tall as they are wide, hence the asymmetry.
pub const PAN_UNITS_PER_COLUMN: f32 = 10.0;
pub const PAN_UNITS_PER_ROW: f32 = 20.0;

impl ViewerPopup {
    pub fn render(f: &mut Frame, session: &ViewerSession) {
        let Some(image) = session.current_image() else {
            return;
        };

        let popup_area = Self::popup_area(f.area());
        f.render_widget(Clear, popup_area);

        let title = format!(" {} ", image.source);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let caption_height = Self::caption_height(image.title.as_deref(), image.caption.as_deref());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(caption_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        if caption_height > 0 {
            let mut lines = Vec::new();
            if let Some(title) = &image.title {
                lines.push(Line::from(Span::styled(
                    title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            if let Some(caption) = &image.caption {
                lines.push(Line::from(Span::styled(
                    caption.clone(),
                    Style::default().fg(Color::Gray),
                )));
            }
            let caption_widget = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(caption_widget, chunks[0]);
        }

        Self::render_image_frame(f, chunks[1], session);
        Self::render_status_line(f, chunks[2], session);
        Self::render_help_text(f, popup_area, session);
    }

    /// Center the popup, leaving room for borders and the help line below.
    fn popup_area(terminal_size: Rect) -> Rect {
        let width = terminal_size
            .width
            .saturating_sub(8)
            .max(24)
            .min(terminal_size.width);
        let height = terminal_size
            .height
            .saturating_sub(6)
            .max(8)
            .min(terminal_size.height);
        let x = (terminal_size.width.saturating_sub(width)) / 2;
        let y = (terminal_size.height.saturating_sub(height + 2)) / 2;
        Rect {
            x: terminal_size.x + x,
            y: terminal_size.y + y,
            width,
            height,
        }
    }

    fn caption_height(title: Option<&str>, caption: Option<&str>) -> u16 {
        (title.is_some() as u16) + (caption.is_some() as u16)
    }

    /// The stand-in image: a bordered frame scaled by zoom and shifted by
    /// pan, clipped to the available body area.
    fn render_image_frame(f: &mut Frame, body: Rect, session: &ViewerSession) {
        let Some(image) = session.current_image() else {
            return;
        };
        let gestures = session.gestures();
        let zoom = gestures.zoom();
        let pan = gestures.pan();

        let base_width = (body.width as f32 * 0.6).max(16.0);
        let base_height = (body.height as f32 * 0.7).max(3.0);
        let width = ((base_width * zoom) as u16).min(body.width.max(1));
        let height = ((base_height * zoom) as u16).min(body.height.max(1));

        let centered_x = body.x + (body.width.saturating_sub(width)) / 2;
        let centered_y = body.y + (body.height.saturating_sub(height)) / 2;
        let x = (centered_x as i32 + (pan.x / PAN_UNITS_PER_COLUMN) as i32)
            .clamp(body.x as i32, (body.x + body.width.saturating_sub(width)) as i32);
        let y = (centered_y as i32 + (pan.y / PAN_UNITS_PER_ROW) as i32)
            .clamp(body.y as i32, (body.y + body.height.saturating_sub(height)) as i32);

        let frame = Rect {
            x: x as u16,
            y: y as u16,
            width,
            height,
        }
        .intersection(body);

        let label = image
            .alt_text
            .clone()
            .unwrap_or_else(|| image.source.clone());
        let placeholder = Paragraph::new(Line::from(Span::styled(
            label,
            Style::default().fg(Color::Gray),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(placeholder, frame);
    }

    fn render_status_line(f: &mut Frame, area: Rect, session: &ViewerSession) {
        let zoom_percent = (session.gestures().zoom() * 100.0).round() as u32;
        let status = if session.has_multiple() {
            format!(
                "{}% | {} / {}",
                zoom_percent,
                session.current_index() + 1,
                session.images().len()
            )
        } else {
            format!("{zoom_percent}%")
        };
        let status_widget = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Yellow),
        )))
        .alignment(Alignment::Center);
        f.render_widget(status_widget, area);
    }

    fn render_help_text(f: &mut Frame, popup_area: Rect, session: &ViewerSession) {
        let terminal_area = f.area();
        let help_y = popup_area.y + popup_area.height + 1;
        if help_y + 1 >= terminal_area.height {
            return;
        }

        let help_area = Rect {
            x: popup_area.x,
            y: help_y,
            width: popup_area.width,
            height: 1,
        };
        let help_text = if session.has_multiple() {
            " ESC: close | \u{2190}/\u{2192}: navigate | +/-: zoom | 0: reset "
        } else {
            " ESC: close | +/-: zoom | 0: reset "
        };
        let help = Paragraph::new(Line::from(Span::styled(
            help_text,
            Style::default().fg(Color::Yellow),
        )))
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
        f.render_widget(help, help_area);
    }
}
