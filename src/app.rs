use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use log::debug;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::content::{ContentTree, NodeId};
use crate::document::{self, PortfolioDoc};
use crate::event_source::EventSource;
use crate::render::{render_document, RenderedDocument};
use crate::sections::LoadedSection;
use crate::settings::Settings;
use crate::viewer::popup::{PAN_UNITS_PER_COLUMN, PAN_UNITS_PER_ROW};
use crate::viewer::{
    ActivationBus, KeyboardController, Point, TriggerRegistry, ViewerPopup, ViewerSession,
    WheelDirection, TRIGGER_CLASS,
};

/// Application state: the content tree with its trigger registry, the
/// viewer session, and enough layout bookkeeping to turn mouse clicks into
/// node activations.
pub struct App {
    title: String,
    tree: ContentTree,
    registry: TriggerRegistry,
    session: ViewerSession,
    activations: ActivationBus,
    sections: Option<flume::Receiver<LoadedSection>>,
    settings: Settings,
    rendered: Option<RenderedDocument>,
    rendered_width: u16,
    content_area: Rect,
    scroll_offset: usize,
    should_quit: bool,
}

impl App {
    pub fn new(doc: PortfolioDoc, settings: Settings) -> Self {
        let mut tree = ContentTree::new();
        let root = tree.root();
        document::instantiate(&mut tree, root, &doc.body);
        tree.commit();

        let mut registry = TriggerRegistry::new();
        registry.attach(&mut tree, root);

        Self {
            title: doc.title,
            tree,
            registry,
            session: ViewerSession::new(),
            activations: ActivationBus::new(),
            sections: None,
            settings,
            rendered: None,
            rendered_width: 0,
            content_area: Rect::default(),
            scroll_offset: 0,
            should_quit: false,
        }
    }

    /// Wire up a channel of late-loaded sections, typically from
    /// `sections::spawn_loader`.
    pub fn with_sections(mut self, rx: flume::Receiver<LoadedSection>) -> Self {
        self.sections = Some(rx);
        self
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ContentTree {
        &mut self.tree
    }

    /// Publish an activation for `node`, exactly as a click on it would.
    pub fn activate(&mut self, node: NodeId) {
        self.activations.publish(node);
    }

    /// One scheduler turn: graft any sections the loader finished, let the
    /// registry digest queued mutations, then open the viewer for pending
    /// activations.
    pub fn tick(&mut self) {
        self.absorb_sections();
        self.registry.process_pending(&mut self.tree);
        for node in self.activations.drain() {
            self.open_viewer(node);
        }
    }

    fn absorb_sections(&mut self) {
        let Some(rx) = &self.sections else {
            return;
        };
        let incoming: Vec<LoadedSection> = rx.try_iter().collect();
        let done = rx.is_disconnected();

        for section in incoming {
            let parent = section
                .attach_to
                .as_deref()
                .and_then(|anchor| self.tree.find_by_attr("id", anchor))
                .unwrap_or_else(|| self.tree.root());
            document::instantiate(&mut self.tree, parent, &section.nodes);
            self.tree.commit();
            debug!("grafted section '{}'", section.name);
            self.rendered = None;
        }

        if done && self.sections.as_ref().is_some_and(|rx| rx.is_empty()) {
            self.sections = None;
        }
    }

    fn open_viewer(&mut self, node: NodeId) {
        // Clicks land on all sorts of nodes; only marked triggers open the
        // viewer.
        if !self.tree.has_class(node, TRIGGER_CLASS) {
            return;
        }
        let Some(source) = self
            .tree
            .get(node)
            .and_then(|n| n.image())
            .map(|img| img.source.clone())
        else {
            return;
        };
        let snapshot = self.registry.snapshot(&self.tree);
        self.session.open(snapshot, &source);
        self.rendered = None; // trigger marks may repaint
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(..) => self.rendered = None,
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // The viewer gets first refusal while open; unmapped keys fall
        // through to the global bindings below.
        if KeyboardController::handle_key(&mut self.session, &key) {
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(self.settings.scroll_step),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(self.settings.scroll_step),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                if self.session.is_open() {
                    self.session.wheel_step(WheelDirection::ZoomIn);
                } else {
                    self.scroll_up(self.settings.scroll_step);
                }
            }
            MouseEventKind::ScrollDown => {
                if self.session.is_open() {
                    self.session.wheel_step(WheelDirection::ZoomOut);
                } else {
                    self.scroll_down(self.settings.scroll_step);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.session.is_open() {
                    self.session.drag_start(Self::pointer(&mouse));
                } else {
                    self.click_at(mouse.column, mouse.row);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.session.drag_move(Self::pointer(&mouse));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.session.drag_end();
            }
            _ => {}
        }
    }

    /// Mouse cells translated into gesture pointer units, matching the
    /// popup's pan-to-cell conversion so one cell of drag moves the frame
    /// one cell.
    fn pointer(mouse: &MouseEvent) -> Point {
        Point::new(
            mouse.column as f32 * PAN_UNITS_PER_COLUMN,
            mouse.row as f32 * PAN_UNITS_PER_ROW,
        )
    }

    fn click_at(&mut self, column: u16, row: u16) {
        if !self.content_area.contains(Position::new(column, row)) {
            return;
        }
        let line = self.scroll_offset + (row - self.content_area.y) as usize;
        let Some(node) = self
            .rendered
            .as_ref()
            .and_then(|rendered| rendered.image_at_line(line))
        else {
            return;
        };
        if self.tree.has_class(node, TRIGGER_CLASS) {
            debug!("click activated image node at content line {line}");
            self.activations.publish(node);
        }
    }

    fn scroll_down(&mut self, step: usize) {
        let max = self.max_scroll();
        self.scroll_offset = (self.scroll_offset + step).min(max);
    }

    fn scroll_up(&mut self, step: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(step);
    }

    fn max_scroll(&self) -> usize {
        let visible = self.content_area.height as usize;
        self.rendered
            .as_ref()
            .map(|r| r.line_count().saturating_sub(visible))
            .unwrap_or(0)
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let margin = self.settings.margin;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(margin),
                Constraint::Min(0),
                Constraint::Length(margin),
            ])
            .split(chunks[0]);
        self.content_area = columns[1];

        if self.rendered.is_none() || self.rendered_width != self.content_area.width {
            self.rendered = Some(render_document(
                &self.tree,
                self.content_area.width,
                self.settings.placeholder_height,
            ));
            self.rendered_width = self.content_area.width;
            self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        }

        if let Some(rendered) = &self.rendered {
            let content = Paragraph::new(rendered.lines().to_vec())
                .scroll((self.scroll_offset as u16, 0));
            f.render_widget(content, self.content_area);
        }

        let help_text = if self.session.is_open() {
            "ESC: Close viewer | \u{2190}/\u{2192}: Navigate | +/-: Zoom | Drag: Pan"
        } else {
            "j/k: Scroll | Click image: View | q: Quit"
        };
        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title)),
            )
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, chunks[1]);

        if self.session.is_open() {
            ViewerPopup::render(f, &self.session);
        }
    }

    /// Screen cell of the first placeholder line for `source`, if it is
    /// currently visible. Test seam for simulating real clicks.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn screen_cell_of_image(&self, source: &str) -> Option<(u16, u16)> {
        let rendered = self.rendered.as_ref()?;
        let node = self.tree.descendants(self.tree.root()).find(|id| {
            self.tree
                .get(*id)
                .and_then(|n| n.image())
                .is_some_and(|img| img.source == source)
        })?;
        let line = rendered.first_line_of_image(node)?;
        if line < self.scroll_offset {
            return None;
        }
        let row = (line - self.scroll_offset) as u16;
        if row >= self.content_area.height {
            return None;
        }
        Some((
            self.content_area.x + self.content_area.width / 2,
            self.content_area.y + row,
        ))
    }
}

/// Main loop: tick, draw, then wait for the next input event. Generic over
/// the event source so tests can feed scripted input.
pub fn run_app_with_event_source<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut E,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    loop {
        app.tick();
        terminal.draw(|f| app.draw(f))?;
        if app.should_quit() {
            return Ok(());
        }
        if events.poll(tick_rate)? {
            let event = events.read()?;
            app.handle_event(event);
        }
    }
}
