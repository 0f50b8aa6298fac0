use crossterm::event::{KeyCode, KeyEvent};

use crate::viewer::session::ViewerSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    Close,
    Previous,
    Next,
    ZoomIn,
    ZoomOut,
    ResetView,
}

/// Key bindings for the open viewer. The controller never fires while the
/// session is closed, and unmapped keys are left for the rest of the
/// application to handle.
pub struct KeyboardController;

impl KeyboardController {
    /// Translate a key press into a viewer command. `None` means the key is
    /// not ours: either the session is closed or the key is unmapped.
    pub fn command_for(session: &ViewerSession, key: &KeyEvent) -> Option<ViewerCommand> {
        if !session.is_open() {
            return None;
        }
        match key.code {
            KeyCode::Esc => Some(ViewerCommand::Close),
            // Arrow navigation only makes sense with something to move to.
            KeyCode::Left if session.has_multiple() => Some(ViewerCommand::Previous),
            KeyCode::Right if session.has_multiple() => Some(ViewerCommand::Next),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(ViewerCommand::ZoomIn),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(ViewerCommand::ZoomOut),
            KeyCode::Char('0') => Some(ViewerCommand::ResetView),
            _ => None,
        }
    }

    /// Route a key press into the session. Returns true when the key was
    /// consumed.
    pub fn handle_key(session: &mut ViewerSession, key: &KeyEvent) -> bool {
        let Some(command) = Self::command_for(session, key) else {
            return false;
        };
        match command {
            ViewerCommand::Close => session.close(),
            ViewerCommand::Previous => session.navigate(-1),
            ViewerCommand::Next => session.navigate(1),
            ViewerCommand::ZoomIn => session.zoom_in(),
            ViewerCommand::ZoomOut => session.zoom_out(),
            ViewerCommand::ResetView => session.reset_view(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::session::ImageDescriptor;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn descriptor(source: &str) -> ImageDescriptor {
        ImageDescriptor {
            source: source.to_string(),
            alt_text: None,
            caption: None,
            title: None,
        }
    }

    fn open_session(count: usize) -> ViewerSession {
        let mut session = ViewerSession::new();
        let images: Vec<ImageDescriptor> =
            (0..count).map(|i| descriptor(&format!("{i}.png"))).collect();
        session.open(images, "0.png");
        session
    }

    #[test]
    fn closed_session_consumes_nothing() {
        let session = ViewerSession::new();
        assert_eq!(
            KeyboardController::command_for(&session, &key(KeyCode::Esc)),
            None
        );
        assert_eq!(
            KeyboardController::command_for(&session, &key(KeyCode::Left)),
            None
        );
    }

    #[test]
    fn arrows_require_more_than_one_image() {
        let single = open_session(1);
        assert_eq!(
            KeyboardController::command_for(&single, &key(KeyCode::Left)),
            None
        );
        assert_eq!(
            KeyboardController::command_for(&single, &key(KeyCode::Right)),
            None
        );

        let multiple = open_session(3);
        assert_eq!(
            KeyboardController::command_for(&multiple, &key(KeyCode::Right)),
            Some(ViewerCommand::Next)
        );
        assert_eq!(
            KeyboardController::command_for(&multiple, &key(KeyCode::Left)),
            Some(ViewerCommand::Previous)
        );
    }

    #[test]
    fn zoom_keys_map_to_steps() {
        let mut session = open_session(2);

        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Char('+'))));
        assert_eq!(session.gestures().zoom(), 1.25);

        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Char('='))));
        assert_eq!(session.gestures().zoom(), 1.5);

        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Char('_'))));
        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Char('-'))));
        assert_eq!(session.gestures().zoom(), 1.0);

        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Char('0'))));
        assert_eq!(session.gestures().zoom(), 1.0);
    }

    #[test]
    fn unmapped_keys_pass_through() {
        let mut session = open_session(2);
        assert!(!KeyboardController::handle_key(
            &mut session,
            &key(KeyCode::Char('q'))
        ));
        assert!(session.is_open());
    }

    #[test]
    fn escape_closes_the_session() {
        let mut session = open_session(2);
        session.zoom_in();

        assert!(KeyboardController::handle_key(&mut session, &key(KeyCode::Esc)));
        assert!(!session.is_open());
        assert_eq!(session.gestures().zoom(), 1.0);
    }
}
