use std::ops::Range;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::content::{ContentTree, NodeId, NodeKind};
use crate::viewer::classifier::TRIGGER_CLASS;

/// A content tree flattened into styled terminal lines, plus the mapping
/// from line numbers back to the image nodes rendered there. The mapping is
/// what turns a mouse click row into a node activation.
pub struct RenderedDocument {
    lines: Vec<Line<'static>>,
    image_spans: Vec<(Range<usize>, NodeId)>,
}

impl RenderedDocument {
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The image node occupying the given content line, if any.
    pub fn image_at_line(&self, line: usize) -> Option<NodeId> {
        self.image_spans
            .iter()
            .find(|(range, _)| range.contains(&line))
            .map(|(_, id)| *id)
    }

    /// First content line of the placeholder for `id`.
    pub fn first_line_of_image(&self, id: NodeId) -> Option<usize> {
        self.image_spans
            .iter()
            .find(|(_, node)| *node == id)
            .map(|(range, _)| range.start)
    }
}

/// Flatten the tree into lines. Images become framed placeholders of
/// `placeholder_height` lines; everything else is plain text layout.
pub fn render_document(
    tree: &ContentTree,
    width: u16,
    placeholder_height: u16,
) -> RenderedDocument {
    let width = width.max(16) as usize;
    let mut out = RenderedDocument {
        lines: Vec::new(),
        image_spans: Vec::new(),
    };
    render_children(tree, tree.root(), width, placeholder_height.max(3), &mut out);
    out
}

fn render_children(
    tree: &ContentTree,
    parent: NodeId,
    width: usize,
    placeholder_height: u16,
    out: &mut RenderedDocument,
) {
    let Some(node) = tree.get(parent) else {
        return;
    };
    for child in node.children() {
        render_node(tree, *child, width, placeholder_height, out);
    }
}

fn render_node(
    tree: &ContentTree,
    id: NodeId,
    width: usize,
    placeholder_height: u16,
    out: &mut RenderedDocument,
) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Container { .. } => {
            render_children(tree, id, width, placeholder_height, out);
        }
        NodeKind::Heading { level, text } => {
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if *level <= 2 {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            out.lines
                .push(Line::from(Span::styled(text.clone(), style)));
            out.lines.push(Line::from(""));
        }
        NodeKind::Paragraph { text } => {
            for wrapped in textwrap::wrap(text, width) {
                out.lines.push(Line::from(wrapped.into_owned()));
            }
            out.lines.push(Line::from(""));
        }
        NodeKind::Image(image) => {
            let label = if image.alt_text.is_empty() {
                format!("[image: {}]", image.source)
            } else {
                format!("[{}]", image.alt_text)
            };
            let border_color = if tree.has_class(id, TRIGGER_CLASS) {
                Color::Blue
            } else {
                Color::DarkGray
            };
            let start = out.lines.len();
            push_placeholder(&label, width, placeholder_height, border_color, out);
            out.image_spans.push((start..out.lines.len(), id));
            out.lines.push(Line::from(""));
        }
    }
}

/// A bordered frame with the label centered inside, standing in for the
/// image itself.
fn push_placeholder(
    label: &str,
    width: usize,
    height: u16,
    border_color: Color,
    out: &mut RenderedDocument,
) {
    let style = Style::default().fg(border_color);
    let frame_width = (label.chars().count() + 6).clamp(12, width);
    let inner = frame_width - 2;

    out.lines.push(Line::from(Span::styled(
        format!("\u{250c}{}\u{2510}", "\u{2500}".repeat(inner)),
        style,
    )));

    let body_lines = height.saturating_sub(2) as usize;
    let label_line = body_lines / 2;
    for i in 0..body_lines {
        let content = if i == label_line {
            let text: String = if label.chars().count() > inner {
                label.chars().take(inner.saturating_sub(3)).collect::<String>() + "..."
            } else {
                label.to_string()
            };
            let pad_left = (inner - text.chars().count()) / 2;
            let pad_right = inner - text.chars().count() - pad_left;
            format!(
                "\u{2502}{}{}{}\u{2502}",
                " ".repeat(pad_left),
                text,
                " ".repeat(pad_right)
            )
        } else {
            format!("\u{2502}{}\u{2502}", " ".repeat(inner))
        };
        out.lines.push(Line::from(Span::styled(content, style)));
    }

    out.lines.push(Line::from(Span::styled(
        format!("\u{2514}{}\u{2518}", "\u{2500}".repeat(inner)),
        style,
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ImageData;

    fn demo_tree() -> (ContentTree, NodeId) {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.append_child(
            root,
            NodeKind::Heading {
                level: 1,
                text: "About".to_string(),
            },
        );
        tree.append_child(
            root,
            NodeKind::Paragraph {
                text: "Short bio that easily fits one line.".to_string(),
            },
        );
        let img = tree.append_child(
            root,
            NodeKind::Image(ImageData {
                source: "shot.png".to_string(),
                alt_text: "screenshot".to_string(),
                natural_width: None,
                natural_height: None,
            }),
        );
        (tree, img)
    }

    #[test]
    fn image_lines_map_back_to_the_node() {
        let (tree, img) = demo_tree();
        let rendered = render_document(&tree, 60, 7);

        let first = rendered.first_line_of_image(img).unwrap();
        // Every placeholder row hits the node, the rows around it do not.
        for offset in 0..7 {
            assert_eq!(rendered.image_at_line(first + offset), Some(img));
        }
        assert_eq!(rendered.image_at_line(first.saturating_sub(1)), None);
        assert_eq!(rendered.image_at_line(first + 7), None);
    }

    #[test]
    fn placeholder_height_is_respected() {
        let (tree, img) = demo_tree();
        let rendered = render_document(&tree, 60, 9);
        let first = rendered.first_line_of_image(img).unwrap();
        assert_eq!(rendered.image_at_line(first + 8), Some(img));
        assert_eq!(rendered.image_at_line(first + 9), None);
    }

    #[test]
    fn long_paragraphs_wrap_to_width() {
        let mut tree = ContentTree::new();
        tree.append_child(
            tree.root(),
            NodeKind::Paragraph {
                text: "word ".repeat(40).trim_end().to_string(),
            },
        );
        let rendered = render_document(&tree, 20, 7);
        // 40 words of 5 cells each cannot fit 20 columns in one line.
        assert!(rendered.line_count() > 5);
    }
}
