use crate::content::{ContainerRole, ContentTree, NodeId, NodeKind};

/// Marker class the registry stamps onto eligible images. Click hit-testing
/// looks for it; upstream renderers may also set it directly.
pub const TRIGGER_CLASS: &str = "viewer-trigger";

/// Classes that mark an image as interface decoration rather than content.
const EXCLUDED_CLASSES: &[&str] = &[
    "logo",
    "icon",
    "avatar",
    "profile",
    "favicon",
    "object-cover",
    "object-contain",
    "brand",
    "nav-icon",
    "menu-icon",
];

/// Ancestor classes with the same effect as a structural navigation role.
const EXCLUDED_ANCESTOR_CLASSES: &[&str] = &["sidebar", "navigation", "navbar", "menu"];

/// Images with a known intrinsic dimension under this are icon-sized.
const MIN_CONTENT_DIMENSION: u32 = 50;

/// Decides whether a node qualifies as a viewer trigger. Pure and total:
/// unknown ids, non-image nodes and partial data all classify as `false`.
pub fn is_trigger_image(tree: &ContentTree, id: NodeId) -> bool {
    let Some(node) = tree.get(id) else {
        return false;
    };
    let NodeKind::Image(image) = &node.kind else {
        return false;
    };

    // Images inside chrome (nav bars, headers, sidebars, menus) are part of
    // the page furniture, not the portfolio content.
    for ancestor in tree.ancestors(id) {
        let Some(parent) = tree.get(ancestor) else {
            continue;
        };
        if let NodeKind::Container { role } = parent.kind {
            if matches!(
                role,
                ContainerRole::Navigation
                    | ContainerRole::Header
                    | ContainerRole::Sidebar
                    | ContainerRole::Menu
            ) {
                return false;
            }
        }
        if parent
            .classes
            .iter()
            .any(|c| EXCLUDED_ANCESTOR_CLASSES.contains(&c.as_str()))
        {
            return false;
        }
    }

    if node
        .classes
        .iter()
        .any(|c| EXCLUDED_CLASSES.contains(&c.as_str()))
    {
        return false;
    }

    // Best effort: a dimension of zero means the renderer did not know the
    // real size, so it cannot exclude anything.
    if is_icon_sized(image.natural_width) || is_icon_sized(image.natural_height) {
        return false;
    }

    if node.attrs.contains_key("data-no-viewer")
        || node.attrs.get("data-viewer").map(|v| v.as_str()) == Some("false")
    {
        return false;
    }

    true
}

fn is_icon_sized(dimension: Option<u32>) -> bool {
    matches!(dimension, Some(d) if d > 0 && d < MIN_CONTENT_DIMENSION)
}
