//! Display helper functions for elements

use shared::{ElementKind, SceneElement};

/// Get display name for an element
pub fn element_display_name(element: &SceneElement) -> String {
    match &element.kind {
        ElementKind::Group { children } | ElementKind::Subtraction { children } => {
            format!("{} [{}] ({})", element.name, children.len(), short_id(&element.id))
        }
        _ => format!("{} ({})", element.name, short_id(&element.id)),
    }
}

/// Get icon for an element kind
pub fn kind_icon(kind: &ElementKind) -> &'static str {
    match kind {
        ElementKind::Box { .. } => "[B]",
        ElementKind::Sphere => "[S]",
        ElementKind::Cylinder => "[Y]",
        ElementKind::Torus { .. } => "[O]",
        ElementKind::Cone => "[K]",
        ElementKind::Pyramid => "[P]",
        ElementKind::Heart => "[H]",
        ElementKind::Star => "[*]",
        ElementKind::Mesh { .. } => "[M]",
        ElementKind::Group { .. } => "[G]",
        ElementKind::Subtraction { .. } => "[-]",
    }
}

/// Get shortened ID (first 8 characters)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
