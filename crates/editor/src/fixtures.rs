//! Factory functions for creating test data.
//!
//! Builds `SceneElement` tables directly, bypassing the store, so tests can
//! start from an exact layout (nested groups, rotated parents, broken links).

use shared::*;

// ── Element factories ───────────────────────────────────────────

/// Root primitive with identity transform.
pub fn primitive(id: &str, kind: PrimitiveKind, order: i64) -> SceneElement {
    SceneElement::new(id, format!("{} {}", kind.label(), id), kind.into_kind(), order)
}

/// Root primitive at a position.
pub fn primitive_at(id: &str, kind: PrimitiveKind, order: i64, pos: [f64; 3]) -> SceneElement {
    let mut el = primitive(id, kind, order);
    el.position = pos;
    el
}

/// Unit box at a position.
pub fn box_at(id: &str, order: i64, pos: [f64; 3]) -> SceneElement {
    primitive_at(id, PrimitiveKind::Box, order, pos)
}

/// Imported mesh element.
pub fn mesh(id: &str, order: i64, source: &str) -> SceneElement {
    SceneElement::new(
        id,
        id,
        ElementKind::Mesh {
            mesh_source: source.to_string(),
        },
        order,
    )
}

/// Group containing `members`; links both directions.
pub fn group(id: &str, order: i64, members: &mut [SceneElement]) -> SceneElement {
    container(id, order, members, |children| ElementKind::Group { children })
}

/// Subtraction `a - b`; links both directions.
pub fn subtraction(id: &str, order: i64, a: &mut SceneElement, b: &mut SceneElement) -> SceneElement {
    a.parent_id = Some(id.to_string());
    b.parent_id = Some(id.to_string());
    SceneElement::new(
        id,
        id,
        ElementKind::Subtraction {
            children: vec![a.id.clone(), b.id.clone()],
        },
        order,
    )
}

fn container(
    id: &str,
    order: i64,
    members: &mut [SceneElement],
    kind: impl FnOnce(Vec<ElementId>) -> ElementKind,
) -> SceneElement {
    let children = members
        .iter_mut()
        .map(|m| {
            m.parent_id = Some(id.to_string());
            m.id.clone()
        })
        .collect();
    SceneElement::new(id, id, kind(children), order)
}

// ── Tables ──────────────────────────────────────────────────────

/// Key a list of elements by id.
pub fn table(elements: impl IntoIterator<Item = SceneElement>) -> ElementMap {
    elements.into_iter().map(|e| (e.id.clone(), e)).collect()
}

/// Two boxes at x = 0 and x = 4.
pub fn two_boxes() -> ElementMap {
    table([box_at("a", 0, [0.0; 3]), box_at("b", 1, [4.0, 0.0, 0.0])])
}

/// Group `g` at (10, 0, 0) rotated 90° about Y, containing box `c` at local (1, 0, 0).
pub fn rotated_group() -> ElementMap {
    let mut child = box_at("c", 1, [1.0, 0.0, 0.0]);
    let mut g = group("g", 0, std::slice::from_mut(&mut child));
    g.position = [10.0, 0.0, 0.0];
    g.rotation = [0.0, std::f64::consts::FRAC_PI_2, 0.0];
    table([g, child])
}

/// Project file JSON for a table.
pub fn project_json(name: &str, elements: &ElementMap) -> String {
    let project = ProjectFile {
        version: PROJECT_VERSION,
        name: name.to_string(),
        elements: elements.clone(),
        created_at: None,
        updated_at: None,
    };
    serde_json::to_string(&project).unwrap_or_default()
}

/// Single-triangle OBJ source.
pub const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

/// Tetrahedron OBJ source.
pub const TETRAHEDRON_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";
