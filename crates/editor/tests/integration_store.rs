//! Integration tests for the element store: hierarchy, clipboard, alignment
//! and history behavior observed through the public `SceneState` API.

use std::collections::HashSet;

use proptest::prelude::*;
use scene_editor_lib::fixtures::{box_at, group, primitive_at, rotated_group, table, two_boxes};
use scene_editor_lib::math::{world_transform, AlignAnchor, Axis};
use scene_editor_lib::state::scene::{descendant_closure, SceneState};
use scene_editor_lib::state::settings::EditorSettings;
use shared::{ElementId, ElementKind, ElementPatch, PrimitiveKind};

fn scene() -> SceneState {
    SceneState::with_settings(EditorSettings {
        add_jitter: 0.0,
        ..Default::default()
    })
}

fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
}

fn ids(raw: &[&str]) -> Vec<ElementId> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn undo_all(s: &mut SceneState) -> usize {
    let mut steps = 0;
    while s.undo() {
        steps += 1;
    }
    steps
}

#[test]
fn test_group_centers_on_bounds() {
    let mut s = scene();
    s.load_scene(table([
        box_at("a", 0, [2.0, 0.0, 0.0]),
        box_at("b", 1, [4.0, 0.0, 0.0]),
    ]));
    let g = s.group(&ids(&["a", "b"])).unwrap();

    assert_eq!(s.get(&g).unwrap().position, [3.0, 0.0, 0.0]);
    assert_eq!(s.get("a").unwrap().position, [-1.0, 0.0, 0.0]);
    assert_eq!(s.get("b").unwrap().position, [1.0, 0.0, 0.0]);
    assert_eq!(s.get("a").unwrap().parent_id.as_deref(), Some(g.as_str()));
    assert_eq!(s.get(&g).unwrap().kind.children().unwrap(), &ids(&["a", "b"]));
    assert_eq!(s.selection().all(), &[g]);
}

#[test]
fn test_group_then_ungroup_restores_world_transforms() {
    let mut a = box_at("a", 0, [2.0, 1.0, 0.0]);
    a.rotation = [0.3, 0.0, 0.0];
    let mut b = primitive_at("b", PrimitiveKind::Sphere, 1, [4.0, 0.0, -1.0]);
    b.scale = [2.0, 1.0, 1.0];

    let mut s = scene();
    s.load_scene(table([a.clone(), b.clone()]));
    let g = s.group(&ids(&["a", "b"])).unwrap();
    let selected = s.ungroup(&[g.clone()]);

    assert!(s.get(&g).is_none());
    assert_eq!(selected.len(), 2);
    for original in [&a, &b] {
        let now = s.get(&original.id).unwrap();
        assert!(now.parent_id.is_none());
        assert!(approx(now.position, original.position), "{:?}", now.position);
        assert!(approx(now.rotation, original.rotation), "{:?}", now.rotation);
        assert!(approx(now.scale, original.scale), "{:?}", now.scale);
    }
}

#[test]
fn test_ungroup_passes_non_groups_through() {
    let mut s = scene();
    s.load_scene(rotated_group());
    s.add(PrimitiveKind::Star);
    let star = s.selection().all()[0].clone();

    let selected = s.ungroup(&[star.clone(), "g".to_string()]);
    assert!(selected.contains(&star));
    assert!(selected.contains(&"c".to_string()));
    // g at (10,0,0) rotated 90° about Y maps local (1,0,0) to (0,0,-1)
    assert!(approx(s.get("c").unwrap().position, [10.0, 0.0, -1.0]));
}

#[test]
fn test_subtract_orders_operands() {
    let mut s = scene();
    let a = s.add(PrimitiveKind::Box);
    let b = s.add(PrimitiveKind::Sphere);
    let sub = s.subtract(&[b.clone(), a.clone()]).unwrap();

    let element = s.get(&sub).unwrap();
    assert!(matches!(element.kind, ElementKind::Subtraction { .. }));
    assert_eq!(element.kind.children().unwrap(), &[a.clone(), b.clone()]);
    assert_eq!(s.get(&a).unwrap().parent_id.as_deref(), Some(sub.as_str()));
    assert_eq!(s.get(&b).unwrap().parent_id.as_deref(), Some(sub.as_str()));
}

#[test]
fn test_subtract_rejects_containers_and_wrong_counts() {
    let mut s = scene();
    s.load_scene(rotated_group());
    s.add(PrimitiveKind::Box);
    let b = s.selection().all()[0].clone();
    let version = s.version();
    assert!(s.subtract(&["g".to_string(), b.clone()]).is_none());
    assert!(s.subtract(&[b.clone()]).is_none());
    assert_eq!(s.version(), version);
}

#[test]
fn test_operands_cannot_be_regrouped() {
    let mut s = scene();
    let a = s.add(PrimitiveKind::Box);
    let b = s.add(PrimitiveKind::Sphere);
    let c = s.add(PrimitiveKind::Cone);
    s.subtract(&[a.clone(), b.clone()]).unwrap();
    assert!(s.group(&[a, c]).is_none());
}

#[test]
fn test_reorder_moves_before_target() {
    let mut s = scene();
    s.load_scene(table([
        box_at("a", 0, [0.0; 3]),
        box_at("b", 1, [0.0; 3]),
        box_at("c", 2, [0.0; 3]),
    ]));
    assert!(s.reorder("c", "a"));
    assert_eq!(s.ordered_ids(), ids(&["c", "a", "b"]));
    assert_eq!(
        ["c", "a", "b"].map(|id| s.get(id).unwrap().order),
        [0, 1, 2]
    );
    assert!(!s.reorder("a", "a"));
    assert!(!s.reorder("a", "ghost"));
}

#[test]
fn test_remove_cascades_to_descendants() {
    let mut inner_members = [box_at("x", 3, [0.0; 3])];
    let mut inner = group("inner", 2, &mut inner_members);
    let mut outer_members = [box_at("y", 1, [0.0; 3])];
    let mut outer = group("outer", 0, &mut outer_members);
    inner.parent_id = Some("outer".to_string());
    if let Some(children) = outer.kind.children_mut() {
        children.push("inner".to_string());
    }

    let mut s = scene();
    s.load_scene(table(
        [outer, inner, box_at("keep", 4, [0.0; 3])]
            .into_iter()
            .chain(inner_members)
            .chain(outer_members),
    ));
    s.set_selection(ids(&["x", "keep"]));

    let removed: HashSet<ElementId> = s.remove(&ids(&["outer"])).into_iter().collect();
    assert_eq!(removed, ids(&["outer", "inner", "x", "y"]).into_iter().collect());
    assert_eq!(s.len(), 1);
    assert_eq!(s.selection().all(), &ids(&["keep"]));
}

#[test]
fn test_remove_child_strips_container_list() {
    let mut s = scene();
    s.load_scene(rotated_group());
    s.remove(&ids(&["c"]));
    assert!(s.get("g").unwrap().kind.children().unwrap().is_empty());
}

#[test]
fn test_copy_paste_is_isomorphic_with_fresh_ids() {
    let mut s = scene();
    s.load_scene(rotated_group());
    let before: HashSet<ElementId> = s.elements().keys().cloned().collect();
    let max_order = s.elements().values().map(|e| e.order).max().unwrap();

    assert_eq!(s.copy(&ids(&["g"])), 2);
    let pasted = s.paste();
    assert_eq!(pasted.len(), 1);
    assert_eq!(s.len(), 4);

    let new_group = s.get(&pasted[0]).unwrap();
    assert!(!before.contains(&new_group.id));
    assert!(new_group.parent_id.is_none());
    assert_eq!(new_group.position, [10.5, 0.0, 0.5]);
    assert!(new_group.order > max_order);

    let children = new_group.kind.children().unwrap().to_vec();
    assert_eq!(children.len(), 1);
    let child = s.get(&children[0]).unwrap();
    assert!(!before.contains(&child.id));
    assert_eq!(child.parent_id.as_deref(), Some(new_group.id.as_str()));
    assert!(matches!(child.kind, ElementKind::Box { .. }));
    assert_eq!(s.selection().all(), pasted.as_slice());

    // originals untouched
    assert_eq!(s.get("c").unwrap().parent_id.as_deref(), Some("g"));
    assert_eq!(s.get("g").unwrap().position, [10.0, 0.0, 0.0]);
}

#[test]
fn test_paste_twice_gives_distinct_copies() {
    let mut s = scene();
    s.load_scene(two_boxes());
    s.copy(&ids(&["a"]));
    let first = s.paste();
    let second = s.paste();
    assert_ne!(first, second);
    assert_eq!(s.len(), 4);
}

#[test]
fn test_copying_a_child_bakes_world_transform() {
    let mut s = scene();
    s.load_scene(rotated_group());
    let created = s.duplicate(&ids(&["c"]));
    let copy = s.get(&created[0]).unwrap();
    assert!(copy.parent_id.is_none());
    assert!(approx(copy.position, [10.5, 0.0, -0.5]), "{:?}", copy.position);
}

#[test]
fn test_align_min_is_idempotent() {
    let mut s = scene();
    s.load_scene(two_boxes());
    s.set_selection(ids(&["a", "b"]));

    assert!(s.align(Axis::X, AlignAnchor::Min));
    assert_eq!(s.get("a").unwrap().position, [0.0, 0.0, 0.0]);
    assert_eq!(s.get("b").unwrap().position, [0.0, 0.0, 0.0]);

    let version = s.version();
    assert!(s.align(Axis::X, AlignAnchor::Min));
    assert_eq!(s.version(), version);

    // one undo step undoes the only recorded alignment
    assert!(s.undo());
    assert_eq!(s.get("b").unwrap().position, [4.0, 0.0, 0.0]);
    assert!(!s.undo());
}

#[test]
fn test_align_max_inside_rotated_parent() {
    let mut s = scene();
    let mut elements = rotated_group();
    elements.insert("d".to_string(), box_at("d", 2, [0.0, 0.0, 5.0]));
    s.load_scene(elements);
    s.set_selection(ids(&["c", "d"]));

    assert!(s.align(Axis::Z, AlignAnchor::Max));
    let world = world_transform(s.elements(), "c").unwrap();
    assert!(approx(world.position, [10.0, 0.0, 5.0]), "{:?}", world.position);
    assert!(approx(s.get("c").unwrap().position, [-5.0, 0.0, 0.0]));
    assert_eq!(s.get("d").unwrap().position, [0.0, 0.0, 5.0]);
}

#[test]
fn test_align_needs_two_selected() {
    let mut s = scene();
    s.load_scene(two_boxes());
    s.set_selection(ids(&["a"]));
    assert!(!s.align(Axis::Y, AlignAnchor::Center));
    assert!(!s.can_undo());
}

#[test]
fn test_update_missing_id_records_nothing() {
    let mut s = scene();
    assert!(!s.update("ghost", ElementPatch::transform([1.0; 3], [0.0; 3], [1.0; 3])));
    assert!(!s.can_undo());
}

#[test]
fn test_update_clamps_shape_attributes() {
    let mut s = scene();
    let b = s.add(PrimitiveKind::Box);
    let t = s.add(PrimitiveKind::Torus);
    s.update(&b, ElementPatch { corner_radius: Some(3.0), ..Default::default() });
    s.update(&t, ElementPatch { tube_thickness: Some(0.0), ..Default::default() });
    assert_eq!(
        s.get(&b).unwrap().kind,
        ElementKind::Box { corner_radius: Some(0.5) }
    );
    assert_eq!(
        s.get(&t).unwrap().kind,
        ElementKind::Torus { tube_thickness: Some(0.05) }
    );
}

#[test]
fn test_operations_then_undos_restore_table() {
    let mut s = scene();
    s.load_scene(two_boxes());
    let initial = s.elements().clone();

    let c = s.add(PrimitiveKind::Cylinder);
    s.update("a", ElementPatch { name: Some("Renamed".into()), ..Default::default() });
    let g = s.group(&[c.clone(), "b".to_string()]).unwrap();
    s.duplicate(&[g.clone()]);
    s.ungroup(&[g]);
    s.remove(&ids(&["a"]));
    s.reorder(&c, "b");

    assert_eq!(undo_all(&mut s), 7);
    assert_eq!(s.elements(), &initial);
}

#[test]
fn test_redo_replays_undone_state() {
    let mut s = scene();
    s.add(PrimitiveKind::Heart);
    s.add(PrimitiveKind::Pyramid);
    let after = s.elements().clone();

    assert!(s.undo());
    assert_eq!(s.len(), 1);
    assert!(s.redo());
    assert_eq!(s.elements(), &after);
    assert!(!s.redo());
}

#[test]
fn test_undo_and_redo_restore_selection() {
    let mut s = scene();
    s.load_scene(table([
        box_at("a", 0, [0.0; 3]),
        box_at("b", 1, [2.0, 0.0, 0.0]),
        box_at("c", 2, [4.0, 0.0, 0.0]),
    ]));
    s.set_selection(ids(&["a", "b"]));

    let g = s.group(&ids(&["a", "b"])).unwrap();
    let copies = s.duplicate(&[g.clone()]);
    assert_eq!(s.selection().all(), &copies);
    s.remove(&copies);
    assert_eq!(s.selection().count(), 0);

    assert!(s.undo());
    assert_eq!(s.selection().all(), &copies);
    assert!(s.undo());
    assert_eq!(s.selection().all(), &[g.clone()]);
    assert!(s.undo());
    assert_eq!(s.selection().all(), &ids(&["a", "b"]));

    assert!(s.redo());
    assert_eq!(s.selection().all(), &[g]);
    assert!(s.redo());
    assert_eq!(s.selection().all(), &copies);
    assert!(s.redo());
    assert_eq!(s.selection().count(), 0);
}

#[test]
fn test_pasted_children_keep_local_offsets() {
    let mut s = scene();
    s.load_scene(table([
        box_at("a", 0, [2.0, 0.0, 0.0]),
        box_at("b", 1, [4.0, 0.0, 0.0]),
    ]));
    let g = s.group(&ids(&["a", "b"])).unwrap();
    s.copy(&[g]);
    let pasted = s.paste();

    let new_group = s.get(&pasted[0]).unwrap();
    assert_eq!(new_group.position, [3.5, 0.0, 0.5]);
    let children = new_group.kind.children().unwrap().to_vec();
    // the offset lands on both the group and its members' local positions
    let world: Vec<[f64; 3]> = children
        .iter()
        .map(|id| world_transform(s.elements(), id).unwrap().position)
        .collect();
    assert!(approx(world[0], [3.0, 0.0, 1.0]), "{:?}", world[0]);
    assert!(approx(world[1], [5.0, 0.0, 1.0]), "{:?}", world[1]);
}

#[test]
fn test_new_operation_clears_redo() {
    let mut s = scene();
    s.add(PrimitiveKind::Heart);
    assert!(s.undo());
    s.add(PrimitiveKind::Cone);
    assert!(!s.can_redo());
}

#[test]
fn test_history_is_bounded() {
    let mut s = scene();
    for _ in 0..55 {
        s.add(PrimitiveKind::Box);
    }
    assert_eq!(undo_all(&mut s), 50);
    assert_eq!(s.len(), 5);
}

#[test]
fn test_load_scene_assigns_missing_orders_after_max() {
    let mut s = scene();
    s.add(PrimitiveKind::Box);
    s.load_scene(table([
        box_at("z", -1, [0.0; 3]),
        box_at("m", 4, [0.0; 3]),
        box_at("b", -1, [0.0; 3]),
    ]));
    assert_eq!(s.get("m").unwrap().order, 4);
    assert_eq!(s.get("b").unwrap().order, 5);
    assert_eq!(s.get("z").unwrap().order, 6);
    assert!(!s.can_undo());
    assert!(s.selection().all().is_empty());
    assert!(s.clipboard().is_none());
}

#[test]
fn test_alignment_mode_drops_with_selection() {
    let mut s = scene();
    s.load_scene(two_boxes());
    assert!(!s.set_alignment_mode(true));
    s.set_selection(ids(&["a", "b"]));
    assert!(s.set_alignment_mode(true));
    s.toggle_selection("b");
    assert!(!s.selection().alignment_mode());
}

#[test]
fn test_closure_of_group_includes_nested_children() {
    let elements = rotated_group();
    let mut closure = descendant_closure(&elements, &ids(&["g"]));
    closure.sort();
    assert_eq!(closure, ids(&["c", "g"]));
}

// ── Property: every recorded operation is undoable ──────────────

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Move(usize, f64),
    Group(usize),
    Ungroup(usize),
    Subtract(usize),
    Duplicate(usize),
    Reorder(usize, usize),
    Align(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8).prop_map(Op::Add),
        (0usize..64).prop_map(Op::Remove),
        (0usize..64, -10.0f64..10.0).prop_map(|(i, x)| Op::Move(i, x)),
        (0usize..64).prop_map(Op::Group),
        (0usize..64).prop_map(Op::Ungroup),
        (0usize..64).prop_map(Op::Subtract),
        (0usize..64).prop_map(Op::Duplicate),
        (0usize..64, 0usize..64).prop_map(|(a, b)| Op::Reorder(a, b)),
        (0usize..64, 0usize..3).prop_map(|(i, a)| Op::Align(i, a)),
    ]
}

fn pick(s: &SceneState, i: usize) -> Option<ElementId> {
    let ids = s.ordered_ids();
    (!ids.is_empty()).then(|| ids[i % ids.len()].clone())
}

fn pair(s: &SceneState, i: usize) -> Vec<ElementId> {
    let ids = s.ordered_ids();
    if ids.len() < 2 {
        return Vec::new();
    }
    vec![ids[i % ids.len()].clone(), ids[(i + 1) % ids.len()].clone()]
}

fn apply(s: &mut SceneState, op: &Op) {
    match *op {
        Op::Add(k) => {
            s.add(PrimitiveKind::all()[k % PrimitiveKind::all().len()]);
        }
        Op::Remove(i) => {
            if let Some(id) = pick(s, i) {
                s.remove(&[id]);
            }
        }
        Op::Move(i, x) => {
            if let Some(id) = pick(s, i) {
                s.update(&id, ElementPatch { position: Some([x, 0.0, -x]), ..Default::default() });
            }
        }
        Op::Group(i) => {
            s.group(&pair(s, i));
        }
        Op::Ungroup(i) => {
            if let Some(id) = pick(s, i) {
                s.ungroup(&[id]);
            }
        }
        Op::Subtract(i) => {
            s.subtract(&pair(s, i));
        }
        Op::Duplicate(i) => {
            if let Some(id) = pick(s, i) {
                s.duplicate(&[id]);
            }
        }
        Op::Reorder(a, b) => {
            if let (Some(a), Some(b)) = (pick(s, a), pick(s, b)) {
                s.reorder(&a, &b);
            }
        }
        Op::Align(i, axis) => {
            s.set_selection(pair(s, i));
            let axis = [Axis::X, Axis::Y, Axis::Z][axis];
            s.align(axis, AlignAnchor::Min);
        }
    }
}

proptest! {
    #[test]
    fn undo_all_restores_initial_table(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut s = scene();
        s.load_scene(two_boxes());
        let initial = s.elements().clone();

        for op in &ops {
            apply(&mut s, op);
        }
        let last = s.elements().clone();

        undo_all(&mut s);
        prop_assert_eq!(s.elements(), &initial);

        while s.redo() {}
        prop_assert_eq!(s.elements(), &last);
    }
}
