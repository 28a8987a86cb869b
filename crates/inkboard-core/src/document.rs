//! Document model: a flat, z-ordered collection of elements.

use crate::element::{generate_seed, Element, ElementId, ElementPatch, GroupId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Z-order destination for [`Document::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Front,
    Back,
}

/// An ordered collection of elements; index order is z-order, later entries
/// draw on top.
///
/// The public mutators are pure: each returns a new document and leaves the
/// receiver untouched, so history and callers can hold snapshots without
/// defensive copies. In-place access is restricted to the crate and used
/// only for transient gesture updates between commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Topmost element whose bounding box contains the point, scanning in
    /// reverse z-order.
    pub fn hit_test(&self, point: Point) -> Option<&Element> {
        self.elements.iter().rev().find(|el| el.contains(point))
    }

    /// The element's whole group in z-order, or the element alone when it
    /// carries no group id. Unknown ids yield an empty list.
    pub fn expand_group(&self, id: ElementId) -> Vec<ElementId> {
        let Some(element) = self.get(id) else {
            return Vec::new();
        };
        match element.group_id {
            Some(group) => self
                .elements
                .iter()
                .filter(|el| el.group_id == Some(group))
                .map(|el| el.id)
                .collect(),
            None => vec![id],
        }
    }

    /// Append an element on top of the z-order.
    pub fn add(&self, element: Element) -> Document {
        let mut elements = self.elements.clone();
        elements.push(element);
        Document { elements }
    }

    /// Merge a partial update into one element. Unknown ids are a no-op.
    pub fn update_element(&self, id: ElementId, patch: &ElementPatch) -> Document {
        let mut doc = self.clone();
        if let Some(el) = doc.elements.iter_mut().find(|el| el.id == id) {
            el.apply(patch);
        }
        doc
    }

    /// Remove every listed element; unknown ids are ignored.
    pub fn delete_elements(&self, ids: &[ElementId]) -> Document {
        let elements = self
            .elements
            .iter()
            .filter(|el| !ids.contains(&el.id))
            .cloned()
            .collect();
        Document { elements }
    }

    /// Clone the listed elements with fresh ids and seeds, offset by
    /// [`DUPLICATE_OFFSET`], appended on top in source z-order. Clones of
    /// grouped sources share one fresh group id so the copies stay grouped.
    /// Returns the new document and the clone ids.
    pub fn duplicate_elements(&self, ids: &[ElementId]) -> (Document, Vec<ElementId>) {
        let fresh_group = Uuid::new_v4();
        let mut elements = self.elements.clone();
        let mut clone_ids = Vec::new();
        for el in self.elements.iter().filter(|el| ids.contains(&el.id)) {
            let mut clone = el.clone();
            clone.id = Uuid::new_v4();
            clone.seed = generate_seed();
            clone.translate(DUPLICATE_OFFSET);
            clone.group_id = el.group_id.map(|_| fresh_group);
            clone_ids.push(clone.id);
            elements.push(clone);
        }
        (Document { elements }, clone_ids)
    }

    /// Move the listed elements to the top or bottom of the z-order,
    /// preserving their relative order.
    pub fn reorder(&self, ids: &[ElementId], placement: ZOrder) -> Document {
        let (moved, rest): (Vec<Element>, Vec<Element>) = self
            .elements
            .iter()
            .cloned()
            .partition(|el| ids.contains(&el.id));
        let elements = match placement {
            ZOrder::Front => rest.into_iter().chain(moved).collect(),
            ZOrder::Back => moved.into_iter().chain(rest).collect(),
        };
        Document { elements }
    }

    /// Assign a fresh shared group id to the listed elements, overwriting
    /// any prior membership. Fewer than two ids is a no-op; groups do not
    /// nest.
    pub fn group(&self, ids: &[ElementId]) -> Document {
        if ids.len() < 2 {
            return self.clone();
        }
        let group = Uuid::new_v4();
        let mut doc = self.clone();
        for el in doc.elements.iter_mut().filter(|el| ids.contains(&el.id)) {
            el.group_id = Some(group);
        }
        doc
    }

    /// Clear group membership on the listed elements and on everything
    /// grouped with them, so no group is left with dangling members.
    pub fn ungroup(&self, ids: &[ElementId]) -> Document {
        let groups: Vec<GroupId> = self
            .elements
            .iter()
            .filter(|el| ids.contains(&el.id))
            .filter_map(|el| el.group_id)
            .collect();
        let mut doc = self.clone();
        for el in doc.elements.iter_mut() {
            if ids.contains(&el.id) || el.group_id.is_some_and(|g| groups.contains(&g)) {
                el.group_id = None;
            }
        }
        doc
    }

    /// Mutable access to one element for transient gesture updates.
    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    /// The most recently appended element (the one a drawing gesture grows).
    pub(crate) fn last_mut(&mut self) -> Option<&mut Element> {
        self.elements.last_mut()
    }

    /// Translate every listed element in place.
    pub(crate) fn translate_all(&mut self, ids: &[ElementId], delta: Vec2) {
        for el in self.elements.iter_mut().filter(|el| ids.contains(&el.id)) {
            el.translate(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, StyleDefaults, Theme};

    fn style() -> StyleDefaults {
        StyleDefaults::for_theme(Theme::Light)
    }

    fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut el = Element::new(ElementKind::Rectangle, Point::new(x, y), &style());
        el.width = w;
        el.height = h;
        el
    }

    #[test]
    fn test_mutators_leave_receiver_untouched() {
        let doc = Document::new().add(rect_at(0.0, 0.0, 10.0, 10.0));
        let id = doc.elements()[0].id;
        let _ = doc.update_element(id, &ElementPatch { x: Some(99.0), ..Default::default() });
        let _ = doc.delete_elements(&[id]);
        assert_eq!(doc.elements()[0].x, 0.0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let doc = Document::new().add(rect_at(0.0, 0.0, 10.0, 10.0));
        let updated = doc.update_element(Uuid::new_v4(), &ElementPatch {
            x: Some(50.0),
            ..Default::default()
        });
        assert_eq!(doc, updated);
    }

    #[test]
    fn test_delete_ignores_unknown_ids() {
        let doc = Document::new().add(rect_at(0.0, 0.0, 10.0, 10.0));
        let id = doc.elements()[0].id;
        let out = doc.delete_elements(&[id, Uuid::new_v4()]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_duplicate_offsets_and_refreshes_identity() {
        let doc = Document::new().add(rect_at(5.0, 5.0, 10.0, 10.0));
        let source = &doc.elements()[0];
        let (out, clones) = doc.duplicate_elements(&[source.id]);
        assert_eq!(out.len(), 2);
        assert_eq!(clones.len(), 1);
        let clone = out.get(clones[0]).unwrap();
        assert_ne!(clone.id, source.id);
        assert_ne!(clone.seed, source.seed);
        assert_eq!(clone.x, 25.0);
        assert_eq!(clone.y, 25.0);
        assert_eq!(clone.group_id, None);
    }

    #[test]
    fn test_duplicate_grouped_selection_shares_fresh_group() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 10.0, 10.0))
            .add(rect_at(20.0, 0.0, 10.0, 10.0));
        let ids: Vec<ElementId> = doc.elements().iter().map(|el| el.id).collect();
        let grouped = doc.group(&ids);
        let old_group = grouped.elements()[0].group_id.unwrap();

        let (out, clones) = grouped.duplicate_elements(&ids);
        let g0 = out.get(clones[0]).unwrap().group_id.unwrap();
        let g1 = out.get(clones[1]).unwrap().group_id.unwrap();
        assert_eq!(g0, g1);
        assert_ne!(g0, old_group);
    }

    #[test]
    fn test_duplicate_moves_freehand_points() {
        let mut el = Element::new(ElementKind::Freehand, Point::new(0.0, 0.0), &style());
        el.push_point(Point::new(10.0, 10.0));
        let doc = Document::new().add(el);
        let id = doc.elements()[0].id;
        let (out, clones) = doc.duplicate_elements(&[id]);
        let clone = out.get(clones[0]).unwrap();
        assert_eq!(clone.points[0], Point::new(20.0, 20.0));
        assert_eq!(clone.points[1], Point::new(30.0, 30.0));
    }

    #[test]
    fn test_reorder_to_front_preserves_relative_order() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 1.0, 1.0))
            .add(rect_at(1.0, 0.0, 1.0, 1.0))
            .add(rect_at(2.0, 0.0, 1.0, 1.0));
        let a = doc.elements()[0].id;
        let b = doc.elements()[1].id;
        let c = doc.elements()[2].id;

        let fronted = doc.reorder(&[a, b], ZOrder::Front);
        let order: Vec<ElementId> = fronted.elements().iter().map(|el| el.id).collect();
        assert_eq!(order, vec![c, a, b]);

        let backed = doc.reorder(&[c], ZOrder::Back);
        let order: Vec<ElementId> = backed.elements().iter().map(|el| el.id).collect();
        assert_eq!(order, vec![c, a, b]);
    }

    #[test]
    fn test_group_requires_two_elements() {
        let doc = Document::new().add(rect_at(0.0, 0.0, 10.0, 10.0));
        let id = doc.elements()[0].id;
        let out = doc.group(&[id]);
        assert_eq!(out.elements()[0].group_id, None);
    }

    #[test]
    fn test_group_overwrites_prior_membership_and_ungroup_clears() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 1.0, 1.0))
            .add(rect_at(1.0, 0.0, 1.0, 1.0))
            .add(rect_at(2.0, 0.0, 1.0, 1.0));
        let ids: Vec<ElementId> = doc.elements().iter().map(|el| el.id).collect();

        let first = doc.group(&ids[..2]);
        let old = first.elements()[0].group_id.unwrap();
        let second = first.group(&ids[1..]);
        assert_eq!(second.elements()[0].group_id, Some(old));
        assert_ne!(second.elements()[1].group_id, Some(old));
        assert_eq!(
            second.elements()[1].group_id,
            second.elements()[2].group_id
        );

        let cleared = second.ungroup(&ids);
        assert!(cleared.elements().iter().all(|el| el.group_id.is_none()));
    }

    #[test]
    fn test_ungroup_reaches_unlisted_group_members() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 1.0, 1.0))
            .add(rect_at(1.0, 0.0, 1.0, 1.0))
            .add(rect_at(2.0, 0.0, 1.0, 1.0))
            .add(rect_at(3.0, 0.0, 1.0, 1.0));
        let ids: Vec<ElementId> = doc.elements().iter().map(|el| el.id).collect();
        let grouped = doc.group(&ids[..2]).group(&ids[2..]);

        // Naming one member dissolves its whole group; the other group
        // stays intact.
        let out = grouped.ungroup(&ids[..1]);
        assert!(out.elements()[0].group_id.is_none());
        assert!(out.elements()[1].group_id.is_none());
        assert!(out.elements()[2].group_id.is_some());
        assert_eq!(out.elements()[2].group_id, out.elements()[3].group_id);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 100.0, 100.0))
            .add(rect_at(25.0, 25.0, 100.0, 100.0));
        let top = doc.elements()[1].id;
        let hit = doc.hit_test(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit.id, top);
        assert!(doc.hit_test(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_expand_group() {
        let doc = Document::new()
            .add(rect_at(0.0, 0.0, 1.0, 1.0))
            .add(rect_at(1.0, 0.0, 1.0, 1.0))
            .add(rect_at(2.0, 0.0, 1.0, 1.0));
        let ids: Vec<ElementId> = doc.elements().iter().map(|el| el.id).collect();
        let grouped = doc.group(&ids[..2]);

        assert_eq!(grouped.expand_group(ids[0]), vec![ids[0], ids[1]]);
        assert_eq!(grouped.expand_group(ids[2]), vec![ids[2]]);
        assert!(grouped.expand_group(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_document_serde_round_trip_is_plain_array() {
        let doc = Document::new().add(rect_at(0.0, 0.0, 10.0, 10.0));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.starts_with('['));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
