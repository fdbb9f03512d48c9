use crate::model::PlanView;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Bucket key: the level and phase a plan view shows
///
/// Either part may be absent. A view without a phase is still indexed, under
/// `(level, None)`, so level-only pairing keeps working when phase data is
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ViewKey {
    /// Level name
    pub level: Option<String>,
    /// Phase name
    pub phase: Option<String>,
}

impl ViewKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(level: Option<&str>, phase: Option<&str>) -> Self {
        Self {
            level: level.map(str::to_string),
            phase: phase.map(str::to_string),
        }
    }

    /// Key of a view
    #[inline]
    #[must_use]
    pub fn of(view: &PlanView) -> Self {
        Self::new(view.level(), view.phase_name())
    }

    /// Level name
    #[inline]
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    /// Phase name
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            self.level().unwrap_or("<no level>"),
            self.phase().unwrap_or("<no phase>")
        )
    }
}

/// Host plan views indexed by `(level, phase)`
///
/// Built once per run. Both the view list and the bucket list keep host
/// enumeration order (buckets in order of first appearance), so everything
/// downstream is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ViewIndex {
    views: Vec<PlanView>,
    buckets: IndexMap<ViewKey, Vec<usize>>,
    bucket_of: Vec<usize>,
}

impl ViewIndex {
    /// Index `views`, keeping their order
    #[must_use]
    pub fn build(views: Vec<PlanView>) -> Self {
        let mut buckets: IndexMap<ViewKey, Vec<usize>> = IndexMap::new();
        let mut bucket_of = Vec::with_capacity(views.len());

        for (position, view) in views.iter().enumerate() {
            let entry = buckets.entry(ViewKey::of(view));
            bucket_of.push(entry.index());
            entry.or_default().push(position);
        }

        Self {
            views,
            buckets,
            bucket_of,
        }
    }

    /// All views in host enumeration order
    #[inline]
    #[must_use]
    pub fn views(&self) -> &[PlanView] {
        &self.views
    }

    /// Number of views
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check index has no views
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Number of distinct `(level, phase)` buckets
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket keys in order of first appearance
    pub fn keys(&self) -> impl Iterator<Item = &ViewKey> + '_ {
        self.buckets.keys()
    }

    /// Bucket position of the view at `position`
    ///
    /// # Panics
    /// If `position` is out of range.
    #[inline]
    #[must_use]
    pub fn bucket_of(&self, position: usize) -> usize {
        self.bucket_of[position]
    }

    /// Views sharing `level` and `phase`, in enumeration order
    #[must_use]
    pub fn views_for(&self, level: Option<&str>, phase: Option<&str>) -> Vec<&PlanView> {
        self.buckets
            .get(&ViewKey::new(level, phase))
            .map(|positions| positions.iter().map(|&p| &self.views[p]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ViewId;
    use crate::model::PlanView;

    fn sample() -> ViewIndex {
        ViewIndex::build(vec![
            PlanView::floor(10, "L1 New").on_level("Level 1").in_phase("New"),
            PlanView::ceiling(11, "L1 RCP").on_level("Level 1").in_phase("New"),
            PlanView::floor(12, "L1 Existing").on_level("Level 1").in_phase("Existing"),
            PlanView::floor(13, "L2 unphased").on_level("Level 2"),
            PlanView::floor(14, "Floating").in_phase("New"),
        ])
    }

    #[test]
    fn buckets_by_level_and_phase() {
        let index = sample();
        assert_eq!(index.len(), 5);
        assert_eq!(index.bucket_count(), 4);

        let ids: Vec<ViewId> = index
            .views_for(Some("Level 1"), Some("New"))
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![ViewId::new(10), ViewId::new(11)]);
    }

    #[test]
    fn missing_phase_indexed_under_level_only() {
        let index = sample();
        let views = index.views_for(Some("Level 2"), None);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, ViewId::new(13));
        assert!(index.views_for(Some("Level 2"), Some("New")).is_empty());
    }

    #[test]
    fn preserves_enumeration_order() {
        let index = sample();
        let ids: Vec<i64> = index.views().iter().map(|v| v.id.value()).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);

        let keys: Vec<String> = index.keys().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            vec![
                "Level 1 / New",
                "Level 1 / Existing",
                "Level 2 / <no phase>",
                "<no level> / New"
            ]
        );
    }

    #[test]
    fn bucket_of_maps_views_to_buckets() {
        let index = sample();
        assert_eq!(index.bucket_of(0), 0);
        assert_eq!(index.bucket_of(1), 0);
        assert_eq!(index.bucket_of(2), 1);
        assert_eq!(index.bucket_of(4), 3);
    }

    #[test]
    fn empty_phase_string_reads_as_absent() {
        let index = ViewIndex::build(vec![PlanView::floor(1, "x").on_level("L").in_phase("")]);
        assert_eq!(index.views_for(Some("L"), None).len(), 1);
    }
}
