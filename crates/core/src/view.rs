//! Favorites view session: memoized derivation plus optimistic updates.
//!
//! [`FavoritesView`] is the single owner of a rendered list. Its four inputs
//! (raw list, filters, sort, view mode) each carry a revision counter and the
//! derived list is only recomputed when one of them moved. Optimistic edits
//! patch the rendered list in place so an edited card keeps its position
//! until the server-confirmed source is reloaded.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::filter::FilterSet;
use crate::pipeline::{derive_visible, ViewMode};
use crate::restaurant::{Restaurant, RestaurantPatch};
use crate::sort::SortSpec;
use crate::types::DbId;

/// Revisions of the four derivation inputs, in a fixed order.
type InputRevisions = [u64; 4];

const RAW: usize = 0;
const FILTERS: usize = 1;
const SORT: usize = 2;
const MODE: usize = 3;

#[derive(Debug, Default)]
pub struct FavoritesView {
    raw: Vec<Restaurant>,
    filters: FilterSet,
    sort: SortSpec,
    mode: ViewMode,

    revisions: InputRevisions,
    derived_at: Option<InputRevisions>,
    rendered: Vec<Restaurant>,
    derive_count: u64,

    /// Patches sent to the server and not yet answered, keyed by record id.
    in_flight: HashMap<DbId, RestaurantPatch>,
    pending_geocode: HashSet<DbId>,
    needs_refresh: bool,
}

impl FavoritesView {
    pub fn new(raw: Vec<Restaurant>) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }

    // -- inputs -------------------------------------------------------------

    /// Replace the authoritative source (after a fetch or refetch).
    pub fn replace_source(&mut self, raw: Vec<Restaurant>) {
        self.raw = raw;
        self.needs_refresh = false;
        self.bump(RAW);
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        if filters != self.filters {
            self.filters = filters;
            self.bump(FILTERS);
        }
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        if sort != self.sort {
            self.sort = sort;
            self.bump(SORT);
        }
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if mode != self.mode {
            self.mode = mode;
            self.bump(MODE);
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    fn bump(&mut self, input: usize) {
        self.revisions[input] += 1;
    }

    // -- output -------------------------------------------------------------

    /// The list to render, re-derived only if an input changed.
    pub fn visible(&mut self) -> &[Restaurant] {
        if self.derived_at != Some(self.revisions) {
            self.rendered = derive_visible(&self.raw, &self.filters, &self.sort, self.mode);
            self.derived_at = Some(self.revisions);
            self.derive_count += 1;
        }
        &self.rendered
    }

    /// How many times the pipeline actually ran.
    pub fn derive_count(&self) -> u64 {
        self.derive_count
    }

    // -- optimistic updates -------------------------------------------------

    /// Patch a rendered record in place without re-deriving.
    ///
    /// The source copy is patched too, without bumping its revision, so a
    /// later filter, sort or mode change keeps the edit until
    /// [`replace_source`](Self::replace_source) brings in server state.
    ///
    /// Returns `false` when the id is not in the rendered list; the patch is
    /// still tracked so the caller can send it.
    pub fn apply_optimistic(&mut self, id: DbId, patch: &RestaurantPatch) -> bool {
        // Make sure the rendered list reflects current inputs before patching it.
        self.visible();

        if patch.is_coordinate_only() {
            self.pending_geocode.remove(&id);
        }
        self.in_flight.insert(id, patch.clone());

        if let Some(record) = self.raw.iter_mut().find(|r| r.id == id) {
            record.apply_patch(patch);
        }

        match self.rendered.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// The server accepted the update. The source is now stale and must be
    /// re-fetched; [`replace_source`](Self::replace_source) reconciles.
    pub fn confirm(&mut self, id: DbId) {
        self.in_flight.remove(&id);
        self.needs_refresh = true;
    }

    /// The server rejected the update.
    ///
    /// The optimistic patch stays on the rendered record; the returned error
    /// carries the message to surface.
    pub fn reject(&mut self, id: DbId, message: impl Into<String>) -> CoreError {
        self.in_flight.remove(&id);
        CoreError::Validation(message.into())
    }

    pub fn is_in_flight(&self, id: DbId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    // -- geocode markers ----------------------------------------------------

    pub fn mark_geocode_pending(&mut self, id: DbId) {
        self.pending_geocode.insert(id);
    }

    pub fn is_geocode_pending(&self, id: DbId) -> bool {
        self.pending_geocode.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SidebarFilter;
    use crate::restaurant::fixtures::restaurant;
    use crate::restaurant::Coordinates;
    use crate::sort::{SortDirection, SortField};

    fn ids(items: &[Restaurant]) -> Vec<i64> {
        items.iter().map(|r| r.id).collect()
    }

    fn by_visits() -> SortSpec {
        SortSpec::new().with(SortField::VisitCount, SortDirection::Desc)
    }

    fn seeded() -> FavoritesView {
        let mut a = restaurant(1, "東京都", "港区");
        a.visit_count = 3;
        let mut b = restaurant(2, "東京都", "港区");
        b.visit_count = 2;
        let mut c = restaurant(3, "東京都", "港区");
        c.visit_count = 1;
        let mut view = FavoritesView::new(vec![a, b, c]);
        view.set_sort(by_visits());
        view
    }

    #[test]
    fn derives_once_until_an_input_changes() {
        let mut view = seeded();
        view.visible();
        view.visible();
        assert_eq!(view.derive_count(), 1);

        // Unrelated session state does not trigger a recompute.
        view.mark_geocode_pending(1);
        view.visible();
        assert_eq!(view.derive_count(), 1);

        // Setting an equal value is not a change either.
        view.set_sort(by_visits());
        view.visible();
        assert_eq!(view.derive_count(), 1);

        view.set_mode(ViewMode::Map);
        view.visible();
        assert_eq!(view.derive_count(), 2);
    }

    #[test]
    fn optimistic_patch_keeps_position() {
        let mut view = seeded();
        assert_eq!(ids(view.visible()), vec![1, 2, 3]);

        let patch = RestaurantPatch {
            visit_count: Some(10),
            ..Default::default()
        };
        assert!(view.apply_optimistic(3, &patch));

        // Would sort first, but stays put until the source is reloaded.
        let visible = view.visible();
        assert_eq!(ids(visible), vec![1, 2, 3]);
        assert_eq!(visible[2].visit_count, 10);
        assert!(view.is_in_flight(3));
    }

    #[test]
    fn confirm_then_reload_reconciles_membership() {
        let mut view = seeded();
        view.set_mode(ViewMode::Map);
        view.visible();

        let patch = RestaurantPatch {
            is_closed: Some(true),
            ..Default::default()
        };
        view.apply_optimistic(2, &patch);
        assert_eq!(ids(view.visible()), vec![1, 2, 3]);

        view.confirm(2);
        assert!(view.needs_refresh());

        let mut server = seeded().raw;
        server[1].is_closed = true;
        view.replace_source(server);
        assert!(!view.needs_refresh());
        assert_eq!(ids(view.visible()), vec![1, 3]);
    }

    #[test]
    fn rejection_does_not_roll_back() {
        let mut view = seeded();
        view.visible();
        let patch = RestaurantPatch {
            comment: Some("optimistic".into()),
            ..Default::default()
        };
        view.apply_optimistic(1, &patch);
        let err = view.reject(1, "update failed");
        assert!(err.to_string().contains("update failed"));
        assert!(!view.is_in_flight(1));
        assert_eq!(view.visible()[0].comment, "optimistic");
    }

    #[test]
    fn in_flight_patch_survives_filter_change() {
        let mut view = seeded();
        view.visible();
        view.apply_optimistic(1, &RestaurantPatch { visit_count: Some(7), ..Default::default() });

        view.set_filters(FilterSet {
            sidebar_filters: vec![SidebarFilter::City("港区".into())],
            genre_filters: Vec::new(),
        });
        let record = view.visible().iter().find(|r| r.id == 1).cloned().unwrap();
        assert_eq!(record.visit_count, 7);
        assert_eq!(view.derive_count(), 2);
        assert!(view.is_in_flight(1));
    }

    #[test]
    fn rejected_patch_survives_mode_change() {
        let mut view = seeded();
        view.visible();
        view.apply_optimistic(1, &RestaurantPatch { comment: Some("great".into()), ..Default::default() });
        view.reject(1, "update failed");

        view.set_mode(ViewMode::Map);
        let record = view.visible().iter().find(|r| r.id == 1).unwrap();
        assert_eq!(record.comment, "great");
    }

    #[test]
    fn reload_replaces_optimistic_state() {
        let mut view = seeded();
        view.visible();
        view.apply_optimistic(1, &RestaurantPatch { comment: Some("local".into()), ..Default::default() });
        view.confirm(1);

        view.replace_source(seeded().raw);
        let record = view.visible().iter().find(|r| r.id == 1).unwrap();
        assert_eq!(record.comment, "");
    }

    #[test]
    fn independent_mutations_reconcile_by_id() {
        let mut view = seeded();
        view.visible();
        view.apply_optimistic(1, &RestaurantPatch { visit_count: Some(7), ..Default::default() });
        view.apply_optimistic(2, &RestaurantPatch { visit_count: Some(8), ..Default::default() });
        view.confirm(2);
        assert!(view.is_in_flight(1));
        assert!(!view.is_in_flight(2));
    }

    #[test]
    fn coordinate_only_update_clears_geocode_marker() {
        let mut view = seeded();
        view.mark_geocode_pending(1);
        view.mark_geocode_pending(2);

        let coords = RestaurantPatch {
            coordinates: Some(Coordinates { latitude: 35.6, longitude: 139.7 }),
            ..Default::default()
        };
        view.apply_optimistic(1, &coords);
        assert!(!view.is_geocode_pending(1));

        let mixed = RestaurantPatch {
            comment: Some("x".into()),
            ..coords
        };
        view.apply_optimistic(2, &mixed);
        assert!(view.is_geocode_pending(2));
    }

    #[test]
    fn patch_for_filtered_out_record_reports_miss() {
        let mut view = seeded();
        view.set_filters(FilterSet {
            sidebar_filters: vec![SidebarFilter::Prefecture("大阪府".into())],
            genre_filters: Vec::new(),
        });
        assert!(!view.apply_optimistic(1, &RestaurantPatch::default()));
    }
}
