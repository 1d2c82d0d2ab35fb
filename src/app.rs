//! The controller: turns user intents into repository changes and keeps the
//! map and the list in step with the repository.
//!
//! Every intent that changes something ends in [`App::refresh`], which
//! rebuilds markers and list from scratch. The order is always: repository,
//! then markers, then list.
//!
//! Only storage failures escape as errors. Bad input, unknown ids, failed
//! lookups and empty collections are reported through the [`ViewService`]
//! and leave the state as it was.

use jiff::Timestamp;

use crate::lookup::Lookup;
use crate::model::{ActivityType, Coords, Meta, Workout, WorkoutId, validate};
use crate::order::{SortKey, VIEW_KEY, ViewState, visible_order};
use crate::repository::{EditError, Repository};
use crate::services::{Bounds, MapService, ViewService};
use crate::storage::{BlobStore, Result};

/// Map behaviour that comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSettings {
    /// Zoom used when panning to a selected workout.
    pub zoom: u8,
    /// Padding in pixels, on both axes, when fitting all workouts.
    pub fit_padding: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: 13,
            fit_padding: 100,
        }
    }
}

/// What the "new workout" form submits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub activity: ActivityType,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Cadence (running) or elevation gain (cycling).
    pub value: f64,
}

/// What the edit form submits. The type can't change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditForm {
    pub distance_km: f64,
    pub duration_min: f64,
    pub value: f64,
}

pub struct App<S, M: MapService, V, L> {
    repo: Repository<S>,
    map: M,
    view: V,
    lookup: L,
    settings: MapSettings,
    view_state: ViewState,
    markers: Vec<(WorkoutId, M::Marker)>,
    pending: Option<Coords>,
}

impl<S, M, V, L> App<S, M, V, L>
where
    S: BlobStore,
    M: MapService,
    V: ViewService,
    L: Lookup,
{
    /// Loads workouts and view state from the store and renders them.
    pub fn start(store: S, map: M, view: V, lookup: L, settings: MapSettings) -> Result<Self> {
        let view_state = match store.get(VIEW_KEY)? {
            Some(blob) => ViewState::from_blob(&blob),
            None => ViewState::default(),
        };
        let repo = Repository::load(store)?;

        let mut app = Self {
            repo,
            map,
            view,
            lookup,
            settings,
            view_state,
            markers: Vec::new(),
            pending: None,
        };
        app.refresh();
        Ok(app)
    }

    /// Remembers where the next workout goes.
    pub fn on_map_clicked(&mut self, coords: Coords) {
        tracing::debug!(%coords, "location picked");
        self.pending = Some(coords);
    }

    /// Logs a new workout at the picked location.
    ///
    /// Returns the new id, or `None` if nothing was logged (no location was
    /// picked or the input was invalid).
    pub fn on_create_submitted(&mut self, form: &WorkoutForm) -> Result<Option<WorkoutId>> {
        let Some(coords) = self.pending else {
            self.view.show_missing_location();
            return Ok(None);
        };

        if let Err(e) = validate(form.activity, form.distance_km, form.duration_min, form.value) {
            tracing::debug!(error = %e, "rejected workout");
            self.view.show_validation_warning(&e);
            return Ok(None);
        }

        let meta = self.lookup_meta(coords);
        let (d, t, now) = (form.distance_km, form.duration_min, Timestamp::now());
        let built = match form.activity {
            ActivityType::Running => Workout::running(coords, d, t, now, meta, form.value),
            ActivityType::Cycling => Workout::cycling(coords, d, t, now, meta, form.value),
        };
        let workout = match built {
            Ok(w) => w,
            Err(e) => {
                self.view.show_validation_warning(&e);
                return Ok(None);
            }
        };

        self.pending = None;
        let id = workout.id().clone();
        let added = self.repo.add(workout);
        self.refresh();
        added.map(|()| Some(id))
    }

    /// Replaces a workout's metrics. Returns whether anything changed.
    pub fn on_edit_submitted(&mut self, id: &WorkoutId, form: &EditForm) -> Result<bool> {
        let edited = self
            .repo
            .edit(id, form.distance_km, form.duration_min, form.value)
            .map(|_| ());

        let outcome = match edited {
            Ok(()) => Ok(true),
            Err(EditError::NotFound(id)) => {
                self.view.show_not_found(&id);
                return Ok(false);
            }
            Err(EditError::Invalid(e)) => {
                self.view.show_validation_warning(&e);
                return Ok(false);
            }
            Err(EditError::Storage(e)) => Err(e),
        };
        self.refresh();
        outcome
    }

    /// Deletes a workout and its marker. Returns whether it existed.
    pub fn on_delete_confirmed(&mut self, id: &WorkoutId) -> Result<bool> {
        let removed = match self.repo.remove_by_id(id) {
            Ok(None) => {
                self.view.show_not_found(id);
                return Ok(false);
            }
            Ok(Some(_)) => Ok(true),
            Err(e) => Err(e),
        };
        self.release_marker(id);
        self.refresh();
        removed
    }

    /// Centres the map on a workout and counts the selection.
    pub fn on_record_selected(&mut self, id: &WorkoutId) -> Result<bool> {
        let Some(coords) = self.repo.find_by_id(id).map(Workout::coords) else {
            self.view.show_not_found(id);
            return Ok(false);
        };

        let touched = self.repo.touch(id).map(|_| ());
        self.map.pan_to(coords, self.settings.zoom);
        self.refresh();
        touched.map(|()| true)
    }

    /// Fits the map to every workout, filtered out or not.
    /// Returns `false` (after warning) when there are none.
    pub fn on_show_all(&mut self) -> bool {
        let Some(bounds) = Bounds::enclosing(self.repo.workouts().iter().map(Workout::coords))
        else {
            self.view.show_empty_warning();
            return false;
        };

        let padding = self.settings.fit_padding;
        self.map.fit_bounds(bounds, (padding, padding));
        true
    }

    /// Selects a sort key (or clears sorting with `None`) and persists it.
    pub fn on_sort_requested(&mut self, key: Option<SortKey>) -> Result<bool> {
        if self.repo.is_empty() {
            self.view.show_empty_warning();
            return Ok(false);
        }
        match key {
            Some(key) => self.view_state.select_sort(key),
            None => self.view_state.clear_sort(),
        }
        self.save_view_state().map(|()| true)
    }

    /// Toggles a type filter (or shows everything with `None`) and persists it.
    pub fn on_filter_requested(&mut self, activity: Option<ActivityType>) -> Result<bool> {
        if self.repo.is_empty() {
            self.view.show_empty_warning();
            return Ok(false);
        }
        match activity {
            Some(activity) => self.view_state.toggle_filter(activity),
            None => self.view_state.clear_filter(),
        }
        self.save_view_state().map(|()| true)
    }

    /// Forgets every workout, marker, pending location and view setting.
    pub fn on_reset_all(&mut self) -> Result<()> {
        let cleared = self.repo.clear();
        self.view_state = ViewState::default();
        let view_cleared = self.repo.store().remove(VIEW_KEY);
        self.pending = None;
        self.refresh();
        cleared.and(view_cleared)
    }

    /// Rebuilds markers and list from the repository and the view state.
    pub fn refresh(&mut self) {
        self.release_all_markers();

        let visible = visible_order(self.repo.workouts(), &self.view_state);
        for workout in &visible {
            let marker = self
                .map
                .place_marker(workout.coords(), &workout.popup_text());
            self.markers.push((workout.id().clone(), marker));
        }
        self.view.render_list(&visible);
        self.view.set_actions_enabled(!self.repo.is_empty());

        tracing::trace!(
            total = self.repo.len(),
            visible = self.markers.len(),
            "rendered"
        );
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Ids of the workouts that currently have a marker.
    #[cfg(test)]
    pub fn marked(&self) -> impl Iterator<Item = &WorkoutId> {
        self.markers.iter().map(|(id, _)| id)
    }

    /// Runs both lookups, independently. A failure is shown and leaves its
    /// fields empty.
    fn lookup_meta(&mut self, coords: Coords) -> Meta {
        let place = match self.lookup.resolve_location(coords) {
            Ok(place) => Some(place),
            Err(e) => {
                tracing::warn!(error = %e, "location lookup failed");
                self.view.show_lookup_failure(&e);
                None
            }
        };
        let weather = match self.lookup.resolve_weather(coords) {
            Ok(weather) => Some(weather),
            Err(e) => {
                tracing::warn!(error = %e, "weather lookup failed");
                self.view.show_lookup_failure(&e);
                None
            }
        };
        Meta::from_lookups(place.as_ref(), weather.as_ref())
    }

    fn save_view_state(&mut self) -> Result<()> {
        tracing::info!(filter = ?self.view_state.filter, sort = ?self.view_state.sort, "view changed");
        let saved = serde_json::to_string(&self.view_state)
            .map_err(Into::into)
            .and_then(|blob| self.repo.store().set(VIEW_KEY, &blob));
        self.refresh();
        saved
    }

    fn release_marker(&mut self, id: &WorkoutId) {
        if let Some(index) = self.markers.iter().position(|(marked, _)| marked == id) {
            let (_, marker) = self.markers.remove(index);
            self.map.remove_marker(marker);
        }
    }

    fn release_all_markers(&mut self) {
        for (_, marker) in self.markers.drain(..) {
            self.map.remove_marker(marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use tempfile::TempDir;

    use crate::lookup::LookupError;
    use crate::model::{Place, ValidationError, Weather};
    use crate::order::{Direction, Filter, Sort};
    use crate::repository::WORKOUTS_KEY;
    use crate::storage::{MemoryStore, Storage, StorageError};

    #[derive(Default)]
    struct RecordingMap {
        next: u32,
        live: Vec<(u32, Coords, String)>,
        removed: Vec<u32>,
        pans: Vec<(Coords, u8)>,
        fits: Vec<(Bounds, (u32, u32))>,
    }

    impl MapService for RecordingMap {
        type Marker = u32;

        fn place_marker(&mut self, coords: Coords, popup: &str) -> u32 {
            self.next += 1;
            self.live.push((self.next, coords, popup.to_string()));
            self.next
        }

        fn remove_marker(&mut self, marker: u32) {
            self.live.retain(|(m, _, _)| *m != marker);
            self.removed.push(marker);
        }

        fn pan_to(&mut self, coords: Coords, zoom: u8) {
            self.pans.push((coords, zoom));
        }

        fn fit_bounds(&mut self, bounds: Bounds, padding: (u32, u32)) {
            self.fits.push((bounds, padding));
        }
    }

    #[derive(Default)]
    struct RecordingView {
        lists: Vec<Vec<WorkoutId>>,
        actions_enabled: Option<bool>,
        warnings: Vec<String>,
    }

    impl RecordingView {
        fn last_list(&self) -> &[WorkoutId] {
            self.lists.last().map(Vec::as_slice).unwrap_or_default()
        }
    }

    impl ViewService for RecordingView {
        fn render_list(&mut self, workouts: &[&Workout]) {
            self.lists
                .push(workouts.iter().map(|w| w.id().clone()).collect());
        }

        fn set_actions_enabled(&mut self, enabled: bool) {
            self.actions_enabled = Some(enabled);
        }

        fn show_validation_warning(&mut self, error: &ValidationError) {
            self.warnings.push(format!("invalid: {error}"));
        }

        fn show_empty_warning(&mut self) {
            self.warnings.push("empty".to_string());
        }

        fn show_lookup_failure(&mut self, error: &LookupError) {
            self.warnings.push(format!("lookup: {error}"));
        }

        fn show_missing_location(&mut self) {
            self.warnings.push("no location".to_string());
        }

        fn show_not_found(&mut self, id: &WorkoutId) {
            self.warnings.push(format!("not found: {id}"));
        }
    }

    #[derive(Default)]
    struct StubLookup {
        place: Option<Place>,
        weather: Option<Weather>,
        calls: Cell<u32>,
    }

    impl StubLookup {
        fn lisbon() -> Self {
            Self {
                place: Some(Place {
                    city: Some("Lisbon".to_string()),
                    country: Some("Portugal".to_string()),
                }),
                weather: Some(Weather {
                    description: "Clear Sky".to_string(),
                    icon_id: "01d".to_string(),
                    temp_c: 18.4,
                }),
                calls: Cell::new(0),
            }
        }
    }

    impl Lookup for StubLookup {
        fn resolve_location(&self, _: Coords) -> core::result::Result<Place, LookupError> {
            self.calls.set(self.calls.get() + 1);
            self.place.clone().ok_or(LookupError::Status {
                service: "geocode",
                status: 403,
            })
        }

        fn resolve_weather(&self, _: Coords) -> core::result::Result<Weather, LookupError> {
            self.calls.set(self.calls.get() + 1);
            self.weather
                .clone()
                .ok_or(LookupError::NotConfigured { service: "weather" })
        }
    }

    type TestApp = App<MemoryStore, RecordingMap, RecordingView, StubLookup>;

    fn app_with(store: MemoryStore, lookup: StubLookup) -> TestApp {
        App::start(
            store,
            RecordingMap::default(),
            RecordingView::default(),
            lookup,
            MapSettings::default(),
        )
        .unwrap()
    }

    fn app() -> TestApp {
        app_with(MemoryStore::default(), StubLookup::lisbon())
    }

    fn running(distance: f64, duration: f64, cadence: f64) -> WorkoutForm {
        WorkoutForm {
            activity: ActivityType::Running,
            distance_km: distance,
            duration_min: duration,
            value: cadence,
        }
    }

    fn cycling(distance: f64, duration: f64, elevation: f64) -> WorkoutForm {
        WorkoutForm {
            activity: ActivityType::Cycling,
            distance_km: distance,
            duration_min: duration,
            value: elevation,
        }
    }

    fn log(app: &mut TestApp, at: Coords, form: &WorkoutForm) -> WorkoutId {
        app.on_map_clicked(at);
        app.on_create_submitted(form).unwrap().unwrap()
    }

    fn marked(app: &TestApp) -> Vec<WorkoutId> {
        app.marked().cloned().collect()
    }

    #[test]
    fn start_on_empty_store_disables_actions() {
        let app = app();
        assert!(app.repository().is_empty());
        assert_eq!(app.view().actions_enabled, Some(false));
        assert_eq!(app.view().lists, vec![Vec::<WorkoutId>::new()]);
        assert!(app.map().live.is_empty());
    }

    #[test]
    fn create_without_location_warns() {
        let mut app = app();
        let out = app.on_create_submitted(&running(5.0, 25.0, 150.0)).unwrap();

        assert_eq!(out, None);
        assert_eq!(app.view().warnings, vec!["no location"]);
        assert!(app.repository().is_empty());
    }

    #[test]
    fn create_logs_workout_with_metadata() {
        let mut app = app();
        let at = Coords::new(38.72, -9.14);
        let id = log(&mut app, at, &running(5.0, 25.0, 150.0));

        let w = app.repository().find_by_id(&id).unwrap();
        assert_eq!(w.pace(), Some(5.0));
        assert_eq!(w.coords(), at);
        assert_eq!(w.meta().location.as_deref(), Some("Lisbon, Portugal"));
        assert_eq!(w.meta().weather.as_deref(), Some("Clear Sky"));
        assert_eq!(w.meta().temp_c, Some(18.4));

        assert_eq!(app.pending, None);
        assert_eq!(app.view().actions_enabled, Some(true));
        assert_eq!(app.view().last_list(), &[id.clone()]);
        assert_eq!(app.map().live.len(), 1);
        assert_eq!(app.map().live[0].1, at);
        assert!(app.map().live[0].2.starts_with("🏃‍♂️ Running on"));
    }

    #[test]
    fn invalid_create_changes_nothing_and_skips_lookups() {
        let mut app = app();
        app.on_map_clicked(Coords::new(1.0, 2.0));

        let out = app.on_create_submitted(&running(5.0, 25.0, 0.0)).unwrap();

        assert_eq!(out, None);
        assert!(app.repository().is_empty());
        assert_eq!(app.repository().store().raw(WORKOUTS_KEY), None);
        assert_eq!(app.view().warnings.len(), 1);
        assert!(app.view().warnings[0].starts_with("invalid"));
        assert_eq!(app.lookup.calls.get(), 0);
        assert_eq!(app.pending, Some(Coords::new(1.0, 2.0)));
    }

    #[test]
    fn failed_lookups_degrade_metadata() {
        let mut app = app_with(MemoryStore::default(), StubLookup::default());
        let id = log(&mut app, Coords::new(0.0, 0.0), &cycling(20.0, 60.0, 100.0));

        let w = app.repository().find_by_id(&id).unwrap();
        assert!(w.meta().is_empty());
        assert_eq!(app.lookup.calls.get(), 2);
        assert_eq!(app.view().warnings.len(), 2);
        assert!(app.view().warnings.iter().all(|w| w.starts_with("lookup")));
    }

    #[test]
    fn one_failed_lookup_keeps_the_other() {
        let lookup = StubLookup {
            weather: None,
            ..StubLookup::lisbon()
        };
        let mut app = app_with(MemoryStore::default(), lookup);
        let id = log(&mut app, Coords::new(0.0, 0.0), &running(5.0, 25.0, 150.0));

        let meta = app.repository().find_by_id(&id).unwrap().meta().clone();
        assert_eq!(meta.location.as_deref(), Some("Lisbon, Portugal"));
        assert_eq!(meta.weather, None);
        assert_eq!(meta.temp_c, None);
    }

    #[test]
    fn start_restores_markers_from_storage() {
        let mut first = app();
        let a = log(&mut first, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        let b = log(&mut first, Coords::new(2.0, 2.0), &cycling(20.0, 60.0, 0.0));
        let blob = first.repository().store().raw(WORKOUTS_KEY).unwrap();

        let second = app_with(
            MemoryStore::with_blob(WORKOUTS_KEY, &blob),
            StubLookup::lisbon(),
        );
        assert_eq!(marked(&second), vec![a.clone(), b.clone()]);
        assert_eq!(second.map().live.len(), 2);
        assert_eq!(second.view().last_list(), &[a, b]);
        assert_eq!(second.view().actions_enabled, Some(true));
    }

    #[test]
    fn edit_updates_and_rerenders() {
        let mut app = app();
        let id = log(&mut app, Coords::new(0.0, 0.0), &running(5.0, 25.0, 150.0));
        let renders = app.view().lists.len();

        let form = EditForm {
            distance_km: 10.0,
            duration_min: 40.0,
            value: 170.0,
        };
        assert!(app.on_edit_submitted(&id, &form).unwrap());

        let w = app.repository().find_by_id(&id).unwrap();
        assert_eq!(w.pace(), Some(4.0));
        assert_eq!(app.view().lists.len(), renders + 1);
    }

    #[test]
    fn invalid_edit_warns_and_keeps_record() {
        let mut app = app();
        let id = log(&mut app, Coords::new(0.0, 0.0), &running(5.0, 25.0, 150.0));
        let before = app.repository().find_by_id(&id).unwrap().clone();

        let form = EditForm {
            distance_km: f64::NAN,
            duration_min: 40.0,
            value: 170.0,
        };
        assert!(!app.on_edit_submitted(&id, &form).unwrap());
        assert_eq!(app.repository().find_by_id(&id), Some(&before));
        assert!(app.view().warnings[0].starts_with("invalid"));
    }

    #[test]
    fn edit_unknown_id_is_a_no_op() {
        let mut app = app();
        let form = EditForm {
            distance_km: 1.0,
            duration_min: 1.0,
            value: 1.0,
        };
        assert!(!app.on_edit_submitted(&WorkoutId::from("ghost"), &form).unwrap());
        assert_eq!(app.view().warnings, vec!["not found: ghost"]);
    }

    #[test]
    fn delete_removes_record_and_its_marker() {
        let mut app = app();
        let a = log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        let b = log(&mut app, Coords::new(2.0, 2.0), &running(6.0, 30.0, 160.0));
        let c = log(&mut app, Coords::new(3.0, 3.0), &cycling(20.0, 60.0, 0.0));

        assert!(app.on_delete_confirmed(&b).unwrap());

        assert!(app.repository().find_by_id(&b).is_none());
        assert_eq!(app.repository().len(), 2);
        assert_eq!(marked(&app), vec![a.clone(), c.clone()]);
        assert_eq!(app.map().live.len(), 2);
        assert!(
            app.map()
                .live
                .iter()
                .all(|(_, coords, _)| *coords != Coords::new(2.0, 2.0))
        );
        assert_eq!(app.view().last_list(), &[a, c]);
    }

    #[test]
    fn delete_unknown_id_is_a_no_op() {
        let mut app = app();
        log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        let renders = app.view().lists.len();

        assert!(!app.on_delete_confirmed(&WorkoutId::from("ghost")).unwrap());
        assert_eq!(app.repository().len(), 1);
        assert_eq!(app.view().lists.len(), renders);
    }

    #[test]
    fn deleting_last_record_disables_actions() {
        let mut app = app();
        let id = log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        app.on_delete_confirmed(&id).unwrap();

        assert_eq!(app.view().actions_enabled, Some(false));
        assert!(app.map().live.is_empty());
    }

    #[test]
    fn select_pans_and_counts() {
        let mut app = app();
        let at = Coords::new(38.72, -9.14);
        let id = log(&mut app, at, &running(5.0, 25.0, 150.0));

        assert!(app.on_record_selected(&id).unwrap());
        assert!(app.on_record_selected(&id).unwrap());

        assert_eq!(app.map().pans, vec![(at, 13), (at, 13)]);
        assert_eq!(
            app.repository().find_by_id(&id).unwrap().interaction_count(),
            2
        );
    }

    #[test]
    fn select_unknown_id_does_not_pan() {
        let mut app = app();
        assert!(!app.on_record_selected(&WorkoutId::from("ghost")).unwrap());
        assert!(app.map().pans.is_empty());
    }

    #[test]
    fn show_all_fits_every_record() {
        let mut app = app();
        log(&mut app, Coords::new(38.7, -9.1), &running(5.0, 25.0, 150.0));
        log(&mut app, Coords::new(51.5, -0.1), &cycling(20.0, 60.0, 0.0));
        app.on_filter_requested(Some(ActivityType::Running)).unwrap();

        assert!(app.on_show_all());

        let (bounds, padding) = app.map().fits[0];
        assert_eq!(bounds.north_west, Coords::new(51.5, -9.1));
        assert_eq!(bounds.south_east, Coords::new(38.7, -0.1));
        assert_eq!(padding, (100, 100));
    }

    #[test]
    fn show_all_on_empty_collection_only_warns() {
        let mut app = app();
        assert!(!app.on_show_all());
        assert!(app.map().fits.is_empty());
        assert_eq!(app.view().warnings, vec!["empty"]);
    }

    #[test]
    fn sort_and_filter_on_empty_collection_only_warn() {
        let mut app = app();
        assert!(!app.on_sort_requested(Some(SortKey::Date)).unwrap());
        assert!(!app.on_filter_requested(Some(ActivityType::Running)).unwrap());

        assert_eq!(app.view_state(), ViewState::default());
        assert_eq!(app.view().warnings, vec!["empty", "empty"]);
    }

    #[test]
    fn view_state_is_persisted_and_restored() {
        let mut app = app();
        let run = log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        log(&mut app, Coords::new(2.0, 2.0), &cycling(20.0, 60.0, 0.0));
        app.on_filter_requested(Some(ActivityType::Running)).unwrap();
        app.on_sort_requested(Some(SortKey::Distance)).unwrap();

        let store = MemoryStore::with_blob(
            WORKOUTS_KEY,
            &app.repository().store().raw(WORKOUTS_KEY).unwrap(),
        );
        store
            .set(VIEW_KEY, &app.repository().store().raw(VIEW_KEY).unwrap())
            .unwrap();

        let restored = app_with(store, StubLookup::lisbon());
        assert_eq!(restored.view_state(), app.view_state());
        assert_eq!(marked(&restored), vec![run.clone()]);
        assert_eq!(restored.view().last_list(), &[run]);
    }

    #[test]
    fn filter_hides_new_records_of_other_type() {
        let mut app = app();
        let run = log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        app.on_filter_requested(Some(ActivityType::Running)).unwrap();

        let ride = log(&mut app, Coords::new(2.0, 2.0), &cycling(20.0, 60.0, 0.0));

        assert!(app.repository().find_by_id(&ride).is_some());
        assert_eq!(marked(&app), vec![run.clone()]);
        assert_eq!(app.view().last_list(), &[run]);
    }

    #[test]
    fn end_to_end_scenario() {
        let mut app = app();

        let run = log(&mut app, Coords::new(38.72, -9.14), &running(5.0, 25.0, 150.0));
        let ride = log(&mut app, Coords::new(38.75, -9.2), &cycling(20.0, 60.0, -10.0));
        assert_eq!(
            app.repository().find_by_id(&run).unwrap().pace(),
            Some(5.0)
        );
        assert_eq!(
            app.repository().find_by_id(&ride).unwrap().speed(),
            Some(20.0)
        );

        app.on_filter_requested(Some(ActivityType::Running)).unwrap();
        assert_eq!(app.view().last_list(), &[run.clone()]);
        assert_eq!(marked(&app), vec![run.clone()]);

        app.on_sort_requested(Some(SortKey::Date)).unwrap();
        assert_eq!(
            app.view_state(),
            ViewState {
                filter: Filter::only(ActivityType::Running),
                sort: Some(Sort {
                    key: SortKey::Date,
                    direction: Direction::Descending
                }),
            }
        );
        assert_eq!(app.view().last_list(), &[run.clone()]);
        assert_eq!(marked(&app), vec![run.clone()]);

        app.on_reset_all().unwrap();
        assert!(app.repository().is_empty());
        assert!(app.map().live.is_empty());
        assert_eq!(marked(&app), Vec::<WorkoutId>::new());
        assert_eq!(app.view_state(), ViewState::default());
        assert_eq!(app.view_state().filter, Filter::All);
        assert_eq!(app.repository().store().raw(WORKOUTS_KEY), None);
        assert_eq!(app.repository().store().raw(VIEW_KEY), None);
        assert_eq!(app.view().actions_enabled, Some(false));
        assert!(app.repository().find_by_id(&run).is_none());
        assert!(app.repository().find_by_id(&ride).is_none());
    }

    #[test]
    fn create_builds_the_kind_the_form_names() {
        let mut app = app();
        let run = log(&mut app, Coords::new(1.0, 1.0), &running(10.0, 50.0, 170.0));
        let ride = log(&mut app, Coords::new(2.0, 2.0), &cycling(30.0, 90.0, 0.0));

        let run = app.repository().find_by_id(&run).unwrap();
        assert_eq!(run.activity(), ActivityType::Running);
        assert_eq!(run.pace(), Some(5.0));
        assert_eq!(run.speed(), None);

        let ride = app.repository().find_by_id(&ride).unwrap();
        assert_eq!(ride.activity(), ActivityType::Cycling);
        assert_eq!(ride.speed(), Some(20.0));
        assert_eq!(ride.pace(), None);
        assert_eq!(ride.meta().location.as_deref(), Some("Lisbon, Portugal"));
    }

    #[test]
    fn every_marker_placed_is_released_exactly_once() {
        let mut app = app();
        let a = log(&mut app, Coords::new(1.0, 1.0), &running(5.0, 25.0, 150.0));
        log(&mut app, Coords::new(2.0, 2.0), &cycling(20.0, 60.0, 0.0));
        app.on_sort_requested(Some(SortKey::Distance)).unwrap();
        app.on_delete_confirmed(&a).unwrap();
        app.on_reset_all().unwrap();

        let map = app.map();
        let mut removed = map.removed.clone();
        removed.sort_unstable();
        removed.dedup();
        assert_eq!(removed.len(), map.removed.len());
        assert_eq!(u32::try_from(removed.len()).unwrap(), map.next);
    }

    #[test]
    fn storage_failure_propagates_after_rerender() {
        let mut app = app();
        app.repository().store().fail_writes(true);
        app.on_map_clicked(Coords::new(1.0, 1.0));

        let err = app
            .on_create_submitted(&running(5.0, 25.0, 150.0))
            .unwrap_err();

        assert!(matches!(err, StorageError::Io(_)));
        // The in-memory state and the render agree.
        assert_eq!(app.repository().len(), 1);
        assert_eq!(app.map().live.len(), 1);
        assert_eq!(app.view().last_list().len(), 1);
    }

    #[test]
    fn works_against_on_disk_storage() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut app = App::start(
                Storage::new(dir.path()).unwrap(),
                RecordingMap::default(),
                RecordingView::default(),
                StubLookup::lisbon(),
                MapSettings::default(),
            )
            .unwrap();
            app.on_map_clicked(Coords::new(1.0, 1.0));
            let id = app
                .on_create_submitted(&running(5.0, 25.0, 150.0))
                .unwrap()
                .unwrap();
            app.on_sort_requested(Some(SortKey::Duration)).unwrap();
            id
        };

        let app = App::start(
            Storage::new(dir.path()).unwrap(),
            RecordingMap::default(),
            RecordingView::default(),
            StubLookup::lisbon(),
            MapSettings::default(),
        )
        .unwrap();
        assert_eq!(app.view().last_list(), &[id]);
        assert_eq!(app.view_state().sort.unwrap().key, SortKey::Duration);
    }
}
