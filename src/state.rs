use std::path::Path;
use std::sync::Arc;

use crate::charts::ChartParams;
use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, quality_options, FilterSpec};
use crate::data::loader::LoaderCache;
use crate::data::model::{Capabilities, CellValue, RecordTable, AREA, NEIGHBORHOOD, QUALITY, YEAR};

// ---------------------------------------------------------------------------
// Tabs of the central panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Visuals,
    Drivers,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Visuals, Tab::Drivers, Tab::Data];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Visuals => "Visuals",
            Tab::Drivers => "Drivers",
            Tab::Data => "Data",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memoized dataset loads, keyed by path.
    pub loader: LoaderCache,

    /// Loaded dataset (None until a file loads successfully). Shared with
    /// the cache; treated as immutable once produced.
    pub dataset: Option<Arc<RecordTable>>,

    /// Which optional columns the dataset actually has.
    pub capabilities: Capabilities,

    /// Current sidebar filter selections.
    pub filters: FilterSpec,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Observed slider bounds for the two range filters.
    pub year_bounds: Option<(f64, f64)>,
    pub area_bounds: Option<(f64, f64)>,

    /// Main-area chart controls (top-N, top-K, heatmap toggle).
    pub params: ChartParams,

    /// Active central-panel tab.
    pub selected_tab: Tab,

    /// Colour per quality value for the scatter plot.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            loader: LoaderCache::default(),
            dataset: None,
            capabilities: Capabilities::default(),
            filters: FilterSpec::default(),
            visible_indices: Vec::new(),
            year_bounds: None,
            area_bounds: None,
            params: ChartParams::default(),
            selected_tab: Tab::default(),
            color_map: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a dataset through the cache; failures land in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match self.loader.load(path) {
            Ok(table) => self.set_dataset(table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Ingest a newly loaded dataset: probe capabilities, reset filters to
    /// their defaults, and compute the initial filtered view.
    pub fn set_dataset(&mut self, dataset: Arc<RecordTable>) {
        self.capabilities = Capabilities::probe(&dataset);
        self.filters = FilterSpec::initial(&dataset, self.capabilities);
        self.year_bounds = dataset.numeric_bounds(YEAR);
        self.area_bounds = dataset.numeric_bounds(AREA);
        self.visible_indices = filtered_indices(&dataset, &self.filters);
        self.color_map = dataset
            .unique_values
            .get(QUALITY)
            .map(|vals| ColorMap::new(vals));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
        }
    }

    /// Whether the current filters exclude every row of a loaded dataset.
    pub fn view_is_empty(&self) -> bool {
        self.dataset.is_some() && self.visible_indices.is_empty()
    }

    // ---- Quality multi-select mutators ----

    pub fn toggle_quality_value(&mut self, value: &CellValue) {
        let selected = self.filters.quality.get_or_insert_with(Default::default);
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    pub fn select_all_quality(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters.quality = Some(quality_options(ds));
        }
        self.refilter();
    }

    pub fn select_no_quality(&mut self) {
        if self.filters.quality.is_some() {
            self.filters.quality = Some(Default::default());
        }
        self.refilter();
    }

    // ---- Neighborhood multi-select mutators ----

    pub fn toggle_neighborhood(&mut self, label: &str) {
        if !self.filters.neighborhoods.remove(label) {
            self.filters.neighborhoods.insert(label.to_string());
        }
        self.refilter();
    }

    pub fn clear_neighborhoods(&mut self) {
        self.filters.neighborhoods.clear();
        self.refilter();
    }

    /// Sorted neighborhood labels offered by the multi-select.
    pub fn neighborhood_options(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(NEIGHBORHOOD))
            .map(|vals| vals.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }
}
