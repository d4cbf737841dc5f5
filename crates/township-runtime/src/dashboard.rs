//! Cascading filter selection shared by every view.
//!
//! [`DashboardState`] tracks which township is selected and which facet
//! values are ticked. Changing the township resets every facet to "all
//! options of the new township"; a reload keeps the ticks that still exist.

use std::collections::HashSet;

use township_core::models::Table;
use township_data::aggregator::{PlotAggregator, Summary};
use township_data::filter::{facet_options, filter, townships, Facet, FacetOptions, FilterCriteria, FilteredView};

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    townships: Vec<String>,
    options: FacetOptions,
    criteria: FilterCriteria,
}

impl DashboardState {
    /// Select `preferred` when the table has it, otherwise the first
    /// township.
    pub fn new(table: &Table, preferred: Option<&str>) -> Self {
        let mut state = Self {
            townships: townships(table),
            ..Self::default()
        };
        let initial = preferred
            .filter(|p| state.townships.iter().any(|t| t.as_str() == *p))
            .map(str::to_string)
            .or_else(|| state.townships.first().cloned());
        if let Some(township) = initial {
            state.select_township(table, &township);
        }
        state
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn townships(&self) -> &[String] {
        &self.townships
    }

    /// `None` when the table has no townships.
    pub fn township(&self) -> Option<&str> {
        if self.townships.is_empty() {
            None
        } else {
            Some(self.criteria.township.as_str())
        }
    }

    pub fn options(&self) -> &FacetOptions {
        &self.options
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.criteria.selection(facet).contains(value)
    }

    // ── Township ──────────────────────────────────────────────────────────

    /// Switch township and reset every facet to all of its options.
    pub fn select_township(&mut self, table: &Table, township: &str) {
        self.options = facet_options(table, township);
        self.criteria = FilterCriteria::all_for(table, township);
        tracing::debug!(township, "township selected");
    }

    /// Move `step` townships forward (negative: backward), wrapping around.
    pub fn cycle_township(&mut self, table: &Table, step: isize) {
        let len = self.townships.len();
        if len == 0 {
            return;
        }
        let current = self
            .townships
            .iter()
            .position(|t| *t == self.criteria.township)
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(len as isize) as usize;
        let township = self.townships[next].clone();
        self.select_township(table, &township);
    }

    // ── Facets ────────────────────────────────────────────────────────────

    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selection = self.criteria.selection_mut(facet);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
    }

    pub fn select_all(&mut self, facet: Facet) {
        *self.criteria.selection_mut(facet) = self.options.get(facet).iter().cloned().collect();
    }

    /// Clearing a facet makes the view empty.
    pub fn select_none(&mut self, facet: Facet) {
        self.criteria.selection_mut(facet).clear();
    }

    /// Restrict `facet` to `values`. An empty slice keeps the current
    /// selection.
    pub fn restrict(&mut self, facet: Facet, values: &[String]) {
        if values.is_empty() {
            return;
        }
        *self.criteria.selection_mut(facet) = values.iter().cloned().collect();
    }

    // ── Reload ────────────────────────────────────────────────────────────

    /// Recompute townships and options after the table was reloaded.
    ///
    /// The township is kept if it still exists. Ticked values that vanished
    /// are dropped; values that are new since the last load start ticked.
    pub fn refresh(&mut self, table: &Table) {
        self.townships = townships(table);
        if !self.townships.contains(&self.criteria.township) {
            match self.townships.first().cloned() {
                Some(first) => self.select_township(table, &first),
                None => *self = Self::default(),
            }
            return;
        }

        let previous = std::mem::replace(&mut self.options, facet_options(table, &self.criteria.township));
        for facet in Facet::ALL {
            let old_options: HashSet<&String> = previous.get(facet).iter().collect();
            let kept: HashSet<String> = self
                .options
                .get(facet)
                .iter()
                .filter(|v| self.criteria.selection(facet).contains(*v) || !old_options.contains(v))
                .cloned()
                .collect();
            *self.criteria.selection_mut(facet) = kept;
        }
    }

    // ── Derived ───────────────────────────────────────────────────────────

    /// Records matching the current selection. Empty without a township.
    pub fn view<'a>(&self, table: &'a Table) -> FilteredView<'a> {
        filter(table, &self.criteria)
    }

    pub fn summary(&self, table: &Table) -> Summary {
        PlotAggregator::summarize(&self.view(table))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
