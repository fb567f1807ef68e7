//! Projection of accepted results into display entries

use crate::index::IndexSettings;
use crate::items::ItemRepository;
use crate::results::{CandidateMatch, DisplayEntry, ResultSet};

/// Receives the final display entries, in result order
pub trait ResultSink {
    fn add_result(&mut self, entry: DisplayEntry);
}

impl ResultSink for Vec<DisplayEntry> {
    fn add_result(&mut self, entry: DisplayEntry) {
        self.push(entry);
    }
}

/// Builds display entries for accepted candidates
pub struct DisplayProjector<'a> {
    repository: &'a dyn ItemRepository,
    default_icon: Option<&'a str>,
}

impl<'a> DisplayProjector<'a> {
    pub fn new(repository: &'a dyn ItemRepository, settings: &'a IndexSettings) -> Self {
        Self {
            repository,
            default_icon: settings.default_icon.as_deref(),
        }
    }

    /// Display entry for one candidate.
    ///
    /// Returns `None` when the backing item cannot be resolved, or when no label
    /// or icon can be found.
    pub fn entry(&self, candidate: &CandidateMatch) -> Option<DisplayEntry> {
        let item = self.repository.resolve(&candidate.item_id).ok()??;
        let label = candidate.label()?;

        let icon = candidate
            .icon()
            .or_else(|| item.appearance.icon.clone())
            .or_else(|| self.default_icon.map(str::to_string))
            .filter(|icon| !icon.is_empty())?;

        let address = candidate
            .uri
            .as_ref()
            .map(|uri| uri.to_string())
            .unwrap_or_default();

        Some(DisplayEntry::new(label, icon, address))
    }

    /// Emit entries for every projectable candidate; returns how many were emitted
    pub fn project(&self, results: &ResultSet, sink: &mut dyn ResultSink) -> usize {
        let mut emitted = 0;
        for entry in results.iter().filter_map(|candidate| self.entry(candidate)) {
            sink.add_result(entry);
            emitted += 1;
        }
        emitted
    }
}
