//! One user session against the survey gateway.

use std::path::{Path, PathBuf};
use std::time::Duration;

use survey_core::{
    Calendar, FilterCriteria, Invalidation, RecordCache, SurveyForm, SurveyGateway, SurveyRecord,
    TableView,
};
use survey_export::{ExportArtifact, ExportError, export_document, export_spreadsheet};
use survey_settings::{DisplaySettings, ExportSettings, SurveySettings};
use tracing::instrument;

use crate::errors::SessionError;
use crate::notify::{LOAD_FAILED, NO_DATA, Notification, SAVED, SAVING, StatusBoard};

/// The two screens of the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// The data-entry form.
    Entry,
    /// The filterable record table.
    Details,
}

/// Calendar for the configured display offset; the local offset when unset.
pub fn resolve_calendar(display: &DisplaySettings) -> Result<Calendar, SessionError> {
    match display.utc_offset.as_deref() {
        None => Ok(Calendar::local()),
        Some(raw) => Calendar::parse_offset(raw)
            .map(Calendar::new)
            .ok_or_else(|| SessionError::Config(format!("invalid display.utcOffset {raw:?}"))),
    }
}

/// Session state: the gateway, the record cache, the active view, the
/// filter, and the status board.
///
/// Operations take `&mut self`, so at most one gateway call is in flight.
pub struct SurveySession<G> {
    gateway: G,
    cache: RecordCache,
    view: View,
    criteria: FilterCriteria,
    load_failed: bool,
    calendar: Calendar,
    status: StatusBoard,
    export: ExportSettings,
}

impl<G: SurveyGateway> SurveySession<G> {
    /// Session starting on the entry view with an unloaded cache.
    pub fn new(gateway: G, calendar: Calendar, export: ExportSettings, reset_after: Duration) -> Self {
        Self {
            gateway,
            cache: RecordCache::new(),
            view: View::Entry,
            criteria: FilterCriteria::default(),
            load_failed: false,
            calendar,
            status: StatusBoard::new(reset_after),
            export,
        }
    }

    /// Session configured from settings.
    pub fn from_settings(gateway: G, settings: &SurveySettings) -> Result<Self, SessionError> {
        let calendar = resolve_calendar(&settings.display)?;
        Ok(Self::new(
            gateway,
            calendar,
            settings.export.clone(),
            Duration::from_millis(settings.notification.reset_after_ms),
        ))
    }

    /// The gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The record cache.
    pub const fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// The active view.
    pub const fn view(&self) -> View {
        self.view
    }

    /// The calendar dates are read in.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// The status board.
    pub const fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// The active filter.
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the filter. The cache is untouched.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// Submit the form.
    ///
    /// On success the form is reset for the next resident, the cache is
    /// invalidated, and the table is reloaded when the details view is
    /// active. On failure the form and the cache are left as they were.
    #[instrument(skip_all)]
    pub async fn submit(&mut self, form: &mut SurveyForm) -> Result<(), SessionError> {
        self.status.post(Notification::info(SAVING));
        let submission = form.to_submission();

        if let Err(e) = self.gateway.submit(&submission).await {
            tracing::warn!(kind = e.error_kind(), error = %e, "submission failed");
            self.status.post(Notification::error(e.submit_notice()));
            return Err(e.into());
        }

        self.status.post(Notification::success(SAVED));
        form.reset_for_next_entry();
        self.invalidate(Invalidation::Submitted);
        if self.view == View::Details {
            // a failed reload is already on the status board
            let _ = self.refresh().await;
        }
        Ok(())
    }

    /// Switch to the details view. The cache is invalidated and reloaded.
    pub async fn enter_details(&mut self) -> Result<usize, SessionError> {
        self.view = View::Details;
        self.invalidate(Invalidation::DetailsEntered);
        self.refresh().await
    }

    /// Switch to the entry view.
    pub fn enter_entry(&mut self) {
        self.view = View::Entry;
    }

    /// Fetch every record into the cache and return how many arrived.
    ///
    /// A failed fetch leaves the cache loaded but empty and posts a failure
    /// notification.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result<usize, SessionError> {
        match self.gateway.fetch_all().await {
            Ok(records) => {
                let count = records.len();
                self.cache.replace(records);
                self.load_failed = false;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(kind = e.error_kind(), error = %e, "fetch failed");
                self.cache.replace(Vec::new());
                self.load_failed = true;
                self.status.post(Notification::error(LOAD_FAILED));
                Err(e.into())
            }
        }
    }

    /// Records passing the active filter, in cache order.
    pub fn filtered(&self) -> Vec<&SurveyRecord> {
        self.cache.filtered(&self.criteria, &self.calendar)
    }

    /// The table as it should currently be shown.
    pub fn render(&self) -> TableView {
        if self.load_failed {
            TableView::Failed
        } else if self.cache.is_stale() {
            TableView::Loading
        } else {
            TableView::from_records(&self.filtered(), &self.calendar)
        }
    }

    /// Export the filtered records as a workbook into the output directory.
    pub fn export_spreadsheet(&self) -> Result<PathBuf, SessionError> {
        let records = self.filtered();
        let built = export_spreadsheet(&records, &self.export);
        self.finish_export(built, Path::new(&self.export.output_dir))
    }

    /// Export the filtered records as a PDF report into the output
    /// directory. The file name carries the current time.
    pub fn export_document(&self) -> Result<PathBuf, SessionError> {
        let records = self.filtered();
        let built = export_document(&records, &self.calendar, self.calendar.now(), &self.export);
        self.finish_export(built, Path::new(&self.export.output_dir))
    }

    /// Point exports at another directory.
    pub fn set_output_dir(&mut self, dir: impl Into<String>) {
        self.export.output_dir = dir.into();
    }

    /// Drop the cached records. The table shows `Loading` until the next
    /// fetch settles, whatever the previous fetch did.
    fn invalidate(&mut self, reason: Invalidation) {
        self.cache.invalidate(reason);
        self.load_failed = false;
    }

    fn finish_export(
        &self,
        built: Result<ExportArtifact, ExportError>,
        dir: &Path,
    ) -> Result<PathBuf, SessionError> {
        let written = built.and_then(|artifact| {
            let path = artifact.write_to(dir)?;
            Ok((artifact.file_name, path))
        });
        match written {
            Ok((file_name, path)) => {
                self.status.post(Notification::exported(&file_name));
                Ok(path)
            }
            Err(ExportError::NoData) => {
                self.status.post(Notification::error(NO_DATA));
                Err(ExportError::NoData.into())
            }
            Err(e) => {
                tracing::warn!(kind = e.error_kind(), error = %e, "export failed");
                self.status.post(Notification::error(format!("Export failed: {e}")));
                Err(e.into())
            }
        }
    }
}
