//! Dependent configuration form.
//!
//! Owns the [`PlanRequest`] under construction and is its only mutator.
//! The focus-topic choice list is derived from the extraction per read, and
//! changing the lecture topic clears the focus topic in the same update so
//! a stale focus selection can never be observed.

use crate::api::{ExtractionResult, OptionCatalog, PlanRequest};

/// The six fields of the configuration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    SubjectName,
    LectureTopic,
    FocusTopic,
    BloomsTaxonomy,
    AqfLevel,
    LessonDuration,
}

impl FormField {
    /// Fields in display order.
    pub const ALL: [FormField; 6] = [
        FormField::SubjectName,
        FormField::LectureTopic,
        FormField::FocusTopic,
        FormField::BloomsTaxonomy,
        FormField::AqfLevel,
        FormField::LessonDuration,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FormField::SubjectName => "Subject Name",
            FormField::LectureTopic => "Lecture Content",
            FormField::FocusTopic => "Focus Topic",
            FormField::BloomsTaxonomy => "Bloom's Taxonomy Level",
            FormField::AqfLevel => "AQF Level",
            FormField::LessonDuration => "Lesson Duration",
        }
    }
}

/// Focus topics available for `lecture_topic`, derived from the extraction.
///
/// Pure; a lecture topic absent from the mapping has no focus topics. This
/// is recomputed on every read rather than cached, so the choice list can
/// never lag behind the current lecture selection.
pub fn focus_topics_for<'a>(
    extraction: &'a ExtractionResult,
    lecture_topic: &str,
) -> &'a [String] {
    if lecture_topic.is_empty() {
        return &[];
    }
    extraction
        .lecture_focus_mapping
        .get(lecture_topic)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Mutable wrapper around the request being configured.
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    request: PlanRequest,
}

impl PlanForm {
    /// Fresh form with every field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the request.
    pub fn request(&self) -> &PlanRequest {
        &self.request
    }

    /// Current value of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::SubjectName => &self.request.subject_name,
            FormField::LectureTopic => &self.request.lecture_topic,
            FormField::FocusTopic => &self.request.focus_topic,
            FormField::BloomsTaxonomy => &self.request.blooms_taxonomy,
            FormField::AqfLevel => &self.request.aqf_level,
            FormField::LessonDuration => &self.request.lesson_duration,
        }
    }

    /// Set a field.
    ///
    /// Setting the lecture topic also clears the focus topic in the same
    /// update, so the two change atomically from the caller's perspective.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::SubjectName => self.request.subject_name = value,
            FormField::LectureTopic => {
                self.request.lecture_topic = value;
                self.request.focus_topic = String::new();
            }
            FormField::FocusTopic => self.request.focus_topic = value,
            FormField::BloomsTaxonomy => self.request.blooms_taxonomy = value,
            FormField::AqfLevel => self.request.aqf_level = value,
            FormField::LessonDuration => self.request.lesson_duration = value,
        }
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.request = PlanRequest::default();
    }

    /// Whether the form is ready for generation.
    ///
    /// Pure with no side effects; re-evaluated on every field change. The
    /// three catalog-backed fields must hold values from the catalog, so an
    /// empty catalog (failed `/options` fetch) can never validate. The
    /// focus topic is required only when the selected lecture topic has
    /// focus topics to choose from.
    pub fn is_complete(&self, catalog: &OptionCatalog, extraction: &ExtractionResult) -> bool {
        let r = &self.request;

        let required_filled = !r.subject_name.is_empty()
            && !r.lecture_topic.is_empty()
            && !r.blooms_taxonomy.is_empty()
            && !r.aqf_level.is_empty()
            && !r.lesson_duration.is_empty();
        if !required_filled {
            return false;
        }

        let catalog_backed = catalog.blooms_taxonomy.contains(&r.blooms_taxonomy)
            && catalog.aqf_levels.contains(&r.aqf_level)
            && catalog.lesson_durations.contains(&r.lesson_duration);
        if !catalog_backed {
            return false;
        }

        let focus_choices = focus_topics_for(extraction, &r.lecture_topic);
        focus_choices.is_empty() || !r.focus_topic.is_empty()
    }
}
