//! Wire types shared with the lesson-plan service.
//!
//! Field names mirror the service's JSON shapes exactly, so these types
//! serialize/deserialize without rename maps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured data extracted from an uploaded course outline.
///
/// Produced by `POST /upload-document`. `lecture_focus_mapping` keys are a
/// subset of `lecture_topics`; a topic absent from the map simply has no
/// focus topics, and consumers must treat that as an empty list rather than
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Opaque extraction identifier
    #[serde(default)]
    pub id: String,
    /// Name of the uploaded file
    #[serde(default)]
    pub filename: String,
    /// Subject names found in the outline
    pub subject_names: Vec<String>,
    /// Lecture topics found in the outline
    pub lecture_topics: Vec<String>,
    /// Maps lecture topics to their focus topics
    #[serde(default)]
    pub lecture_focus_mapping: HashMap<String, Vec<String>>,
    /// When the extraction was produced
    #[serde(default = "Utc::now")]
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// One-line summary shown when entering the configure stage.
    pub fn summary(&self) -> String {
        format!(
            "Extracted {} subject(s), {} lecture topic(s), and {} lecture-focus mapping(s)",
            self.subject_names.len(),
            self.lecture_topics.len(),
            self.lecture_focus_mapping.len()
        )
    }
}

/// Server-supplied dropdown options, independent of any document.
///
/// Fetched once from `GET /options` at workflow start. When the fetch fails
/// the catalog stays empty and the form can never validate complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionCatalog {
    /// Bloom's taxonomy levels
    pub blooms_taxonomy: Vec<String>,
    /// Australian Qualifications Framework levels
    pub aqf_levels: Vec<String>,
    /// Lesson duration labels
    pub lesson_durations: Vec<String>,
}

impl OptionCatalog {
    /// Whether any option list was loaded.
    pub fn is_empty(&self) -> bool {
        self.blooms_taxonomy.is_empty()
            && self.aqf_levels.is_empty()
            && self.lesson_durations.is_empty()
    }

    /// The catalog the service publishes today. The live `/options`
    /// response is authoritative; this mirror exists for tests and
    /// offline display.
    pub fn standard() -> Self {
        let owned = |items: &[&str]| items.iter().map(ToString::to_string).collect();
        Self {
            blooms_taxonomy: owned(&[
                "Remember",
                "Understand",
                "Apply",
                "Analyze",
                "Evaluate",
                "Create",
            ]),
            aqf_levels: owned(&[
                "AQF Level 1 - Certificate I",
                "AQF Level 2 - Certificate II",
                "AQF Level 3 - Certificate III",
                "AQF Level 4 - Certificate IV",
                "AQF Level 5 - Diploma",
                "AQF Level 6 - Advanced Diploma/Associate Degree",
                "AQF Level 7 - Bachelor Degree",
                "AQF Level 8 - Bachelor Honours/Graduate Certificate/Graduate Diploma",
                "AQF Level 9 - Masters Degree",
                "AQF Level 10 - Doctoral Degree",
            ]),
            lesson_durations: owned(&[
                "30 minutes",
                "45 minutes",
                "1 hour",
                "1.5 hours",
                "2 hours",
                "2.5 hours",
                "3 hours",
            ]),
        }
    }
}

/// The configuration form submitted to `POST /generate-plan`.
///
/// All fields start empty; the form model in [`crate::workflow::form`] is
/// the only mutator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Selected subject name (from the extraction)
    pub subject_name: String,
    /// Selected lecture topic (from the extraction)
    pub lecture_topic: String,
    /// Selected focus topic (dependent on the lecture topic; may be empty)
    #[serde(default)]
    pub focus_topic: String,
    /// Selected Bloom's taxonomy level (from the catalog)
    pub blooms_taxonomy: String,
    /// Selected AQF level (from the catalog)
    pub aqf_level: String,
    /// Selected lesson duration (from the catalog)
    pub lesson_duration: String,
}

/// A generated lesson plan, as returned by `POST /generate-plan`.
///
/// Immutable once received; a new generation replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
    /// Opaque plan identifier, used to fetch the rendered artifact
    pub id: String,
    /// Echo of the request that produced this plan
    pub request_data: PlanRequest,
    /// Free-text plan body (blank-line separated sections)
    pub content: String,
    /// When the plan was generated
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl GeneratedPlan {
    /// Suggested filename for the downloaded artifact.
    ///
    /// Matches the service's convention: subject name with whitespace
    /// collapsed to underscores, plus the first 8 characters of the plan id.
    pub fn artifact_filename(&self) -> String {
        let subject: String = self
            .request_data
            .subject_name
            .chars()
            .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
            .collect();
        let short_id: String = self.id.chars().take(8).collect();
        format!("lesson_plan_{subject}_{short_id}.pdf")
    }
}
