//! Inspection aggregate
//!
//! Property inspections (vistorias) and the AI-produced report (laudo)
//! attached to them.

pub mod model;
pub mod report;
pub mod repository;

pub use model::{Inspection, InspectionFilter, InspectionStats, NewInspection, STATUS_PENDING};
pub use report::{
    addendum_entry, append_report_entry, extract_json_object, manual_note_entry,
    normalize_vision_report, parse_report, AnalysisMetadata, AnalyzedPhoto, InspectionAnalysis,
    InspectionImage,
};
pub use repository::InspectionRepository;
