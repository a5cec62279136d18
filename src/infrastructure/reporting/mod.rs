pub mod inspection_pdf;

pub use inspection_pdf::{render_inspection_report, report_filename};
