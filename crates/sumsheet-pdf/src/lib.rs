pub mod backend;
pub mod document;
pub mod exporter;
pub mod sink;

pub use backend::FontBackend;
pub use document::PdfDocument;
pub use exporter::{ExportOptions, ExportSummary, PdfExporter};
pub use sink::{render_layout, PageSink};
