use std::cell::OnceCell;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use sumsheet_core::{layout, LayoutOptions, Presentation, Problem};

use crate::backend::FontBackend;
use crate::document::PdfDocument;
use crate::sink::{render_layout, PageSink};

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Printed centered above the first worksheet page.
    pub title: Option<String>,
    /// Append pages listing every problem with its answer.
    pub answer_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub problems: usize,
    pub pages: usize,
    pub bytes: usize,
}

/// Writes worksheets as PDF. The font backend is set up on first use and
/// kept for the exporter's lifetime.
#[derive(Debug, Default)]
pub struct PdfExporter {
    backend: OnceCell<FontBackend>,
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> &FontBackend {
        self.backend.get_or_init(FontBackend::load)
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.get().is_some()
    }

    /// Lay out and draw `problems` into a fresh document.
    pub fn build<'a>(
        &'a self,
        problems: &[Problem],
        presentation: &Presentation,
        options: &ExportOptions,
    ) -> PdfDocument<'a> {
        let opts = LayoutOptions::for_paper(presentation);
        let backend = self.backend();
        let mut doc = PdfDocument::new(
            backend,
            opts.page_width,
            opts.page_height,
            opts.font_size,
            opts.margin,
        );

        if let Some(title) = &options.title {
            doc.set_title(title);
            doc.centered_text(opts.margin * 0.6, title, opts.font_size);
        }

        let texts: Vec<&str> = problems.iter().map(|p| p.text.as_str()).collect();
        warn_if_too_wide(backend, &texts, &opts);
        render_layout(&layout(&texts, &opts), &mut doc);

        if options.answer_key {
            doc.new_page();
            doc.centered_text(opts.margin * 0.6, "Answer key", opts.font_size);
            let answers: Vec<String> = problems.iter().map(Problem::with_answer).collect();
            warn_if_too_wide(backend, &answers, &opts);
            render_layout(&layout(&answers, &opts), &mut doc);
        }

        doc
    }

    pub fn render(
        &self,
        problems: &[Problem],
        presentation: &Presentation,
        options: &ExportOptions,
    ) -> Result<Vec<u8>> {
        self.build(problems, presentation, options).finish()
    }

    pub fn export(
        &self,
        problems: &[Problem],
        presentation: &Presentation,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<ExportSummary> {
        let doc = self.build(problems, presentation, options);
        let pages = doc.page_count();
        let bytes = doc
            .save(path)
            .with_context(|| format!("exporting worksheet to {}", path.display()))?;
        info!(
            "exported {} problems on {pages} pages to {}",
            problems.len(),
            path.display()
        );
        Ok(ExportSummary {
            problems: problems.len(),
            pages,
            bytes,
        })
    }
}

fn warn_if_too_wide<S: AsRef<str>>(backend: &FontBackend, texts: &[S], opts: &LayoutOptions) {
    let limit = opts.column_width();
    let wide = texts
        .iter()
        .filter(|t| backend.text_width(t.as_ref(), opts.font_size) > limit)
        .count();
    if wide > 0 {
        warn!("{wide} problem(s) are wider than the {limit:.0}pt column and may overlap");
    }
}
