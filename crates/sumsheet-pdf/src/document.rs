use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Date, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::debug;

use crate::backend::{FontBackend, BASE_FONT, FONT_RESOURCE};
use crate::sink::PageSink;

const CREATOR: &str = concat!("sumsheet ", env!("CARGO_PKG_VERSION"));

/// A PDF under construction. Text positions are given top-left based and
/// flipped into PDF user space on write. Every page gets a centered
/// `Page N of M` footer inside the bottom margin.
pub struct PdfDocument<'a> {
    backend: &'a FontBackend,
    width: f32,
    height: f32,
    font_size: f32,
    footer_y: f32,
    title: Option<String>,
    pages: Vec<Content>,
}

impl<'a> PdfDocument<'a> {
    /// Opens the first page.
    pub fn new(backend: &'a FontBackend, width: f32, height: f32, font_size: f32, margin: f32) -> Self {
        Self {
            backend,
            width,
            height,
            font_size,
            footer_y: height - margin / 2.0,
            title: None,
            pages: vec![Content::new()],
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text horizontally centered on the page.
    pub fn centered_text(&mut self, y: f32, text: &str, font_size: f32) {
        let x = (self.width - self.backend.text_width(text, font_size)) / 2.0;
        self.place(x, y, text, font_size);
    }

    fn place(&mut self, x: f32, y: f32, text: &str, font_size: f32) {
        let encoded = self.backend.encode(text);
        let pdf_y = self.height - y;
        if let Some(content) = self.pages.last_mut() {
            content.begin_text();
            content.set_font(Name(FONT_RESOURCE), font_size);
            content.next_line(x, pdf_y);
            content.show(Str(&encoded));
            content.end_text();
        }
    }

    fn draw_footers(&mut self) {
        let total = self.pages.len();
        let footer_size = (self.font_size * 0.7).max(6.0);
        let footers: Vec<(f32, String)> = (1..=total)
            .map(|n| {
                let label = format!("Page {n} of {total}");
                let x = (self.width - self.backend.text_width(&label, footer_size)) / 2.0;
                (x, label)
            })
            .collect();
        for (content, (x, label)) in self.pages.iter_mut().zip(footers) {
            let encoded = self.backend.encode(&label);
            content.begin_text();
            content.set_font(Name(FONT_RESOURCE), footer_size);
            content.next_line(x, self.height - self.footer_y);
            content.show(Str(&encoded));
            content.end_text();
        }
    }

    /// Serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.draw_footers();

        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let info_id = Ref::new(4);
        let page_ids: Vec<Ref> = (0..self.pages.len())
            .map(|i| Ref::new(5 + 2 * i as i32))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.type1_font(font_id)
            .base_font(Name(BASE_FONT))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        let now = Utc::now();
        {
            let mut info = pdf.document_info(info_id);
            info.creator(TextStr(CREATOR));
            info.creation_date(
                Date::new(now.year() as u16)
                    .month(now.month() as u8)
                    .day(now.day() as u8),
            );
            if let Some(title) = &self.title {
                info.title(TextStr(title.as_str()));
            }
        }

        for (page_id, content) in page_ids.iter().zip(self.pages) {
            let content_id = Ref::new(page_id.get() + 1);

            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, self.width, self.height));
            page.parent(tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(Name(FONT_RESOURCE), font_id);
            drop(page);

            let compressed = compress(&content.finish()).context("compressing page content")?;
            pdf.stream(content_id, &compressed)
                .filter(Filter::FlateDecode);
        }

        let bytes = pdf.finish();
        debug!("pdf serialized: {} pages, {} bytes", page_ids.len(), bytes.len());
        Ok(bytes)
    }

    pub fn save(self, path: &Path) -> Result<usize> {
        let bytes = self.finish()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(bytes.len())
    }
}

impl PageSink for PdfDocument<'_> {
    fn new_page(&mut self) {
        self.pages.push(Content::new());
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        self.place(x, y, text, self.font_size);
    }
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
