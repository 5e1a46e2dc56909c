//! Font resources shared by every document an exporter writes.
//!
//! Worksheets use the standard Helvetica font with WinAnsi encoding, so no
//! font file is embedded. Widths are the Helvetica AFM advances for the
//! characters worksheets actually contain; other glyphs use an average.

use std::collections::HashMap;

use tracing::debug;

pub const BASE_FONT: &[u8] = b"Helvetica";
pub const FONT_RESOURCE: &[u8] = b"F1";

/// Substituted for characters WinAnsi cannot encode.
const REPLACEMENT: u8 = b'?';

/// Non-ASCII WinAnsi code points worksheets are likely to need.
const WIN_ANSI_EXTRA: &[(char, u8)] = &[
    ('×', 0xD7),
    ('÷', 0xF7),
    ('–', 0x96),
    ('−', b'-'),
    ('·', 0xB7),
    ('°', 0xB0),
    ('½', 0xBD),
    ('¼', 0xBC),
    ('¾', 0xBE),
];

const HELVETICA_WIDTHS: &[(char, u16)] = &[
    (' ', 278),
    ('+', 584),
    ('-', 333),
    ('=', 584),
    ('×', 584),
    ('÷', 584),
    ('.', 278),
    ('(', 333),
    (')', 333),
    ('/', 278),
    ('*', 389),
    ('?', 556),
];

const DEFAULT_WIDTH: u16 = 556;

#[derive(Debug)]
pub struct FontBackend {
    encoding: HashMap<char, u8>,
    widths: HashMap<char, u16>,
}

impl FontBackend {
    pub fn load() -> Self {
        let mut encoding: HashMap<char, u8> = (0x20u8..0x7F).map(|b| (b as char, b)).collect();
        encoding.extend(WIN_ANSI_EXTRA.iter().copied());

        let mut widths: HashMap<char, u16> = ('0'..='9').map(|c| (c, 556)).collect();
        widths.extend(HELVETICA_WIDTHS.iter().copied());

        debug!(
            "font backend loaded: {} encodable chars",
            encoding.len()
        );
        Self { encoding, widths }
    }

    /// WinAnsi bytes for `text`; unencodable characters become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| self.encoding.get(&c).copied().unwrap_or(REPLACEMENT))
            .collect()
    }

    /// Advance width of `text` in points at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(self.widths.get(&c).copied().unwrap_or(DEFAULT_WIDTH)))
            .sum();
        units as f32 * font_size / 1000.0
    }
}
