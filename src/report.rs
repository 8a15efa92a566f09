// PDF report for one history record.
// Text content comes from `report_lines` (deterministic, testable without a PDF parser);
// `render` lays those lines out on as many A4 pages as needed.

use crate::error::ReportError;
use crate::models::HistoryRecord;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DEFAULT_TITLE: &str = "Chemical Equipment Report";
pub const DEFAULT_FILENAME: &str = "equipment_report.pdf";

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 72.0;
const FOOTER_SIZE: f32 = 9.0;

// Fixed object numbers.
const CATALOG_OBJECT: i32 = 1;
const PAGE_TREE_OBJECT: i32 = 2;
const INFO_OBJECT: i32 = 3;
const REGULAR_FONT_OBJECT: i32 = 4;
const BOLD_FONT_OBJECT: i32 = 5;
/// Per-page objects (page, content stream) are numbered from here.
const FIRST_PAGE_OBJECT: i32 = 6;

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

/// Title and download name; both come from `[report]` config.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub title: String,
    pub filename: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            filename: DEFAULT_FILENAME.into(),
        }
    }
}

/// Document bytes plus what the transport needs to serve them as an attachment.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

impl LineStyle {
    fn font(self) -> (Name<'static>, f32) {
        match self {
            LineStyle::Title => (BOLD_FONT, 22.0),
            LineStyle::Heading => (BOLD_FONT, 15.0),
            LineStyle::Body => (REGULAR_FONT, 11.0),
        }
    }

    /// Vertical space the line occupies, including spacing before the next one.
    fn leading(self) -> f32 {
        match self {
            LineStyle::Title => 36.0,
            LineStyle::Heading => 26.0,
            LineStyle::Body => 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub style: LineStyle,
    pub text: String,
}

impl ReportLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Title, upload time, total, the three averages, then one line per equipment type in key order.
pub fn report_lines(title: &str, record: &HistoryRecord) -> Vec<ReportLine> {
    let s = &record.summary;
    let mut lines = vec![
        ReportLine::new(LineStyle::Title, title),
        ReportLine::new(
            LineStyle::Body,
            format!("Uploaded at: {}", record.uploaded_at_display()),
        ),
        ReportLine::new(LineStyle::Body, format!("Total Equipment: {}", s.total_count)),
        ReportLine::new(
            LineStyle::Body,
            format!("Average Flowrate: {:.3}", s.average_flowrate),
        ),
        ReportLine::new(
            LineStyle::Body,
            format!("Average Pressure: {:.3}", s.average_pressure),
        ),
        ReportLine::new(
            LineStyle::Body,
            format!("Average Temperature: {:.3}", s.average_temperature),
        ),
        ReportLine::new(LineStyle::Heading, "Equipment Type Distribution:"),
    ];
    lines.extend(
        s.equipment_type_distribution
            .iter()
            .map(|(kind, count)| ReportLine::new(LineStyle::Body, format!("{}: {}", kind, count))),
    );
    lines
}

/// Renders `record` as a PDF. `None` (empty history) is [`ReportError::NoData`].
pub fn render(
    record: Option<&HistoryRecord>,
    settings: &ReportSettings,
) -> Result<RenderedReport, ReportError> {
    let record = record.ok_or(ReportError::NoData)?;
    let lines = report_lines(&settings.title, record);
    let pages = paginate(&lines);
    if pages.is_empty() {
        return Err(ReportError::Render("report has no content".into()));
    }

    let catalog_id = Ref::new(CATALOG_OBJECT);
    let page_tree_id = Ref::new(PAGE_TREE_OBJECT);
    let regular_font_id = Ref::new(REGULAR_FONT_OBJECT);
    let bold_font_id = Ref::new(BOLD_FONT_OBJECT);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    let page_ids: Vec<Ref> = (0..pages.len()).map(page_ref).collect();
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);
    pdf.document_info(Ref::new(INFO_OBJECT))
        .title(TextStr(&settings.title))
        .producer(TextStr(crate::version::NAME));
    pdf.type1_font(regular_font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_font_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let total = pages.len();
    for (index, placed) in pages.iter().enumerate() {
        let content_id = content_ref(index);
        let mut page = pdf.page(page_ref(index));
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(REGULAR_FONT, regular_font_id);
            fonts.pair(BOLD_FONT, bold_font_id);
        }
        page.finish();

        let mut content = Content::new();
        for (line, y) in placed {
            let (font, size) = line.style.font();
            write_text(&mut content, font, size, MARGIN, *y, &line.text);
        }
        let footer = format!("Page {} of {}", index + 1, total);
        write_text(
            &mut content,
            REGULAR_FONT,
            FOOTER_SIZE,
            MARGIN,
            MARGIN / 2.0,
            &footer,
        );
        pdf.stream(content_id, &content.finish());
    }

    Ok(RenderedReport {
        bytes: pdf.finish(),
        filename: settings.filename.clone(),
        content_type: PDF_CONTENT_TYPE,
    })
}

/// Assigns each line a baseline, starting a new page when the bottom margin would be crossed.
fn paginate(lines: &[ReportLine]) -> Vec<Vec<(&ReportLine, f32)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages: Vec<Vec<(&ReportLine, f32)>> = Vec::new();
    let mut current = Vec::new();
    let mut y = top;
    for line in lines {
        let leading = line.style.leading();
        if y - leading < MARGIN && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            y = top;
        }
        y -= leading;
        current.push((line, y));
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

fn write_text(content: &mut Content, font: Name, size: f32, x: f32, y: f32, text: &str) {
    let bytes = win_ansi_text(text);
    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, y);
    content.show(Str(&bytes));
    content.end_text();
}

/// Encodes `text` for the WinAnsi-encoded standard fonts. Printable ASCII and Latin-1 keep their
/// code points, the 0x80..=0x9F punctuation block is mapped, anything else becomes `?`.
pub fn win_ansi_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

fn page_ref(index: usize) -> Ref {
    Ref::new(FIRST_PAGE_OBJECT + 2 * index as i32)
}

fn content_ref(index: usize) -> Ref {
    Ref::new(FIRST_PAGE_OBJECT + 2 * index as i32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Distribution, Summary};

    fn record_with_types(n: usize) -> HistoryRecord {
        let mut dist = Distribution::new();
        for i in 0..n {
            dist.insert(format!("Type{:03}", i), 1);
        }
        HistoryRecord {
            id: 1,
            uploaded_at: 0,
            summary: Summary {
                total_count: n as u64,
                average_flowrate: 1.0,
                average_pressure: 1.0,
                average_temperature: 1.0,
                equipment_type_distribution: dist,
            },
        }
    }

    #[test]
    fn test_paginate_single_page_for_short_report() {
        let lines = report_lines(DEFAULT_TITLE, &record_with_types(3));
        assert_eq!(paginate(&lines).len(), 1);
    }

    #[test]
    fn test_paginate_spills_long_distribution_onto_more_pages() {
        let lines = report_lines(DEFAULT_TITLE, &record_with_types(120));
        let pages = paginate(&lines);
        assert!(pages.len() > 1);
        let placed: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(placed, lines.len());
        for page in &pages {
            for (_, y) in page {
                assert!(*y >= MARGIN);
            }
        }
    }

    #[test]
    fn test_win_ansi_keeps_latin1_and_maps_punctuation() {
        assert_eq!(win_ansi_text("Pumpe Ü"), b"Pumpe \xDC".to_vec());
        assert_eq!(win_ansi_text("Pumpe Ä"), b"Pumpe \xC4".to_vec());
        assert_eq!(win_ansi_text("5 €"), b"5 \x80".to_vec());
        assert_eq!(win_ansi_text("Kühler – Ω"), b"K\xFChler \x96 ?".to_vec());
        assert_eq!(win_ansi_text("tab\there"), b"tab?here".to_vec());
    }
}
