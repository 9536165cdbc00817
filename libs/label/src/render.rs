//! PDF layout for the parcel label.
//!
//! Positions below are given from the top-left corner of the page, the way
//! the label is designed; they are flipped into PDF space when drawn.

use chrono::{DateTime, Utc};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::{LabelError, QrMatrix};

/// Page width in PDF points.
pub const PAGE_WIDTH: f32 = 130.0;

/// Page height in PDF points.
pub const PAGE_HEIGHT: f32 = 65.0;

const CAPTION: &str = "Parcel delivery";
const PRODUCER: &str = "Parcel Manager";

const BOLD: Name<'static> = Name(b"F1");
const REGULAR: Name<'static> = Name(b"F2");

// Helvetica ascender and line height, per 1 pt of font size.
const ASCENT: f32 = 0.718;
const LINE_HEIGHT: f32 = 1.156;

const QR_X: f32 = 80.0;
const QR_Y: f32 = 10.0;
const QR_SIZE: f32 = 40.0;
const QR_QUIET_ZONE: usize = 4;

/// Data printed on a label.
#[derive(Debug, Clone, Copy)]
pub struct Label<'a> {
    /// Encoded public id; printed and carried by the QR code.
    pub public_id: &'a str,

    /// Recipient name, used for the document title.
    pub name: &'a str,

    /// Arrival time; only the UTC date is printed.
    pub arrived_at: DateTime<Utc>,
}

/// Renders a label to PDF bytes.
pub fn render(label: &Label<'_>) -> Result<Vec<u8>, LabelError> {
    if label.public_id.is_empty() {
        return Err(LabelError::EmptyPublicId);
    }

    let qr = QrMatrix::encode(label.public_id)?;

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let bold_id = Ref::new(5);
    let regular_id = Ref::new(6);
    let info_id = Ref::new(7);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources()
        .fonts()
        .pair(BOLD, bold_id)
        .pair(REGULAR, regular_id);
    page.finish();

    pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));
    pdf.type1_font(regular_id).base_font(Name(b"Helvetica"));

    let content = draw(label, &qr);
    pdf.stream(content_id, &content);

    let title = format!("Parcel Label for {} ({})", label.name, label.public_id);
    pdf.document_info(info_id)
        .title(TextStr(&title))
        .producer(TextStr(PRODUCER));

    Ok(pdf.finish())
}

fn draw(label: &Label<'_>, qr: &QrMatrix) -> Vec<u8> {
    let mut content = Content::new();

    text(&mut content, BOLD, 7.0, 15.0, 15.0, CAPTION);

    let date = label.arrived_at.format("%Y-%m-%d").to_string();
    text(&mut content, REGULAR, 6.0, 15.0, 35.0, &format!("Date: {date}"));
    text(
        &mut content,
        REGULAR,
        6.0,
        15.0,
        35.0 + 6.0 * LINE_HEIGHT,
        &format!("Parcel ID: {}", label.public_id),
    );

    draw_qr(&mut content, qr);

    let size = 5.0;
    let width = text_width(label.public_id, size);
    let x = QR_X + ((QR_SIZE - width) / 2.0).max(0.0);
    text(&mut content, REGULAR, size, x, 46.0, label.public_id);

    // Cutting outline.
    content.save_state();
    content.set_line_width(1.0);
    content.set_dash_pattern([1.0, 1.0], 0.0);
    content.rect(10.0, PAGE_HEIGHT - 10.0 - 45.0, 110.0, 45.0);
    content.stroke();
    content.restore_state();

    content.finish()
}

/// Draws one line of text whose top edge sits at `top`.
fn text(content: &mut Content, font: Name<'_>, size: f32, x: f32, top: f32, value: &str) {
    let baseline = PAGE_HEIGHT - top - size * ASCENT;
    let bytes = printable(value);

    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, baseline);
    content.show(Str(&bytes));
    content.end_text();
}

fn draw_qr(content: &mut Content, qr: &QrMatrix) {
    let modules = qr.width() + 2 * QR_QUIET_ZONE;
    let module = QR_SIZE / modules as f32;
    let top = PAGE_HEIGHT - QR_Y;

    content.save_state();
    content.set_fill_gray(0.0);
    for y in 0..qr.width() {
        let row_top = top - (QR_QUIET_ZONE + y) as f32 * module;
        for (start, len) in qr.dark_runs(y) {
            let x = QR_X + (QR_QUIET_ZONE + start) as f32 * module;
            content.rect(x, row_top - module, len as f32 * module, module);
        }
    }
    content.fill_nonzero();
    content.restore_state();
}

/// The standard fonts only cover Latin-1 reliably; keep to printable ASCII.
fn printable(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c as u8 } else { b'?' })
        .collect()
}

/// Approximate rendered width of `value` in Helvetica at `size` pt.
fn text_width(value: &str, size: f32) -> f32 {
    let units: u32 = value.chars().map(helvetica_advance).sum();
    units as f32 * size / 1000.0
}

fn helvetica_advance(c: char) -> u32 {
    match c {
        '0'..='9' => 556,
        'f' | 't' | 'I' | ' ' | '.' | ':' => 278,
        'i' | 'j' | 'l' => 222,
        'r' | '-' => 333,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        'F' | 'T' | 'Z' => 611,
        'L' => 556,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        _ => 556,
    }
}
