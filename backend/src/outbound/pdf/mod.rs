//! Minimal deterministic PDF writer.
//!
//! Produces a one-page PDF 1.4 document with a fixed layout: a title line
//! and one row per identity field, all set in the built-in Helvetica font.
//! No timestamps or random identifiers are embedded, so the output is
//! byte-identical for the same template and identity.

use crate::domain::Identity;

/// Fixed layout rendered for a given identity.
#[derive(Debug, Clone, Copy)]
pub struct PdfTemplate {
    /// Attachment name, without the `.pdf` suffix.
    pub name: &'static str,
    /// Title line at the top of the page.
    pub title: &'static str,
}

/// Template backing the `/auth/pdf/` download.
pub static WELCOME_TEMPLATE: PdfTemplate = PdfTemplate {
    name: "welcome",
    title: "Welcome",
};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_LEFT: u32 = 72;
const TITLE_BASELINE: u32 = 720;
const TITLE_SIZE: u32 = 18;
const BODY_SIZE: u32 = 12;
const LINE_SPACING: u32 = 24;

/// Render the template for an identity.
pub fn build_pdf(template: &PdfTemplate, identity: &Identity) -> Vec<u8> {
    let body_lines = [
        format!("Name: {}", identity.name),
        format!("Email: {}", identity.email),
        format!("Role: {}", identity.role.as_str()),
    ];
    render_document(template.title, &body_lines)
}

/// Escape a string for a PDF literal string object.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            // Helvetica with the standard encoding only covers Latin-1;
            // anything else degrades to '?' rather than corrupting the file.
            ch if (' '..='\u{00FF}').contains(&ch) => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

fn content_stream(title: &str, body_lines: &[String]) -> String {
    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!("/F1 {TITLE_SIZE} Tf\n"));
    ops.push_str(&format!("{MARGIN_LEFT} {TITLE_BASELINE} Td\n"));
    ops.push_str(&format!("({}) Tj\n", escape_text(title)));
    ops.push_str(&format!("/F1 {BODY_SIZE} Tf\n"));
    for (index, line) in body_lines.iter().enumerate() {
        let dy = if index == 0 { 2 * LINE_SPACING } else { LINE_SPACING };
        ops.push_str(&format!("0 -{dy} Td\n"));
        ops.push_str(&format!("({}) Tj\n", escape_text(line)));
    }
    ops.push_str("ET\n");
    ops
}

fn render_document(title: &str, body_lines: &[String]) -> Vec<u8> {
    let stream = content_stream(title, body_lines);

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_owned(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
        ),
        format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_owned(),
    ];

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
