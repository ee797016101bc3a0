//! Line-addressable text extraction.
//!
//! Turns raw upload bytes into [`AddressableText`]: every non-blank source
//! line is tagged with the [`Marker`] a model answer will later cite.
//!
//! - PDF: one page at a time, `[Page P, Line L]`, line numbering restarts
//!   on every page.
//! - TXT: `[Line L]`, numbered continuously across the file.
//!
//! Blank lines are kept as bare newlines so numbering stays aligned with
//! the source.

use docent_core::document::{AddressableText, AddressableTextWriter, Marker, SourceKind};
use docent_core::error::ExtractionError;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Extract addressable text from `bytes` declared as `kind`.
///
/// PDF parsing is CPU-bound and runs on the blocking pool. Any parse
/// failure discards the whole document; a document without a single
/// non-blank line is also a failure.
pub async fn extract(bytes: Vec<u8>, kind: SourceKind) -> Result<AddressableText, ExtractionError> {
    let text = match kind {
        SourceKind::Pdf => {
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
            })
            .await
            .map_err(|e| ExtractionError::Corrupt {
                kind,
                reason: format!("PDF parser task failed: {e}"),
            })?
            .map_err(|e| ExtractionError::Corrupt {
                kind,
                reason: e.to_string(),
            })?;

            debug!(pages = pages.len(), "Parsed PDF");
            annotate_pages(&pages)
        }
        SourceKind::Text => {
            let content = std::str::from_utf8(&bytes).map_err(|e| ExtractionError::Corrupt {
                kind,
                reason: format!("invalid UTF-8: {e}"),
            })?;
            annotate_lines(content.strip_prefix(UTF8_BOM).unwrap_or(content))
        }
    };

    if text.marked_lines() == 0 {
        warn!(kind = %kind, "Document has no extractable text");
        return Err(ExtractionError::Empty { kind });
    }

    debug!(
        kind = %kind,
        lines = text.marked_lines(),
        chars = text.len(),
        "Extracted addressable text"
    );
    Ok(text)
}

/// Annotate already-extracted page texts with `[Page P, Line L]` markers.
///
/// A page with no text contributes nothing.
pub fn annotate_pages<S: AsRef<str>>(pages: &[S]) -> AddressableText {
    let mut writer = AddressableTextWriter::new();
    for (page_index, page) in pages.iter().enumerate() {
        let page_number = page_index as u32 + 1;
        for (line_index, line) in page.as_ref().lines().enumerate() {
            if line.trim().is_empty() {
                writer.push_blank();
            } else {
                writer.push_line(
                    Marker::Page {
                        page: page_number,
                        line: line_index as u32 + 1,
                    },
                    line,
                );
            }
        }
    }
    writer.finish()
}

/// Annotate flat text with continuously numbered `[Line L]` markers.
pub fn annotate_lines(content: &str) -> AddressableText {
    let mut writer = AddressableTextWriter::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            writer.push_blank();
        } else {
            writer.push_line(
                Marker::Line {
                    line: index as u32 + 1,
                },
                line,
            );
        }
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_lines_keep_blank_numbering() {
        let text = annotate_lines("Hello\n\nWorld");
        assert_eq!(text.as_str(), "[Line 1] Hello\n\n[Line 3] World\n");
        assert_eq!(text.marked_lines(), 2);
    }

    #[test]
    fn flat_lines_number_continuously() {
        let content = (1..=12).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let text = annotate_lines(&content);
        let markers = Marker::find_all(text.as_str());
        assert_eq!(markers.len(), 12);
        for (i, marker) in markers.iter().enumerate() {
            assert_eq!(*marker, Marker::Line { line: i as u32 + 1 });
        }
    }

    #[test]
    fn crlf_and_trailing_newline() {
        let text = annotate_lines("one\r\ntwo\r\n");
        assert_eq!(text.as_str(), "[Line 1] one\n[Line 2] two\n");
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        let text = annotate_lines("a\n   \t\nb");
        assert_eq!(text.as_str(), "[Line 1] a\n\n[Line 3] b\n");
    }

    #[test]
    fn line_content_is_not_trimmed() {
        let text = annotate_lines("  indented");
        assert_eq!(text.as_str(), "[Line 1]   indented\n");
    }

    #[test]
    fn pages_reset_line_numbers() {
        let pages = ["Intro\n\nScope", "", "Results\nMore"];
        let text = annotate_pages(&pages);
        assert_eq!(
            text.as_str(),
            "[Page 1, Line 1] Intro\n\n[Page 1, Line 3] Scope\n\
             [Page 3, Line 1] Results\n[Page 3, Line 2] More\n"
        );
        assert_eq!(text.marked_lines(), 4);
    }

    #[test]
    fn every_marker_resolves_to_its_source_line() {
        let pages = ["alpha\nbeta", "gamma"];
        let text = annotate_pages(&pages);
        assert_eq!(text.resolve(&Marker::Page { page: 1, line: 2 }), Some("beta"));
        assert_eq!(text.resolve(&Marker::Page { page: 2, line: 1 }), Some("gamma"));
        assert_eq!(text.resolve(&Marker::Page { page: 2, line: 2 }), None);
    }

    #[tokio::test]
    async fn extract_text_file() {
        let text = extract(b"Hello\n\nWorld\n".to_vec(), SourceKind::Text)
            .await
            .unwrap();
        assert_eq!(text.as_str(), "[Line 1] Hello\n\n[Line 3] World\n");
    }

    #[tokio::test]
    async fn extract_strips_bom() {
        let mut bytes = "\u{feff}First".as_bytes().to_vec();
        bytes.extend_from_slice(b"\nSecond");
        let text = extract(bytes, SourceKind::Text).await.unwrap();
        assert_eq!(text.as_str(), "[Line 1] First\n[Line 2] Second\n");
    }

    #[tokio::test]
    async fn invalid_utf8_is_corrupt() {
        let err = extract(vec![0x66, 0x6f, 0xff, 0xfe], SourceKind::Text)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Corrupt {
                kind: SourceKind::Text,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blank_document_is_empty() {
        let err = extract(b"\n   \n\n".to_vec(), SourceKind::Text)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Empty {
                kind: SourceKind::Text
            }
        ));
    }

    /// A minimal PDF with one Helvetica text line per entry, one page per
    /// slice, with a correct xref table.
    fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let font_id = 3 + 2 * pages.len();
        let mut objects: Vec<String> = Vec::new();

        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".into());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ));
        for (i, lines) in pages.iter().enumerate() {
            let mut content = String::from("BT /F1 12 Tf 72 720 Td\n");
            for (n, line) in lines.iter().enumerate() {
                if n > 0 {
                    content.push_str("0 -20 Td ");
                }
                content.push_str(&format!("({line}) Tj\n"));
            }
            content.push_str("ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".into());

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = pdf.len();
        pdf.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    fn marker_of(text: &AddressableText, content: &str) -> Marker {
        let line = text
            .as_str()
            .lines()
            .find(|l| l.trim_end().ends_with(content))
            .unwrap_or_else(|| panic!("{content:?} missing from {:?}", text.as_str()));
        Marker::find_all(line)[0]
    }

    #[tokio::test]
    async fn extract_pdf_numbers_lines_per_page() {
        let pdf = build_pdf(&[&["Alpha line", "Beta line"], &["Gamma line", "Delta line"]]);
        let text = extract(pdf, SourceKind::Pdf).await.unwrap();

        let alpha = marker_of(&text, "Alpha line");
        let beta = marker_of(&text, "Beta line");
        let gamma = marker_of(&text, "Gamma line");
        let delta = marker_of(&text, "Delta line");

        let (Marker::Page { page: 1, line: alpha_line }, Marker::Page { page: 1, line: beta_line }) =
            (alpha, beta)
        else {
            panic!("first page markers: {alpha} {beta}");
        };
        let (Marker::Page { page: 2, line: gamma_line }, Marker::Page { page: 2, line: delta_line }) =
            (gamma, delta)
        else {
            panic!("second page markers: {gamma} {delta}");
        };

        // Same layout on both pages, so numbering restarts identically
        assert!(alpha_line < beta_line);
        assert_eq!(gamma_line, alpha_line);
        assert_eq!(delta_line, beta_line);
        assert_eq!(text.marked_lines(), 4);
        assert_eq!(text.resolve(&gamma).map(str::trim_end), Some("Gamma line"));
    }

    #[tokio::test]
    async fn garbage_pdf_is_corrupt() {
        let err = extract(b"definitely not a pdf".to_vec(), SourceKind::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Corrupt {
                kind: SourceKind::Pdf,
                ..
            }
        ));
    }
}
