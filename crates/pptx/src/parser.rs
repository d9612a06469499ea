//! Slide text extraction implementation.

use quick_xml::events::Event;
use quick_xml::Reader;
use quiz_core::{ExtractionError, SlideText};
use regex::Regex;
use std::cmp::Ordering;
use std::io::{Cursor, Read, Seek};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use zip::ZipArchive;

/// Slide parts live directly under `ppt/slides/` as `slide<N>.xml`.
/// The capture is the suffix that should hold the slide number.
static SLIDE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide([^/]*)\.xml$").unwrap());

/// Extracts visible slide text from PPTX archives.
pub struct SlideTextExtractor;

impl SlideTextExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract all slide text as one blob, one `[Slide N] ...` line per slide
    /// that has text.
    pub fn extract<R: Read + Seek>(&self, reader: R) -> Result<String, ExtractionError> {
        let slides = self.extract_slides(reader)?;

        let mut output = String::new();
        for slide in &slides {
            output.push_str(&format!("[Slide {}] {}\n", slide.number, slide.text));
        }

        if output.is_empty() {
            return Err(ExtractionError::NoTextFound);
        }

        Ok(output)
    }

    /// Extract from an in-memory archive.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        self.extract(Cursor::new(bytes))
    }

    /// Extract the text of every slide that has any, in slide order.
    ///
    /// Slide numbers are positions in the sorted slide sequence, so a deck
    /// whose second slide is blank yields slides 1 and 3.
    pub fn extract_slides<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideText>, ExtractionError> {
        let mut archive = ZipArchive::new(reader).map_err(|e| {
            log::debug!("Failed to open ZIP: {}", e);
            ExtractionError::UnreadableArchive
        })?;

        let parts = self.slide_parts(&mut archive)?;
        log::debug!("Found {} slide parts", parts.len());

        let mut slides = Vec::new();
        for (position, part) in parts.iter().enumerate() {
            let content = self.read_part(&mut archive, part)?;
            let text = self.extract_runs_from_xml(&content, &part.name);
            if !text.is_empty() {
                slides.push(SlideText {
                    number: position + 1,
                    text,
                });
            }
        }

        Ok(slides)
    }

    /// List slide parts sorted by slide number.
    ///
    /// Parts whose number cannot be parsed keep their archive order and go
    /// after every numbered slide.
    fn slide_parts<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<SlidePart>, ExtractionError> {
        let mut parts = Vec::new();

        for index in 0..archive.len() {
            let file = archive.by_index(index).map_err(|e| {
                log::debug!("Failed to read entry {}: {}", index, e);
                ExtractionError::UnreadableArchive
            })?;
            let name = file.name().to_string();

            if let Some(caps) = SLIDE_PART_REGEX.captures(&name) {
                let suffix = &caps[1];
                let number = if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                    suffix.parse::<usize>().ok()
                } else {
                    None
                };
                if number.is_none() {
                    log::warn!(
                        "Slide part '{}' has no numeric suffix; placing it after numbered slides",
                        name
                    );
                }
                parts.push(SlidePart { index, name, number });
            }
        }

        parts.sort_by(|a, b| match (a.number, b.number) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Ok(parts)
    }

    /// Collect the text of every run (`a:t`) in a slide, joined by single
    /// spaces.
    fn extract_runs_from_xml(&self, xml_content: &str, part_name: &str) -> String {
        let mut reader = Reader::from_str(xml_content);
        let mut runs: Vec<String> = Vec::new();
        let mut current_run: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"t" => {
                    current_run = Some(String::new());
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(run) = current_run.as_mut() {
                        match e.unescape() {
                            Ok(text) => run.push_str(&text),
                            Err(err) => {
                                log::warn!("Bad escape in {} (keeping raw text): {}", part_name, err);
                                run.push_str(&String::from_utf8_lossy(e));
                            }
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(run) = current_run.as_mut() {
                        run.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"t" => {
                    if let Some(run) = current_run.take() {
                        if !run.is_empty() {
                            runs.push(run);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("XML parsing error in {} (keeping text so far): {}", part_name, e);
                    break;
                }
                _ => {}
            }
        }

        runs.join(" ").nfc().collect::<String>().trim().to_string()
    }

    /// Read a slide part from the archive as UTF-8.
    fn read_part<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        part: &SlidePart,
    ) -> Result<String, ExtractionError> {
        let mut file = archive.by_index(part.index).map_err(|e| {
            log::debug!("Failed to open '{}': {}", part.name, e);
            ExtractionError::UnreadableArchive
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| {
            log::debug!("Failed to read '{}': {}", part.name, e);
            ExtractionError::UnreadableArchive
        })?;

        Ok(content)
    }
}

impl Default for SlideTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// A slide entry located in the archive.
#[derive(Debug)]
struct SlidePart {
    /// Position in the archive's central directory.
    index: usize,
    name: String,
    number: Option<usize>,
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn slide_xml(runs: &[&str]) -> String {
        let body: String = runs
            .iter()
            .map(|r| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", r))
            .collect();
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
                r#"<p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
            ),
            body
        )
    }

    fn build_pptx(entries: &[(&str, String)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_numeric_slide_order() {
        let bytes = build_pptx(&[
            ("[Content_Types].xml", "<Types/>".to_string()),
            ("ppt/slides/slide1.xml", slide_xml(&["First"])),
            ("ppt/slides/slide10.xml", slide_xml(&["Tenth"])),
            ("ppt/slides/slide2.xml", slide_xml(&["Second"])),
        ]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] First\n[Slide 2] Second\n[Slide 3] Tenth\n");
    }

    #[test]
    fn test_order_independent_of_listing() {
        let mut entries: Vec<(String, String)> = (1..=12)
            .map(|n| (format!("ppt/slides/slide{}.xml", n), slide_xml(&[format!("S{}", n).as_str()])))
            .collect();
        entries.reverse();
        let refs: Vec<(&str, String)> = entries.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();

        let slides = SlideTextExtractor::new()
            .extract_slides(Cursor::new(build_pptx(&refs)))
            .unwrap();
        let texts: Vec<String> = slides.into_iter().map(|s| s.text).collect();
        let expected: Vec<String> = (1..=12).map(|n| format!("S{}", n)).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_runs_joined_with_spaces() {
        let bytes = build_pptx(&[(
            "ppt/slides/slide1.xml",
            slide_xml(&["Cell", "biology &amp; genetics", "overview"]),
        )]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] Cell biology & genetics overview\n");
    }

    #[test]
    fn test_blank_slides_keep_numbering() {
        let bytes = build_pptx(&[
            ("ppt/slides/slide1.xml", slide_xml(&["Intro"])),
            ("ppt/slides/slide2.xml", slide_xml(&[])),
            ("ppt/slides/slide3.xml", slide_xml(&["Summary"])),
        ]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] Intro\n[Slide 3] Summary\n");
    }

    #[test]
    fn test_ignores_non_slide_parts() {
        let bytes = build_pptx(&[
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>".to_string()),
            ("ppt/slideLayouts/slideLayout1.xml", slide_xml(&["Layout title"])),
            ("ppt/notesSlides/notesSlide1.xml", slide_xml(&["Speaker notes"])),
            ("ppt/slides/slide1.xml", slide_xml(&["Body"])),
        ]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] Body\n");
    }

    #[test]
    fn test_unparsable_suffix_goes_last() {
        let bytes = build_pptx(&[
            ("ppt/slides/slideExtra.xml", slide_xml(&["Extra"])),
            ("ppt/slides/slide2.xml", slide_xml(&["Two"])),
            ("ppt/slides/slide1.xml", slide_xml(&["One"])),
        ]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] One\n[Slide 2] Two\n[Slide 3] Extra\n");
    }

    #[test]
    fn test_signed_suffix_is_not_a_number() {
        let bytes = build_pptx(&[
            ("ppt/slides/slide+3.xml", slide_xml(&["Plus"])),
            ("ppt/slides/slide2.xml", slide_xml(&["Two"])),
            ("ppt/slides/slide1.xml", slide_xml(&["One"])),
        ]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] One\n[Slide 2] Two\n[Slide 3] Plus\n");
    }

    #[test]
    fn test_no_text_found() {
        let bytes = build_pptx(&[
            ("ppt/slides/slide1.xml", slide_xml(&[])),
            ("ppt/slides/slide2.xml", slide_xml(&["   "])),
        ]);

        assert_eq!(
            SlideTextExtractor::new().extract_bytes(&bytes),
            Err(ExtractionError::NoTextFound)
        );
    }

    #[test]
    fn test_archive_without_slides() {
        let bytes = build_pptx(&[("docProps/app.xml", "<Properties/>".to_string())]);
        assert_eq!(
            SlideTextExtractor::new().extract_bytes(&bytes),
            Err(ExtractionError::NoTextFound)
        );
    }

    #[test]
    fn test_unreadable_archive() {
        assert_eq!(
            SlideTextExtractor::new().extract_bytes(b"%PDF-1.7 definitely not a zip"),
            Err(ExtractionError::UnreadableArchive)
        );
    }

    #[test]
    fn test_malformed_slide_keeps_earlier_runs() {
        let bytes = build_pptx(&[(
            "ppt/slides/slide1.xml",
            "<p:sld><a:t>Kept</a:t><a:t>Broken</b:oops></p:sld>".to_string(),
        )]);

        let text = SlideTextExtractor::new().extract_bytes(&bytes).unwrap();
        assert_eq!(text, "[Slide 1] Kept\n");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"t"), b"t");
    }
}
