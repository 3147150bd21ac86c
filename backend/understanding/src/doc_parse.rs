//! Document Parsing Pipeline
//!
//! Cracks open Word (`.docx`) containers: paragraph text comes straight from
//! `word/document.xml`, and every embedded raster image referenced from
//! `word/_rels/document.xml.rels` is pushed through OCR so text inside scanned
//! pages pasted into a memo is not lost.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use async_trait::async_trait;
use docket_core::{DocketError, DocumentFormat, TextExtractor, UploadedFile};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::ocr::OcrExtractor;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";
const IMAGE_REL_SUFFIX: &str = "/relationships/image";
/// Upper bound for any single part read out of the container.
pub const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

static STRUCTURE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)(w:p|mc:Fallback)(?:\s[^>]*)?/?>").unwrap());
static RUN_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>").unwrap()
});
static RELATIONSHIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<Relationship\s[^>]*>").unwrap());
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z:]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").unwrap());

/// An image part stored inside the container.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub part_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct DocxContent {
    /// Paragraph texts in body order; empty paragraphs are kept.
    pub paragraphs: Vec<String>,
    /// Raster images in relationship order.
    pub images: Vec<EmbeddedImage>,
}

/// Parse a `.docx` payload into paragraphs and embedded raster images.
pub fn parse_docx(bytes: &[u8]) -> Result<DocxContent> {
    parse_docx_with_limit(bytes, MAX_PART_BYTES)
}

/// Like [`parse_docx`], failing when any part inflates past `limit` bytes.
pub fn parse_docx_with_limit(bytes: &[u8], limit: u64) -> Result<DocxContent> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocketError::Extraction(format!("not a valid docx container: {e}")))?;

    let document = read_part(&mut archive, DOCUMENT_PART, limit)?.ok_or_else(|| {
        DocketError::Extraction(format!("docx container has no {DOCUMENT_PART}"))
    })?;
    let document = String::from_utf8_lossy(&document);
    let paragraphs = extract_paragraphs(&document);

    let mut images = Vec::new();
    if let Some(rels) = read_part(&mut archive, RELS_PART, limit)? {
        for target in image_targets(&String::from_utf8_lossy(&rels)) {
            let part_name = resolve_target("word", &target);
            let Some(content_type) = raster_content_type(&part_name) else {
                debug!(part = %part_name, "Skipping non-raster image");
                continue;
            };
            match read_part(&mut archive, &part_name, limit)? {
                Some(bytes) => images.push(EmbeddedImage {
                    part_name,
                    content_type,
                    bytes,
                }),
                None => debug!(part = %part_name, "Image relationship points at a missing part"),
            }
        }
    }

    Ok(DocxContent { paragraphs, images })
}

/// Read one part, trusting only the bytes that actually inflate and never
/// the size the central directory declares.
fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    limit: u64,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(file) => {
            let mut buf = Vec::new();
            file.take(limit.saturating_add(1))
                .read_to_end(&mut buf)
                .with_context(|| format!("failed to read {name} from docx"))?;
            if buf.len() as u64 > limit {
                return Err(DocketError::Extraction(format!(
                    "{name} in docx exceeds {limit} bytes"
                ))
                .into());
            }
            Ok(Some(buf))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(DocketError::Extraction(format!("failed to open {name}: {e}")).into()),
    }
}

/// Paragraph texts from `word/document.xml`, one entry per `<w:p>`.
///
/// A paragraph keeps only its own runs. Paragraphs nested inside it (text
/// boxes) become separate entries right after it, and `mc:Fallback`
/// subtrees are skipped because they repeat the preferred rendition.
pub fn extract_paragraphs(xml: &str) -> Vec<String> {
    let mut slots: Vec<String> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut fallback_depth = 0usize;
    let mut cursor = 0;

    for tag in STRUCTURE_TAG_RE.captures_iter(xml) {
        let whole = &tag[0];
        let start = tag.get(0).map_or(cursor, |m| m.start());
        if fallback_depth == 0 {
            if let Some(&slot) = open.last() {
                slots[slot].push_str(&paragraph_text(&xml[cursor..start]));
            }
        }
        cursor = start + whole.len();

        let closing = &tag[1] == "/";
        let self_closing = whole.ends_with("/>");
        match &tag[2] {
            "mc:Fallback" if self_closing => {}
            "mc:Fallback" if closing => fallback_depth = fallback_depth.saturating_sub(1),
            "mc:Fallback" => fallback_depth += 1,
            _ if fallback_depth > 0 => {}
            _ if closing => {
                open.pop();
            }
            _ => {
                slots.push(String::new());
                if !self_closing {
                    open.push(slots.len() - 1);
                }
            }
        }
    }
    slots
}

fn paragraph_text(inner: &str) -> String {
    let mut text = String::new();
    for token in RUN_TOKEN_RE.captures_iter(inner) {
        match token.get(1) {
            Some(run) => text.push_str(&unescape_xml(run.as_str())),
            None if token[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

/// Targets of internal image relationships, in declaration order.
fn image_targets(rels_xml: &str) -> Vec<String> {
    RELATIONSHIP_RE
        .find_iter(rels_xml)
        .filter_map(|tag| {
            let mut rel_type = None;
            let mut target = None;
            let mut external = false;
            for attr in ATTR_RE.captures_iter(tag.as_str()) {
                let value = attr.get(2).or_else(|| attr.get(3)).map(|m| m.as_str());
                match &attr[1] {
                    "Type" => rel_type = value,
                    "Target" => target = value,
                    "TargetMode" => external = value == Some("External"),
                    _ => {}
                }
            }
            match (rel_type, target) {
                (Some(t), Some(target)) if t.ends_with(IMAGE_REL_SUFFIX) && !external => {
                    Some(unescape_xml(target))
                }
                _ => None,
            }
        })
        .collect()
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// MIME type for image parts the OCR service can read. Vector formats
/// (emf, wmf, svg) and gif return `None`.
fn raster_content_type(part_name: &str) -> Option<&'static str> {
    let ext = part_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "heif" | "heic" => Some("image/heif"),
        _ => None,
    }
}

fn unescape_xml(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY_RE
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .unwrap_or_else(|| entity[1..].parse::<u32>())
                    .ok()
                    .and_then(char::from_u32),
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Office extractor: everything [`OcrExtractor`] handles, plus `.docx`.
#[derive(Clone)]
pub struct OfficeExtractor {
    ocr: OcrExtractor,
}

impl OfficeExtractor {
    pub fn new(ocr: OcrExtractor) -> Self {
        Self { ocr }
    }

    async fn extract_docx(&self, file: &UploadedFile) -> Result<String> {
        let content = parse_docx(&file.bytes)?;
        info!(
            file = %file.name,
            paragraphs = content.paragraphs.len(),
            images = content.images.len(),
            "Parsed docx"
        );

        let mut entries = content.paragraphs;
        for image in &content.images {
            let text = self
                .ocr
                .ocr_text(&image.bytes, image.content_type)
                .await
                .with_context(|| format!("embedded image {} in {}", image.part_name, file.name))?;
            entries.push(text);
        }
        Ok(join_non_blank(entries))
    }
}

/// Drop whitespace-only entries and join the rest with `\n`.
fn join_non_blank(entries: Vec<String>) -> String {
    entries
        .into_iter()
        .filter(|e| !e.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextExtractor for OfficeExtractor {
    fn name(&self) -> &str {
        "office"
    }

    fn supports(&self, _format: DocumentFormat) -> bool {
        true
    }

    async fn extract(&self, file: &UploadedFile) -> Result<String> {
        match file.format {
            DocumentFormat::Docx => self.extract_docx(file).await,
            _ => self.ocr.extract(file).await,
        }
    }
}
