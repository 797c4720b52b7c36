//! In-memory Open Packaging Convention archive: the ZIP layer under `.xlsx`.

use crate::detect::is_zip_file;
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::cell::RefCell;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// Relationship type from the package to its main part.
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type from a workbook to its shared string table.
pub const SHARED_STRINGS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Relationship type from a workbook to its style sheet.
pub const STYLES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// One `<Relationship>` of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Relationships of one part, in file order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse the XML of a `.rels` part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut entries = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                    };
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.local_name().as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            _ => {}
                        }
                    }
                    if !rel.id.is_empty() {
                        entries.push(rel);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    /// Relationship with the given id.
    pub fn find(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    /// First relationship of the given type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.rel_type == rel_type)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Path of the `.rels` part describing `part`: `xl/workbook.xml` maps to
/// `xl/_rels/workbook.xml.rels`, the package itself (`""`) to `_rels/.rels`.
pub fn rels_path(part: &str) -> String {
    match part.trim_start_matches('/').rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part.trim_start_matches('/')),
    }
}

/// Resolve a relationship target against the part that owns it.
///
/// Absolute targets (`/xl/...`) are taken from the package root; `..`
/// segments climb out of the owner's directory.
pub fn resolve_target(owner: &str, target: &str) -> String {
    let mut segments: Vec<&str> = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => {
            let owner = owner.trim_start_matches('/');
            match owner.rsplit_once('/') {
                Some((dir, _)) => dir.split('/').collect(),
                None => Vec::new(),
            }
        }
    };

    for segment in target.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    segments.join("/")
}

/// Decode the bytes of an XML part.
///
/// Parts are UTF-8, optionally with a BOM. A UTF-16 BOM switches to UTF-16,
/// and the declaration is rewritten to match the decoded text. Invalid UTF-8
/// is replaced rather than rejected.
pub fn decode_part(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return Ok(String::from_utf8_lossy(rest).into_owned());
    }
    let text = if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        decode_utf16(rest, u16::from_le_bytes)?
    } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        decode_utf16(rest, u16::from_be_bytes)?
    } else {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    };
    Ok(declare_utf8(text))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|err| Error::InvalidData(format!("bad UTF-16 in XML part: {}", err)))
}

fn declare_utf8(text: String) -> String {
    let end = match text.find("?>") {
        Some(end) if text.starts_with("<?xml") => end,
        _ => return text,
    };
    let declaration = text[..end].to_ascii_lowercase();
    match declaration.find("utf-16") {
        Some(at) => format!("{}UTF-8{}", &text[..at], &text[at + "utf-16".len()..]),
        None => text,
    }
}

/// A package archive held in memory for the duration of one conversion.
pub struct Package {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
}

impl Package {
    /// Open the archive. Fails when `data` is not a ZIP file.
    pub fn open(data: Vec<u8>) -> Result<Self> {
        if !is_zip_file(&data) {
            return Err(Error::ZipArchive("not a ZIP archive".to_string()));
        }
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Number of entries in the archive.
    pub(crate) fn len(&self) -> usize {
        self.archive.borrow().len()
    }

    /// Read a part as text, or `None` when the archive has no such entry.
    pub fn read_optional_xml(&self, path: &str) -> Result<Option<String>> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = match archive.by_name(path.trim_start_matches('/')) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        decode_part(&bytes).map(Some)
    }

    /// Read a part that must exist.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        self.read_optional_xml(path)?
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Relationships of `part`; none when its `.rels` part is absent.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.read_optional_xml(&rels_path(part))? {
            Some(xml) => Relationships::parse(&xml),
            None => Ok(Relationships::default()),
        }
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package").field("entries", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_path("/xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_path(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../sharedStrings.xml"),
            "xl/sharedStrings.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
        assert_eq!(resolve_target("", "./xl/workbook.xml"), "xl/workbook.xml");
    }

    #[test]
    fn test_relationship_lookup() {
        let rels = Relationships::parse(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://test/sheet" Target="b.xml"/>
  <Relationship Id="rId1" Type="http://test/sheet" Target="a&amp;b.xml"/>
  <Relationship Type="http://test/sheet" Target="no-id.xml"/>
</Relationships>"#,
        )
        .unwrap();

        assert_eq!(rels.len(), 2);
        assert_eq!(rels.find("rId1").unwrap().target, "a&b.xml");
        assert!(rels.find("rId3").is_none());
        assert_eq!(rels.first_of_type("http://test/sheet").unwrap().id, "rId2");
        assert!(rels.first_of_type("http://test/other").is_none());
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = Package::open(b"name,age\nann,3\n".to_vec());
        assert!(matches!(result, Err(Error::ZipArchive(_))));
    }

    #[test]
    fn test_read_parts_and_relationships() {
        let data = build_zip(&[
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://test/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            ("xl/workbook.xml", "<workbook/>"),
        ]);

        let package = Package::open(data).unwrap();
        assert_eq!(package.len(), 2);
        assert_eq!(package.read_xml("xl/workbook.xml").unwrap(), "<workbook/>");
        assert_eq!(package.read_xml("/xl/workbook.xml").unwrap(), "<workbook/>");
        assert!(matches!(
            package.read_xml("xl/missing.xml"),
            Err(Error::MissingComponent(_))
        ));
        assert!(package.read_optional_xml("xl/missing.xml").unwrap().is_none());

        let rels = package.relationships("xl/workbook.xml").unwrap();
        assert_eq!(rels.find("rId1").unwrap().target, "worksheets/sheet1.xml");
        assert_eq!(package.relationships("").unwrap().len(), 0);
    }

    #[test]
    fn test_decode_part_encodings() {
        assert_eq!(decode_part(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
        assert_eq!(decode_part(b"<a>\xFF</a>").unwrap(), "<a>\u{FFFD}</a>");
        assert_eq!(decode_part(b"\xFF\xFE<\0a\0/\0>\0").unwrap(), "<a/>");
        assert_eq!(decode_part(b"\xFE\xFF\0<\0a\0/\0>").unwrap(), "<a/>");
    }

    #[test]
    fn test_utf16_declaration_rewritten() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-16\"?><a/>";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in xml.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(
            decode_part(&bytes).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>"
        );
    }
}
