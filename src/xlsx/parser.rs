//! XLSX reader implementation.

use crate::error::{Error, Result};
use crate::model::{Row, Table};
use crate::package::{
    resolve_target, Package, Relationships, OFFICE_DOCUMENT_REL, SHARED_STRINGS_REL, STYLES_REL,
};
use quick_xml::events::{BytesStart, Event};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::cell::{CellRef, CellValue, MAX_COL, MAX_ROW};
use super::formula::SharedFormula;
use super::shared_strings::SharedStrings;
use super::styles::{serial_to_datetime, Styles};

const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";
const DEFAULT_SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";
const DEFAULT_STYLES_PATH: &str = "xl/styles.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Cells of one worksheet, keyed by 0-based row then column index.
///
/// Only rows and cells present in the worksheet part are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: BTreeMap<u32, BTreeMap<u32, CellValue>>,
}

impl Sheet {
    /// Cells of a row in column order, if the row is present.
    pub fn row(&self, index: u32) -> Option<impl Iterator<Item = &CellValue>> {
        self.rows.get(&index).map(|cells| cells.values())
    }

    /// Index of the last row present in the sheet.
    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of rows present.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the sheet as a table.
    ///
    /// Row 0, when present, is emitted first as the header. Data rows are then
    /// emitted from `start_row` through the last row. Only a `start_row` of
    /// exactly 0 is moved past the header; a negative `start_row` scans from
    /// row 0, so the header appears again as the first data row. Absent rows
    /// are skipped and cells keep the sheet's own ragged shape.
    pub fn to_table(&self, start_row: i64) -> Table {
        let mut table = Table::new();
        let mut start_row = start_row;

        if let Some(header) = self.rows.get(&0) {
            table.add_row(render_row(header));
            if start_row == 0 {
                start_row = 1;
            }
        }

        // Indices below 0 hold no rows.
        let start = u32::try_from(start_row.max(0)).unwrap_or(u32::MAX);
        if let Some(last) = self.last_row_index() {
            if start <= last {
                for cells in self.rows.range(start..=last).map(|(_, cells)| cells) {
                    table.add_row(render_row(cells));
                }
            }
        }

        table
    }
}

fn render_row(cells: &BTreeMap<u32, CellValue>) -> Row {
    cells.values().map(CellValue::to_string).collect()
}

/// Reader for the first worksheet of an XLSX workbook.
pub struct XlsxReader {
    package: Package,
    workbook_path: String,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    relationships: Relationships,
    date1904: bool,
}

impl XlsxReader {
    /// Open a workbook held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_package(Package::open(data)?)
    }

    fn from_package(package: Package) -> Result<Self> {
        let workbook_path = package
            .relationships("")?
            .first_of_type(OFFICE_DOCUMENT_REL)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string());

        let workbook_xml = package.read_xml(&workbook_path)?;
        let (sheets, date1904) = Self::parse_workbook(&workbook_xml)?;
        let relationships = package.relationships(&workbook_path)?;
        let part_path = |rel_type: &str, default: &str| {
            relationships
                .first_of_type(rel_type)
                .map(|rel| resolve_target(&workbook_path, &rel.target))
                .unwrap_or_else(|| default.to_string())
        };

        let shared_strings =
            match package.read_optional_xml(&part_path(SHARED_STRINGS_REL, DEFAULT_SHARED_STRINGS_PATH))? {
                Some(xml) => SharedStrings::parse(&xml)?,
                None => SharedStrings::default(),
            };

        let styles = match package.read_optional_xml(&part_path(STYLES_REL, DEFAULT_STYLES_PATH))? {
            Some(xml) => Styles::parse(&xml),
            None => Styles::default(),
        };

        debug!(
            workbook = %workbook_path,
            entries = package.len(),
            sheets = sheets.len(),
            relationships = relationships.len(),
            shared_strings = shared_strings.len(),
            date1904,
            "opened workbook"
        );

        Ok(Self {
            package,
            workbook_path,
            shared_strings,
            styles,
            sheets,
            relationships,
            date1904,
        })
    }

    /// Parse workbook.xml for sheet info and the date system.
    fn parse_workbook(xml: &str) -> Result<(Vec<SheetInfo>, bool)> {
        let mut sheets = Vec::new();
        let mut date1904 = false;

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = String::new();
                        let mut rel_id = String::new();

                        for attr in e.attributes().flatten() {
                            match attr.key.local_name().as_ref() {
                                b"name" => {
                                    name = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                b"id" => {
                                    rel_id = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }

                        sheets.push(SheetInfo { name, rel_id });
                    }
                    b"workbookPr" => {
                        date1904 = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.as_ref() == b"date1904")
                            .is_some_and(|attr| matches!(attr.value.as_ref(), b"1" | b"true"));
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date1904))
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether the workbook uses the 1904 date system.
    pub fn is_date1904(&self) -> bool {
        self.date1904
    }

    /// Read the first sheet. Any further sheets are ignored.
    pub fn first_sheet(&self) -> Result<Sheet> {
        let info = self.sheets.first().ok_or(Error::NoSheets)?;
        let rel = self.relationships.find(&info.rel_id).ok_or_else(|| {
            Error::MissingComponent(format!("relationship {} of sheet {}", info.rel_id, info.name))
        })?;
        let sheet_path = resolve_target(&self.workbook_path, &rel.target);

        debug!(sheet = %info.name, path = %sheet_path, of = self.sheet_count(), "reading first sheet");
        let xml = self.package.read_xml(&sheet_path)?;
        self.parse_sheet(&xml)
    }

    /// Read the first sheet as a table starting at `start_row`.
    pub fn read_table(&self, start_row: i64) -> Result<Table> {
        Ok(self.first_sheet()?.to_table(start_row))
    }

    /// Parse a worksheet XML into rows of typed cells.
    pub fn parse_sheet(&self, xml: &str) -> Result<Sheet> {
        let mut sheet = Sheet::default();
        let mut shared_formulas: HashMap<String, SharedFormula> = HashMap::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut current_row: Option<u32> = None;
        let mut last_row: Option<u32> = None;
        let mut last_col: Option<u32> = None;
        let mut cell: Option<RawCell> = None;
        let mut target = TextTarget::None;
        let mut in_inline = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        let index = row_index(&e, last_row)?;
                        sheet.rows.entry(index).or_default();
                        current_row = Some(index);
                        last_row = Some(index);
                        last_col = None;
                    }
                    b"c" => {
                        if let Some(row) = current_row {
                            cell = Some(RawCell::open(&e, row, last_col)?);
                        }
                    }
                    b"v" if cell.is_some() => target = TextTarget::Value,
                    b"f" => {
                        if let Some(ref mut raw) = cell {
                            raw.formula = Some(FormulaPart::open(&e));
                            target = TextTarget::Formula;
                        }
                    }
                    b"is" => in_inline = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if in_inline && !in_phonetic => {
                        if let Some(ref mut raw) = cell {
                            raw.inline.get_or_insert_with(String::new);
                            target = TextTarget::Inline;
                        }
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => {
                        let index = row_index(&e, last_row)?;
                        sheet.rows.entry(index).or_default();
                        last_row = Some(index);
                    }
                    b"c" => {
                        if let Some(row) = current_row {
                            let raw = RawCell::open(&e, row, last_col)?;
                            last_col = Some(raw.at.col);
                            let (col, value) = self.resolve_cell(raw, &mut shared_formulas);
                            sheet.rows.entry(row).or_default().insert(col, value);
                        }
                    }
                    b"f" => {
                        if let Some(ref mut raw) = cell {
                            raw.formula = Some(FormulaPart::open(&e));
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if target != TextTarget::None {
                        let text = e.unescape()?;
                        if let Some(ref mut raw) = cell {
                            raw.push_text(target, &text);
                        }
                    }
                }
                Event::CData(e) => {
                    if target != TextTarget::None {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        if let Some(ref mut raw) = cell {
                            raw.push_text(target, &text);
                        }
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"row" => current_row = None,
                    b"c" => {
                        if let (Some(raw), Some(row)) = (cell.take(), current_row) {
                            last_col = Some(raw.at.col);
                            let (col, value) = self.resolve_cell(raw, &mut shared_formulas);
                            sheet.rows.entry(row).or_default().insert(col, value);
                        }
                        in_inline = false;
                    }
                    b"v" | b"f" | b"t" => target = TextTarget::None,
                    b"is" => in_inline = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Type a raw cell. Unreadable cells are logged and become blank.
    fn resolve_cell(
        &self,
        raw: RawCell,
        shared_formulas: &mut HashMap<String, SharedFormula>,
    ) -> (u32, CellValue) {
        let at = raw.at;
        match self.cell_value(raw, shared_formulas) {
            Ok(value) => (at.col, value),
            Err(err) => {
                warn!(cell = %at, error = %err, "unreadable cell, using empty value");
                (at.col, CellValue::Blank)
            }
        }
    }

    fn cell_value(
        &self,
        raw: RawCell,
        shared_formulas: &mut HashMap<String, SharedFormula>,
    ) -> Result<CellValue> {
        if let Some(formula) = raw.formula {
            return Ok(CellValue::Formula(formula.resolve(raw.at, shared_formulas)?));
        }

        match raw.cell_type.as_deref() {
            Some("s") => {
                let Some(value) = raw.value else {
                    return Ok(CellValue::Blank);
                };
                let index: usize = value.trim().parse().map_err(|_| {
                    Error::InvalidData(format!("shared string index {:?}", value))
                })?;
                self.shared_strings
                    .get(index)
                    .map(|s| CellValue::Text(s.to_string()))
                    .ok_or_else(|| {
                        Error::InvalidData(format!("shared string {} out of range", index))
                    })
            }
            Some("inlineStr") => Ok(raw
                .inline
                .or(raw.value)
                .map(CellValue::Text)
                .unwrap_or(CellValue::Blank)),
            Some("str") => Ok(raw.value.map(CellValue::Text).unwrap_or(CellValue::Blank)),
            Some("b") => Ok(raw
                .value
                .map(|v| CellValue::Boolean(v.trim() == "1"))
                .unwrap_or(CellValue::Blank)),
            Some("e") => Ok(CellValue::Error(raw.value.unwrap_or_default())),
            Some("n") | None => {
                let Some(value) = raw.value else {
                    return Ok(CellValue::Blank);
                };
                let number: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::InvalidData(format!("number {:?}", value)))?;
                let is_date = raw.style.is_some_and(|s| self.styles.is_date_style(s));
                if is_date {
                    if let Some(date) = serial_to_datetime(number, self.is_date1904()) {
                        return Ok(CellValue::Date(date));
                    }
                }
                Ok(CellValue::Number(number))
            }
            Some(other) => Err(Error::InvalidData(format!("cell type {:?}", other))),
        }
    }
}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("workbook_path", &self.workbook_path)
            .field("sheets", &self.sheet_names())
            .field("date1904", &self.date1904)
            .finish()
    }
}

/// Where character data inside a cell goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

/// The `<f>` element of a cell.
#[derive(Debug)]
struct FormulaPart {
    text: String,
    shared_index: Option<String>,
}

impl FormulaPart {
    fn open(e: &BytesStart<'_>) -> Self {
        let mut is_shared = false;
        let mut shared_index = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"t" => is_shared = attr.value.as_ref() == b"shared",
                b"si" => shared_index = Some(String::from_utf8_lossy(&attr.value).to_string()),
                _ => {}
            }
        }
        Self {
            text: String::new(),
            shared_index: shared_index.filter(|_| is_shared),
        }
    }

    /// Formula text of the cell at `at`, registering or expanding shared formulas.
    fn resolve(
        self,
        at: CellRef,
        shared_formulas: &mut HashMap<String, SharedFormula>,
    ) -> Result<String> {
        let Some(index) = self.shared_index else {
            return Ok(self.text);
        };

        if !self.text.is_empty() {
            shared_formulas.insert(
                index,
                SharedFormula {
                    anchor: at,
                    text: self.text.clone(),
                },
            );
            return Ok(self.text);
        }

        shared_formulas
            .get(&index)
            .map(|shared| shared.expand_at(at))
            .ok_or_else(|| Error::InvalidData(format!("shared formula {} has no anchor", index)))
    }
}

/// A `<c>` element collected before typing.
#[derive(Debug)]
struct RawCell {
    at: CellRef,
    cell_type: Option<String>,
    style: Option<usize>,
    value: Option<String>,
    inline: Option<String>,
    formula: Option<FormulaPart>,
}

impl RawCell {
    fn open(e: &BytesStart<'_>, row: u32, last_col: Option<u32>) -> Result<Self> {
        let mut reference = None;
        let mut cell_type = None;
        let mut style = None;

        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"r" => reference = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"s" => style = String::from_utf8_lossy(&attr.value).trim().parse().ok(),
                _ => {}
            }
        }

        let col = match reference {
            Some(ref r) => CellRef::parse(r)
                .ok_or_else(|| Error::InvalidData(format!("cell reference {:?}", r)))?
                .col,
            None => last_col.map_or(0, |c| c + 1),
        };
        if col > MAX_COL {
            return Err(Error::InvalidData(format!("column {} out of range", col)));
        }

        Ok(Self {
            at: CellRef::new(row, col),
            cell_type,
            style,
            value: None,
            inline: None,
            formula: None,
        })
    }

    fn push_text(&mut self, target: TextTarget, text: &str) {
        match target {
            TextTarget::Value => self.value.get_or_insert_with(String::new).push_str(text),
            TextTarget::Inline => self.inline.get_or_insert_with(String::new).push_str(text),
            TextTarget::Formula => {
                if let Some(ref mut formula) = self.formula {
                    formula.text.push_str(text);
                }
            }
            TextTarget::None => {}
        }
    }
}

/// Row index from the `r` attribute, or the one after the previous row.
fn row_index(e: &BytesStart<'_>, last_row: Option<u32>) -> Result<u32> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            let text = String::from_utf8_lossy(&attr.value);
            let number: u32 = text
                .trim()
                .parse()
                .map_err(|_| Error::InvalidData(format!("row number {:?}", text)))?;
            if number == 0 || number - 1 > MAX_ROW {
                return Err(Error::InvalidData(format!("row number {} out of range", number)));
            }
            return Ok(number - 1);
        }
    }
    Ok(last_row.map_or(0, |r| r + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

    const STRINGS: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Name</t></si><si><t>Amount</t></si><si><t>Ann</t></si>
</sst>"#;

    fn reader() -> XlsxReader {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let parts = [
            (
                "xl/workbook.xml",
                r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            ("xl/sharedStrings.xml", STRINGS),
            ("xl/styles.xml", STYLES),
            ("xl/worksheets/sheet1.xml", "<worksheet><sheetData/></worksheet>"),
        ];
        for (name, body) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let data = zip.finish().unwrap().into_inner();
        XlsxReader::from_bytes(data).unwrap()
    }

    fn sheet_xml(rows: &str) -> String {
        format!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    #[test]
    fn test_reader_metadata() {
        let reader = reader();
        assert_eq!(reader.sheet_count(), 1);
        assert_eq!(reader.sheet_names(), vec!["Data"]);
        assert!(!reader.is_date1904());
        assert_eq!(reader.first_sheet().unwrap().row_count(), 0);
    }

    #[test]
    fn test_cell_types() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="1">
  <c r="A1" t="s"><v>0</v></c>
  <c r="B1" t="inlineStr"><is><t xml:space="preserve">In </t><r><t>line</t></r></is></c>
  <c r="C1"><v>42</v></c>
  <c r="D1" t="b"><v>1</v></c>
  <c r="E1" t="b"><v>0</v></c>
  <c r="F1"><f>A1+B1</f><v>3</v></c>
  <c r="G1" t="e"><v>#DIV/0!</v></c>
  <c r="H1" s="1"/>
  <c r="I1" s="1"><v>45306</v></c>
  <c r="J1" t="str"><v>plain</v></c>
</row>"#,
        );

        let sheet = reader.parse_sheet(&xml).unwrap();
        let cells: Vec<String> = sheet.row(0).unwrap().map(|c| c.to_string()).collect();
        assert_eq!(
            cells,
            vec![
                "Name",
                "In line",
                "42.0",
                "true",
                "false",
                "=A1+B1",
                "",
                "",
                "Mon Jan 15 00:00:00 UTC 2024",
                "plain",
            ]
        );
    }

    #[test]
    fn test_unreadable_cells_become_empty() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="1"><c r="A1" t="s"><v>99</v></c><c r="B1"><v>abc</v></c><c r="C1" t="s"><v>1</v></c></row>"#,
        );

        let table = reader.parse_sheet(&xml).unwrap().to_table(0);
        assert_eq!(table.rows()[0], vec!["", "", "Amount"]);
    }

    #[test]
    fn test_columns_sorted_and_gaps_skipped() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="1"><c r="D1"><v>4</v></c><c r="A1"><v>1</v></c></row>
<row r="2"><c><v>1</v></c><c><v>2</v></c></row>"#,
        );

        let table = reader.parse_sheet(&xml).unwrap().to_table(0);
        assert_eq!(table.rows()[0], vec!["1.0", "4.0"]);
        assert_eq!(table.rows()[1], vec!["1.0", "2.0"]);
    }

    #[test]
    fn test_shared_formula_expansion() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="2"><c r="C2"><f t="shared" ref="C2:C4" si="0">A2*B2</f><v>1</v></c></row>
<row r="3"><c r="C3"><f t="shared" si="0"/><v>1</v></c></row>
<row r="4"><c r="C4"><f t="shared" si="0"/><v>1</v></c></row>"#,
        );

        let sheet = reader.parse_sheet(&xml).unwrap();
        let formula = |row| sheet.row(row).unwrap().next().unwrap().to_string();
        assert_eq!(formula(1), "=A2*B2");
        assert_eq!(formula(2), "=A3*B3");
        assert_eq!(formula(3), "=A4*B4");
    }

    #[test]
    fn test_to_table_start_rows() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>10</v></c></row>
<row r="4"><c r="A4"><v>3</v></c></row>
<row r="5"/>"#,
        );
        let sheet = reader.parse_sheet(&xml).unwrap();
        assert_eq!(sheet.last_row_index(), Some(4));

        let from_zero = sheet.to_table(0);
        assert_eq!(
            from_zero.into_rows(),
            vec![
                vec!["Name".to_string(), "Amount".to_string()],
                vec!["Ann".to_string(), "10.0".to_string()],
                vec!["3.0".to_string()],
                vec![],
            ]
        );

        let from_one = sheet.to_table(1);
        assert_eq!(from_one.row_count(), 4);

        let from_three = sheet.to_table(3);
        assert_eq!(from_three.row_count(), 3);
        assert_eq!(from_three.rows()[1], vec!["3.0"]);

        let negative = sheet.to_table(-5);
        assert_eq!(negative.row_count(), 5);
        assert_eq!(negative.rows()[0], negative.rows()[1]);
        assert_eq!(&negative.rows()[1..], &sheet.to_table(1).rows()[..]);

        let beyond = sheet.to_table(100);
        assert_eq!(beyond.into_rows(), vec![vec!["Name", "Amount"]]);
    }

    #[test]
    fn test_no_header_row() {
        let reader = reader();
        let xml = sheet_xml(r#"<row r="3"><c r="A3"><v>7</v></c></row>"#);
        let sheet = reader.parse_sheet(&xml).unwrap();

        assert_eq!(sheet.to_table(0).into_rows(), vec![vec!["7.0"]]);
        assert!(sheet.to_table(5).is_empty());
    }

    #[test]
    fn test_negative_start_repeats_header() {
        let reader = reader();
        let xml = sheet_xml(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>
<row r="2"><c r="A2"><v>1</v></c></row>"#,
        );
        let sheet = reader.parse_sheet(&xml).unwrap();

        assert_eq!(
            sheet.to_table(-1).into_rows(),
            vec![vec!["Name"], vec!["Name"], vec!["1.0"]]
        );
        assert_eq!(
            sheet.to_table(0).into_rows(),
            vec![vec!["Name"], vec!["1.0"]]
        );
    }

    #[test]
    fn test_malformed_sheet_is_an_error() {
        let reader = reader();
        let result = reader.parse_sheet("<worksheet><sheetData><row r=\"1\"></sheetData>");
        assert!(matches!(result, Err(Error::XmlParse(_))));

        let result = reader.parse_sheet(&sheet_xml(r#"<row r="zero"/>"#));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }
}
