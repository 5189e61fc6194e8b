//! 容器部件读取与关系解析
//!
//! 部件 XML 只按需要的属性做轻量扫描，不引入完整 XML 解析器——
//! 工作簿关系链涉及的元素形态固定，属性扫描足以覆盖。

use std::collections::HashMap;
use std::io::{BufReader, Read};

use lazy_static::lazy_static;
use regex::Regex;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::XlsxError;

lazy_static! {
    static ref RELATIONSHIP_RE: Regex = Regex::new(r"<Relationship\b[^>]*>").unwrap();
    static ref SHEET_RE: Regex = Regex::new(r"<sheet\b[^>]*>").unwrap();
    static ref DRAWING_REF_RE: Regex = Regex::new(r"<drawing\b[^>]*>").unwrap();
}

pub type Archive = ZipArchive<BufReader<std::fs::File>>;

/// 读取文本部件；部件不存在映射为 MissingPart
pub fn read_part_string(archive: &mut Archive, name: &str) -> Result<String, XlsxError> {
    let mut raw = String::new();
    part(archive, name)?.read_to_string(&mut raw)?;
    Ok(raw)
}

/// 读取文本部件，不存在时返回 None
pub fn try_read_part_string(
    archive: &mut Archive,
    name: &str,
) -> Result<Option<String>, XlsxError> {
    match read_part_string(archive, name) {
        Ok(raw) => Ok(Some(raw)),
        Err(XlsxError::MissingPart(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// 读取二进制部件
pub fn read_part_bytes(archive: &mut Archive, name: &str) -> Result<Vec<u8>, XlsxError> {
    let mut raw = Vec::new();
    part(archive, name)?.read_to_end(&mut raw)?;
    Ok(raw)
}

fn part<'a>(archive: &'a mut Archive, name: &str) -> Result<zip::read::ZipFile<'a>, XlsxError> {
    match archive.by_name(name) {
        Ok(file) => Ok(file),
        Err(ZipError::FileNotFound) => Err(XlsxError::MissingPart(name.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// 在元素标签文本中取属性值；属性名前必须是空白，避免 `x` 命中 `cx`
pub fn attr_value<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
    let needle = format!("{attr}=\"");
    let mut search = 0;
    while let Some(pos) = tag[search..].find(&needle) {
        let abs = search + pos;
        let at_boundary = tag[..abs]
            .chars()
            .last()
            .map(|c| c.is_whitespace())
            .unwrap_or(false);
        if at_boundary {
            let start = abs + needle.len();
            let end = tag[start..].find('"')?;
            return Some(&tag[start..start + end]);
        }
        search = abs + needle.len();
    }
    None
}

/// 解析关系部件：关系 Id -> Target
pub fn parse_relationships(rels_xml: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for m in RELATIONSHIP_RE.find_iter(rels_xml) {
        let tag = m.as_str();
        if let (Some(id), Some(target)) = (attr_value(tag, "Id"), attr_value(tag, "Target")) {
            map.insert(id.to_string(), target.to_string());
        }
    }
    map
}

/// 解析工作簿部件里的工作表清单：(名称, 关系 Id)，按文档顺序
pub fn parse_sheets(workbook_xml: &str) -> Vec<(String, String)> {
    SHEET_RE
        .find_iter(workbook_xml)
        .filter_map(|m| {
            let tag = m.as_str();
            match (attr_value(tag, "name"), attr_value(tag, "r:id")) {
                (Some(name), Some(rid)) => Some((name.to_string(), rid.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// 工作表部件里的绘图引用关系 Id
pub fn drawing_rel_id(sheet_xml: &str) -> Option<String> {
    DRAWING_REF_RE
        .find_iter(sheet_xml)
        .find_map(|m| attr_value(m.as_str(), "r:id").map(|s| s.to_string()))
}

/// 部件对应的关系部件名：`xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
pub fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_name}.rels"),
    }
}

/// 部件所在目录
pub fn parent_dir(part_name: &str) -> &str {
    part_name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// 把关系 Target 解析为容器内的部件名
///
/// Target 以引用方部件所在目录为基准，可能含 `..`；以 `/` 开头的
/// Target 是容器绝对路径。
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut stack: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            ".." => {
                stack.pop();
            }
            "" | "." => {}
            seg => stack.push(seg),
        }
    }
    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_requires_boundary() {
        let tag = r#"<a:ext cx="5715000" cy="1143000"/>"#;
        assert_eq!(attr_value(tag, "cx"), Some("5715000"));
        // "x" 不应命中 "cx" 的尾巴
        assert_eq!(attr_value(tag, "x"), None);
    }

    #[test]
    fn test_parse_relationships_any_attr_order() {
        let xml = r#"<Relationships>
<Relationship Id="rId1" Type="t" Target="worksheets/sheet1.xml"/>
<Relationship Target="../media/image1.png" Id="rId2"/>
</Relationships>"#;
        let map = parse_relationships(xml);
        assert_eq!(map["rId1"], "worksheets/sheet1.xml");
        assert_eq!(map["rId2"], "../media/image1.png");
    }

    #[test]
    fn test_parse_sheets_in_document_order() {
        let xml = r#"<sheets><sheet name="Summary" sheetId="1" r:id="rId1"/><sheet name="Raw" sheetId="2" r:id="rId2"/></sheets>"#;
        let sheets = parse_sheets(xml);
        assert_eq!(
            sheets,
            vec![
                ("Summary".to_string(), "rId1".to_string()),
                ("Raw".to_string(), "rId2".to_string())
            ]
        );
    }

    #[test]
    fn test_resolve_target_walks_parent_dirs() {
        assert_eq!(
            resolve_target("xl", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(
            resolve_target("xl/drawings", "../media/image1.png"),
            "xl/media/image1.png"
        );
        assert_eq!(
            resolve_target("xl/worksheets", "/xl/media/image2.png"),
            "xl/media/image2.png"
        );
    }

    #[test]
    fn test_rels_part_for() {
        assert_eq!(
            rels_part_for("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
        assert_eq!(rels_part_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
    }
}
