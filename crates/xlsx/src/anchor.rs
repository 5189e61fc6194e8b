//! 绘图锚点的规范化
//!
//! 绘图部件里的图片锚点有三种形态：双单元格锚、单单元格锚、
//! 绝对像素锚。这里用一组具名解析策略按序尝试，第一个成功者
//! 生效；全部落空返回结构化的"不支持的锚点"错误，而不是
//! 悄悄丢弃图片。

use lazy_static::lazy_static;
use regex::Regex;

use crate::parts::attr_value;
use crate::XlsxError;

/// EMU（English Metric Unit）与像素的换算，96 DPI 下 9525 EMU/px
const EMU_PER_PIXEL: i64 = 9525;

lazy_static! {
    static ref TWO_CELL_RE: Regex =
        Regex::new(r"(?s)<xdr:twoCellAnchor\b.*?</xdr:twoCellAnchor>").unwrap();
    static ref ONE_CELL_RE: Regex =
        Regex::new(r"(?s)<xdr:oneCellAnchor\b.*?</xdr:oneCellAnchor>").unwrap();
    static ref ABSOLUTE_RE: Regex =
        Regex::new(r"(?s)<xdr:absoluteAnchor\b.*?</xdr:absoluteAnchor>").unwrap();
    static ref FROM_RE: Regex = Regex::new(r"(?s)<xdr:from>.*?</xdr:from>").unwrap();
    static ref COL_RE: Regex = Regex::new(r"<xdr:col>(\d+)</xdr:col>").unwrap();
    static ref COL_OFF_RE: Regex = Regex::new(r"<xdr:colOff>(-?\d+)</xdr:colOff>").unwrap();
    static ref ROW_RE: Regex = Regex::new(r"<xdr:row>(\d+)</xdr:row>").unwrap();
    static ref ROW_OFF_RE: Regex = Regex::new(r"<xdr:rowOff>(-?\d+)</xdr:rowOff>").unwrap();
    static ref EXT_RE: Regex = Regex::new(r"<(?:a|xdr):ext\b[^>]*>").unwrap();
    static ref POS_RE: Regex = Regex::new(r"<xdr:pos\b[^>]*>").unwrap();
    static ref BLIP_RE: Regex = Regex::new(r"<a:blip\b[^>]*>").unwrap();
}

/// 规范化后的锚点描述符
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorDescriptor {
    /// 锚定到单元格，外加单元格内像素偏移
    Cell {
        /// 0 基列号
        col: u32,
        /// 0 基行号
        row: u32,
        col_off_px: u32,
        row_off_px: u32,
    },
    /// 工作表内的绝对像素位置
    Offset { left_px: u32, top_px: u32 },
}

impl AnchorDescriptor {
    /// 锚点单元格的 A1 名称；绝对锚退化为 A1
    pub fn cell_name(&self) -> String {
        match self {
            AnchorDescriptor::Cell { col, row, .. } => {
                format!("{}{}", column_letter(col + 1), row + 1)
            }
            AnchorDescriptor::Offset { .. } => "A1".to_string(),
        }
    }

    /// 单元格内（或工作表内）的像素偏移
    pub fn pixel_offset(&self) -> (u32, u32) {
        match self {
            AnchorDescriptor::Cell {
                col_off_px,
                row_off_px,
                ..
            } => (*col_off_px, *row_off_px),
            AnchorDescriptor::Offset { left_px, top_px } => (*left_px, *top_px),
        }
    }
}

struct AnchorStrategy {
    name: &'static str,
    parse: fn(&str) -> Option<AnchorDescriptor>,
}

/// 解析策略按此顺序尝试
const ANCHOR_STRATEGIES: [AnchorStrategy; 3] = [
    AnchorStrategy {
        name: "twoCellAnchor",
        parse: parse_two_cell,
    },
    AnchorStrategy {
        name: "oneCellAnchor",
        parse: parse_one_cell,
    },
    AnchorStrategy {
        name: "absoluteAnchor",
        parse: parse_absolute,
    },
];

/// 规范化一个锚点块；所有策略落空时报结构化错误
pub fn resolve_anchor(block: &str) -> Result<AnchorDescriptor, XlsxError> {
    for strategy in &ANCHOR_STRATEGIES {
        if let Some(descriptor) = (strategy.parse)(block) {
            log::debug!("[Xlsx] 锚点按 {} 解析", strategy.name);
            return Ok(descriptor);
        }
    }
    let preview: String = block.chars().take(80).collect();
    Err(XlsxError::UnsupportedAnchor(preview))
}

/// 绘图部件里的全部锚点块，按文档顺序
pub fn anchor_blocks(drawing_xml: &str) -> Vec<&str> {
    let mut blocks: Vec<(usize, &str)> = Vec::new();
    for re in [&*TWO_CELL_RE, &*ONE_CELL_RE, &*ABSOLUTE_RE] {
        for m in re.find_iter(drawing_xml) {
            blocks.push((m.start(), m.as_str()));
        }
    }
    blocks.sort_by_key(|(start, _)| *start);
    blocks.into_iter().map(|(_, block)| block).collect()
}

/// 锚点块里引用的媒体关系 Id（无图片的锚点返回 None）
pub fn blip_embed(block: &str) -> Option<String> {
    BLIP_RE
        .find_iter(block)
        .find_map(|m| attr_value(m.as_str(), "r:embed").map(|s| s.to_string()))
}

/// 锚点块声明的展示尺寸（像素）；未声明时为 (0, 0)
pub fn image_extent(block: &str) -> (u32, u32) {
    EXT_RE
        .find(block)
        .map(|m| {
            let tag = m.as_str();
            (
                emu_attr_px(tag, "cx").unwrap_or(0),
                emu_attr_px(tag, "cy").unwrap_or(0),
            )
        })
        .unwrap_or((0, 0))
}

fn parse_two_cell(block: &str) -> Option<AnchorDescriptor> {
    if !block.starts_with("<xdr:twoCellAnchor") {
        return None;
    }
    parse_from_cell(block)
}

fn parse_one_cell(block: &str) -> Option<AnchorDescriptor> {
    if !block.starts_with("<xdr:oneCellAnchor") {
        return None;
    }
    parse_from_cell(block)
}

fn parse_absolute(block: &str) -> Option<AnchorDescriptor> {
    if !block.starts_with("<xdr:absoluteAnchor") {
        return None;
    }
    let pos = POS_RE.find(block)?;
    let tag = pos.as_str();
    Some(AnchorDescriptor::Offset {
        left_px: emu_attr_px(tag, "x")?,
        top_px: emu_attr_px(tag, "y")?,
    })
}

/// 从 `<xdr:from>` 取锚点单元格与格内偏移
fn parse_from_cell(block: &str) -> Option<AnchorDescriptor> {
    let from = FROM_RE.find(block)?.as_str();
    let col = capture_u32(&COL_RE, from)?;
    let row = capture_u32(&ROW_RE, from)?;
    let col_off = capture_i64(&COL_OFF_RE, from).unwrap_or(0);
    let row_off = capture_i64(&ROW_OFF_RE, from).unwrap_or(0);
    Some(AnchorDescriptor::Cell {
        col,
        row,
        col_off_px: emu_to_px(col_off),
        row_off_px: emu_to_px(row_off),
    })
}

fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_i64(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn emu_attr_px(tag: &str, attr: &str) -> Option<u32> {
    attr_value(tag, attr)
        .and_then(|v| v.parse::<i64>().ok())
        .map(emu_to_px)
}

fn emu_to_px(emu: i64) -> u32 {
    (emu / EMU_PER_PIXEL).max(0) as u32
}

/// 1 基列号转字母（1 -> A, 27 -> AA）
fn column_letter(mut col: u32) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters
}
