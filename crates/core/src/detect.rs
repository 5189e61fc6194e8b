//! 敏感区域检测
//!
//! 对每一条重组后的逻辑行做模式匹配；一旦命中，整行所有 token 的
//! 边界框合并成一个带边距的遮盖矩形。按整行而不是命中子串遮盖：
//! OCR 的分词并不可靠，按行遮盖不会因为拆词漏掉相邻字符。

use cellmask_ocr::TokenLine;
use cellmask_rules::PatternSet;

use crate::redaction::RedactionBox;

/// 检测敏感行，返回未裁剪的遮盖矩形列表
///
/// 返回矩形的左/上边界已钳制为非负；右/下边界可能越出图片，
/// 由应用阶段裁剪。
pub fn detect_sensitive_lines(
    lines: &[TokenLine],
    patterns: &PatternSet,
    padding: u32,
) -> Vec<RedactionBox> {
    let mut redactions = Vec::new();

    for line in lines {
        if line.boxes.is_empty() || patterns.find_matches(&line.text).is_empty() {
            continue;
        }

        let x1 = line
            .boxes
            .iter()
            .map(|b| b.left)
            .min()
            .unwrap_or(0)
            .saturating_sub(padding);
        let y1 = line
            .boxes
            .iter()
            .map(|b| b.top)
            .min()
            .unwrap_or(0)
            .saturating_sub(padding);
        let x2 = line.boxes.iter().map(|b| b.right()).max().unwrap_or(0) + padding;
        let y2 = line.boxes.iter().map(|b| b.bottom()).max().unwrap_or(0) + padding;

        log::info!(
            "[Detect] 命中敏感行 {:?}: {}",
            line.key,
            mask_snippet(&line.text)
        );

        redactions.push(RedactionBox::sensitive(x1, y1, x2 - x1, y2 - y1));
    }

    redactions
}

/// 日志用脱敏显示：只露出首尾少量字符
fn mask_snippet(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= 4 {
        "*".repeat(len)
    } else {
        let visible = 4.min(len / 3);
        let prefix: String = chars[..visible].iter().collect();
        let suffix: String = chars[len - visible..].iter().collect();
        format!("{}****{}", prefix, suffix)
    }
}
