//! 行重组
//!
//! OCR 输出的 token 流是乱序的词级碎片，按行归属键重组成逻辑行：
//! 行文本取 token 的引擎输出顺序空格拼接（不按坐标重排序——
//! 引擎自身的输出顺序是可信的），行内保留全部成员边界框。

use std::collections::BTreeMap;

use crate::token::{LineKey, Token, TokenBox};

/// 重组后的逻辑行
#[derive(Debug, Clone)]
pub struct TokenLine {
    pub key: LineKey,
    /// 空格拼接的行文本
    pub text: String,
    /// 行内全部 token 的边界框，按出现顺序
    pub boxes: Vec<TokenBox>,
}

/// 把 token 流重组为逻辑行，按行归属键升序返回
///
/// 负置信度 token 视为噪声剔除，空白文本同样跳过。
pub fn assemble_lines(tokens: &[Token]) -> Vec<TokenLine> {
    let mut grouped: BTreeMap<LineKey, (Vec<&str>, Vec<TokenBox>)> = BTreeMap::new();

    for token in tokens {
        if token.text.trim().is_empty() || token.confidence < 0.0 {
            continue;
        }
        let entry = grouped.entry(token.key).or_default();
        entry.0.push(token.text.as_str());
        entry.1.push(token.bbox);
    }

    grouped
        .into_iter()
        .map(|(key, (parts, boxes))| TokenLine {
            key,
            text: parts.join(" "),
            boxes,
        })
        .collect()
}

/// 整图文字稿：行文本按行归属键升序换行拼接
pub fn transcript(lines: &[TokenLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, key: LineKey, left: u32, confidence: f32) -> Token {
        Token {
            text: text.to_string(),
            bbox: TokenBox {
                left,
                top: 10,
                width: 30,
                height: 12,
            },
            confidence,
            key,
        }
    }

    #[test]
    fn test_groups_by_line_key_in_emission_order() {
        let tokens = vec![
            token("Bearer", LineKey::new(1, 1, 2), 80, 91.0),
            token("Authorization:", LineKey::new(1, 1, 2), 10, 95.0),
            token("Host:", LineKey::new(1, 1, 1), 10, 96.0),
        ];

        let lines = assemble_lines(&tokens);
        assert_eq!(lines.len(), 2);
        // 行按键升序，行内按引擎输出顺序拼接
        assert_eq!(lines[0].key, LineKey::new(1, 1, 1));
        assert_eq!(lines[0].text, "Host:");
        assert_eq!(lines[1].text, "Bearer Authorization:");
        assert_eq!(lines[1].boxes.len(), 2);
        assert_eq!(lines[1].boxes[0].left, 80);
    }

    #[test]
    fn test_negative_confidence_and_blank_excluded() {
        let tokens = vec![
            token("real", LineKey::new(1, 1, 1), 10, 88.0),
            token("ghost", LineKey::new(1, 1, 1), 50, -1.0),
            token("  ", LineKey::new(1, 1, 1), 90, 95.0),
        ];

        let lines = assemble_lines(&tokens);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "real");
        assert_eq!(lines[0].boxes.len(), 1);
    }

    #[test]
    fn test_transcript_joins_lines_in_key_order() {
        let tokens = vec![
            token("second", LineKey::new(2, 1, 1), 10, 90.0),
            token("first", LineKey::new(1, 3, 9), 10, 90.0),
        ];

        let lines = assemble_lines(&tokens);
        assert_eq!(transcript(&lines), "first\nsecond");
    }

    #[test]
    fn test_all_noise_yields_no_lines() {
        let tokens = vec![token("x", LineKey::new(1, 1, 1), 10, -1.0)];
        assert!(assemble_lines(&tokens).is_empty());
        assert_eq!(transcript(&[]), "");
    }
}
