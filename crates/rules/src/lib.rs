//! 敏感文本模式集
//!
//! 定义用于判定"这一行文字是否敏感"的模式集合：按插入顺序保存的
//! 大小写不敏感正则列表。支持内置默认模式、按 HTTP 头名构造、
//! 显式正则列表以及 JSON / 纯文本文件加载。

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// 内置敏感模式：常见的 HTTP 认证头整行 + 独立的 Bearer 令牌值
pub const DEFAULT_SENSITIVE_PATTERNS: [&str; 9] = [
    r"\bAuthorization\b[:\-\s]*.*",
    r"\bAuth\b[:\-\s]*.*",
    r"\bBearer\b\s+[A-Za-z0-9\-\._~\+\/=]+",
    r"\bX\-API\-Key\b[:\-\s]*.*",
    r"\bAPI\s*Key\b[:\-\s]*.*",
    r"\bHost\b[:\-\s]*.*",
    r"\bCookie\b[:\-\s]*.*",
    r"\bSet\-Cookie\b[:\-\s]*.*",
    r"\bX\-Auth\-Token\b[:\-\s]*.*",
];

/// Bearer 令牌值模式。Authorization 头经 OCR 拆行后，令牌值经常
/// 脱离头名单独成行，所以需要一个不依赖头名的兜底模式。
const BEARER_VALUE_PATTERN: &str = r"\bBearer\b\s+[A-Za-z0-9\-\._~\+\/=]+";

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("无效的正则模式 {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("模式文件格式错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 单次匹配结果：命中的模式原文与命中区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    pub pattern: &'a str,
    pub start: usize,
    pub end: usize,
}

/// 模式集合
///
/// 所有模式均大小写不敏感；构造时按模式原文做保序去重，
/// 首次出现的位置生效。构造完成后只读共享。
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

/// 两种可接受的 JSON 形态：`[..]`，或对象里取 `key` 字段。
/// 对象缺少该字段按空列表处理；非列表值同样按空列表处理。
fn string_list(value: &Value, key: &str) -> Vec<String> {
    let list = match value {
        Value::Array(list) => list.as_slice(),
        Value::Object(map) => match map.get(key) {
            Some(Value::Array(list)) => list.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    list.iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

impl PatternSet {
    /// 从正则字符串列表构造（保序去重后逐个编译）
    pub fn from_strings<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: Vec<String> = Vec::new();
        for p in patterns {
            let p = p.as_ref();
            if !seen.iter().any(|s| s == p) {
                seen.push(p.to_string());
            }
        }

        let mut compiled = Vec::with_capacity(seen.len());
        for source in seen {
            let regex = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|e| RuleError::InvalidPattern {
                    pattern: source.clone(),
                    source: Box::new(e),
                })?;
            compiled.push(regex);
        }

        Ok(Self { patterns: compiled })
    }

    /// 内置默认模式集
    pub fn defaults() -> Result<Self, RuleError> {
        Self::from_strings(DEFAULT_SENSITIVE_PATTERNS)
    }

    /// 按 HTTP 头名构造
    ///
    /// 每个头名生成一条"头名 + 行尾全部内容"的模式（头名经正则转义）；
    /// `authorization` / `auth` 额外追加独立的 Bearer 值模式。
    pub fn from_headers<I, S>(headers: I, include_defaults: bool) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sources: Vec<String> = Vec::new();
        for header in headers {
            let header = header.as_ref().trim();
            if header.is_empty() {
                continue;
            }
            let escaped = regex::escape(header);
            sources.push(format!(r"\b{escaped}\b[:\-\s]*.*"));
            let lower = header.to_lowercase();
            if lower == "authorization" || lower == "auth" {
                sources.push(BEARER_VALUE_PATTERN.to_string());
            }
        }
        if include_defaults {
            sources.extend(DEFAULT_SENSITIVE_PATTERNS.iter().map(|p| p.to_string()));
        }
        Self::from_strings(sources)
    }

    /// 从 JSON 模式文件加载：`[..]` 或 `{"patterns": [..]}`
    ///
    /// JSON 解析失败视为配置错误，直接返回错误（没有其它备选格式）。
    pub fn from_file(path: &Path) -> Result<Self, RuleError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&raw)?;
        Self::from_strings(string_list(&parsed, "patterns"))
    }

    /// 从头名文件构造
    ///
    /// 接受 JSON（`[..]` 或 `{"headers": [..]}`）；JSON 解析失败时退化为
    /// 按行分隔的纯文本。文件不存在视为空头名列表，而不是错误。
    pub fn from_headers_file(path: &Path, include_defaults: bool) -> Result<Self, RuleError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("[Rules] 头名文件不存在: {}，按空列表处理", path.display());
                return Self::from_headers(Vec::<String>::new(), include_defaults);
            }
            Err(e) => return Err(e.into()),
        };

        let headers: Vec<String> = match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => string_list(&parsed, "headers"),
            Err(_) => raw
                .lines()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
        };

        Self::from_headers(headers, include_defaults)
    }

    /// 在一行文本中查找所有模式的所有命中
    pub fn find_matches<'a>(&'a self, text: &str) -> Vec<PatternMatch<'a>> {
        let mut matches = Vec::new();
        for regex in &self.patterns {
            for m in regex.find_iter(text) {
                matches.push(PatternMatch {
                    pattern: regex.as_str(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        matches
    }

    /// 模式原文列表（按集合顺序）
    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(|r| r.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_compile() {
        let set = PatternSet::defaults().unwrap();
        assert_eq!(set.len(), DEFAULT_SENSITIVE_PATTERNS.len());
    }

    #[test]
    fn test_case_insensitive_match() {
        let set = PatternSet::defaults().unwrap();
        assert!(!set.find_matches("authorization: Basic dXNlcg==").is_empty());
        assert!(!set.find_matches("SET-COOKIE: session=abc").is_empty());
        assert!(set.find_matches("nothing interesting here").is_empty());
    }

    #[test]
    fn test_from_headers_authorization_gets_bearer_pattern() {
        let set = PatternSet::from_headers(["Authorization"], false).unwrap();
        // 头名整行模式 + 独立的 Bearer 值模式，恰好两条
        assert_eq!(set.len(), 2);
        assert!(set.sources()[0].contains("Authorization"));
        assert_eq!(set.sources()[1], BEARER_VALUE_PATTERN);

        // 同样输入重复构造，结果完全一致
        let again = PatternSet::from_headers(["Authorization"], false).unwrap();
        assert_eq!(set.sources(), again.sources());
    }

    #[test]
    fn test_from_headers_escapes_metacharacters() {
        let set = PatternSet::from_headers(["X-API-Key"], false).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.find_matches("X-API-Key: sk-12345").is_empty());
        // 转义后连字符不再是字符区间，相似但不同名的头不应命中
        assert!(set.find_matches("XzAPIzKey: sk-12345").is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_position() {
        let set =
            PatternSet::from_strings([r"\bHost\b.*", r"\bCookie\b.*", r"\bHost\b.*"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.sources(), vec![r"\bHost\b.*", r"\bCookie\b.*"]);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = PatternSet::from_strings(["("]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn test_find_matches_spans() {
        let set = PatternSet::from_strings([r"\bBearer\b\s+\w+"]).unwrap();
        let text = "say Bearer abc123 done";
        let matches = set.find_matches(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "Bearer abc123");
    }

    #[test]
    fn test_patterns_file_both_shapes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"["\\bHost\\b.*"]"#).unwrap();
        let set = PatternSet::from_file(f.path()).unwrap();
        assert_eq!(set.len(), 1);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"patterns": ["\\bHost\\b.*", "\\bCookie\\b.*"]}}"#).unwrap();
        let set = PatternSet::from_file(f.path()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_patterns_file_malformed_json_is_fatal() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "Host\nCookie\n").unwrap();
        assert!(matches!(
            PatternSet::from_file(f.path()),
            Err(RuleError::Json(_))
        ));
    }

    #[test]
    fn test_headers_file_json_and_newline_fallback() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"headers": ["Host"]}}"#).unwrap();
        let set = PatternSet::from_headers_file(f.path(), false).unwrap();
        assert_eq!(set.len(), 1);

        // 非 JSON 内容退化为按行解析
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "Host\n\n  Cookie  \n").unwrap();
        let set = PatternSet::from_headers_file(f.path(), false).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_headers_file_missing_yields_empty_set() {
        let set =
            PatternSet::from_headers_file(Path::new("/no/such/headers.json"), false).unwrap();
        assert!(set.is_empty());
        assert!(set.find_matches("Authorization: Bearer x").is_empty());

        // include_defaults 时仍然补上默认模式
        let set = PatternSet::from_headers_file(Path::new("/no/such/headers.json"), true).unwrap();
        assert_eq!(set.len(), DEFAULT_SENSITIVE_PATTERNS.len());
    }
}
