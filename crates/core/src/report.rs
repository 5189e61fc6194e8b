//! 单图处理报告与审计信息

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::redaction::RedactionBox;

/// OCR 审计信息：哪个引擎、什么参数、处理了哪份输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleAudit {
    /// 引擎名，当前恒为 "tesseract"
    pub engine: String,
    /// 引擎版本
    pub version: Option<String>,
    /// 引擎参数（JSON）
    pub params: Option<String>,
    /// 输入图片的 SHA-256
    pub input_sha256: String,
    /// 遮盖完成时刻
    pub masked_at: DateTime<Utc>,
}

/// 单图处理报告，随批次汇总为 JSON 数组输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub image_id: String,
    pub sheet: String,
    pub cell: String,
    /// 提取出的原图路径
    pub original: String,
    /// 遮盖后图片路径
    pub masked: String,
    pub redactions: Vec<RedactionBox>,
    pub ocr_text: String,
    pub audit: OracleAudit,
}

/// 文件内容的 SHA-256（十六进制）
pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_sha256_known_vector() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"abc").unwrap();
        assert_eq!(
            file_sha256(f.path()).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_report_serializes_original_key_names() {
        let report = ImageReport {
            image_id: "Sheet1#1".to_string(),
            sheet: "Sheet1".to_string(),
            cell: "B3".to_string(),
            original: "/tmp/a.png".to_string(),
            masked: "/tmp/a.masked.png".to_string(),
            redactions: vec![RedactionBox::sensitive(1, 2, 3, 4)],
            ocr_text: "Host: example.com".to_string(),
            audit: OracleAudit {
                engine: "tesseract".to_string(),
                version: Some("5.3.0".to_string()),
                params: None,
                input_sha256: "00".to_string(),
                masked_at: Utc::now(),
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["image_id"], "Sheet1#1");
        assert_eq!(json["ocr_text"], "Host: example.com");
        assert_eq!(json["redactions"][0]["w"], 3);
    }
}
