//! 遮盖流水线核心
//!
//! 对一张图片执行：分块 OCR → 行重组 → 敏感行检测 → 矩形遮盖，
//! 返回遮盖后的图片、命中的矩形列表与整图文字稿。
//! 模式集与配置在一次运行内构造一次、只读共享。

pub mod config;
pub mod detect;
pub mod pipeline;
pub mod redact;
pub mod report;

mod redaction;

pub use config::MaskConfig;
pub use detect::detect_sensitive_lines;
pub use pipeline::{mask_image, mask_image_file, MaskOutcome, MaskedFile};
pub use redact::apply_redactions;
pub use redaction::RedactionBox;
pub use report::{file_sha256, ImageReport, OracleAudit};

use cellmask_ocr::OcrError;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("无法解码图片 {path}: {source}")]
    ImageDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("无法写出图片 {path}: {source}")]
    ImageEncode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("OCR 失败: {0}")]
    Ocr(#[from] OcrError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}
