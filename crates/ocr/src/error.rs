//! OCR 错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR 引擎不可用: {0}")]
    EngineUnavailable(String),

    #[error("OCR 调用失败: {0}")]
    Oracle(String),

    #[error("OCR 输出解析失败: {0}")]
    Parse(String),

    #[error("图像处理失败: {0}")]
    ImageProcess(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}
