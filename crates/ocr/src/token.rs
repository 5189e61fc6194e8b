//! Token 数据模型
//!
//! OCR 引擎对一张图片的输出是一串词级 token：文字、像素边界框、
//! 置信度以及行归属键。行归属键由引擎在单次调用内分配，只保证
//! 调用内唯一，仅用于分组与排序，不承载任何语义。

use serde::{Deserialize, Serialize};

/// 行归属键：(块, 段, 行) 三元组
///
/// 分块 OCR 时每个分块独立编号，不同分块之间可能重号，
/// 这是需要保留的既有性质，不要跨分块"修复"它。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LineKey {
    pub block: u32,
    pub par: u32,
    pub line: u32,
}

impl LineKey {
    pub fn new(block: u32, par: u32, line: u32) -> Self {
        Self { block, par, line }
    }
}

/// 词级像素边界框（图像坐标系）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl TokenBox {
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// OCR 识别出的单个词
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// 识别文字
    pub text: String,
    /// 像素边界框
    #[serde(flatten)]
    pub bbox: TokenBox,
    /// 置信度，负值表示"不是真实文字"
    pub confidence: f32,
    /// 行归属键
    pub key: LineKey,
}
