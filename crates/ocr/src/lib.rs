//! 外部 Tesseract CLI 集成与分块识别
//!
//! 把 OCR 当作黑盒预言机：输入图片像素与语言，输出带像素边界框、
//! 置信度和行归属键的词级 token 流。超高图片按水平分块提交，
//! 识别结果按分块偏移拼接回原图坐标系。

mod error;
mod line;
mod tesseract;
mod tiling;
mod token;

pub use error::OcrError;
pub use line::{assemble_lines, transcript, TokenLine};
pub use tesseract::{get_tesseract_version, TesseractConfig, TesseractEngine};
pub use tiling::{detect_tokens_tiled, TileConfig};
pub use token::{LineKey, Token, TokenBox};

use image::DynamicImage;

/// OCR 引擎统一 trait
///
/// 实现者对一张图片做一次完整识别。调用可能因图片尺寸 / 资源限制
/// 失败；失败后必须允许用降采样后的图片重新调用。
pub trait OcrEngine {
    /// 识别图片中的文字，返回词级 token 流
    fn detect_tokens(&mut self, img: &DynamicImage, lang: &str) -> Result<Vec<Token>, OcrError>;
}
