//! 工作簿嵌入图片的提取与回写
//!
//! `.xlsx` 是 ZIP 容器，嵌入图片以媒体部件形式存放，位置信息在
//! 绘图部件的锚点里。这里直接读写容器部件：提取时解析
//! 工作簿 → 工作表 → 绘图 → 媒体的关系链，把每张图片连同
//! 规范化后的锚点描述符取出；回写时逐条复制原始条目，
//! 只替换有遮盖结果的媒体条目，其余工作簿状态原样保留。

mod anchor;
mod parts;
mod read;
mod write;

pub use anchor::{resolve_anchor, AnchorDescriptor};
pub use read::extract_images;
pub use write::write_masked_images;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XlsxError {
    #[error("容器读写失败: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("缺少工作簿部件: {0}")]
    MissingPart(String),

    #[error("不支持的图片锚点: {0}")]
    UnsupportedAnchor(String),
}

/// 规范化后的图片位置描述
///
/// 核心流水线只见到这个固定形状，不接触容器里的多态锚点对象。
#[derive(Debug, Clone)]
pub struct ImagePlacement {
    pub sheet_name: String,
    /// 锚点单元格（A1 形式）；绝对锚点退化为 A1 + 像素偏移
    pub cell: String,
    /// 相对锚点单元格左缘的像素偏移
    pub left: u32,
    /// 相对锚点单元格上缘的像素偏移
    pub top: u32,
    /// 展示宽度（像素），绘图部件未声明时为 0
    pub width: u32,
    /// 展示高度（像素）
    pub height: u32,
    /// 每张工作表内唯一：`"{sheet}#{序号}"`
    pub image_id: String,
    /// 容器内的媒体部件名，回写时定位条目用
    pub media_part: String,
}

/// 提取出的单张嵌入图片
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub placement: ImagePlacement,
    /// 落到临时目录的图片文件路径
    pub image_path: PathBuf,
}
