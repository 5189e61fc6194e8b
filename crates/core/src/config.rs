//! 遮盖配置

use cellmask_ocr::TileConfig;
use serde::{Deserialize, Serialize};

/// 一次运行的遮盖配置，构造后只读共享
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskConfig {
    /// OCR 语言代码
    pub lang: String,
    /// 遮盖矩形四周的额外边距（像素）
    pub mask_padding: u32,
    /// 遮盖填充色 (RGB)，不透明
    pub mask_color: [u8; 3],
    /// Tesseract 可执行文件路径覆盖；显式传入引擎构造，
    /// 不经过任何进程级全局状态
    pub tesseract_cmd: Option<String>,
    /// 超高图片的分块参数
    pub tile: TileConfig,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            mask_padding: 4,
            mask_color: [0, 0, 0],
            tesseract_cmd: None,
            tile: TileConfig::default(),
        }
    }
}
