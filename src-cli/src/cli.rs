//! 命令行参数定义

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cellmask",
    version,
    about = "通过 OCR 遮盖 Excel 嵌入图片中的敏感信息",
    long_about = "扫描 .xlsx 工作簿里的嵌入图片，用 OCR 定位包含敏感信息\
（认证头、令牌、Cookie 等）的文字行，按行涂黑后把图片写回工作簿副本。\
所有图片全部处理成功后才写出输出文件。"
)]
pub struct Cli {
    /// 输入 .xlsx 文件路径
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: PathBuf,

    /// 输出 .xlsx 文件路径
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// 要处理的工作表名；缺省或 "all" 表示全部工作表
    #[arg(long = "sheets", visible_alias = "sheet", num_args = 0.., value_name = "NAME")]
    pub sheets: Vec<String>,

    /// Tesseract OCR 语言
    #[arg(long, default_value = "eng")]
    pub lang: String,

    /// tesseract 可执行文件路径（不在 PATH 中时指定）
    #[arg(long = "tesseract-cmd", value_name = "PATH")]
    pub tesseract_cmd: Option<String>,

    /// 遮盖矩形四周的额外边距（像素）
    #[arg(long = "mask-padding", default_value_t = 4, value_name = "PX")]
    pub mask_padding: u32,

    /// 逗号分隔的待遮盖头名列表（如 "Authorization,Host,X-API-Key"）
    #[arg(long, value_name = "NAMES")]
    pub headers: Option<String>,

    /// 头名文件：JSON `[..]` / `{"headers": [..]}` 或按行分隔的纯文本
    #[arg(long = "headers-file", value_name = "FILE")]
    pub headers_file: Option<PathBuf>,

    /// 在显式头名之外追加内置默认模式
    #[arg(long = "include-default-headers")]
    pub include_default_headers: bool,

    /// 逗号分隔的敏感模式正则列表（高级用法）
    #[arg(long, value_name = "REGEXES")]
    pub patterns: Option<String>,

    /// 模式文件：JSON `{"patterns": [..]}` 或 `[..]`
    #[arg(long = "patterns-file", value_name = "FILE")]
    pub patterns_file: Option<PathBuf>,

    /// 把 OCR 文字稿与遮盖元数据汇总为 JSON 写到该路径
    #[arg(long = "dump-json", value_name = "FILE")]
    pub dump_json: Option<PathBuf>,

    /// 静默模式，关闭日志输出
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// 调试日志
    #[arg(long, short = 'd')]
    pub debug: bool,
}

impl Cli {
    /// 选定的工作表集合；None 表示全部
    pub fn selected_sheets(&self) -> Option<Vec<String>> {
        if self.sheets.is_empty() || self.sheets == ["all"] {
            None
        } else {
            Some(self.sheets.clone())
        }
    }
}
