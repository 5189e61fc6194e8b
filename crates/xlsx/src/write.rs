//! 遮盖图片回写
//!
//! 不重建工作簿：逐条流式复制输入容器的条目到输出，只有在
//! 替换表里的媒体条目换成遮盖后的字节。锚点、尺寸与其余全部
//! 工作簿状态保持原样。调用方保证所有图片都遮盖成功后才调用，
//! 不会写出半成品工作簿。

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::XlsxError;

/// 把遮盖结果写入输出工作簿
///
/// `replacements`: 媒体部件名（如 `xl/media/image1.png`）到遮盖后
/// 图片文件的映射。遮盖文件的编码格式与原媒体条目一致
/// （按扩展名落盘），可以直接按字节替换。
pub fn write_masked_images(
    input: &Path,
    output: &Path,
    replacements: &HashMap<String, PathBuf>,
) -> Result<(), XlsxError> {
    let file = fs::File::open(input)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    if let Some(dir) = output.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut writer = ZipWriter::new(BufWriter::new(fs::File::create(output)?));

    let mut replaced = 0usize;
    for i in 0..archive.len() {
        let name = archive.by_index_raw(i)?.name().to_string();

        match replacements.get(&name) {
            Some(masked_path) => {
                let data = fs::read(masked_path)?;
                writer.start_file(name.as_str(), SimpleFileOptions::default())?;
                writer.write_all(&data)?;
                replaced += 1;
            }
            None => {
                let entry = archive.by_index_raw(i)?;
                writer.raw_copy_file(entry)?;
            }
        }
    }
    writer.finish()?;

    log::info!(
        "[Xlsx] 已写出 {}，替换媒体条目 {} 个",
        output.display(),
        replaced
    );
    Ok(())
}
