//! 嵌入图片提取
//!
//! 沿工作簿 → 工作表 → 绘图 → 媒体的关系链枚举每张工作表里的
//! 图片，把图片字节落到本次运行的临时目录，位置信息规范化为
//! `ImagePlacement`。图片编号在工作表内从 1 递增，
//! `image_id = "{sheet}#{序号}"` 与回写侧约定一致。

use std::fs;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use crate::anchor::{anchor_blocks, blip_embed, image_extent, resolve_anchor};
use crate::parts::{
    drawing_rel_id, parent_dir, parse_relationships, parse_sheets, read_part_bytes,
    read_part_string, rels_part_for, resolve_target, try_read_part_string, Archive,
};
use crate::{ExtractedImage, ImagePlacement, XlsxError};

/// 提取工作簿中所有（或指定工作表的）嵌入图片
///
/// `sheet_names` 为 None 时处理全部工作表。返回顺序：工作表在
/// 工作簿中的顺序，表内按绘图部件的文档顺序。
pub fn extract_images(
    input: &Path,
    sheet_names: Option<&[String]>,
) -> Result<Vec<ExtractedImage>, XlsxError> {
    let file = fs::File::open(input)?;
    let mut archive: Archive = ZipArchive::new(BufReader::new(file))?;

    let workbook_xml = read_part_string(&mut archive, "xl/workbook.xml")?;
    let workbook_rels = read_part_string(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let sheet_targets = parse_relationships(&workbook_rels);

    let tmpdir = std::env::temp_dir().join(format!("xlimg_{}", std::process::id()));
    fs::create_dir_all(&tmpdir)?;

    let mut results = Vec::new();

    for (sheet_name, rid) in parse_sheets(&workbook_xml) {
        if let Some(filter) = sheet_names {
            if !filter.iter().any(|wanted| wanted == &sheet_name) {
                continue;
            }
        }

        let Some(target) = sheet_targets.get(&rid) else {
            log::warn!("[Xlsx] 工作表 {} 缺少关系目标，跳过", sheet_name);
            continue;
        };
        let sheet_part = resolve_target("xl", target);
        let sheet_xml = read_part_string(&mut archive, &sheet_part)?;

        // 没有绘图引用的工作表没有嵌入图片
        let Some(drawing_rid) = drawing_rel_id(&sheet_xml) else {
            continue;
        };
        let Some(sheet_rels) = try_read_part_string(&mut archive, &rels_part_for(&sheet_part))?
        else {
            log::warn!("[Xlsx] 工作表 {} 引用绘图但缺少关系部件", sheet_name);
            continue;
        };
        let Some(drawing_target) = parse_relationships(&sheet_rels).remove(&drawing_rid) else {
            continue;
        };

        let drawing_part = resolve_target(parent_dir(&sheet_part), &drawing_target);
        let drawing_xml = read_part_string(&mut archive, &drawing_part)?;
        let drawing_rels = read_part_string(&mut archive, &rels_part_for(&drawing_part))?;
        let media_targets = parse_relationships(&drawing_rels);

        let mut idx = 0u32;
        for block in anchor_blocks(&drawing_xml) {
            // 不含图片引用的锚点（形状、图表等）不计数
            let Some(embed) = blip_embed(block) else {
                continue;
            };
            idx += 1;

            let descriptor = resolve_anchor(block)?;
            let (width, height) = image_extent(block);

            let Some(media_target) = media_targets.get(&embed) else {
                log::warn!(
                    "[Xlsx] {} 第 {} 张图片的媒体关系 {} 缺失，跳过",
                    sheet_name,
                    idx,
                    embed
                );
                continue;
            };
            let media_part = resolve_target(parent_dir(&drawing_part), media_target);
            let data = read_part_bytes(&mut archive, &media_part)?;

            let ext = media_part.rsplit('.').next().unwrap_or("png");
            let image_path = tmpdir.join(format!("{}_img{}.{}", sheet_name, idx, ext));
            fs::write(&image_path, &data)?;

            let (left, top) = descriptor.pixel_offset();
            results.push(ExtractedImage {
                placement: ImagePlacement {
                    sheet_name: sheet_name.clone(),
                    cell: descriptor.cell_name(),
                    left,
                    top,
                    width,
                    height,
                    image_id: format!("{}#{}", sheet_name, idx),
                    media_part,
                },
                image_path,
            });
        }
    }

    log::info!("[Xlsx] 共提取 {} 张嵌入图片", results.len());
    Ok(results)
}
