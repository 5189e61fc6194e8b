//! 超高图片的分块识别
//!
//! OCR 引擎对输入尺寸有上限，超高截图（长网页、长聊天记录）需要
//! 切成带重叠的水平条带分别识别，再把每个条带的 token 坐标加上
//! 条带偏移拼回原图坐标系。条带内的行归属键保持引擎原样，
//! 不同条带之间允许重号。

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::token::Token;
use crate::OcrEngine;

/// 分块参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileConfig {
    /// 单个条带的最大高度（像素）
    pub max_tile_height: u32,
    /// 相邻条带的重叠高度（像素）
    pub overlap: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            max_tile_height: 7000,
            overlap: 40,
        }
    }
}

/// 条带步进下限，防止参数异常时退化为逐像素切条
const MIN_TILE_STEP: u32 = 1000;

/// 分块识别一张图片，返回拼接回原图坐标系的 token 流
///
/// 高度不超过上限时整图单次提交，结果原样返回。单个条带识别失败时
/// 降采样重试一次；重试仍失败则整图判为失败。重叠区域的 token 可能
/// 重复出现，不做去重（后续的矩形填充是幂等的）。
pub fn detect_tokens_tiled(
    engine: &mut dyn OcrEngine,
    img: &DynamicImage,
    lang: &str,
    tile: &TileConfig,
) -> Result<Vec<Token>, OcrError> {
    let (width, height) = img.dimensions();
    if height <= tile.max_tile_height {
        return engine.detect_tokens(img, lang);
    }

    let step = tile
        .max_tile_height
        .saturating_sub(tile.overlap)
        .max(MIN_TILE_STEP);

    log::info!(
        "[Tiling] 图片高度 {} 超过上限 {}，按步进 {} 分块识别",
        height,
        tile.max_tile_height,
        step
    );

    let mut merged = Vec::new();
    let mut y = 0u32;
    loop {
        let y2 = y.saturating_add(tile.max_tile_height).min(height);
        let strip = img.crop_imm(0, y, width, y2 - y);

        let mut tokens = match engine.detect_tokens(&strip, lang) {
            Ok(tokens) => tokens,
            Err(first_err) => {
                log::warn!(
                    "[Tiling] 条带 y={} 识别失败: {}，降采样后重试",
                    y,
                    first_err
                );
                detect_downscaled(engine, &strip, lang, tile.max_tile_height)?
            }
        };

        for token in &mut tokens {
            token.bbox.top += y;
        }
        merged.extend(tokens);

        if y2 >= height {
            break;
        }
        y += step;
        if y >= height {
            break;
        }
    }

    Ok(merged)
}

/// 降采样重试：等比缩小条带，识别后把坐标按原/缩比例放回
fn detect_downscaled(
    engine: &mut dyn OcrEngine,
    strip: &DynamicImage,
    lang: &str,
    max_tile_height: u32,
) -> Result<Vec<Token>, OcrError> {
    let (width, height) = strip.dimensions();

    // 缩放后高度留出 10% 余量
    let scale = (max_tile_height as f32 / height.max(1) as f32).min(1.0) * 0.9;
    let new_w = ((width as f32 * scale) as u32).max(1);
    let new_h = ((height as f32 * scale) as u32).max(1);

    let small = image::imageops::resize(
        &strip.to_rgb8(),
        new_w,
        new_h,
        image::imageops::FilterType::Lanczos3,
    );
    let mut tokens = engine.detect_tokens(&DynamicImage::ImageRgb8(small), lang)?;

    let sx = width as f32 / new_w as f32;
    let sy = height as f32 / new_h as f32;
    for token in &mut tokens {
        token.bbox.left = (token.bbox.left as f32 * sx) as u32;
        token.bbox.top = (token.bbox.top as f32 * sy) as u32;
        token.bbox.width = (token.bbox.width as f32 * sx) as u32;
        token.bbox.height = (token.bbox.height as f32 * sy) as u32;
    }

    Ok(tokens)
}
