//! 矩形遮盖
//!
//! 在图片副本上把每个遮盖矩形填成不透明的配置色。填充互不影响、
//! 可重复执行；裁剪后为空的矩形直接跳过。

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::redaction::RedactionBox;

/// 返回遮盖后的新图片，输入不变
pub fn apply_redactions(
    img: &DynamicImage,
    redactions: &[RedactionBox],
    color: [u8; 3],
) -> RgbaImage {
    let mut out = img.to_rgba8();
    let (img_width, img_height) = out.dimensions();
    let fill = Rgba([color[0], color[1], color[2], 255]);

    for redaction in redactions {
        let clipped = redaction.clipped(img_width, img_height);
        if clipped.is_empty() {
            continue;
        }
        draw_filled_rect_mut(
            &mut out,
            Rect::at(clipped.x as i32, clipped.y as i32).of_size(clipped.w, clipped.h),
            fill,
        );
    }

    out
}
