//! 遮盖矩形

use serde::{Deserialize, Serialize};

/// 标记为需要不透明填充的像素矩形（图像坐标系）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// 自由文本标签，当前恒为 "sensitive"
    pub label: String,
}

impl RedactionBox {
    pub fn sensitive(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            label: "sensitive".to_string(),
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// 裁剪到图片边界内；完全越界时宽/高归零
    pub fn clipped(&self, img_width: u32, img_height: u32) -> Self {
        let x = self.x.min(img_width);
        let y = self.y.min(img_height);
        Self {
            x,
            y,
            w: self.right().min(img_width).saturating_sub(x),
            h: self.bottom().min(img_height).saturating_sub(y),
            label: self.label.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_inside_is_identity() {
        let r = RedactionBox::sensitive(6, 16, 108, 28);
        assert_eq!(r.clipped(200, 200), r);
    }

    #[test]
    fn test_clip_trims_right_edge() {
        let r = RedactionBox::sensitive(6, 16, 108, 28);
        let clipped = r.clipped(100, 200);
        assert_eq!(clipped.w, 94);
        assert_eq!(clipped.h, 28);
    }

    #[test]
    fn test_fully_outside_becomes_empty() {
        let r = RedactionBox::sensitive(150, 10, 20, 20);
        assert!(r.clipped(100, 100).is_empty());
    }
}
