//! 切片的 PNG 导出, 仅用于肉眼检查.

use crate::data::IntensityWindow;
use crate::{OwnedSlice, SliceView};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 归一化强度会经 [`IntensityWindow::unit`] 映射为 8-bit 灰度后保存,
/// 保存格式由 `path` 的扩展名决定.
pub trait ImgWriteVis {
    /// 按照可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

impl ImgWriteVis for SliceView<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.to_gray(&IntensityWindow::unit()).save(path)
    }
}

impl ImgWriteVis for OwnedSlice {
    #[inline]
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.as_view().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_png_roundtrip_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.png");
        let s = OwnedSlice::from_shape_fn((2, 3), |(h, w)| if h == w { 1.0 } else { 0.0 });
        s.save(&path).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(1, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 1).0, [255]);
    }
}
