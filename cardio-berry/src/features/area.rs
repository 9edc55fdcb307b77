//! 心脏区域面积占比.
//!
//! 8-bit 灰度图经 Otsu 全局阈值二值化, 再用 Suzuki 边界跟踪找到所有外轮廓,
//! 取面积最大者. 二值化与轮廓跟踪均由 `imageproc` 完成.

use crate::{IntensityWindow, SliceView};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::point::Point;

/// 最大外轮廓面积占整幅图像像素数的比例.
///
/// 切片先以 [`IntensityWindow::unit`] 截断量化到 8-bit, 再做 Otsu 二值化.
/// 没有任何轮廓 (例如全黑图像) 时返回 0.
pub fn cardiac_area(slice: &SliceView) -> f64 {
    if slice.is_empty() {
        return 0.0;
    }
    let gray = slice.to_gray(&IntensityWindow::unit());
    let contours = external_contours(&otsu_binarize(&gray));
    largest_contour_area(&contours).map_or(0.0, |area| area / slice.size() as f64)
}

/// Otsu 二值化: 大于阈值的像素为 255, 其余为 0.
fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray))
}

/// 二值图中不被任何孔洞包围的外轮廓, 按光栅扫描的发现顺序排列.
///
/// 跟踪前在四周补一圈背景, 紧贴图像边界的前景区域也能得到闭合轮廓.
/// 返回的坐标位于补边后的图像中, 面积不受影响.
fn external_contours(binary: &GrayImage) -> Vec<Contour<i32>> {
    let (width, height) = binary.dimensions();
    let padded = GrayImage::from_fn(width + 2, height + 2, |x, y| {
        if x == 0 || y == 0 || x > width || y > height {
            Luma([0])
        } else {
            *binary.get_pixel(x - 1, y - 1)
        }
    });
    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect()
}

/// 以像素中心为顶点的多边形面积 (鞋带公式), 与 `cv2.contourArea` 一致.
///
/// 少于 3 个点时为 0.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// 面积最大的轮廓面积. 并列时保留先发现的那一个.
fn largest_contour_area(contours: &[Contour<i32>]) -> Option<f64> {
    contours
        .iter()
        .map(|c| contour_area(&c.points))
        .fold(None, |best, area| match best {
            Some(b) if b >= area => Some(b),
            _ => Some(area),
        })
}
