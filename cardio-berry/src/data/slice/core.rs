use crate::data::IntensityWindow;
use crate::Idx2d;
use image::{GrayImage, Luma};
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, Ix2};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// 不可变、借用的二维单通道切片. 像素为 \[0, 1\] 内的归一化强度.
#[derive(Copy, Clone, Debug)]
pub struct SliceView<'a> {
    /// 底层数据的轻量级视图, 借用于 [`OwnedSlice`] 或调用方自己的数组.
    data: ArrayView2<'a, f64>,
}

impl Index<Idx2d> for SliceView<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> From<ArrayView2<'a, f64>> for SliceView<'a> {
    #[inline]
    fn from(data: ArrayView2<'a, f64>) -> Self {
        Self { data }
    }
}

/// 不可变方法集合.
impl<'a> SliceView<'a> {
    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'a, f64> {
        self.data
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f64, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f64> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 获得图像的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获得图像的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 图像是否没有任何像素?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 所有像素是否都是 \[0, 1\] 内的有限值?
    pub fn is_normalized(&self) -> bool {
        self.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 强度)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f64)> {
        self.data.indexed_iter()
    }

    /// 用 `window` 将切片转为 8-bit 灰度图. 非有限值映射为 0.
    ///
    /// 图像坐标 `(x, y)` 对应切片索引 `(y, x)`, 即 (宽, 高).
    pub fn to_gray(&self, window: &IntensityWindow) -> GrayImage {
        let (height, width) = self.shape();
        GrayImage::from_fn(width as u32, height as u32, |x, y| {
            let v = self.data[(y as usize, x as usize)];
            Luma([window.eval(v).unwrap_or(u8::MIN)])
        })
    }

    /// 克隆自己, 获得一个拥有所有权的切片对象.
    pub fn to_owned(&self) -> OwnedSlice {
        OwnedSlice {
            data: self.data.to_owned(),
        }
    }
}

/// 拥有所有权的二维单通道切片.
///
/// 生成后即不可变: `OwnedSlice` 仅提供到 `SliceView`
/// 的轻量转换和底层数据移动, 不提供任何修改方法.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnedSlice {
    data: Array2<f64>,
}

impl OwnedSlice {
    /// 直接初始化.
    #[inline]
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// 按 `(高, 宽)` 形状和像素函数构建切片.
    #[inline]
    pub fn from_shape_fn(shape: Idx2d, f: impl FnMut(Idx2d) -> f64) -> Self {
        Self::new(Array2::from_shape_fn(shape, f))
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_view(&self) -> SliceView<'_> {
        SliceView::from(self.data.view())
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f64> {
        self.data
    }
}

impl Index<Idx2d> for OwnedSlice {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}
