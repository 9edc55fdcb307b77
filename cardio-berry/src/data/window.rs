/// 灰度窗口, 包含窗位 (window level) 和窗宽 (window width).
/// 用于把归一化强度转换为 8-bit 灰度值.
///
/// 目前只用到覆盖 \[0, 1\] 的 [`IntensityWindow::unit`].
#[derive(Copy, Clone, Debug)]
pub struct IntensityWindow {
    level: f64,
    width: f64,
}

impl IntensityWindow {
    /// 覆盖归一化区间 \[0, 1\] 的窗口. 窗位为 0.5, 窗宽为 1.
    ///
    /// 在该窗口下 `eval(v)` 与 `(v * 255).astype(uint8)` 的截断语义一致.
    #[inline]
    pub const fn unit() -> IntensityWindow {
        Self {
            level: 0.5,
            width: 1.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.level + self.width / 2.0
    }

    /// 求当前窗口设置下, 强度 `v` 对应的灰度图像素整数值 (0 <= value <= 255).
    /// 窗内数值向零截断.
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, v: f64) -> Option<u8> {
        if !v.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if v <= lb {
            Some(u8::MIN)
        } else if v >= self.upper_bound() {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some((((v - lb) / self.width) * 255.0) as u8)
        }
    }
}
