//! 切片增强接缝.

use crate::{OwnedSlice, SliceView};

/// 切片增强. 输出形状须与输入一致.
pub trait Enhancer: Send + Sync {
    /// 名字, 用于日志.
    fn name(&self) -> &str;

    /// 增强单张切片.
    fn enhance(&self, slice: &SliceView) -> OwnedSlice;
}

/// 恒等增强, 原样复制.
#[derive(Debug, Copy, Clone, Default)]
pub struct Identity;

impl Enhancer for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    #[inline]
    fn enhance(&self, slice: &SliceView) -> OwnedSlice {
        slice.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let s = OwnedSlice::from_shape_fn((3, 4), |(h, w)| (h * 4 + w) as f64 / 12.0);
        assert_eq!(Identity.enhance(&s.as_view()), s);
        assert_eq!(Identity.name(), "identity");
    }
}
