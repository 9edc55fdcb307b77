//! 二维单通道切片对象的操作.

mod core;
mod save;

pub use self::core::{OwnedSlice, SliceView};

pub use save::ImgWriteVis;
