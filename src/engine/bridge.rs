//! ### English
//! Image import bridge: the external backend contract for turning an opaque
//! decoded-frame handle into GPU-importable plane images without a copy.
//!
//! This core only calls the bridge; the conversion itself (DMA-BUF export,
//! platform image creation) is the backend collaborator's business. Import
//! buffers are a finite platform resource: every successful import must be
//! released exactly once, after the synchronization step of the frame that
//! used it and before the next frame's import.
//!
//! ### 中文
//! 图像导入桥：把不透明的解码帧句柄零拷贝转换为可供 GPU 导入的平面图像
//! 的外部后端契约。
//!
//! 本核心只调用该桥；转换本身（DMA-BUF 导出、平台图像创建）属于后端
//! 协作方。导入缓冲是有限的平台资源：每次成功导入必须且只能释放一次，
//! 时机在使用它的那一帧完成同步步骤之后、下一帧导入之前。

use std::ffi::c_void;

use super::frame::{DecodedFrame, PixelLayout};

/// ### English
/// Fixed maximum number of pixel planes an imported frame may carry.
///
/// ### 中文
/// 导入帧最多可携带的像素平面数（固定上限）。
pub const MAX_PLANE_COUNT: usize = 4;

/// ### English
/// One platform image handle produced by the import backend (e.g. an
/// `EGLImage`). Plane *i* is always bound to texture unit *i*.
///
/// ### 中文
/// 导入后端产出的一个平台图像句柄（例如 `EGLImage`）。
/// 平面 *i* 恒绑定到纹理单元 *i*。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneImage(pub *const c_void);

impl PlaneImage {
    /// ### English
    /// The empty (unfilled) handle.
    ///
    /// ### 中文
    /// 空（未填充）句柄。
    pub const NULL: Self = Self(std::ptr::null());

    /// ### English
    /// Whether the handle is empty.
    ///
    /// ### 中文
    /// 句柄是否为空。
    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for PlaneImage {
    fn default() -> Self {
        Self::NULL
    }
}

/// ### English
/// External import backend contract. Implemented by the rendering-backend
/// collaborator that owns the platform display connection.
///
/// ### 中文
/// 外部导入后端契约。由持有平台 display 连接的渲染后端协作方实现。
pub trait ImportBackend {
    /// ### English
    /// The native pixel layout this backend decodes into. Queried once, when
    /// the first real frame arrives; the answer is fixed for the renderer's
    /// lifetime.
    ///
    /// ### 中文
    /// 该后端解码输出的原生像素布局。在首个真实帧到达时查询一次；
    /// 结果在 renderer 生命周期内固定。
    fn native_pixel_layout(&self) -> PixelLayout;

    /// ### English
    /// Imports `frame`'s planes into `images[..n]` and returns `n`, or a
    /// negative value on failure. `n` never exceeds [`MAX_PLANE_COUNT`];
    /// exceeding it is a contract violation, not an environmental error.
    ///
    /// ### 中文
    /// 将 `frame` 的各平面导入 `images[..n]` 并返回 `n`；失败时返回负值。
    /// `n` 不得超过 [`MAX_PLANE_COUNT`]；超过属于契约违规，而非环境错误。
    fn import_planes(
        &self,
        frame: &DecodedFrame,
        images: &mut [PlaneImage; MAX_PLANE_COUNT],
    ) -> isize;

    /// ### English
    /// Releases images produced by a successful `import_planes`. Must be
    /// called exactly once per successful import, after the GPU has finished
    /// reading (i.e. after the frame's synchronization step).
    ///
    /// ### 中文
    /// 释放一次成功 `import_planes` 产出的图像。每次成功导入必须且只能
    /// 调用一次，时机在 GPU 读取完成之后（即该帧的同步步骤之后）。
    fn release_planes(&self, images: &mut [PlaneImage]);
}
