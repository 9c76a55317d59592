//! ### English
//! Frame presentation driver.
//!
//! Per-frame orchestration around the import bridge, shader variants,
//! overlay compositor, and synchronization strategy. The driver runs on one
//! dedicated rendering thread that owns the GL context; the context is
//! attached before each present cycle and explicitly detached so teardown
//! can reattach it elsewhere.
//!
//! ### 中文
//! 帧呈现驱动器。
//!
//! 围绕导入桥、着色器变体、overlay 合成器与同步策略的逐帧编排。
//! 驱动器运行在持有 GL 上下文的专用渲染线程上；每个呈现周期前 attach
//! 上下文，之后显式 detach，使销毁流程可以在别处重新 attach。

use std::rc::Rc;
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::bridge::{ImportBackend, MAX_PLANE_COUNT};
use super::caps::{CapabilitySet, ExternalImageFns};
use super::error::ResetEvent;
use super::frame::{Colorspace, RetainedFrame};
use super::overlay::{OverlayCompositor, OverlayFlags, OverlayNotifier, OverlaySource};
use super::platform::{ContextAttributeGuard, PlatformWindow};
use super::shader::{ShaderSourceLoader, SpecializedPrograms};
use super::sync::{PendingFence, SwapPolicy};

mod init;
mod render;
mod specialize;
mod teardown;

/// ### English
/// Driver states. `Uninitialized` is the absence of a value (construction
/// is initialization); `Rendering` is transient within one `render_frame`
/// call; `ResetRequested` is terminal for the instance.
///
/// ### 中文
/// 驱动器状态。`Uninitialized` 即“值尚不存在”（构造即初始化）；
/// `Rendering` 只在一次 `render_frame` 调用内短暂存在；
/// `ResetRequested` 对该实例是终态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenterState {
    /// ### English
    /// Waiting for the first frame to reveal the native pixel layout.
    ///
    /// ### 中文
    /// 等待首帧揭示原生像素布局。
    AwaitingFirstFrame,
    /// ### English
    /// Specialized and ready to draw.
    ///
    /// ### 中文
    /// 已特化，可以绘制。
    Ready,
    /// ### English
    /// Inside a frame's draw cycle.
    ///
    /// ### 中文
    /// 正在一帧的绘制周期内。
    Rendering,
    /// ### English
    /// Specialization failed; the host must re-create the renderer.
    ///
    /// ### 中文
    /// 特化失败；宿主必须重建 renderer。
    ResetRequested,
}

/// ### English
/// Initialization bundle for [`FramePresenter`].
///
/// ### 中文
/// [`FramePresenter`] 的初始化参数包。
pub struct FramePresenterInit {
    /// ### English
    /// Windowing collaborator for the target surface.
    ///
    /// ### 中文
    /// 目标 surface 的窗口协作方。
    pub platform: Rc<dyn PlatformWindow>,
    /// ### English
    /// Image import backend.
    ///
    /// ### 中文
    /// 图像导入后端。
    pub backend: Rc<dyn ImportBackend>,
    /// ### English
    /// Overlay content source.
    ///
    /// ### 中文
    /// overlay 内容源。
    pub overlay_source: Arc<dyn OverlaySource>,
    /// ### English
    /// Shader source loader.
    ///
    /// ### 中文
    /// 着色器源加载器。
    pub shader_loader: Box<dyn ShaderSourceLoader>,
    /// ### English
    /// Channel carrying asynchronous reset signals to the host.
    ///
    /// ### 中文
    /// 向宿主传递异步重置信号的通道。
    pub reset_tx: Sender<ResetEvent>,
    /// ### English
    /// Negotiated stream format bitmask (see `video_format`).
    ///
    /// ### 中文
    /// 协商后的码流格式位掩码（见 `video_format`）。
    pub video_format_flags: u32,
    /// ### English
    /// Whether the host requested vsync.
    ///
    /// ### 中文
    /// 宿主是否请求 vsync。
    pub vsync_requested: bool,
}

/// ### English
/// Unit quad vertices, interleaved `(x, y, u, v)`: top-right, bottom-right,
/// bottom-left, top-left. Texture row 0 (the frame top) maps to the top of
/// the quad.
///
/// ### 中文
/// 单位四边形顶点，交错 `(x, y, u, v)`：右上、右下、左下、左上。
/// 纹理第 0 行（帧顶部）映射到四边形顶部。
pub(super) const QUAD_VERTICES: [f32; 16] = [
    1.0, 1.0, 1.0, 0.0, //
    1.0, -1.0, 1.0, 1.0, //
    -1.0, -1.0, 0.0, 1.0, //
    -1.0, 1.0, 0.0, 0.0,
];

/// ### English
/// Two triangles over the quad vertices.
///
/// ### 中文
/// 覆盖四边形顶点的两个三角形。
pub(super) const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// ### English
/// The frame presentation driver. One instance per renderer lifetime; not
/// `Send`, since it lives on the rendering thread. Cross-thread overlay
/// invalidation goes through [`OverlayNotifier`].
///
/// ### 中文
/// 帧呈现驱动器。每个 renderer 生命周期一个实例；非 `Send`，
/// 固定在渲染线程上。跨线程 overlay 失效通过 [`OverlayNotifier`]。
pub struct FramePresenter {
    platform: Rc<dyn PlatformWindow>,
    backend: Rc<dyn ImportBackend>,
    overlay_source: Arc<dyn OverlaySource>,
    shader_loader: Box<dyn ShaderSourceLoader>,
    reset_tx: Sender<ResetEvent>,
    gl: Arc<glow::Context>,
    caps: CapabilitySet,
    ext_fns: ExternalImageFns,
    policy: SwapPolicy,
    state: PresenterState,
    /// ### English
    /// One external-image texture per plane; unit *i* always receives
    /// plane *i*.
    ///
    /// ### 中文
    /// 每个平面一个外部图像纹理；单元 *i* 恒接收平面 *i*。
    plane_textures: [glow::NativeTexture; MAX_PLANE_COUNT],
    /// ### English
    /// Filter currently applied to the plane textures (avoids redundant
    /// state changes; nearest for exact integer scales).
    ///
    /// ### 中文
    /// 当前应用于平面纹理的采样过滤（避免冗余状态切换；
    /// 精确整数倍率时用最近邻）。
    plane_filter: u32,
    quad_vbo: glow::NativeBuffer,
    quad_ebo: glow::NativeBuffer,
    /// ### English
    /// Compiled programs; populated by the one-time lazy specialization.
    ///
    /// ### 中文
    /// 已编译的 program；由一次性的惰性特化填充。
    programs: Option<SpecializedPrograms>,
    pending_fence: PendingFence,
    retained: RetainedFrame,
    /// ### English
    /// (colorspace, full-range) of the constants last uploaded; uploads are
    /// skipped while it matches the incoming frame.
    ///
    /// ### 中文
    /// 上次上传常量对应的（色彩空间, 全范围）；与新帧一致时跳过上传。
    last_conversion: Option<(Colorspace, bool)>,
    overlay: OverlayCompositor,
    overlay_flags: Arc<OverlayFlags>,
    overlay_notifier: OverlayNotifier,
    /// ### English
    /// Teardown idempotence guard.
    ///
    /// ### 中文
    /// 销毁幂等保护。
    destroyed: bool,
    /// ### English
    /// Declared last: restores the platform's context attribute request
    /// after the GL resources are gone.
    ///
    /// ### 中文
    /// 声明在最后：在 GL 资源销毁之后恢复平台的上下文属性请求。
    _attr_guard: ContextAttributeGuard,
}

impl FramePresenter {
    /// ### English
    /// Current driver state.
    ///
    /// ### 中文
    /// 当前驱动器状态。
    pub fn state(&self) -> PresenterState {
        self.state
    }

    /// ### English
    /// The capability snapshot taken at setup.
    ///
    /// ### 中文
    /// 初始化时的能力快照。
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }

    /// ### English
    /// The swap policy chosen at setup.
    ///
    /// ### 中文
    /// 初始化时选定的交换策略。
    pub fn swap_policy(&self) -> SwapPolicy {
        self.policy
    }

    /// ### English
    /// A cloneable handle for overlay-content invalidation, callable from
    /// any thread.
    ///
    /// ### 中文
    /// 可克隆的 overlay 内容失效句柄，可从任意线程调用。
    pub fn overlay_notifier(&self) -> OverlayNotifier {
        self.overlay_notifier.clone()
    }
}
