//! ### English
//! Windowing-system collaborator contract.
//!
//! Window/surface creation and windowing-system integration are out of scope
//! for this core; everything it needs from the platform flows through the
//! [`PlatformWindow`] trait. The GL context is a single exclusively-owned
//! resource: it is attached (`make_current`) to the rendering thread before
//! each present cycle and explicitly detached (`release_current`) afterwards
//! so a teardown routine on another thread can reattach it. The hand-off is
//! strictly detach-then-reattach, never concurrent.
//!
//! ### 中文
//! 窗口系统协作方契约。
//!
//! 窗口/surface 的创建与窗口系统集成不在本核心范围内；核心对平台的全部
//! 依赖都经由 [`PlatformWindow`] trait。GL 上下文是独占资源：每个呈现
//! 周期前 attach（`make_current`）到渲染线程，之后显式 detach
//! （`release_current`），以便销毁流程可在其它线程重新 attach。
//! 交接顺序严格为先 detach 后 attach，绝不并发持有。

use std::ffi::c_void;
use std::rc::Rc;

use dpi::PhysicalSize;

use super::error::PlatformError;

/// ### English
/// Window state change: drawable size changed.
///
/// ### 中文
/// 窗口状态变化：drawable 尺寸变化。
pub const GEOMETRY_CHANGE_SIZE: u32 = 1 << 0;

/// ### English
/// Window state change: the window moved to a different display.
///
/// ### 中文
/// 窗口状态变化：窗口移动到另一块显示器。
pub const GEOMETRY_CHANGE_DISPLAY: u32 = 1 << 1;

/// ### English
/// Returns whether this core can absorb a window state change without a full
/// renderer re-creation. Only size and display changes are transparent.
///
/// ### 中文
/// 返回本核心能否在不重建 renderer 的情况下吸收一次窗口状态变化。
/// 只有尺寸与显示器变化是透明的。
#[inline]
pub fn can_absorb_geometry_change(flags: u32) -> bool {
    flags & !(GEOMETRY_CHANGE_SIZE | GEOMETRY_CHANGE_DISPLAY) == 0
}

/// ### English
/// Windowing system behind the target surface. Drives the swap-policy
/// platform special cases; deliberately open-ended (`Other`) because the
/// policy table is expected to accrue more cases.
///
/// ### 中文
/// 目标 surface 背后的窗口系统。决定交换策略的平台特例；刻意保留
/// `Other`（开放式），因为策略表预期会继续增加特例。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowingKind {
    /// ### English
    /// Wayland: the compositor already guarantees tear-free presentation,
    /// so a blocking swap only adds latency.
    ///
    /// ### 中文
    /// Wayland：合成器本身保证无撕裂呈现，阻塞交换只会增加延迟。
    Wayland,
    /// ### English
    /// X11.
    ///
    /// ### 中文
    /// X11.
    X11,
    /// ### English
    /// Direct KMS/DRM scan-out: already double-buffered; an extra fence wait
    /// after a blocking swap stalls rendering to half the refresh rate.
    ///
    /// ### 中文
    /// 直接 KMS/DRM 扫描输出：本身即双缓冲；阻塞交换后再等 fence 会把
    /// 渲染卡到刷新率的一半。
    KmsDrm,
    /// ### English
    /// GBM off-screen surface.
    ///
    /// ### 中文
    /// GBM 离屏 surface。
    Gbm,
    /// ### English
    /// Anything else.
    ///
    /// ### 中文
    /// 其它。
    Other,
}

/// ### English
/// GL context attributes captured before this renderer reconfigures them and
/// restored when it is destroyed. Modeled as an explicit value, not ambient
/// global state.
///
/// ### 中文
/// 本 renderer 修改前捕获、销毁时恢复的 GL 上下文属性。
/// 以显式值建模，而非环境级全局可变状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextAttributes {
    /// ### English
    /// Context profile mask.
    ///
    /// ### 中文
    /// 上下文 profile 掩码。
    pub profile_mask: i32,
    /// ### English
    /// Requested major version.
    ///
    /// ### 中文
    /// 请求的主版本号。
    pub major_version: i32,
    /// ### English
    /// Requested minor version.
    ///
    /// ### 中文
    /// 请求的次版本号。
    pub minor_version: i32,
}

/// ### English
/// Profile mask bit requesting an OpenGL ES context.
///
/// ### 中文
/// 请求 OpenGL ES 上下文的 profile 掩码位。
pub const CONTEXT_PROFILE_ES: i32 = 0x0004;

impl ContextAttributes {
    /// ### English
    /// The attribute set this renderer requests: an OpenGL ES 3.0 context.
    ///
    /// ### 中文
    /// 本 renderer 请求的属性集：OpenGL ES 3.0 上下文。
    pub const GLES3: Self = Self {
        profile_mask: CONTEXT_PROFILE_ES,
        major_version: 3,
        minor_version: 0,
    };
}

/// ### English
/// Narrow interface to the windowing system. All methods are called on the
/// thread that currently owns the GL context, except `context_attributes` /
/// `set_context_attributes`, which touch context *requests*, not the live
/// context.
///
/// ### 中文
/// 面向窗口系统的窄接口。除 `context_attributes` /
/// `set_context_attributes`（只涉及上下文“请求”，不触及已建立的上下文）
/// 外，所有方法都在当前持有 GL 上下文的线程上调用。
pub trait PlatformWindow {
    /// ### English
    /// Reads the current context attribute request (for save/restore).
    ///
    /// ### 中文
    /// 读取当前的上下文属性请求（用于保存/恢复）。
    fn context_attributes(&self) -> ContextAttributes;

    /// ### English
    /// Replaces the context attribute request.
    ///
    /// ### 中文
    /// 替换上下文属性请求。
    fn set_context_attributes(&self, attributes: ContextAttributes);

    /// ### English
    /// Creates the GL context for this window using the current attribute
    /// request. Failure is a fatal setup condition (no driver support).
    ///
    /// ### 中文
    /// 按当前属性请求为该窗口创建 GL 上下文。失败属于致命的初始化条件
    /// （无驱动支持）。
    fn create_context(&self) -> Result<(), PlatformError>;

    /// ### English
    /// Attaches the GL context to the calling thread. A no-op if already
    /// current there.
    ///
    /// ### 中文
    /// 将 GL 上下文 attach 到调用线程。若已 current 则为 no-op。
    fn make_current(&self) -> Result<(), PlatformError>;

    /// ### English
    /// Detaches the GL context from the calling thread so another thread may
    /// attach it.
    ///
    /// ### 中文
    /// 将 GL 上下文从调用线程 detach，使其它线程可以 attach。
    fn release_current(&self);

    /// ### English
    /// Presents the back buffer. Whether this call blocks until the display
    /// consumes the frame depends on the platform and the swap interval.
    ///
    /// ### 中文
    /// 呈现后台缓冲。该调用是否阻塞到显示器消费完该帧，取决于平台与
    /// swap interval。
    fn swap_buffers(&self);

    /// ### English
    /// Sets the swap interval (0 = immediate, 1 = synchronized). Returns
    /// false if the platform rejects the value.
    ///
    /// ### 中文
    /// 设置 swap interval（0 = 立即，1 = 同步）。平台拒绝该值时返回 false。
    fn set_swap_interval(&self, interval: i32) -> bool;

    /// ### English
    /// Current drawable size in physical pixels.
    ///
    /// ### 中文
    /// 当前 drawable 的物理像素尺寸。
    fn drawable_size(&self) -> PhysicalSize<u32>;

    /// ### English
    /// The windowing system behind this surface.
    ///
    /// ### 中文
    /// 该 surface 背后的窗口系统。
    fn windowing_kind(&self) -> WindowingKind;

    /// ### English
    /// Resolves a GL or platform-interop entry point by name. Returns null
    /// when the symbol is unknown.
    ///
    /// ### 中文
    /// 按名称解析 GL 或平台互操作入口点。符号未知时返回 null。
    fn get_proc_address(&self, name: &str) -> *const c_void;

    /// ### English
    /// Whether the platform-side (display) extension is advertised.
    ///
    /// ### 中文
    /// 平台侧（display）扩展是否可用。
    fn supports_platform_extension(&self, name: &str) -> bool;
}

/// ### English
/// Scoped capture/restore of the platform's context attribute request.
/// Captures at construction; restores on drop, bracketing this renderer's
/// lifetime.
///
/// ### 中文
/// 平台上下文属性请求的作用域化捕获/恢复。构造时捕获；drop 时恢复，
/// 覆盖本 renderer 的整个生命周期。
pub struct ContextAttributeGuard {
    platform: Rc<dyn PlatformWindow>,
    saved: ContextAttributes,
}

impl ContextAttributeGuard {
    /// ### English
    /// Captures the current attribute request.
    ///
    /// ### 中文
    /// 捕获当前属性请求。
    pub fn capture(platform: Rc<dyn PlatformWindow>) -> Self {
        let saved = platform.context_attributes();
        Self { platform, saved }
    }
}

impl Drop for ContextAttributeGuard {
    fn drop(&mut self) {
        self.platform.set_context_attributes(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_display_changes_are_absorbed() {
        assert!(can_absorb_geometry_change(GEOMETRY_CHANGE_SIZE));
        assert!(can_absorb_geometry_change(GEOMETRY_CHANGE_DISPLAY));
        assert!(can_absorb_geometry_change(
            GEOMETRY_CHANGE_SIZE | GEOMETRY_CHANGE_DISPLAY
        ));
        assert!(can_absorb_geometry_change(0));
    }

    #[test]
    fn any_other_change_requires_recreation() {
        assert!(!can_absorb_geometry_change(1 << 2));
        assert!(!can_absorb_geometry_change(GEOMETRY_CHANGE_SIZE | (1 << 5)));
    }
}
