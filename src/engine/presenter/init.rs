//! ### English
//! Initialization for `FramePresenter`.
//!
//! ### 中文
//! `FramePresenter` 的初始化逻辑。

use std::sync::Arc;

use glow::HasContext as _;
use tracing::{info, warn};

use crate::engine::bridge::MAX_PLANE_COUNT;
use crate::engine::caps::{self, ExternalImageFns, TEXTURE_EXTERNAL_OES};
use crate::engine::error::InitError;
use crate::engine::frame::RetainedFrame;
use crate::engine::overlay::{OverlayCompositor, OverlayFlags, OverlayNotifier, vertex_bytes};
use crate::engine::platform::{ContextAttributeGuard, ContextAttributes};
use crate::engine::sync::{PendingFence, SwapPolicy};
use crate::engine::video_format::VIDEO_FORMAT_MASK_10BIT;

use super::{FramePresenter, FramePresenterInit, PresenterState, QUAD_INDICES, QUAD_VERTICES};

/// ### English
/// Drains the GL error queue, logging each entry. Returns whether anything
/// was pending.
///
/// ### 中文
/// 清空 GL 错误队列并逐条记录。返回是否存在残留错误。
pub(super) fn drain_gl_errors(gl: &glow::Context, stage: &str) -> bool {
    let mut had_error = false;
    loop {
        let err = unsafe { gl.get_error() };
        if err == glow::NO_ERROR {
            break;
        }
        warn!(err, stage, "GL error");
        had_error = true;
    }
    had_error
}

impl FramePresenter {
    /// ### English
    /// Creates and initializes the renderer against the given window.
    ///
    /// Runs the capability probe, resolves the interop function table,
    /// chooses the swap policy, and creates all layout-independent GL
    /// resources. Shader specialization is deferred to the first frame.
    /// Returns with the context detached so the rendering thread can attach
    /// it.
    ///
    /// On failure the caller must select a different renderer; there is no
    /// retry within this core.
    ///
    /// ### 中文
    /// 针对给定窗口创建并初始化 renderer。
    ///
    /// 执行能力探测，解析互操作函数表，选定交换策略，并创建所有与布局
    /// 无关的 GL 资源。着色器特化推迟到首帧。返回时上下文已 detach，
    /// 以便渲染线程 attach。
    ///
    /// 失败时调用方必须另选 renderer；本核心内部不重试。
    pub fn initialize(init: FramePresenterInit) -> Result<Self, InitError> {
        let FramePresenterInit {
            platform,
            backend,
            overlay_source,
            shader_loader,
            reset_tx,
            video_format_flags,
            vsync_requested,
        } = init;

        // HDR formats are out of scope; fail explicitly instead of showing
        // wrong colors.
        if video_format_flags & VIDEO_FORMAT_MASK_10BIT != 0 {
            info!("10-bit stream requested; this renderer does not support HDR output");
            return Err(InitError::UnsupportedVideoFormat(video_format_flags));
        }

        // Capture the platform's context attribute request before touching
        // it; the guard restores it when the presenter is destroyed.
        let attr_guard = ContextAttributeGuard::capture(platform.clone());
        platform.set_context_attributes(ContextAttributes::GLES3);

        platform
            .create_context()
            .map_err(|err| InitError::NoDriverSupport(err.to_string()))?;
        platform.make_current()?;

        let gl = Arc::new(unsafe {
            glow::Context::from_loader_function(|name| platform.get_proc_address(name))
        });

        let caps = caps::probe(&gl, platform.as_ref())?;
        let ext_fns = ExternalImageFns::resolve(platform.as_ref())?;

        let policy = SwapPolicy::select(vsync_requested, platform.windowing_kind());
        if !platform.set_swap_interval(policy.swap_interval()) {
            warn!(
                interval = policy.swap_interval(),
                "platform rejected the requested swap interval"
            );
        }
        info!(?policy, kind = ?platform.windowing_kind(), vsync_requested, "swap policy selected");

        // One external-image texture per plane slot. Some drivers raise
        // errors when configuring external textures with no image bound
        // yet; those are drained as warnings, not failures.
        let mut plane_textures = Vec::with_capacity(MAX_PLANE_COUNT);
        for _ in 0..MAX_PLANE_COUNT {
            let texture = unsafe { gl.create_texture() }
                .map_err(InitError::NoDriverSupport)?;
            unsafe {
                gl.bind_texture(TEXTURE_EXTERNAL_OES, Some(texture));
                gl.tex_parameter_i32(
                    TEXTURE_EXTERNAL_OES,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR as i32,
                );
                gl.tex_parameter_i32(
                    TEXTURE_EXTERNAL_OES,
                    glow::TEXTURE_MAG_FILTER,
                    glow::LINEAR as i32,
                );
                gl.tex_parameter_i32(
                    TEXTURE_EXTERNAL_OES,
                    glow::TEXTURE_WRAP_S,
                    glow::CLAMP_TO_EDGE as i32,
                );
                gl.tex_parameter_i32(
                    TEXTURE_EXTERNAL_OES,
                    glow::TEXTURE_WRAP_T,
                    glow::CLAMP_TO_EDGE as i32,
                );
            }
            drain_gl_errors(&gl, "external texture setup");
            plane_textures.push(texture);
        }
        unsafe { gl.bind_texture(TEXTURE_EXTERNAL_OES, None) };

        let overlay = OverlayCompositor::new(&gl, caps.supports_row_length_unpack)
            .map_err(InitError::NoDriverSupport)?;

        // Layout-independent quad geometry shared by the video draw and the
        // overlay draws.
        let quad_vbo = unsafe { gl.create_buffer() }.map_err(InitError::NoDriverSupport)?;
        let quad_ebo = unsafe { gl.create_buffer() }.map_err(InitError::NoDriverSupport)?;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(quad_vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                vertex_bytes(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(quad_ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                index_bytes(&QUAD_INDICES),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }

        // Anything still pending here means the GL stack is not healthy
        // enough to trust.
        if drain_gl_errors(&gl, "initialization") {
            return Err(InitError::NoDriverSupport(
                "GL errors during initialization".to_owned(),
            ));
        }

        // Detach so the rendering thread can attach the context.
        platform.release_current();

        let overlay_flags = Arc::new(OverlayFlags::new());
        let overlay_notifier = OverlayNotifier::new(overlay_flags.clone(), overlay_source.clone());

        Ok(Self {
            platform,
            backend,
            overlay_source,
            shader_loader,
            reset_tx,
            gl,
            caps,
            ext_fns,
            policy,
            state: PresenterState::AwaitingFirstFrame,
            plane_textures: plane_textures.try_into().expect("plane count"),
            plane_filter: glow::LINEAR,
            quad_vbo,
            quad_ebo,
            programs: None,
            pending_fence: PendingFence::default(),
            retained: RetainedFrame::default(),
            last_conversion: None,
            overlay,
            overlay_flags,
            overlay_notifier,
            destroyed: false,
            _attr_guard: attr_guard,
        })
    }
}

/// ### English
/// Reinterprets quad indices as the byte slice GL buffer uploads expect.
///
/// ### 中文
/// 将四边形索引重解释为 GL 缓冲上传所需的字节切片。
fn index_bytes(indices: &[u32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(indices.as_ptr().cast::<u8>(), std::mem::size_of_val(indices))
    }
}
