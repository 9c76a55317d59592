//! ### English
//! The per-frame render cycle and the rendering-thread protocol hooks
//! (`wait_to_render` / `prepare_to_render` / `cleanup_render_context`).
//!
//! ### 中文
//! 逐帧渲染周期与渲染线程协议钩子
//! （`wait_to_render` / `prepare_to_render` / `cleanup_render_context`）。

use glow::HasContext as _;
use tracing::{debug, error, warn};

use crate::engine::bridge::{MAX_PLANE_COUNT, PlaneImage};
use crate::engine::caps::TEXTURE_EXTERNAL_OES;
use crate::engine::colorspace::conversion_constants;
use crate::engine::frame::DecodedFrame;
use crate::engine::overlay::OverlaySlot;
use crate::engine::platform::can_absorb_geometry_change;
use crate::engine::shader::{ATTRIB_POSITION, ATTRIB_TEXCOORD, VideoUniforms};
use crate::engine::viewport;

use super::{FramePresenter, PresenterState};

impl FramePresenter {
    /// ### English
    /// Whether this core can absorb a window state change without full
    /// re-creation (true only for size/display changes).
    ///
    /// ### 中文
    /// 本核心能否不经整体重建而吸收一次窗口状态变化
    /// （仅尺寸/显示器变化为 true）。
    pub fn notify_window_geometry_changed(&self, flags: u32) -> bool {
        can_absorb_geometry_change(flags)
    }

    /// ### English
    /// Convenience forwarder for same-thread callers; cross-thread callers
    /// use [`FramePresenter::overlay_notifier`].
    ///
    /// ### 中文
    /// 同线程调用方的便捷转发；跨线程调用方使用
    /// [`FramePresenter::overlay_notifier`]。
    pub fn notify_overlay_content_changed(&self, slot: OverlaySlot) {
        self.overlay_notifier.content_changed(slot);
    }

    /// ### English
    /// Pre-frame synchronization: attaches the context and, under a fencing
    /// policy, waits (unbounded) on the previous frame's fence before the
    /// caller picks the next frame, so the freshest available frame
    /// gets rendered after the wait. Falls back to a full pipeline
    /// flush-and-wait when no fence mechanism exists.
    ///
    /// ### 中文
    /// 帧前同步：attach 上下文；在带 fence 的策略下，先无限等待上一帧的
    /// fence，再由调用方挑选下一帧；这样等待之后渲染的是最新可用的帧。
    /// 无 fence 机制时退化为完整的流水线 flush 并等待。
    pub fn wait_to_render(&mut self) {
        if let Err(err) = self.platform.make_current() {
            error!(%err, "cannot attach GL context for pre-frame wait");
            return;
        }
        if !self.policy.waits_before_render() {
            return;
        }
        if self.caps.fence_sync.is_available() {
            self.pending_fence.wait_and_clear(&self.gl);
        } else {
            unsafe { self.gl.finish() };
        }
    }

    /// ### English
    /// Shows an opaque black frame before the stream starts, then detaches
    /// the context again.
    ///
    /// ### 中文
    /// 在码流开始前先呈现一帧不透明黑色，然后再次 detach 上下文。
    pub fn prepare_to_render(&mut self) {
        if let Err(err) = self.platform.make_current() {
            error!(%err, "cannot attach GL context to prepare rendering");
            return;
        }
        unsafe {
            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.platform.swap_buffers();
        self.platform.release_current();
    }

    /// ### English
    /// Detaches the context from the rendering thread so teardown (possibly
    /// on another thread) can reattach it. Must be called after the last
    /// presentation call; the hand-off is strictly detach-then-reattach.
    ///
    /// ### 中文
    /// 将上下文从渲染线程 detach，使（可能在其它线程的）销毁流程可以
    /// 重新 attach。必须在最后一次呈现调用之后调用；交接严格遵循
    /// 先 detach 后 attach。
    pub fn cleanup_render_context(&self) {
        self.platform.release_current();
    }

    /// ### English
    /// Dry-run compatibility check: imports the frame's planes and releases
    /// them immediately, without touching renderer state. Used to validate
    /// the format before committing to this renderer: some devices decode
    /// into formats their own GL stack then refuses to import.
    ///
    /// ### 中文
    /// 试运行兼容性检查：导入帧的各平面并立即释放，不触碰 renderer
    /// 状态。用于在最终选定本 renderer 前验证格式：有些设备解码出的
    /// 格式，其自身的 GL 栈反而拒绝导入。
    pub fn test_render_frame(&self, frame: &DecodedFrame) -> bool {
        let mut images = [PlaneImage::NULL; MAX_PLANE_COUNT];
        let plane_count = self.backend.import_planes(frame, &mut images);
        if plane_count <= 0 {
            warn!(plane_count, "backend failed to export importable images for the test frame");
            return false;
        }
        self.backend.release_planes(&mut images[..plane_count as usize]);
        true
    }

    /// ### English
    /// Presents one frame. The steady-state cycle: import → bind planes →
    /// viewport → uniforms → draw → overlays → swap → synchronization →
    /// release planes → retain frame. Import failure abandons only this
    /// frame (the previous image stays on screen); other per-step GL errors
    /// are logged and the cycle continues to present. Ownership of `frame`
    /// transfers here; it is retained until the *next* frame is safely in
    /// flight.
    ///
    /// ### 中文
    /// 呈现一帧。稳态周期：导入 → 绑定平面 → viewport → uniform →
    /// 绘制 → overlay → 交换 → 同步 → 释放平面 → 保留帧。
    /// 导入失败只放弃本帧（屏幕上保留上一帧画面）；其它步骤的 GL 错误
    /// 记录日志后周期继续直至呈现。`frame` 的所有权在此转移；
    /// 它会被保留到“下一帧”安全在途为止。
    pub fn render_frame(&mut self, frame: DecodedFrame) {
        if self.state == PresenterState::ResetRequested {
            debug!("reset already requested; dropping frame");
            return;
        }

        // NB: usually already current on this thread; attaching again is a
        // no-op then.
        if let Err(err) = self.platform.make_current() {
            error!(%err, "cannot attach GL context; dropping frame");
            return;
        }

        if !self.ensure_specialized() {
            return;
        }
        debug_assert_eq!(
            self.programs.as_ref().map(|p| p.layout),
            Some(frame.layout),
            "frame layout differs from the specialized layout"
        );

        self.state = PresenterState::Rendering;

        let mut images = [PlaneImage::NULL; MAX_PLANE_COUNT];
        let plane_count = self.backend.import_planes(&frame, &mut images);
        if plane_count < 0 {
            warn!(plane_count, "plane import failed; leaving the previous frame on screen");
            self.state = PresenterState::Ready;
            return;
        }
        let plane_count = plane_count as usize;
        assert!(
            plane_count <= MAX_PLANE_COUNT,
            "import backend returned {plane_count} planes (maximum {MAX_PLANE_COUNT})"
        );

        let drawable = self.platform.drawable_size();
        let dest = viewport::scale_to_fit(frame.size(), drawable);
        let filter = if viewport::is_integer_scale(frame.size(), &dest) {
            glow::NEAREST
        } else {
            glow::LINEAR
        };
        self.bind_planes(&images[..plane_count], filter);

        unsafe {
            self.gl.clear(glow::COLOR_BUFFER_BIT);
            // The viewport carries the aspect-ratio mapping; the quad always
            // fills it.
            self.gl.viewport(dest.x, dest.y, dest.width, dest.height);
        }
        self.draw_video(&frame);

        // Overlays composite against the full drawable, not the letterboxed
        // video viewport.
        unsafe {
            self.gl
                .viewport(0, 0, drawable.width as i32, drawable.height as i32);
        }
        if let Some(programs) = &self.programs {
            for slot in OverlaySlot::ALL {
                self.overlay.render(
                    &self.gl,
                    self.overlay_source.as_ref(),
                    &self.overlay_flags,
                    slot,
                    &programs.overlay,
                    drawable,
                    self.quad_ebo,
                );
            }
        }

        self.platform.swap_buffers();
        self.apply_sync_after_swap();

        // The planes were only needed for this frame's draw; the swap/fence
        // pair above orders their release after the GPU read. Import
        // buffers are a finite resource, so this must precede the next
        // import.
        self.backend.release_planes(&mut images[..plane_count]);

        // Only now is the previous frame's backing memory safe to reclaim.
        self.retained.retain(frame);
        self.state = PresenterState::Ready;
    }

    /// ### English
    /// Binds imported plane *i* to texture unit *i* and applies the filter
    /// choice when it changed. Per-plane bind errors are transient: logged,
    /// frame continues.
    ///
    /// ### 中文
    /// 将导入的平面 *i* 绑定到纹理单元 *i*，并在过滤方式变化时应用。
    /// 单平面绑定错误是瞬时的：记录日志，该帧继续。
    fn bind_planes(&mut self, images: &[PlaneImage], filter: u32) {
        let update_filter = self.plane_filter != filter;
        for (i, image) in images.iter().enumerate() {
            unsafe {
                self.gl.active_texture(glow::TEXTURE0 + i as u32);
                self.gl
                    .bind_texture(TEXTURE_EXTERNAL_OES, Some(self.plane_textures[i]));
            }
            self.ext_fns
                .bind_image_to_bound_texture(TEXTURE_EXTERNAL_OES, image.0);
            if update_filter {
                unsafe {
                    self.gl.tex_parameter_i32(
                        TEXTURE_EXTERNAL_OES,
                        glow::TEXTURE_MIN_FILTER,
                        filter as i32,
                    );
                    self.gl.tex_parameter_i32(
                        TEXTURE_EXTERNAL_OES,
                        glow::TEXTURE_MAG_FILTER,
                        filter as i32,
                    );
                }
            }
            let err = unsafe { self.gl.get_error() };
            if err != glow::NO_ERROR {
                warn!(plane = i, err, "failed to bind imported plane to its texture unit");
            }
        }
        if update_filter {
            self.plane_filter = filter;
        }
    }

    /// ### English
    /// Issues the video draw: quad attributes, conversion uniforms (only
    /// when the (colorspace, range) pair changed), samplers, indexed draw.
    ///
    /// ### 中文
    /// 执行视频绘制：四边形属性、转换 uniform（仅当（色彩空间, 范围）
    /// 组合变化时）、采样器、索引绘制。
    fn draw_video(&mut self, frame: &DecodedFrame) {
        let key = (frame.colorspace, frame.full_range);
        let conversion_changed = self.last_conversion != Some(key);

        let Some(programs) = self.programs.as_ref() else {
            return;
        };
        let gl = &self.gl;
        let mut conversion_uploaded = false;

        unsafe {
            gl.use_program(Some(programs.video.program));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.quad_vbo));
            gl.vertex_attrib_pointer_f32(ATTRIB_POSITION, 2, glow::FLOAT, false, 16, 0);
            gl.enable_vertex_attrib_array(ATTRIB_POSITION);
            gl.vertex_attrib_pointer_f32(ATTRIB_TEXCOORD, 2, glow::FLOAT, false, 16, 8);
            gl.enable_vertex_attrib_array(ATTRIB_TEXCOORD);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.quad_ebo));

            match &programs.video.uniforms {
                VideoUniforms::Biplanar {
                    conversion_matrix,
                    channel_offset,
                    plane0,
                    plane1,
                } => {
                    if conversion_changed {
                        let constants = conversion_constants(frame.colorspace, frame.full_range);
                        // A `None` location is the "unused" sentinel: the
                        // update is skipped, never an error.
                        if conversion_matrix.is_some() {
                            gl.uniform_matrix_3_f32_slice(
                                conversion_matrix.as_ref(),
                                false,
                                &constants.matrix,
                            );
                        }
                        if channel_offset.is_some() {
                            gl.uniform_3_f32_slice(channel_offset.as_ref(), &constants.offsets);
                        }
                        conversion_uploaded = true;
                    }
                    if plane0.is_some() {
                        gl.uniform_1_i32(plane0.as_ref(), 0);
                    }
                    if plane1.is_some() {
                        gl.uniform_1_i32(plane1.as_ref(), 1);
                    }
                }
                VideoUniforms::Opaque { texture } => {
                    if texture.is_some() {
                        gl.uniform_1_i32(texture.as_ref(), 0);
                    }
                }
            }

            gl.draw_elements(glow::TRIANGLES, 6, glow::UNSIGNED_INT, 0);
        }

        let err = unsafe { gl.get_error() };
        if err != glow::NO_ERROR {
            warn!(err, "GL error during video draw");
        }
        if conversion_uploaded {
            self.last_conversion = Some(key);
        }
    }

    /// ### English
    /// Post-swap synchronization per the policy chosen at setup. Under a
    /// blocking swap the extra clear requires the new back buffer, so the
    /// fence cannot signal before that buffer is actually ready.
    ///
    /// ### 中文
    /// 按初始化时选定的策略做交换后同步。阻塞交换下，额外的 clear
    /// 依赖新的后台缓冲，因此 fence 不可能在该缓冲真正就绪前触发。
    fn apply_sync_after_swap(&mut self) {
        if !self.policy.inserts_fence() {
            return;
        }
        if self.policy.clears_before_fence() {
            unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };
        }
        if self.caps.fence_sync.is_available() {
            self.pending_fence.insert(&self.gl);
        }
    }
}
