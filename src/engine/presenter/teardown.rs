//! ### English
//! Teardown for `FramePresenter`.
//!
//! ### 中文
//! `FramePresenter` 的销毁逻辑。

use glow::HasContext as _;
use tracing::warn;

use super::FramePresenter;

impl FramePresenter {
    /// ### English
    /// Destroys all GL resources owned by this presenter (idempotent).
    ///
    /// Reattaches the context first: after `cleanup_render_context` the
    /// rendering thread has detached it, so teardown may run on another
    /// thread. The retained frame is released here too: with the fence
    /// discarded and the context going away, the GPU can no longer be
    /// reading it.
    ///
    /// ### 中文
    /// 销毁该 presenter 持有的所有 GL 资源（幂等）。
    ///
    /// 先重新 attach 上下文：`cleanup_render_context` 之后渲染线程已
    /// detach，销毁可能在其它线程运行。保留的帧也在此释放：fence 已
    /// 丢弃且上下文即将消失，GPU 不可能再读取它。
    pub fn destroy_gl_resources(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Err(err) = self.platform.make_current() {
            warn!(%err, "cannot attach GL context for teardown; GL resources leak");
            self.retained.release();
            return;
        }

        self.pending_fence.discard(&self.gl);
        if let Some(programs) = self.programs.take() {
            programs.destroy(&self.gl);
        }
        unsafe {
            for texture in self.plane_textures {
                self.gl.delete_texture(texture);
            }
            self.gl.delete_buffer(self.quad_vbo);
            self.gl.delete_buffer(self.quad_ebo);
        }
        self.overlay.destroy(&self.gl);

        self.retained.release();
        self.platform.release_current();
    }
}

impl Drop for FramePresenter {
    fn drop(&mut self) {
        self.destroy_gl_resources();
        // `_attr_guard` drops after this, restoring the platform's context
        // attribute request.
    }
}
