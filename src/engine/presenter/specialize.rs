//! ### English
//! Lazy one-time specialization: layout discovery on the first frame plus
//! shader variant compilation.
//!
//! ### 中文
//! 惰性的一次性特化：首帧时发现布局并编译着色器变体。

use tracing::{error, info};

use crate::engine::error::ResetEvent;
use crate::engine::shader;

use super::{FramePresenter, PresenterState};

impl FramePresenter {
    /// ### English
    /// Ensures the shader variants exist, discovering the native pixel
    /// layout from the backend on the first call. Returns whether the
    /// driver may draw.
    ///
    /// Specialization failure is fatal for this instance: the state becomes
    /// `ResetRequested` and a reset event is emitted instead of drawing;
    /// partial GPU state may already be bound, so recovery requires a full
    /// re-probe / re-create by the host.
    ///
    /// ### 中文
    /// 确保着色器变体已存在；首次调用时向后端查询原生像素布局。
    /// 返回驱动器是否可以绘制。
    ///
    /// 特化失败对本实例是致命的：状态转为 `ResetRequested` 并发出重置
    /// 事件而非绘制；部分 GPU 状态可能已被绑定，恢复需要宿主整体
    /// 重新探测/重建。
    pub(super) fn ensure_specialized(&mut self) -> bool {
        if self.programs.is_some() {
            return true;
        }

        let layout = self.backend.native_pixel_layout();
        info!(?layout, "first frame: discovered native pixel layout");

        match shader::specialize(&self.gl, self.shader_loader.as_ref(), layout) {
            Ok(programs) => {
                self.programs = Some(programs);
                self.state = PresenterState::Ready;
                true
            }
            Err(err) => {
                error!(%err, "shader specialization failed; requesting renderer reset");
                self.state = PresenterState::ResetRequested;
                if self.reset_tx.send(ResetEvent::SpecializationFailed).is_err() {
                    error!("reset channel disconnected; host will not observe the reset request");
                }
                false
            }
        }
    }
}
