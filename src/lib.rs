/// ### English
/// `prism_video_engine` crate root.
/// A hardware-accelerated video frame presentation pipeline: imports decoded
/// GPU-resident frames without a copy, converts colorspace in a shader,
/// scales with letterboxing, composites overlays, and presents at the
/// display's refresh cadence. Core implementation lives under `engine`; the
/// host-facing surface is re-exported here.
///
/// ### 中文
/// `prism_video_engine` 的 crate 根。
/// 硬件加速的视频帧呈现管线：零拷贝导入解码后的 GPU 常驻帧，在着色器中做
/// 色彩空间转换，按宽高比缩放（信箱模式），合成 overlay，并按显示刷新节奏
/// 呈现。核心实现位于 `engine` 模块；面向宿主的接口在此处 re-export。
pub mod engine;

pub use engine::bridge::{ImportBackend, MAX_PLANE_COUNT, PlaneImage};
pub use engine::caps::{CapabilitySet, FenceSyncMechanism};
pub use engine::error::{InitError, PlatformError, ResetEvent, ShaderError};
pub use engine::frame::{Colorspace, DecodedFrame, PixelLayout};
pub use engine::overlay::{OverlayNotifier, OverlaySlot, OverlaySource, OverlaySurface};
pub use engine::platform::{
    ContextAttributes, GEOMETRY_CHANGE_DISPLAY, GEOMETRY_CHANGE_SIZE, PlatformWindow,
    WindowingKind,
};
pub use engine::presenter::{FramePresenter, FramePresenterInit, PresenterState};
pub use engine::shader::{EmbeddedShaderLoader, ShaderSourceLoader};
pub use engine::sync::SwapPolicy;
pub use engine::video_format::{
    VIDEO_FORMAT_AV1_MAIN8, VIDEO_FORMAT_AV1_MAIN10, VIDEO_FORMAT_H264, VIDEO_FORMAT_H265,
    VIDEO_FORMAT_H265_MAIN10, VIDEO_FORMAT_MASK_10BIT,
};
