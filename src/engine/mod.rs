/// ### English
/// Engine internal modules (capabilities, import bridge, shading, overlay
/// compositing, per-frame presentation, and synchronization).
///
/// ### 中文
/// 引擎内部模块（能力探测、导入桥、着色、overlay 合成、逐帧呈现与同步）。
pub mod bridge;
pub mod caps;
pub mod colorspace;
pub mod error;
pub mod frame;
pub mod overlay;
pub mod platform;
pub mod presenter;
pub mod shader;
pub mod sync;
pub mod video_format;
pub mod viewport;
