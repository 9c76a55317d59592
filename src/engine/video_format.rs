//! ### English
//! Bitflags describing the negotiated video stream format.
//!
//! Passed by the host as a `u32` bitmask at initialization; this core only
//! inspects the 10-bit mask (HDR formats are out of scope and fail
//! initialization explicitly).
//!
//! ### 中文
//! 描述协商后视频流格式的位标志。
//!
//! 宿主在初始化时以 `u32` 位掩码传入；本核心只检查 10-bit 掩码
//! （HDR 格式不在范围内，会显式地使初始化失败）。

/// ### English
/// 8-bit H.264 stream.
///
/// ### 中文
/// 8-bit H.264 码流。
pub const VIDEO_FORMAT_H264: u32 = 0x0001;

/// ### English
/// 8-bit H.265 (Main) stream.
///
/// ### 中文
/// 8-bit H.265（Main）码流。
pub const VIDEO_FORMAT_H265: u32 = 0x0100;

/// ### English
/// 10-bit H.265 (Main10) stream.
///
/// ### 中文
/// 10-bit H.265（Main10）码流。
pub const VIDEO_FORMAT_H265_MAIN10: u32 = 0x0200;

/// ### English
/// 8-bit AV1 (Main) stream.
///
/// ### 中文
/// 8-bit AV1（Main）码流。
pub const VIDEO_FORMAT_AV1_MAIN8: u32 = 0x1000;

/// ### English
/// 10-bit AV1 (Main10) stream.
///
/// ### 中文
/// 10-bit AV1（Main10）码流。
pub const VIDEO_FORMAT_AV1_MAIN10: u32 = 0x2000;

/// ### English
/// Mask of all 10-bit formats. This renderer does not support HDR output;
/// any of these bits makes initialization fail with an explicit error.
///
/// ### 中文
/// 所有 10-bit 格式的掩码。本 renderer 不支持 HDR 输出；
/// 只要出现其中任一位，初始化就会以显式错误失败。
pub const VIDEO_FORMAT_MASK_10BIT: u32 = VIDEO_FORMAT_H265_MAIN10 | VIDEO_FORMAT_AV1_MAIN10;
