//! ### English
//! Overlay compositing: transient status/debug graphics drawn over the
//! video.
//!
//! Overlay pixel content is produced externally; this module uploads it to
//! textures on demand and draws alpha-blended quads in normalized device
//! coordinates. The only cross-thread interaction in the whole core lives
//! here: content invalidation arrives from arbitrary threads as an atomic
//! flag write (never a GL call), and is read-and-cleared only on the
//! rendering thread.
//!
//! ### 中文
//! overlay 合成：绘制在视频之上的临时状态/调试图层。
//!
//! overlay 像素内容由外部产生；本模块按需上传到纹理，并以归一化设备
//! 坐标绘制 alpha 混合四边形。整个核心唯一的跨线程交互就在这里：
//! 内容失效以原子标志写入的形式来自任意线程（绝不调用 GL），
//! 且只在渲染线程上读取并清除。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

mod compositor;
mod geometry;

pub(crate) use compositor::OverlayCompositor;
pub(crate) use geometry::vertex_bytes;

/// ### English
/// Fixed overlay slot count.
///
/// ### 中文
/// 固定的 overlay 槽位数量。
pub const OVERLAY_SLOT_COUNT: usize = 2;

/// ### English
/// The fixed overlay slots. Each slot has a fixed screen placement.
///
/// ### 中文
/// 固定的 overlay 槽位。每个槽位有固定的屏幕位置。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlaySlot {
    /// ### English
    /// Status text, bottom-left corner.
    ///
    /// ### 中文
    /// 状态文本，左下角。
    StatusUpdate,
    /// ### English
    /// Debug statistics, top-left corner.
    ///
    /// ### 中文
    /// 调试统计，左上角。
    Debug,
}

impl OverlaySlot {
    /// ### English
    /// All slots in draw order.
    ///
    /// ### 中文
    /// 按绘制顺序排列的全部槽位。
    pub const ALL: [OverlaySlot; OVERLAY_SLOT_COUNT] = [OverlaySlot::StatusUpdate, OverlaySlot::Debug];

    /// ### English
    /// Array index of this slot.
    ///
    /// ### 中文
    /// 该槽位的数组下标。
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            OverlaySlot::StatusUpdate => 0,
            OverlaySlot::Debug => 1,
        }
    }
}

/// ### English
/// Bytes per overlay pixel (8-bit BGRA/RGBA style surfaces).
///
/// ### 中文
/// 每个 overlay 像素的字节数（8-bit BGRA/RGBA 类 surface）。
pub const OVERLAY_BYTES_PER_PIXEL: u32 = 4;

/// ### English
/// A pre-rendered overlay pixel buffer handed over by the content source.
/// Rows may be padded: `stride_bytes >= width * 4`.
///
/// ### 中文
/// 内容源交付的预渲染 overlay 像素缓冲。行可能有填充：
/// `stride_bytes >= width * 4`。
pub struct OverlaySurface {
    /// ### English
    /// Width in pixels.
    ///
    /// ### 中文
    /// 宽度（像素）。
    pub width: u32,
    /// ### English
    /// Height in pixels.
    ///
    /// ### 中文
    /// 高度（像素）。
    pub height: u32,
    /// ### English
    /// Bytes per row, padding included.
    ///
    /// ### 中文
    /// 每行字节数（含填充）。
    pub stride_bytes: u32,
    /// ### English
    /// Pixel data, `height` rows of `stride_bytes`.
    ///
    /// ### 中文
    /// 像素数据，`height` 行，每行 `stride_bytes` 字节。
    pub pixels: Vec<u8>,
}

impl OverlaySurface {
    /// ### English
    /// Row length without padding.
    ///
    /// ### 中文
    /// 去除填充后的行字节数。
    #[inline]
    pub fn tight_stride(&self) -> u32 {
        self.width * OVERLAY_BYTES_PER_PIXEL
    }
}

/// ### English
/// Overlay content collaborator. Must be callable from any thread: the
/// notifier consults `is_enabled` off the rendering thread.
///
/// ### 中文
/// overlay 内容协作方。必须可从任意线程调用：notifier 会在渲染线程之外
/// 查询 `is_enabled`。
pub trait OverlaySource: Send + Sync {
    /// ### English
    /// Whether the slot's content is enabled.
    ///
    /// ### 中文
    /// 该槽位内容是否启用。
    fn is_enabled(&self, slot: OverlaySlot) -> bool;

    /// ### English
    /// Returns a freshly rendered surface if the content changed since the
    /// last call, else `None`.
    ///
    /// ### 中文
    /// 若内容自上次调用后发生变化，返回新渲染的 surface；否则返回 `None`。
    fn take_updated_surface(&self, slot: OverlaySlot) -> Option<OverlaySurface>;
}

struct SlotFlags {
    /// ### English
    /// Written by any thread via the notifier; read-and-cleared only by the
    /// rendering thread.
    ///
    /// ### 中文
    /// 由任意线程经 notifier 写入；只在渲染线程读取并清除。
    dirty: AtomicBool,
    /// ### English
    /// Single source of truth for "draw this overlay this frame". Cleared
    /// when the source is disabled; set only after a fresh upload.
    ///
    /// ### 中文
    /// “本帧是否绘制该 overlay”的唯一事实来源。源被禁用时清除；
    /// 只有完成新内容上传后才置位。
    valid: AtomicBool,
}

/// ### English
/// Per-slot atomic overlay state shared between the rendering thread and
/// the notifier. The only shared mutable state that crosses threads in this
/// core.
///
/// ### 中文
/// 渲染线程与 notifier 共享的每槽位原子状态。本核心中唯一跨线程的
/// 共享可变状态。
pub(crate) struct OverlayFlags {
    slots: [SlotFlags; OVERLAY_SLOT_COUNT],
}

impl OverlayFlags {
    pub(crate) fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| SlotFlags {
                dirty: AtomicBool::new(false),
                valid: AtomicBool::new(false),
            }),
        }
    }

    /// ### English
    /// Marks a slot's content as changed (any thread).
    ///
    /// ### 中文
    /// 标记槽位内容已变（任意线程）。
    pub(crate) fn mark_dirty(&self, slot: OverlaySlot) {
        self.slots[slot.index()].dirty.store(true, Ordering::Release);
    }

    /// ### English
    /// Reads and clears the dirty flag. Rendering thread only.
    ///
    /// ### 中文
    /// 读取并清除 dirty 标志。仅限渲染线程。
    pub(crate) fn take_dirty(&self, slot: OverlaySlot) -> bool {
        self.slots[slot.index()].dirty.swap(false, Ordering::AcqRel)
    }

    /// ### English
    /// Sets the validity flag.
    ///
    /// ### 中文
    /// 设置有效标志。
    pub(crate) fn set_valid(&self, slot: OverlaySlot, valid: bool) {
        self.slots[slot.index()].valid.store(valid, Ordering::Release);
    }

    /// ### English
    /// Reads the validity flag.
    ///
    /// ### 中文
    /// 读取有效标志。
    pub(crate) fn is_valid(&self, slot: OverlaySlot) -> bool {
        self.slots[slot.index()].valid.load(Ordering::Acquire)
    }
}

/// ### English
/// Cloneable cross-thread handle for overlay-content invalidation. Never
/// touches GL; a disabled source clears the slot's validity so the next
/// frame skips the draw.
///
/// ### 中文
/// 可克隆的跨线程 overlay 内容失效句柄。绝不触碰 GL；
/// 源被禁用时清除该槽位的有效标志，使下一帧跳过绘制。
#[derive(Clone)]
pub struct OverlayNotifier {
    flags: Arc<OverlayFlags>,
    source: Arc<dyn OverlaySource>,
}

impl OverlayNotifier {
    pub(crate) fn new(flags: Arc<OverlayFlags>, source: Arc<dyn OverlaySource>) -> Self {
        Self { flags, source }
    }

    /// ### English
    /// Notifies that a slot's source content was disabled or updated.
    /// Callable from any thread; idempotent until the rendering thread
    /// consumes the flag.
    ///
    /// ### 中文
    /// 通知某槽位的源内容被禁用或已更新。可从任意线程调用；
    /// 在渲染线程消费标志之前是幂等的。
    pub fn content_changed(&self, slot: OverlaySlot) {
        if !self.source.is_enabled(slot) {
            // Disabled: the currently uploaded data is stale. The upload in
            // the render path is the only place that sets validity again.
            self.flags.set_valid(slot, false);
        }
        self.flags.mark_dirty(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ToggleSource {
        enabled: AtomicBool,
    }

    impl OverlaySource for ToggleSource {
        fn is_enabled(&self, _slot: OverlaySlot) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }

        fn take_updated_surface(&self, _slot: OverlaySlot) -> Option<OverlaySurface> {
            None
        }
    }

    fn notifier(enabled: bool) -> (Arc<OverlayFlags>, OverlayNotifier) {
        let flags = Arc::new(OverlayFlags::new());
        let source = Arc::new(ToggleSource {
            enabled: AtomicBool::new(enabled),
        });
        (flags.clone(), OverlayNotifier::new(flags, source))
    }

    #[test]
    fn notify_is_idempotent_before_consumption() {
        let (flags, notifier) = notifier(true);
        notifier.content_changed(OverlaySlot::Debug);
        notifier.content_changed(OverlaySlot::Debug);

        // One render-thread consumption observes exactly one change.
        assert!(flags.take_dirty(OverlaySlot::Debug));
        assert!(!flags.take_dirty(OverlaySlot::Debug));
        // The other slot is untouched.
        assert!(!flags.take_dirty(OverlaySlot::StatusUpdate));
    }

    #[test]
    fn disable_notification_invalidates_the_slot() {
        let (flags, notifier) = notifier(false);
        flags.set_valid(OverlaySlot::StatusUpdate, true);

        notifier.content_changed(OverlaySlot::StatusUpdate);
        assert!(!flags.is_valid(OverlaySlot::StatusUpdate));
        assert!(flags.take_dirty(OverlaySlot::StatusUpdate));
    }

    #[test]
    fn enabled_notification_preserves_validity() {
        let (flags, notifier) = notifier(true);
        flags.set_valid(OverlaySlot::Debug, true);

        notifier.content_changed(OverlaySlot::Debug);
        assert!(flags.is_valid(OverlaySlot::Debug));
    }
}
