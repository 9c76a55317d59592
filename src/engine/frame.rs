//! ### English
//! Decoded-frame data model and previous-frame retention.
//!
//! Ownership contract: a frame transfers to this core on submission. After a
//! successful render the frame is *retained* (not released) until the next
//! frame has been imported and drawn, because the GPU may still be reading
//! its backing memory asynchronously relative to the decoder reclaiming it.
//!
//! ### 中文
//! 解码帧数据模型与上一帧保留。
//!
//! 所有权契约：帧在提交时转移给本核心。渲染成功后该帧被“保留”
//! （不释放），直到下一帧完成导入与绘制：GPU 可能仍在异步读取
//! 其底层内存，而解码器可能已准备回收它。

use std::any::Any;

use dpi::PhysicalSize;

/// ### English
/// Colorspace tag detected on a decoded frame. The enum is closed: an
/// unrecognized tag cannot be represented, which makes the conversion
/// constant selection exhaustive by construction (silently guessing wrong
/// colors would be worse than a loud failure).
///
/// ### 中文
/// 解码帧上检测到的色彩空间标签。枚举是封闭的：无法表示未知标签，
/// 因而转换常量的选择在构造上就是穷尽的（悄悄猜错颜色比大声失败更糟）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Colorspace {
    /// ### English
    /// Standard definition (Rec. 601).
    ///
    /// ### 中文
    /// 标清（Rec. 601）。
    Rec601,
    /// ### English
    /// High definition (Rec. 709).
    ///
    /// ### 中文
    /// 高清（Rec. 709）。
    Rec709,
    /// ### English
    /// Ultra high definition (Rec. 2020).
    ///
    /// ### 中文
    /// 超高清（Rec. 2020）。
    Rec2020,
}

/// ### English
/// Native pixel-plane layout of imported frames. Discovered once from the
/// first frame and fixed for the renderer's lifetime; a layout change
/// requires full renderer re-creation by the host.
///
/// ### 中文
/// 导入帧的原生像素平面布局。从首帧发现一次，之后在 renderer 生命周期内
/// 固定；布局变化需要宿主整体重建 renderer。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// ### English
    /// Two-plane luma/chroma format (e.g. NV12-family biplanar YUV).
    ///
    /// ### 中文
    /// 两平面亮度/色度格式（例如 NV12 一族的 biplanar YUV）。
    BiplanarYuv,
    /// ### English
    /// Driver-opaque composed single-surface format; sampled as ready-made
    /// RGB without conversion.
    ///
    /// ### 中文
    /// 驱动不透明的单 surface 组合格式；按现成 RGB 采样，无需转换。
    OpaqueSurface,
}

/// ### English
/// One decoded video frame as submitted by the frame source. `payload` is
/// the decoder's opaque backing handle; dropping the frame releases the
/// backing memory back to the decoder.
///
/// ### 中文
/// 帧源提交的一帧解码视频。`payload` 是解码器的不透明底层句柄；
/// drop 该帧即把底层内存释放回解码器。
pub struct DecodedFrame {
    /// ### English
    /// Frame width in pixels.
    ///
    /// ### 中文
    /// 帧宽度（像素）。
    pub width: u32,
    /// ### English
    /// Frame height in pixels.
    ///
    /// ### 中文
    /// 帧高度（像素）。
    pub height: u32,
    /// ### English
    /// Detected colorspace tag.
    ///
    /// ### 中文
    /// 检测到的色彩空间标签。
    pub colorspace: Colorspace,
    /// ### English
    /// Full range (true) vs studio/limited range (false).
    ///
    /// ### 中文
    /// 全范围（true）或 studio/有限范围（false）。
    pub full_range: bool,
    /// ### English
    /// Pixel-plane layout of this frame.
    ///
    /// ### 中文
    /// 该帧的像素平面布局。
    pub layout: PixelLayout,
    /// ### English
    /// Decoder-owned backing handle (DMA buffer, driver frame, ...). Its
    /// `Drop` releases the backing memory.
    ///
    /// ### 中文
    /// 解码器持有的底层句柄（DMA 缓冲、驱动帧……）。其 `Drop`
    /// 负责释放底层内存。
    pub payload: Box<dyn Any + Send>,
}

impl DecodedFrame {
    /// ### English
    /// Frame dimensions.
    ///
    /// ### 中文
    /// 帧尺寸。
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("colorspace", &self.colorspace)
            .field("full_range", &self.full_range)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// ### English
/// Holds the most recently displayed frame. `retain` must only be called
/// once the replacement frame is safely in flight (imported and drawn);
/// storing the new frame is what releases the prior one.
///
/// ### 中文
/// 持有最近显示的一帧。`retain` 只能在替换帧已安全在途（完成导入与绘制）
/// 后调用；存入新帧的动作本身就会释放前一帧。
#[derive(Default)]
pub struct RetainedFrame {
    last: Option<DecodedFrame>,
}

impl RetainedFrame {
    /// ### English
    /// Releases the previously retained frame and retains `frame` in its
    /// place.
    ///
    /// ### 中文
    /// 释放之前保留的帧，并转而保留 `frame`。
    pub fn retain(&mut self, frame: DecodedFrame) {
        self.last = Some(frame);
    }

    /// ### English
    /// Whether a frame is currently retained.
    ///
    /// ### 中文
    /// 当前是否保留着一帧。
    pub fn is_holding(&self) -> bool {
        self.last.is_some()
    }

    /// ### English
    /// Drops the retained frame, releasing its backing memory. Only valid
    /// once the GPU can no longer be reading it (after teardown sync).
    ///
    /// ### 中文
    /// drop 被保留的帧并释放其底层内存。仅当 GPU 已不可能再读取它
    /// （销毁同步之后）才有效。
    pub fn release(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn frame_with_payload(drops: &Arc<AtomicUsize>) -> DecodedFrame {
        DecodedFrame {
            width: 1920,
            height: 1080,
            colorspace: Colorspace::Rec709,
            full_range: false,
            layout: PixelLayout::BiplanarYuv,
            payload: Box::new(DropCounter(drops.clone())),
        }
    }

    #[test]
    fn retain_releases_exactly_the_prior_frame() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut retained = RetainedFrame::default();

        retained.retain(frame_with_payload(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        // Retaining the next frame releases frame N, and only frame N.
        retained.retain(frame_with_payload(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        retained.retain(frame_with_payload(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 2);

        retained.release();
        assert_eq!(drops.load(Ordering::SeqCst), 3);
        assert!(!retained.is_holding());
    }
}
