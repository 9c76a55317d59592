//! ### English
//! Synchronization strategy: swap-policy selection and the
//! single-outstanding-fence discipline.
//!
//! Two presentation-latency policies exist. With a non-blocking swap the CPU
//! keeps preparing the next frame and a GPU fence (waited on before the next
//! frame's work) prevents running ahead of the display. With a blocking swap
//! the present call itself stalls until the display consumes the frame; an
//! extra clear is issued before the fence so the following wait is
//! guaranteed the *new* back buffer is ready, not merely that the old one
//! was consumed. Platforms where that extra wait causes double-buffering
//! stalls use the blocking swap alone.
//!
//! ### 中文
//! 同步策略：交换策略选择与“至多一个未决 fence”纪律。
//!
//! 存在两种呈现延迟策略。非阻塞交换下 CPU 继续准备下一帧，用 GPU fence
//! （在下一帧工作开始前等待）防止跑在显示之前。阻塞交换下 present 调用
//! 本身会阻塞到显示器消费完该帧；fence 之前额外发出一次 clear，保证随后
//! 的等待确认的是“新的后台缓冲已就绪”，而不只是旧缓冲被消费。
//! 在额外等待会造成双缓冲卡顿的平台上，只用阻塞交换本身。

use glow::HasContext as _;
use tracing::warn;

use super::platform::WindowingKind;

/// ### English
/// Per-platform presentation-latency policy, chosen once at setup.
///
/// ### 中文
/// 按平台选定的呈现延迟策略，初始化时选择一次。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapPolicy {
    /// ### English
    /// Swap interval 0; fence after each swap, wait before the next frame.
    ///
    /// ### 中文
    /// swap interval 0；每次交换后插 fence，下一帧前等待。
    NonBlocking,
    /// ### English
    /// Swap interval 1 (swap blocks); extra clear + fence after the swap,
    /// wait before the next frame.
    ///
    /// ### 中文
    /// swap interval 1（交换阻塞）；交换后额外 clear + fence，
    /// 下一帧前等待。
    Blocking,
    /// ### English
    /// Swap interval 1 without the extra fence wait (platforms where the
    /// wait would lock rendering to half the refresh rate).
    ///
    /// ### 中文
    /// swap interval 1 但不做额外 fence 等待（等待会把渲染锁到
    /// 刷新率一半的平台）。
    BlockingNoWait,
}

impl SwapPolicy {
    /// ### English
    /// Selects the policy for a platform. The rule set is a starting
    /// heuristic built from empirically-discovered special cases and is
    /// expected to grow more of them.
    ///
    /// ### 中文
    /// 为平台选择策略。该规则表来自经验发现的特例，是一个起点启发式，
    /// 预期还会继续增加特例。
    pub fn select(vsync_requested: bool, windowing: WindowingKind) -> SwapPolicy {
        if !vsync_requested {
            return SwapPolicy::NonBlocking;
        }
        match windowing {
            // The compositor already guarantees tear-free presentation; a
            // blocking swap would only add latency.
            WindowingKind::Wayland => SwapPolicy::NonBlocking,
            // Direct scan-out is already double-buffered; the extra wait
            // would block a whole extra frame.
            WindowingKind::KmsDrm => SwapPolicy::BlockingNoWait,
            _ => SwapPolicy::Blocking,
        }
    }

    /// ### English
    /// Swap interval requested from the platform.
    ///
    /// ### 中文
    /// 向平台请求的 swap interval。
    #[inline]
    pub fn swap_interval(self) -> i32 {
        match self {
            SwapPolicy::NonBlocking => 0,
            SwapPolicy::Blocking | SwapPolicy::BlockingNoWait => 1,
        }
    }

    /// ### English
    /// Whether a fence is inserted after the swap.
    ///
    /// ### 中文
    /// 交换后是否插入 fence。
    #[inline]
    pub fn inserts_fence(self) -> bool {
        !matches!(self, SwapPolicy::BlockingNoWait)
    }

    /// ### English
    /// Whether an extra clear precedes the fence (blocking swap only).
    ///
    /// ### 中文
    /// fence 前是否需要额外 clear（仅阻塞交换）。
    #[inline]
    pub fn clears_before_fence(self) -> bool {
        matches!(self, SwapPolicy::Blocking)
    }

    /// ### English
    /// Whether the pre-frame wait step runs.
    ///
    /// ### 中文
    /// 帧前等待步骤是否执行。
    #[inline]
    pub fn waits_before_render(self) -> bool {
        !matches!(self, SwapPolicy::BlockingNoWait)
    }
}

/// ### English
/// Longest single `client_wait_sync` slice. The overall wait is unbounded
/// ("forever"); the loop below re-issues the wait until the fence signals.
///
/// ### 中文
/// 单次 `client_wait_sync` 的最长时间片。整体等待无上限（“永远”）；
/// 下方循环会反复等待直到 fence 触发。
const WAIT_SLICE_NANOS: i32 = i32::MAX;

/// ### English
/// At most one outstanding GPU fence per renderer instance. A new fence is
/// never created while a previous one is still alive: the old one is waited
/// on or destroyed first, and violating that is a defect, not a runtime
/// condition.
///
/// ### 中文
/// 每个 renderer 实例至多一个未决 GPU fence。旧 fence 仍存活时绝不创建
/// 新 fence：必须先等待或销毁旧者；违反属于缺陷，而非运行时状况。
#[derive(Default)]
pub struct PendingFence {
    fence: Option<glow::NativeFence>,
}

impl PendingFence {
    /// ### English
    /// Whether a fence is outstanding.
    ///
    /// ### 中文
    /// 是否存在未决 fence。
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.fence.is_some()
    }

    /// ### English
    /// Records a newly created fence. Returns a leftover prior fence (a
    /// contract violation, asserted in debug builds) that the caller must
    /// delete.
    ///
    /// ### 中文
    /// 记录新创建的 fence。返回残留的旧 fence（属契约违规，debug 构建下
    /// 断言），调用方必须删除它。
    fn note_inserted(&mut self, fence: glow::NativeFence) -> Option<glow::NativeFence> {
        let leftover = self.fence.take();
        debug_assert!(
            leftover.is_none(),
            "a second fence was created while one was pending"
        );
        self.fence = Some(fence);
        leftover
    }

    /// ### English
    /// Takes the outstanding fence, if any.
    ///
    /// ### 中文
    /// 取走未决 fence（若有）。
    fn take(&mut self) -> Option<glow::NativeFence> {
        self.fence.take()
    }

    /// ### English
    /// Inserts a fence into the command stream after the current frame's
    /// work. Creation failure degrades to the flush fallback at wait time.
    ///
    /// ### 中文
    /// 在当前帧工作之后向命令流插入 fence。创建失败则在等待时退化为
    /// flush 回退路径。
    pub fn insert(&mut self, gl: &glow::Context) {
        match unsafe { gl.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0) } {
            Ok(fence) => {
                if let Some(leftover) = self.note_inserted(fence) {
                    unsafe { gl.delete_sync(leftover) };
                }
            }
            Err(err) => {
                warn!(%err, "fence_sync failed; next wait will flush instead");
            }
        }
    }

    /// ### English
    /// Waits (unbounded) for the outstanding fence, then destroys it.
    /// Returns false if no fence was outstanding.
    ///
    /// ### 中文
    /// 无限等待未决 fence，然后销毁它。若无未决 fence 返回 false。
    pub fn wait_and_clear(&mut self, gl: &glow::Context) -> bool {
        let Some(fence) = self.take() else {
            return false;
        };
        // First slice flushes pending commands so the fence can signal.
        let mut flags = glow::SYNC_FLUSH_COMMANDS_BIT;
        loop {
            let status = unsafe { gl.client_wait_sync(fence, flags, WAIT_SLICE_NANOS) };
            match status {
                glow::ALREADY_SIGNALED | glow::CONDITION_SATISFIED => break,
                glow::TIMEOUT_EXPIRED => {
                    flags = 0;
                }
                _ => {
                    warn!(status, "client_wait_sync failed; abandoning wait");
                    break;
                }
            }
        }
        unsafe { gl.delete_sync(fence) };
        true
    }

    /// ### English
    /// Destroys the outstanding fence without waiting (teardown path).
    ///
    /// ### 中文
    /// 不等待，直接销毁未决 fence（销毁路径）。
    pub fn discard(&mut self, gl: &glow::Context) {
        if let Some(fence) = self.take() {
            unsafe { gl.delete_sync(fence) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_off_is_always_non_blocking() {
        for kind in [
            WindowingKind::Wayland,
            WindowingKind::X11,
            WindowingKind::KmsDrm,
            WindowingKind::Gbm,
            WindowingKind::Other,
        ] {
            assert_eq!(SwapPolicy::select(false, kind), SwapPolicy::NonBlocking);
        }
    }

    #[test]
    fn vsync_on_policy_table() {
        assert_eq!(
            SwapPolicy::select(true, WindowingKind::Wayland),
            SwapPolicy::NonBlocking
        );
        assert_eq!(
            SwapPolicy::select(true, WindowingKind::KmsDrm),
            SwapPolicy::BlockingNoWait
        );
        assert_eq!(
            SwapPolicy::select(true, WindowingKind::X11),
            SwapPolicy::Blocking
        );
        assert_eq!(
            SwapPolicy::select(true, WindowingKind::Other),
            SwapPolicy::Blocking
        );
    }

    #[test]
    fn policy_step_flags_are_consistent() {
        assert_eq!(SwapPolicy::NonBlocking.swap_interval(), 0);
        assert_eq!(SwapPolicy::Blocking.swap_interval(), 1);
        assert_eq!(SwapPolicy::BlockingNoWait.swap_interval(), 1);

        assert!(SwapPolicy::NonBlocking.inserts_fence());
        assert!(!SwapPolicy::NonBlocking.clears_before_fence());
        assert!(SwapPolicy::Blocking.inserts_fence());
        assert!(SwapPolicy::Blocking.clears_before_fence());
        assert!(!SwapPolicy::BlockingNoWait.inserts_fence());
        assert!(!SwapPolicy::BlockingNoWait.waits_before_render());
    }

    #[test]
    fn fence_bookkeeping_allows_at_most_one() {
        let mut pending = PendingFence::default();
        assert!(!pending.is_pending());

        let fake = glow::NativeFence(0x1 as usize as *mut _);
        assert!(pending.note_inserted(fake).is_none());
        assert!(pending.is_pending());

        // Insert-after-take is the legal sequence.
        assert!(pending.take().is_some());
        assert!(!pending.is_pending());
        assert!(pending.note_inserted(fake).is_none());
    }
}
