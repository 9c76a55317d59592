//! ### English
//! Aspect-correct destination rectangle math.
//!
//! The source frame is scaled into the drawable preserving aspect ratio and
//! centered, leaving letterbox/pillarbox margins when the ratios differ.
//!
//! ### 中文
//! 保持宽高比的目标矩形计算。
//!
//! 源帧按宽高比缩放进 drawable 并居中；宽高比不同的方向留出
//! 信箱/柱箱边距。

use dpi::PhysicalSize;

/// ### English
/// Destination rectangle in drawable pixel coordinates (GL viewport
/// convention: origin at the bottom-left).
///
/// ### 中文
/// drawable 像素坐标下的目标矩形（GL viewport 约定：原点在左下角）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestRect {
    /// ### English
    /// Left edge.
    ///
    /// ### 中文
    /// 左边缘。
    pub x: i32,
    /// ### English
    /// Bottom edge.
    ///
    /// ### 中文
    /// 下边缘。
    pub y: i32,
    /// ### English
    /// Width in pixels.
    ///
    /// ### 中文
    /// 宽度（像素）。
    pub width: i32,
    /// ### English
    /// Height in pixels.
    ///
    /// ### 中文
    /// 高度（像素）。
    pub height: i32,
}

/// ### English
/// Scales `frame` into `drawable` preserving aspect ratio:
/// `scale = min(dw/fw, dh/fh)`, destination size is the frame size × scale
/// (rounded), and the remainder is split evenly to center the image.
/// Degenerate (zero) inputs produce an empty rectangle.
///
/// ### 中文
/// 将 `frame` 按宽高比缩放进 `drawable`：
/// `scale = min(dw/fw, dh/fh)`，目标尺寸为帧尺寸 × scale（取整），
/// 剩余空间均分以使图像居中。退化（为零）的输入产生空矩形。
pub fn scale_to_fit(frame: PhysicalSize<u32>, drawable: PhysicalSize<u32>) -> DestRect {
    if frame.width == 0 || frame.height == 0 || drawable.width == 0 || drawable.height == 0 {
        return DestRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    let scale = f64::min(
        f64::from(drawable.width) / f64::from(frame.width),
        f64::from(drawable.height) / f64::from(frame.height),
    );
    let width = (f64::from(frame.width) * scale).round() as i32;
    let height = (f64::from(frame.height) * scale).round() as i32;

    DestRect {
        x: (drawable.width as i32 - width) / 2,
        y: (drawable.height as i32 - height) / 2,
        width,
        height,
    }
}

/// ### English
/// Whether `dest` is an exact integer multiple of the frame size (same
/// factor on both axes). Exact scales are resampled with nearest-neighbor
/// filtering to avoid softening.
///
/// ### 中文
/// `dest` 是否为帧尺寸的精确整数倍（两轴同一倍率）。精确倍率下使用
/// 最近邻采样，避免画面变软。
pub fn is_integer_scale(frame: PhysicalSize<u32>, dest: &DestRect) -> bool {
    if frame.width == 0 || frame.height == 0 || dest.width <= 0 || dest.height <= 0 {
        return false;
    }
    let (fw, fh) = (frame.width as i32, frame.height as i32);
    dest.width % fw == 0 && dest.height % fh == 0 && dest.width / fw == dest.height / fh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> PhysicalSize<u32> {
        PhysicalSize::new(w, h)
    }

    #[test]
    fn exact_fit_fills_the_drawable() {
        // 1920×1080 into 1280×720: scale = 2/3, no letterbox.
        let dest = scale_to_fit(size(1920, 1080), size(1280, 720));
        assert_eq!(
            dest,
            DestRect {
                x: 0,
                y: 0,
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn wider_frame_is_letterboxed_top_and_bottom() {
        // 1920×800 into 1920×1080: scale = min(1, 1.35) = 1.
        let dest = scale_to_fit(size(1920, 800), size(1920, 1080));
        assert_eq!(
            dest,
            DestRect {
                x: 0,
                y: 140,
                width: 1920,
                height: 800
            }
        );
    }

    #[test]
    fn taller_frame_is_pillarboxed_left_and_right() {
        let dest = scale_to_fit(size(1080, 1920), size(1920, 1080));
        assert_eq!(dest.height, 1080);
        assert_eq!(dest.width, 608); // 1080 * (1080/1920) = 607.5, rounded
        assert_eq!(dest.x, (1920 - 608) / 2);
        assert_eq!(dest.y, 0);
    }

    #[test]
    fn aspect_ratio_is_preserved_within_rounding() {
        for (fw, fh, dw, dh) in [
            (1920u32, 1080u32, 800u32, 600u32),
            (1280, 720, 1920, 1200),
            (720, 576, 1366, 768),
            (640, 480, 2560, 1440),
        ] {
            let dest = scale_to_fit(size(fw, fh), size(dw, dh));
            let frame_ratio = f64::from(fw) / f64::from(fh);
            let dest_ratio = f64::from(dest.width) / f64::from(dest.height);
            assert!(
                (frame_ratio - dest_ratio).abs() < 0.01,
                "{fw}x{fh} -> {dest:?}"
            );
            assert_eq!(dest.x, (dw as i32 - dest.width) / 2);
            assert_eq!(dest.y, (dh as i32 - dest.height) / 2);
        }
    }

    #[test]
    fn degenerate_inputs_produce_an_empty_rect() {
        let empty = DestRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
        assert_eq!(scale_to_fit(size(0, 1080), size(1920, 1080)), empty);
        assert_eq!(scale_to_fit(size(1920, 1080), size(0, 0)), empty);
    }

    #[test]
    fn integer_scale_detection() {
        let frame = size(640, 360);
        let exact = scale_to_fit(frame, size(1280, 720));
        assert!(is_integer_scale(frame, &exact));

        let fractional = scale_to_fit(frame, size(1000, 720));
        assert!(!is_integer_scale(frame, &fractional));

        // Same multiples on both axes required.
        let skewed = DestRect {
            x: 0,
            y: 0,
            width: 1280,
            height: 360,
        };
        assert!(!is_integer_scale(frame, &skewed));
    }
}
