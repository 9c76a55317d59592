//! ### English
//! Overlay quad geometry.
//!
//! Overlay placement is declared in drawable pixel coordinates with a
//! top-left origin (the convention overlay content is rendered in). OpenGL
//! puts the origin at the bottom-left, so the destination rectangle's
//! vertical axis is flipped before conversion into normalized device
//! coordinates.
//!
//! ### 中文
//! overlay 四边形几何。
//!
//! overlay 位置以 drawable 像素坐标声明，原点在左上角（overlay 内容的
//! 渲染约定）。OpenGL 的原点在左下角，因此在转换为归一化设备坐标之前，
//! 先翻转目标矩形的纵轴。

use dpi::PhysicalSize;

use super::{OverlaySlot, OverlaySurface};

/// ### English
/// Destination rectangle in top-left-origin pixel coordinates.
///
/// ### 中文
/// 左上角原点像素坐标下的目标矩形。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// ### English
/// Fixed screen placement for a slot's surface: StatusUpdate sits in the
/// bottom-left corner, Debug in the top-left.
///
/// ### 中文
/// 槽位 surface 的固定屏幕位置：StatusUpdate 在左下角，Debug 在左上角。
pub(crate) fn placement(
    slot: OverlaySlot,
    surface: &OverlaySurface,
    drawable: PhysicalSize<u32>,
) -> PixelRect {
    let y = match slot {
        OverlaySlot::StatusUpdate => drawable.height.saturating_sub(surface.height),
        OverlaySlot::Debug => 0,
    };
    PixelRect {
        x: 0,
        y,
        width: surface.width,
        height: surface.height,
    }
}

/// ### English
/// Interleaved quad vertices `(x, y, u, v) × 4` for `rect`, in NDC, ordered
/// to match the shared quad index buffer (top-right, bottom-right,
/// bottom-left, top-left). Texture row 0 (the image top) maps to the top of
/// the quad.
///
/// ### 中文
/// `rect` 的交错四边形顶点 `(x, y, u, v) × 4`（NDC），顶点顺序与共享
/// 索引缓冲一致（右上、右下、左下、左上）。纹理第 0 行（图像顶部）
/// 映射到四边形顶部。
pub(crate) fn quad_vertices(rect: PixelRect, drawable: PhysicalSize<u32>) -> [f32; 16] {
    let dw = drawable.width.max(1) as f32;
    let dh = drawable.height.max(1) as f32;

    // Flip the vertical axis: top-left-origin pixels → bottom-left-origin.
    let gl_bottom = dh - (rect.y + rect.height) as f32;

    let left = (rect.x as f32 / dw) * 2.0 - 1.0;
    let right = ((rect.x + rect.width) as f32 / dw) * 2.0 - 1.0;
    let bottom = (gl_bottom / dh) * 2.0 - 1.0;
    let top = ((gl_bottom + rect.height as f32) / dh) * 2.0 - 1.0;

    [
        right, top, 1.0, 0.0, //
        right, bottom, 1.0, 1.0, //
        left, bottom, 0.0, 1.0, //
        left, top, 0.0, 0.0,
    ]
}

/// ### English
/// Reinterprets interleaved vertex data as the byte slice GL buffer uploads
/// expect.
///
/// ### 中文
/// 将交错顶点数据重解释为 GL 缓冲上传所需的字节切片。
pub(crate) fn vertex_bytes(vertices: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(vertices.as_ptr().cast::<u8>(), std::mem::size_of_val(vertices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(width: u32, height: u32) -> OverlaySurface {
        OverlaySurface {
            width,
            height,
            stride_bytes: width * 4,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn status_overlay_sits_in_the_bottom_left() {
        let drawable = PhysicalSize::new(800, 600);
        let rect = placement(OverlaySlot::StatusUpdate, &surface(200, 100), drawable);
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 500,
                width: 200,
                height: 100
            }
        );

        let quad = quad_vertices(rect, drawable);
        // Bottom edge of the drawable after the vertical flip.
        assert!(close(quad[5], -1.0), "bottom-right y: {}", quad[5]);
        assert!(close(quad[13], -1.0 + 2.0 * 100.0 / 600.0), "top-left y");
        assert!(close(quad[12], -1.0), "left x");
        assert!(close(quad[0], -1.0 + 2.0 * 200.0 / 800.0), "right x");
    }

    #[test]
    fn debug_overlay_sits_in_the_top_left() {
        let drawable = PhysicalSize::new(800, 600);
        let rect = placement(OverlaySlot::Debug, &surface(320, 100), drawable);
        assert_eq!(rect.y, 0);

        let quad = quad_vertices(rect, drawable);
        // The quad's top edge touches the top of the drawable.
        assert!(close(quad[1], 1.0), "top-right y: {}", quad[1]);
        assert!(close(quad[5], 1.0 - 2.0 * 100.0 / 600.0), "bottom y");
    }

    #[test]
    fn image_top_maps_to_quad_top() {
        let drawable = PhysicalSize::new(640, 480);
        let rect = placement(OverlaySlot::Debug, &surface(64, 32), drawable);
        let quad = quad_vertices(rect, drawable);
        // Vertices with v == 0.0 (texture row 0) must carry the larger y.
        let top_y = quad[1];
        let bottom_y = quad[5];
        assert!(close(quad[3], 0.0) && close(quad[15], 0.0));
        assert!(close(quad[7], 1.0) && close(quad[11], 1.0));
        assert!(top_y > bottom_y);
    }

    #[test]
    fn oversized_overlay_clamps_to_the_drawable() {
        let drawable = PhysicalSize::new(100, 50);
        let rect = placement(OverlaySlot::StatusUpdate, &surface(100, 80), drawable);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn vertex_bytes_length_matches() {
        let quad = [0.0f32; 16];
        assert_eq!(vertex_bytes(&quad).len(), 64);
    }
}
