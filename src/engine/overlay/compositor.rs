//! ### English
//! GL side of the overlay compositor: texture/VBO ownership, strided
//! uploads, and the alpha-blended quad draw.
//!
//! ### 中文
//! overlay 合成器的 GL 部分：纹理/VBO 所有权、带跨距的上传，
//! 以及 alpha 混合四边形绘制。

use dpi::PhysicalSize;
use glow::HasContext as _;
use tracing::warn;

use super::geometry::{self, vertex_bytes};
use super::{OVERLAY_SLOT_COUNT, OverlayFlags, OverlaySlot, OverlaySource, OverlaySurface};
use crate::engine::shader::{ATTRIB_POSITION, ATTRIB_TEXCOORD, OverlayProgram};

/// ### English
/// Copies a row-padded surface into a tightly-packed buffer for drivers
/// without row-length unpack support.
///
/// ### 中文
/// 将带行填充的 surface 拷贝为紧密排列的缓冲，供不支持行长 unpack
/// 的驱动使用。
pub(crate) fn repack_tight(surface: &OverlaySurface) -> Vec<u8> {
    let tight = surface.tight_stride() as usize;
    let stride = surface.stride_bytes as usize;
    let mut packed = Vec::with_capacity(tight * surface.height as usize);
    for row in 0..surface.height as usize {
        let start = row * stride;
        packed.extend_from_slice(&surface.pixels[start..start + tight]);
    }
    packed
}

/// ### English
/// Per-slot GL resources plus the upload/draw logic. Owned by the frame
/// presentation driver; all methods run on the rendering thread with the
/// context current.
///
/// ### 中文
/// 每槽位的 GL 资源及上传/绘制逻辑。由帧呈现驱动器持有；
/// 所有方法都在持有上下文的渲染线程上运行。
pub(crate) struct OverlayCompositor {
    textures: [glow::NativeTexture; OVERLAY_SLOT_COUNT],
    vbos: [glow::NativeBuffer; OVERLAY_SLOT_COUNT],
    supports_row_length_unpack: bool,
}

impl OverlayCompositor {
    /// ### English
    /// Creates the per-slot textures and vertex buffers.
    ///
    /// ### 中文
    /// 创建每槽位的纹理与顶点缓冲。
    pub(crate) fn new(
        gl: &glow::Context,
        supports_row_length_unpack: bool,
    ) -> Result<Self, String> {
        let mut textures = Vec::with_capacity(OVERLAY_SLOT_COUNT);
        let mut vbos = Vec::with_capacity(OVERLAY_SLOT_COUNT);
        for _ in 0..OVERLAY_SLOT_COUNT {
            let texture = unsafe { gl.create_texture() }?;
            unsafe {
                gl.bind_texture(glow::TEXTURE_2D, Some(texture));
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MAG_FILTER,
                    glow::LINEAR as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_WRAP_S,
                    glow::CLAMP_TO_EDGE as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_WRAP_T,
                    glow::CLAMP_TO_EDGE as i32,
                );
            }
            textures.push(texture);
            vbos.push(unsafe { gl.create_buffer() }?);
        }
        unsafe { gl.bind_texture(glow::TEXTURE_2D, None) };

        Ok(Self {
            textures: textures.try_into().expect("slot count"),
            vbos: vbos.try_into().expect("slot count"),
            supports_row_length_unpack,
        })
    }

    /// ### English
    /// Uploads fresh surface pixels into the slot's texture, using the
    /// strided fast path when the driver supports it.
    ///
    /// ### 中文
    /// 将新的 surface 像素上传到该槽位的纹理；驱动支持时走带跨距的
    /// 快速路径。
    fn upload(&self, gl: &glow::Context, slot: OverlaySlot, surface: &OverlaySurface) {
        let tight = surface.tight_stride();
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.textures[slot.index()]));
        }

        let upload_slice = |pixels: &[u8]| unsafe {
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                surface.width as i32,
                surface.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        };

        if surface.stride_bytes == tight {
            upload_slice(&surface.pixels);
        } else if self.supports_row_length_unpack && surface.stride_bytes % 4 == 0 {
            unsafe {
                gl.pixel_store_i32(
                    glow::UNPACK_ROW_LENGTH,
                    (surface.stride_bytes / 4) as i32,
                );
            }
            upload_slice(&surface.pixels);
            unsafe {
                gl.pixel_store_i32(glow::UNPACK_ROW_LENGTH, 0);
            }
        } else {
            // No row-length unpack: repack into a tight buffer first.
            let packed = repack_tight(surface);
            upload_slice(&packed);
        }
    }

    /// ### English
    /// Per-frame overlay pass for one slot: consume the dirty flag, skip a
    /// disabled source, upload new content and recompute the quad when the
    /// source reports a change, then draw if (and only if) the slot is
    /// valid. The caller has already set the full-drawable viewport.
    ///
    /// ### 中文
    /// 单个槽位的逐帧 overlay 处理：消费 dirty 标志，跳过被禁用的源，
    /// 源报告变化时上传新内容并重算四边形，最后仅在槽位有效时绘制。
    /// 调用方已设置覆盖整个 drawable 的 viewport。
    pub(crate) fn render(
        &self,
        gl: &glow::Context,
        source: &dyn OverlaySource,
        flags: &OverlayFlags,
        slot: OverlaySlot,
        program: &OverlayProgram,
        drawable: PhysicalSize<u32>,
        quad_index_buffer: glow::NativeBuffer,
    ) {
        let dirty = flags.take_dirty(slot);

        if !source.is_enabled(slot) {
            // Disabled mid-session: drop the stale data and draw nothing.
            flags.set_valid(slot, false);
            return;
        }

        if dirty || !flags.is_valid(slot) {
            if let Some(surface) = source.take_updated_surface(slot) {
                if surface.pixels.len() < (surface.stride_bytes * surface.height) as usize {
                    warn!(?slot, "overlay surface shorter than stride × height; skipping upload");
                } else {
                    self.upload(gl, slot, &surface);
                    let rect = geometry::placement(slot, &surface, drawable);
                    let vertices = geometry::quad_vertices(rect, drawable);
                    unsafe {
                        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbos[slot.index()]));
                        gl.buffer_data_u8_slice(
                            glow::ARRAY_BUFFER,
                            vertex_bytes(&vertices),
                            glow::STATIC_DRAW,
                        );
                    }
                    flags.set_valid(slot, true);
                }
            }
        }

        if !flags.is_valid(slot) {
            // Not populated yet, or stale: nothing to draw this frame.
            return;
        }

        unsafe {
            gl.use_program(Some(program.program));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbos[slot.index()]));
            gl.vertex_attrib_pointer_f32(ATTRIB_POSITION, 2, glow::FLOAT, false, 16, 0);
            gl.enable_vertex_attrib_array(ATTRIB_POSITION);
            gl.vertex_attrib_pointer_f32(ATTRIB_TEXCOORD, 2, glow::FLOAT, false, 16, 8);
            gl.enable_vertex_attrib_array(ATTRIB_TEXCOORD);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(quad_index_buffer));

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.textures[slot.index()]));
            if program.texture.is_some() {
                gl.uniform_1_i32(program.texture.as_ref(), 0);
            }

            gl.draw_elements(glow::TRIANGLES, 6, glow::UNSIGNED_INT, 0);
        }
    }

    /// ### English
    /// Deletes all per-slot GL resources. Context must be current.
    ///
    /// ### 中文
    /// 删除所有每槽位 GL 资源。必须持有上下文。
    pub(crate) fn destroy(&self, gl: &glow::Context) {
        unsafe {
            for texture in self.textures {
                gl.delete_texture(texture);
            }
            for vbo in self.vbos {
                gl.delete_buffer(vbo);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repack_strips_row_padding() {
        // 2×2 surface, 8 tight bytes per row, 12-byte stride.
        let surface = OverlaySurface {
            width: 2,
            height: 2,
            stride_bytes: 12,
            pixels: vec![
                1, 1, 1, 1, 2, 2, 2, 2, 0xAA, 0xAA, 0xAA, 0xAA, //
                3, 3, 3, 3, 4, 4, 4, 4, 0xBB, 0xBB, 0xBB, 0xBB,
            ],
        };
        let packed = repack_tight(&surface);
        assert_eq!(
            packed,
            vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]
        );
    }

    #[test]
    fn repack_is_identity_for_tight_surfaces() {
        let surface = OverlaySurface {
            width: 2,
            height: 1,
            stride_bytes: 8,
            pixels: vec![9, 8, 7, 6, 5, 4, 3, 2],
        };
        assert_eq!(repack_tight(&surface), surface.pixels);
    }
}
