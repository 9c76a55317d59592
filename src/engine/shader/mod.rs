//! ### English
//! Shader variant manager.
//!
//! Specialization runs lazily, once, when the first real frame reveals the
//! native pixel layout: exactly one of two video programs (bi-planar
//! luma/chroma conversion, or opaque single-surface pass-through) is
//! compiled, plus the fixed overlay-compositing program. Compile or link
//! failure is fatal for the renderer instance: partial GPU state may
//! already be bound, so the caller must trigger a full reset instead of
//! retrying in place.
//!
//! Uniform locations are resolved once after linking. A uniform the driver
//! optimized out resolves to `None` (the "unused" sentinel); uploads for it
//! are skipped rather than faulting.
//!
//! ### 中文
//! 着色器变体管理器。
//!
//! 特化是惰性的，只在首个真实帧揭示原生像素布局时执行一次：
//! 在两个视频 program（bi-planar 亮度/色度转换，或不透明单 surface
//! 直通）中恰好编译一个，外加固定的 overlay 合成 program。
//! 编译或链接失败对该 renderer 实例是致命的；部分 GPU 状态可能已被
//! 绑定，调用方必须整体重置而非原地重试。
//!
//! uniform 位置在链接后解析一次。被驱动优化掉的 uniform 解析为
//! `None`（“未使用”哨兵值）；对它的上传会被跳过而不是出错。

use glow::HasContext as _;
use tracing::{debug, warn};

use super::error::ShaderError;
use super::frame::PixelLayout;

mod sources;

/// ### English
/// Attribute slot for the clip-space position (bound before linking).
///
/// ### 中文
/// 裁剪空间位置的属性槽（链接前绑定）。
pub const ATTRIB_POSITION: u32 = 0;

/// ### English
/// Attribute slot for the texture coordinate (bound before linking).
///
/// ### 中文
/// 纹理坐标的属性槽（链接前绑定）。
pub const ATTRIB_TEXCOORD: u32 = 1;

/// ### English
/// Shader source loading collaborator. `name` is a renderer-chosen
/// identifier such as `"video_biplanar.frag"`; the loader returns the raw
/// source bytes.
///
/// ### 中文
/// 着色器源加载协作方。`name` 是 renderer 选定的标识符
/// （如 `"video_biplanar.frag"`）；加载器返回原始源码字节。
pub trait ShaderSourceLoader {
    /// ### English
    /// Reads one shader source. Errors are fatal for specialization.
    ///
    /// ### 中文
    /// 读取一份着色器源码。出错对特化是致命的。
    fn read_shader_source(&self, name: &str) -> Result<Vec<u8>, String>;
}

/// ### English
/// Default loader serving the crate's embedded GLSL.
///
/// ### 中文
/// 默认加载器，提供 crate 内嵌的 GLSL。
#[derive(Default)]
pub struct EmbeddedShaderLoader;

impl ShaderSourceLoader for EmbeddedShaderLoader {
    fn read_shader_source(&self, name: &str) -> Result<Vec<u8>, String> {
        sources::embedded_source(name)
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| format!("no embedded shader named {name:?}"))
    }
}

/// ### English
/// Source names for the video variant selected by `layout`.
///
/// ### 中文
/// 由 `layout` 选定的视频变体对应的源码名称。
pub fn variant_sources(layout: PixelLayout) -> (&'static str, &'static str) {
    match layout {
        PixelLayout::BiplanarYuv => ("video_biplanar.vert", "video_biplanar.frag"),
        PixelLayout::OpaqueSurface => ("video_opaque.vert", "video_opaque.frag"),
    }
}

/// ### English
/// Source names for the overlay program.
///
/// ### 中文
/// overlay program 的源码名称。
pub const OVERLAY_SOURCES: (&str, &str) = ("overlay.vert", "overlay.frag");

/// ### English
/// Resolved uniforms of the selected video variant. `None` entries are the
/// "unused" sentinel: the driver removed the uniform and updates to it are
/// skipped.
///
/// ### 中文
/// 选定视频变体已解析的 uniform。`None` 即“未使用”哨兵：
/// 驱动删除了该 uniform，对它的更新会被跳过。
pub enum VideoUniforms {
    /// ### English
    /// Bi-planar conversion uniforms.
    ///
    /// ### 中文
    /// bi-planar 转换的 uniform。
    Biplanar {
        /// ### English
        /// 3×3 conversion matrix.
        ///
        /// ### 中文
        /// 3×3 转换矩阵。
        conversion_matrix: Option<glow::NativeUniformLocation>,
        /// ### English
        /// Per-channel offsets.
        ///
        /// ### 中文
        /// 逐通道偏移。
        channel_offset: Option<glow::NativeUniformLocation>,
        /// ### English
        /// Luma plane sampler.
        ///
        /// ### 中文
        /// 亮度平面采样器。
        plane0: Option<glow::NativeUniformLocation>,
        /// ### English
        /// Chroma plane sampler.
        ///
        /// ### 中文
        /// 色度平面采样器。
        plane1: Option<glow::NativeUniformLocation>,
    },
    /// ### English
    /// Opaque pass-through uniform.
    ///
    /// ### 中文
    /// 不透明直通的 uniform。
    Opaque {
        /// ### English
        /// Surface sampler.
        ///
        /// ### 中文
        /// surface 采样器。
        texture: Option<glow::NativeUniformLocation>,
    },
}

/// ### English
/// The compiled video program for the discovered layout.
///
/// ### 中文
/// 为已发现布局编译的视频 program。
pub struct VideoProgram {
    /// ### English
    /// GL program handle.
    ///
    /// ### 中文
    /// GL program 句柄。
    pub program: glow::NativeProgram,
    /// ### English
    /// Resolved uniforms.
    ///
    /// ### 中文
    /// 已解析的 uniform。
    pub uniforms: VideoUniforms,
}

/// ### English
/// The compiled overlay-compositing program.
///
/// ### 中文
/// 已编译的 overlay 合成 program。
pub struct OverlayProgram {
    /// ### English
    /// GL program handle.
    ///
    /// ### 中文
    /// GL program 句柄。
    pub program: glow::NativeProgram,
    /// ### English
    /// Overlay texture sampler.
    ///
    /// ### 中文
    /// overlay 纹理采样器。
    pub texture: Option<glow::NativeUniformLocation>,
}

/// ### English
/// Output of a successful specialization: one video program plus the
/// overlay program, regardless of layout.
///
/// ### 中文
/// 一次成功特化的产物：一个视频 program 外加 overlay program，
/// 与布局无关。
pub struct SpecializedPrograms {
    /// ### English
    /// Video variant.
    ///
    /// ### 中文
    /// 视频变体。
    pub video: VideoProgram,
    /// ### English
    /// Overlay compositing.
    ///
    /// ### 中文
    /// overlay 合成。
    pub overlay: OverlayProgram,
    /// ### English
    /// Layout the video variant was compiled for.
    ///
    /// ### 中文
    /// 视频变体对应的布局。
    pub layout: PixelLayout,
}

impl SpecializedPrograms {
    /// ### English
    /// Deletes both programs. Must run on the context-owning thread.
    ///
    /// ### 中文
    /// 删除两个 program。必须在持有上下文的线程执行。
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.video.program);
            gl.delete_program(self.overlay.program);
        }
    }
}

/// ### English
/// Drains stale GL errors so they cannot be blamed on the upcoming
/// compilation.
///
/// ### 中文
/// 清空残留的 GL 错误，避免它们被归咎到接下来的编译上。
fn drain_stale_errors(gl: &glow::Context) {
    loop {
        let err = unsafe { gl.get_error() };
        if err == glow::NO_ERROR {
            break;
        }
        warn!(err, "clearing stale GL error before shader compilation");
    }
}

/// ### English
/// Loads and compiles one shader stage.
///
/// ### 中文
/// 加载并编译一个着色阶段。
fn load_and_build_stage(
    gl: &glow::Context,
    loader: &dyn ShaderSourceLoader,
    stage: u32,
    name: &str,
) -> Result<glow::NativeShader, ShaderError> {
    let bytes = loader
        .read_shader_source(name)
        .map_err(|reason| ShaderError::Source {
            name: name.to_owned(),
            reason,
        })?;
    let source = String::from_utf8_lossy(&bytes);
    if source.trim().is_empty() {
        return Err(ShaderError::Source {
            name: name.to_owned(),
            reason: "source is empty".to_owned(),
        });
    }

    let shader = unsafe { gl.create_shader(stage) }.map_err(ShaderError::CreateShader)?;
    unsafe {
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::Compile {
                name: name.to_owned(),
                log,
            });
        }
    }
    Ok(shader)
}

/// ### English
/// Compiles and links one vertex+fragment pair with the fixed attribute
/// bindings. The stage objects are deleted regardless of outcome.
///
/// ### 中文
/// 以固定属性绑定编译并链接一对顶点+片元着色器。
/// 无论结果如何都会删除阶段对象。
fn compile_pair(
    gl: &glow::Context,
    loader: &dyn ShaderSourceLoader,
    vertex_name: &str,
    fragment_name: &str,
) -> Result<glow::NativeProgram, ShaderError> {
    let vertex = load_and_build_stage(gl, loader, glow::VERTEX_SHADER, vertex_name)?;
    let fragment = match load_and_build_stage(gl, loader, glow::FRAGMENT_SHADER, fragment_name) {
        Ok(fragment) => fragment,
        Err(err) => {
            unsafe { gl.delete_shader(vertex) };
            return Err(err);
        }
    };

    let result = (|| {
        let program = unsafe { gl.create_program() }.map_err(ShaderError::CreateProgram)?;
        unsafe {
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            // Attribute locations must match the vertex stage and the quad
            // layout used by every draw in this crate.
            gl.bind_attrib_location(program, ATTRIB_POSITION, "aPosition");
            gl.bind_attrib_location(program, ATTRIB_TEXCOORD, "aTexCoord");
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link { log });
            }
        }
        Ok(program)
    })();

    unsafe {
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
    }
    result
}

/// ### English
/// Resolves one named uniform, logging when the sentinel is produced.
///
/// ### 中文
/// 解析一个命名 uniform；产生哨兵值时记录日志。
fn resolve_uniform(
    gl: &glow::Context,
    program: glow::NativeProgram,
    name: &str,
) -> Option<glow::NativeUniformLocation> {
    let location = unsafe { gl.get_uniform_location(program, name) };
    if location.is_none() {
        debug!(name, "uniform not present in linked program; updates will be skipped");
    }
    location
}

/// ### English
/// One-time specialization for the discovered pixel layout. Preconditions:
/// called at most once per renderer instance, with the owning context
/// current. On failure the caller must treat the renderer as unusable for
/// this frame format and trigger a full reset.
///
/// ### 中文
/// 针对已发现像素布局的一次性特化。前置条件：每个 renderer 实例至多
/// 调用一次，且持有上下文。失败时调用方必须认定 renderer 对该帧格式
/// 不可用并触发整体重置。
pub fn specialize(
    gl: &glow::Context,
    loader: &dyn ShaderSourceLoader,
    layout: PixelLayout,
) -> Result<SpecializedPrograms, ShaderError> {
    drain_stale_errors(gl);

    let (vertex_name, fragment_name) = variant_sources(layout);
    let video_program = compile_pair(gl, loader, vertex_name, fragment_name)?;
    let uniforms = match layout {
        PixelLayout::BiplanarYuv => VideoUniforms::Biplanar {
            conversion_matrix: resolve_uniform(gl, video_program, "uYuvMatrix"),
            channel_offset: resolve_uniform(gl, video_program, "uChannelOffset"),
            plane0: resolve_uniform(gl, video_program, "uPlane0"),
            plane1: resolve_uniform(gl, video_program, "uPlane1"),
        },
        PixelLayout::OpaqueSurface => VideoUniforms::Opaque {
            texture: resolve_uniform(gl, video_program, "uTexture"),
        },
    };

    let (overlay_vertex, overlay_fragment) = OVERLAY_SOURCES;
    let overlay_program = match compile_pair(gl, loader, overlay_vertex, overlay_fragment) {
        Ok(program) => program,
        Err(err) => {
            unsafe { gl.delete_program(video_program) };
            return Err(err);
        }
    };
    let overlay_texture = resolve_uniform(gl, overlay_program, "uTexture");

    debug!(?layout, "shader specialization complete");
    Ok(SpecializedPrograms {
        video: VideoProgram {
            program: video_program,
            uniforms,
        },
        overlay: OverlayProgram {
            program: overlay_program,
            texture: overlay_texture,
        },
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_layout_selects_exactly_one_video_variant() {
        let biplanar = variant_sources(PixelLayout::BiplanarYuv);
        let opaque = variant_sources(PixelLayout::OpaqueSurface);
        assert_eq!(biplanar, ("video_biplanar.vert", "video_biplanar.frag"));
        assert_eq!(opaque, ("video_opaque.vert", "video_opaque.frag"));
        assert_ne!(biplanar.1, opaque.1);
    }

    #[test]
    fn embedded_loader_serves_every_selectable_source() {
        let loader = EmbeddedShaderLoader;
        for layout in [PixelLayout::BiplanarYuv, PixelLayout::OpaqueSurface] {
            let (vert, frag) = variant_sources(layout);
            assert!(!loader.read_shader_source(vert).unwrap().is_empty());
            assert!(!loader.read_shader_source(frag).unwrap().is_empty());
        }
        // The overlay pair is compiled regardless of layout.
        let (vert, frag) = OVERLAY_SOURCES;
        assert!(!loader.read_shader_source(vert).unwrap().is_empty());
        assert!(!loader.read_shader_source(frag).unwrap().is_empty());
    }

    #[test]
    fn embedded_loader_rejects_unknown_names() {
        assert!(
            EmbeddedShaderLoader
                .read_shader_source("video_tri_planar.frag")
                .is_err()
        );
    }
}
