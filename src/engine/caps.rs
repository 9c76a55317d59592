//! ### English
//! Extension/capability probe.
//!
//! Runs once during setup against the active GL context and the platform
//! display. Mandatory interop capabilities fail initialization hard; the
//! optional ones (row-length unpack, fence sync, vertex array objects)
//! degrade to slower fallback paths. The probe also resolves the
//! external-image texture binding entry point into an explicit function
//! table (the one GL call outside glow's surface) so hot paths never do
//! per-call null checks.
//!
//! ### 中文
//! 扩展/能力探测。
//!
//! 在初始化期间针对已激活的 GL 上下文与平台 display 运行一次。
//! 必需的互操作能力缺失会使初始化硬性失败；可选能力
//! （行长 unpack、fence 同步、VAO）则退化为较慢的回退路径。
//! 探测同时把外部图像纹理绑定入口点（glow 未覆盖的那一个 GL 调用）
//! 解析进显式函数表，使热路径无需逐次判空。

use std::ffi::c_void;

use glow::HasContext as _;
use tracing::{debug, warn};

use super::error::InitError;
use super::platform::PlatformWindow;

/// ### English
/// `GL_TEXTURE_EXTERNAL_OES`: target for sampling externally-imported
/// images. Not part of glow's generated constants, so defined here.
///
/// ### 中文
/// `GL_TEXTURE_EXTERNAL_OES`：采样外部导入图像的纹理目标。
/// 不在 glow 生成的常量之列，故在此定义。
pub(crate) const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;

/// ### English
/// How GPU-side fence synchronization is provided, if at all.
///
/// ### 中文
/// GPU 侧 fence 同步的提供方式（若有）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenceSyncMechanism {
    /// ### English
    /// No fence mechanism; synchronization falls back to a full pipeline
    /// flush-and-wait.
    ///
    /// ### 中文
    /// 无 fence 机制；同步退化为完整的流水线 flush 并等待。
    None,
    /// ### English
    /// Fence sync advertised as a display extension (`EGL_KHR_fence_sync`
    /// era drivers).
    ///
    /// ### 中文
    /// 以 display 扩展形式提供的 fence 同步（`EGL_KHR_fence_sync`
    /// 时代的驱动）。
    LegacyExtension,
    /// ### English
    /// Fence sync available in the core API (GLES 3.0+).
    ///
    /// ### 中文
    /// 核心 API 自带的 fence 同步（GLES 3.0+）。
    CoreExtension,
}

impl FenceSyncMechanism {
    /// ### English
    /// Whether fences can be created at all.
    ///
    /// ### 中文
    /// 是否能创建 fence。
    #[inline]
    pub fn is_available(self) -> bool {
        !matches!(self, FenceSyncMechanism::None)
    }
}

/// ### English
/// Immutable capability snapshot produced once during setup and consumed by
/// every other component.
///
/// ### 中文
/// 初始化期间生成一次的不可变能力快照，供其余所有组件读取。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapabilitySet {
    /// ### English
    /// Detected GLES version (major, minor).
    ///
    /// ### 中文
    /// 检测到的 GLES 版本（主, 次）。
    pub gles_version: (u32, u32),
    /// ### English
    /// Whether strided texture uploads can use `GL_UNPACK_ROW_LENGTH`
    /// directly (GLES 3.0+ or `GL_EXT_unpack_subimage`).
    ///
    /// ### 中文
    /// 带跨距的纹理上传能否直接使用 `GL_UNPACK_ROW_LENGTH`
    /// （GLES 3.0+ 或 `GL_EXT_unpack_subimage`）。
    pub supports_row_length_unpack: bool,
    /// ### English
    /// Whether vertex array objects exist. Recorded for diagnostics; the
    /// draw path binds attributes per draw and does not require VAOs.
    ///
    /// ### 中文
    /// 是否存在 VAO。仅作诊断记录；绘制路径按每次 draw 绑定属性，
    /// 不依赖 VAO。
    pub supports_vertex_array_objects: bool,
    /// ### English
    /// Fence synchronization mechanism.
    ///
    /// ### 中文
    /// fence 同步机制。
    pub fence_sync: FenceSyncMechanism,
}

/// ### English
/// Parses a GL version string. Expected forms: `"4.6.0 ..."` or
/// `"OpenGL ES 3.2 ..."`.
///
/// ### 中文
/// 解析 GL 版本字符串。期望形式：`"4.6.0 ..."` 或 `"OpenGL ES 3.2 ..."`。
pub(crate) fn parse_gl_version(version: &str) -> (u32, u32) {
    let mut major = 0u32;
    let mut minor = 0u32;
    let tokens: Vec<&str> = version.split_whitespace().collect();
    let number_token = tokens.iter().find(|t| {
        t.chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
    });
    if let Some(token) = number_token {
        let mut parts = token.split('.');
        if let Some(m) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            major = m;
        }
        if let Some(n) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            minor = n;
        }
    }
    (major, minor)
}

/// ### English
/// Classifies the optional capabilities from the raw probe inputs. Pure so
/// the classification table is testable without a live context.
///
/// ### 中文
/// 根据原始探测输入对可选能力分类。纯函数，便于在无上下文的环境中
/// 测试分类表。
fn classify(
    gles_version: (u32, u32),
    has_gl_extension: &dyn Fn(&str) -> bool,
    has_platform_extension: &dyn Fn(&str) -> bool,
) -> CapabilitySet {
    let gles3 = gles_version.0 >= 3;

    let fence_sync = if has_platform_extension("EGL_KHR_fence_sync") {
        FenceSyncMechanism::LegacyExtension
    } else if gles3 {
        FenceSyncMechanism::CoreExtension
    } else {
        FenceSyncMechanism::None
    };

    CapabilitySet {
        gles_version,
        supports_row_length_unpack: gles3 || has_gl_extension("GL_EXT_unpack_subimage"),
        supports_vertex_array_objects: gles3 || has_gl_extension("GL_OES_vertex_array_object"),
        fence_sync,
    }
}

/// ### English
/// Probes the active context and display. Mandatory capabilities (platform
/// image import base extension, GPU-side external-image sampling) are hard
/// failures; everything else degrades.
///
/// ### 中文
/// 探测已激活的上下文与 display。必需能力（平台图像导入基础扩展、
/// GPU 侧外部图像采样）缺失即硬性失败；其余能力仅退化。
pub fn probe(gl: &glow::Context, platform: &dyn PlatformWindow) -> Result<CapabilitySet, InitError> {
    let version = unsafe { gl.get_parameter_string(glow::VERSION) };
    let gles_version = parse_gl_version(&version);
    debug!(%version, ?gles_version, "probing GL capabilities");

    if !platform.supports_platform_extension("EGL_KHR_image_base")
        && !platform.supports_platform_extension("EGL_KHR_image")
    {
        return Err(InitError::MissingExtension("EGL_KHR_image"));
    }
    if !gl.supported_extensions().contains("GL_OES_EGL_image") {
        return Err(InitError::MissingExtension("GL_OES_EGL_image"));
    }

    let caps = classify(
        gles_version,
        &|name| gl.supported_extensions().contains(name),
        &|name| platform.supports_platform_extension(name),
    );
    if !caps.fence_sync.is_available() {
        warn!("no fence sync mechanism; falling back to full pipeline flushes");
    }
    debug!(?caps, "capability probe complete");
    Ok(caps)
}

/// ### English
/// Signature of `glEGLImageTargetTexture2DOES`.
///
/// ### 中文
/// `glEGLImageTargetTexture2DOES` 的函数签名。
type ImageTargetTexture2DFn = unsafe extern "system" fn(target: u32, image: *const c_void);

/// ### English
/// Function table for GL interop entry points outside glow's surface.
/// Assembled once during setup; an unresolved required entry is a fatal
/// setup failure, never a per-call null check.
///
/// ### 中文
/// glow 未覆盖的 GL 互操作入口点函数表。初始化时组装一次；
/// 必需入口解析失败即初始化失败，绝不做逐调用判空。
#[derive(Clone, Copy)]
pub struct ExternalImageFns {
    image_target_texture_2d: ImageTargetTexture2DFn,
}

impl ExternalImageFns {
    /// ### English
    /// Resolves the table through the platform's proc-address loader.
    ///
    /// ### 中文
    /// 通过平台的 proc-address 加载器解析函数表。
    pub fn resolve(platform: &dyn PlatformWindow) -> Result<Self, InitError> {
        let ptr = platform.get_proc_address("glEGLImageTargetTexture2DOES");
        if ptr.is_null() {
            return Err(InitError::MissingGlEntryPoint("glEGLImageTargetTexture2DOES"));
        }
        // Transmuting a non-null proc address to its documented signature.
        let image_target_texture_2d: ImageTargetTexture2DFn = unsafe { std::mem::transmute(ptr) };
        Ok(Self {
            image_target_texture_2d,
        })
    }

    /// ### English
    /// Attaches an imported image to the texture currently bound on
    /// `target`. Caller must have the owning context current.
    ///
    /// ### 中文
    /// 把导入的图像附着到当前绑定在 `target` 上的纹理。
    /// 调用方必须持有对应上下文。
    #[inline]
    pub fn bind_image_to_bound_texture(&self, target: u32, image: *const c_void) {
        unsafe { (self.image_target_texture_2d)(target, image) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_desktop_and_es_version_strings() {
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 535.154.05"), (4, 6));
        assert_eq!(parse_gl_version("OpenGL ES 3.2 Mesa 23.1"), (3, 2));
        assert_eq!(parse_gl_version("OpenGL ES 2.0"), (2, 0));
        assert_eq!(parse_gl_version("garbage"), (0, 0));
    }

    #[test]
    fn gles3_implies_core_capabilities() {
        let caps = classify((3, 0), &|_| false, &|_| false);
        assert!(caps.supports_row_length_unpack);
        assert!(caps.supports_vertex_array_objects);
        assert_eq!(caps.fence_sync, FenceSyncMechanism::CoreExtension);
    }

    #[test]
    fn legacy_fence_extension_wins_over_core() {
        let caps = classify((3, 1), &|_| false, &|name| name == "EGL_KHR_fence_sync");
        assert_eq!(caps.fence_sync, FenceSyncMechanism::LegacyExtension);
    }

    #[test]
    fn gles2_without_extensions_degrades_everywhere() {
        let caps = classify((2, 0), &|_| false, &|_| false);
        assert!(!caps.supports_row_length_unpack);
        assert!(!caps.supports_vertex_array_objects);
        assert_eq!(caps.fence_sync, FenceSyncMechanism::None);
        assert!(!caps.fence_sync.is_available());
    }

    #[test]
    fn gles2_extensions_restore_optional_capabilities() {
        let caps = classify(
            (2, 0),
            &|name| name == "GL_EXT_unpack_subimage" || name == "GL_OES_vertex_array_object",
            &|_| false,
        );
        assert!(caps.supports_row_length_unpack);
        assert!(caps.supports_vertex_array_objects);
    }
}
