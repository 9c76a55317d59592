//! ### English
//! Embedded GLSL sources for the built-in shader source loader.
//!
//! Written against GLSL ES 1.00 so a GLES 2.0 context can still compile
//! them; the fragment shaders sampling imported planes require
//! `GL_OES_EGL_image_external`.
//!
//! ### 中文
//! 内置着色器源加载器使用的内嵌 GLSL 源码。
//!
//! 按 GLSL ES 1.00 编写，GLES 2.0 上下文也能编译；采样导入平面的
//! 片元着色器需要 `GL_OES_EGL_image_external`。

/// ### English
/// Shared pass-through vertex stage: clip-space position plus texture
/// coordinate, attribute slots fixed at 0/1.
///
/// ### 中文
/// 共用的直通顶点阶段：裁剪空间位置加纹理坐标，属性槽固定为 0/1。
const PASSTHROUGH_VERTEX: &str = r#"attribute vec2 aPosition;
attribute vec2 aTexCoord;
varying vec2 vTexCoord;

void main() {
    gl_Position = vec4(aPosition, 0.0, 1.0);
    vTexCoord = aTexCoord;
}
"#;

/// ### English
/// Bi-planar YCbCr → RGB conversion: luma from plane 0, chroma pair from
/// plane 1, offsets subtracted before the conversion matrix.
///
/// ### 中文
/// bi-planar YCbCr → RGB 转换：亮度取自平面 0，色度对取自平面 1，
/// 在乘转换矩阵前先减去偏移。
const BIPLANAR_FRAGMENT: &str = r#"#extension GL_OES_EGL_image_external : require
precision mediump float;

uniform samplerExternalOES uPlane0;
uniform samplerExternalOES uPlane1;
uniform mat3 uYuvMatrix;
uniform vec3 uChannelOffset;
varying vec2 vTexCoord;

void main() {
    vec3 yuv = vec3(
        texture2D(uPlane0, vTexCoord).r,
        texture2D(uPlane1, vTexCoord).r,
        texture2D(uPlane1, vTexCoord).g);
    yuv -= uChannelOffset;
    gl_FragColor = vec4(clamp(uYuvMatrix * yuv, 0.0, 1.0), 1.0);
}
"#;

/// ### English
/// Opaque single-surface pass-through: the driver presents ready-made RGB.
///
/// ### 中文
/// 不透明单 surface 直通：驱动直接给出现成的 RGB。
const OPAQUE_FRAGMENT: &str = r#"#extension GL_OES_EGL_image_external : require
precision mediump float;

uniform samplerExternalOES uTexture;
varying vec2 vTexCoord;

void main() {
    gl_FragColor = texture2D(uTexture, vTexCoord);
}
"#;

/// ### English
/// Overlay compositing: plain 2D sampling, alpha handled by the blend unit.
///
/// ### 中文
/// overlay 合成：普通 2D 采样，alpha 由混合单元处理。
const OVERLAY_FRAGMENT: &str = r#"precision mediump float;

uniform sampler2D uTexture;
varying vec2 vTexCoord;

void main() {
    gl_FragColor = texture2D(uTexture, vTexCoord);
}
"#;

/// ### English
/// Resolves an embedded source by its loader name.
///
/// ### 中文
/// 按加载名解析内嵌源码。
pub(super) fn embedded_source(name: &str) -> Option<&'static str> {
    match name {
        "video_biplanar.vert" | "video_opaque.vert" | "overlay.vert" => Some(PASSTHROUGH_VERTEX),
        "video_biplanar.frag" => Some(BIPLANAR_FRAGMENT),
        "video_opaque.frag" => Some(OPAQUE_FRAGMENT),
        "overlay.frag" => Some(OVERLAY_FRAGMENT),
        _ => None,
    }
}
