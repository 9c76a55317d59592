//! ### English
//! Failure taxonomy for the presentation engine.
//!
//! Fatal setup failures are reported through [`InitError`] and require the
//! host to pick a different renderer. Fatal specialization failures are
//! reported asynchronously as a [`ResetEvent`]. Transient per-frame failures
//! are logged and never surface as errors. Collaborator contract violations
//! are assertions, not error values.
//!
//! ### 中文
//! 呈现引擎的错误分类。
//!
//! 致命的初始化失败通过 [`InitError`] 报告，宿主须改用其它 renderer。
//! 致命的特化（specialization）失败以 [`ResetEvent`] 异步上报。瞬时的逐帧
//! 失败只记录日志，不作为错误返回。协作方违反契约属于断言，不是错误值。

use thiserror::Error;

/// ### English
/// Error reported by the windowing collaborator (context creation, attach).
///
/// The windowing layer is platform glue; a plain message is all this core
/// needs to classify and log.
///
/// ### 中文
/// 窗口系统协作方报告的错误（上下文创建、attach）。
///
/// 窗口层是平台胶水代码；本核心只需要一条文本消息即可分类与记录。
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

/// ### English
/// Fatal setup failure. The renderer is unusable; the caller must select a
/// different renderer. There is no retry within this core.
///
/// ### 中文
/// 致命的初始化失败。renderer 不可用；调用方必须另选 renderer。
/// 本核心内部不做重试。
#[derive(Debug, Error)]
pub enum InitError {
    /// ### English
    /// No usable software/driver support (context creation failed, GL stack
    /// unusable, lingering GL errors during setup).
    ///
    /// ### 中文
    /// 缺少可用的软件/驱动支持（上下文创建失败、GL 栈不可用、初始化期间
    /// 存在残留 GL 错误）。
    #[error("no software/driver support: {0}")]
    NoDriverSupport(String),

    /// ### English
    /// The requested video format is outside this renderer's scope
    /// (e.g. 10-bit/HDR formats).
    ///
    /// ### 中文
    /// 请求的视频格式超出本 renderer 的支持范围（例如 10-bit/HDR）。
    #[error("unsupported video format flags {0:#06x}")]
    UnsupportedVideoFormat(u32),

    /// ### English
    /// A mandatory platform or GL extension is missing.
    ///
    /// ### 中文
    /// 缺少必需的平台或 GL 扩展。
    #[error("required extension missing: {0}")]
    MissingExtension(&'static str),

    /// ### English
    /// A required GL entry point could not be resolved at setup time.
    ///
    /// ### 中文
    /// 初始化时无法解析必需的 GL 入口点。
    #[error("required GL entry point missing: {0}")]
    MissingGlEntryPoint(&'static str),

    /// ### English
    /// The GL context could not be attached to the calling thread.
    ///
    /// ### 中文
    /// 无法将 GL 上下文 attach 到当前线程。
    #[error("context attach failed: {0}")]
    ContextAttach(#[from] PlatformError),
}

/// ### English
/// Shader specialization failure. Fatal for the current frame format: the
/// renderer must be fully reset (re-probe / re-create), not retried in
/// place, since partial GPU state may already be bound.
///
/// ### 中文
/// 着色器特化失败。对当前帧格式是致命的：必须整体重置 renderer
/// （重新探测/重建），不能原地重试，因为部分 GPU 状态可能已被绑定。
#[derive(Debug, Error)]
pub enum ShaderError {
    /// ### English
    /// The source loader could not provide the named shader source.
    ///
    /// ### 中文
    /// 源加载器无法提供指定名称的着色器源码。
    #[error("shader source {name:?} unavailable: {reason}")]
    Source { name: String, reason: String },

    /// ### English
    /// A shader object could not be created.
    ///
    /// ### 中文
    /// 无法创建 shader 对象。
    #[error("cannot create shader object: {0}")]
    CreateShader(String),

    /// ### English
    /// A shader stage failed to compile; `log` carries the driver's info log.
    ///
    /// ### 中文
    /// 某个着色阶段编译失败；`log` 为驱动返回的 info log。
    #[error("cannot compile shader {name:?}: {log}")]
    Compile { name: String, log: String },

    /// ### English
    /// The program object could not be created.
    ///
    /// ### 中文
    /// 无法创建 program 对象。
    #[error("cannot create shader program: {0}")]
    CreateProgram(String),

    /// ### English
    /// The program failed to link; `log` carries the driver's info log.
    ///
    /// ### 中文
    /// program 链接失败；`log` 为驱动返回的 info log。
    #[error("cannot link shader program: {log}")]
    Link { log: String },
}

/// ### English
/// Asynchronous signal to the hosting application that the renderer hit an
/// unrecoverable condition and must be re-created.
///
/// ### 中文
/// 发给宿主应用的异步信号：renderer 遇到不可恢复的状况，必须重建。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetEvent {
    /// ### English
    /// Shader specialization for the first frame's pixel layout failed.
    ///
    /// ### 中文
    /// 针对首帧像素布局的着色器特化失败。
    SpecializationFailed,
}
