//! ### English
//! YCbCr → RGB conversion constants for the bi-planar shader variant.
//!
//! Three transfer characteristics (Rec. 601 / 709 / 2020) crossed with two
//! range conventions (studio/limited vs full) give six fixed matrix+offset
//! pairs. Offsets are expressed in normalized [0,1] texture-sample units,
//! not 8-bit integer units.
//!
//! The matrices follow the CSC setup tables used by the Linux kernel's
//! imx-pxp driver.
//!
//! ### 中文
//! bi-planar 着色器变体使用的 YCbCr → RGB 转换常量。
//!
//! 三种传输特性（Rec. 601 / 709 / 2020）与两种范围约定
//! （studio/有限 与 全范围）交叉，得到六组固定的矩阵+偏移对。
//! 偏移以归一化 [0,1] 纹理采样单位表示，而非 8-bit 整数单位。
//!
//! 矩阵取自 Linux 内核 imx-pxp 驱动的 CSC 配置表。

use super::frame::Colorspace;

/// ### English
/// One matrix+offset pair, ready for upload as shader uniforms. The matrix
/// is stored column-major as consumed by `uniform_matrix_3_f32_slice` with
/// `transpose = false`.
///
/// ### 中文
/// 一组矩阵+偏移对，可直接作为 shader uniform 上传。矩阵按列主序存储，
/// 供 `uniform_matrix_3_f32_slice`（`transpose = false`）使用。
#[derive(Debug, PartialEq)]
pub struct ConversionConstants {
    /// ### English
    /// 3×3 conversion matrix (column-major).
    ///
    /// ### 中文
    /// 3×3 转换矩阵（列主序）。
    pub matrix: [f32; 9],
    /// ### English
    /// Per-channel offsets subtracted from (Y, Cb, Cr) before the matrix.
    ///
    /// ### 中文
    /// 在矩阵乘法前从 (Y, Cb, Cr) 中减去的逐通道偏移。
    pub offsets: [f32; 3],
}

const OFFSETS_LIMITED: [f32; 3] = [16.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0];
const OFFSETS_FULL: [f32; 3] = [0.0, 128.0 / 255.0, 128.0 / 255.0];

const BT601_LIMITED: ConversionConstants = ConversionConstants {
    matrix: [
        1.1644, 1.1644, 1.1644, //
        0.0, -0.3917, 2.0172, //
        1.5960, -0.8129, 0.0,
    ],
    offsets: OFFSETS_LIMITED,
};

const BT601_FULL: ConversionConstants = ConversionConstants {
    matrix: [
        1.0, 1.0, 1.0, //
        0.0, -0.3441, 1.7720, //
        1.4020, -0.7141, 0.0,
    ],
    offsets: OFFSETS_FULL,
};

const BT709_LIMITED: ConversionConstants = ConversionConstants {
    matrix: [
        1.1644, 1.1644, 1.1644, //
        0.0, -0.2132, 2.1124, //
        1.7927, -0.5329, 0.0,
    ],
    offsets: OFFSETS_LIMITED,
};

const BT709_FULL: ConversionConstants = ConversionConstants {
    matrix: [
        1.0, 1.0, 1.0, //
        0.0, -0.1873, 1.8556, //
        1.5748, -0.4681, 0.0,
    ],
    offsets: OFFSETS_FULL,
};

const BT2020_LIMITED: ConversionConstants = ConversionConstants {
    matrix: [
        1.1644, 1.1644, 1.1644, //
        0.0, -0.1874, 2.1418, //
        1.6781, -0.6505, 0.0,
    ],
    offsets: OFFSETS_LIMITED,
};

const BT2020_FULL: ConversionConstants = ConversionConstants {
    matrix: [
        1.0, 1.0, 1.0, //
        0.0, -0.1646, 1.8814, //
        1.4746, -0.5714, 0.0,
    ],
    offsets: OFFSETS_FULL,
};

/// ### English
/// Selects the conversion constants for a frame's (colorspace, range) pair.
/// The match is exhaustive: every representable tag has constants, so an
/// "unknown colorspace" cannot reach the draw path.
///
/// ### 中文
/// 按帧的（色彩空间, 范围）组合选择转换常量。match 是穷尽的：
/// 每个可表示的标签都有对应常量，因此“未知色彩空间”不可能进入绘制路径。
pub fn conversion_constants(colorspace: Colorspace, full_range: bool) -> &'static ConversionConstants {
    match (colorspace, full_range) {
        (Colorspace::Rec601, false) => &BT601_LIMITED,
        (Colorspace::Rec601, true) => &BT601_FULL,
        (Colorspace::Rec709, false) => &BT709_LIMITED,
        (Colorspace::Rec709, true) => &BT709_FULL,
        (Colorspace::Rec2020, false) => &BT2020_LIMITED,
        (Colorspace::Rec2020, true) => &BT2020_FULL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hd_limited_selects_the_fixed_constants() {
        let c = conversion_constants(Colorspace::Rec709, false);
        assert_eq!(
            c.matrix,
            [1.1644, 1.1644, 1.1644, 0.0, -0.2132, 2.1124, 1.7927, -0.5329, 0.0]
        );
        assert_eq!(c.offsets, [16.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0]);
    }

    #[test]
    fn full_range_uses_zero_luma_offset_and_unit_luma_column() {
        for cs in [Colorspace::Rec601, Colorspace::Rec709, Colorspace::Rec2020] {
            let c = conversion_constants(cs, true);
            assert_eq!(c.offsets[0], 0.0);
            assert_eq!(&c.matrix[0..3], &[1.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn all_six_selections_are_distinct() {
        let mut seen: Vec<&ConversionConstants> = Vec::new();
        for cs in [Colorspace::Rec601, Colorspace::Rec709, Colorspace::Rec2020] {
            for full in [false, true] {
                let c = conversion_constants(cs, full);
                assert!(!seen.iter().any(|s| **s == *c));
                seen.push(c);
            }
        }
        assert_eq!(seen.len(), 6);
    }
}
