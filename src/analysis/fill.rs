// 该文件是 Shuiwei （水位） 项目的一部分。
// src/analysis/fill.rs - 液位比例
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use tracing::{debug, warn};

use crate::mask::Mask;

/// 液体前景像素数与容器前景像素数之比，结果限制在 [0, 1]。
/// 容器没有前景像素时返回 0。
pub fn fill_ratio(container: &Mask, liquid: &Mask, threshold: f32) -> f64 {
  let container_pixels = container.foreground_count(threshold);
  if container_pixels == 0 {
    debug!("容器掩码为空，液位记为 0");
    return 0.0;
  }
  let liquid_pixels = liquid.foreground_count(threshold);
  let ratio = liquid_pixels as f64 / container_pixels as f64;
  if ratio > 1.0 {
    warn!(
      "液体像素数 {} 超过容器像素数 {}，液位截断为 1",
      liquid_pixels, container_pixels
    );
    return 1.0;
  }
  ratio
}
