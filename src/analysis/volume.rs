// 该文件是 Shuiwei （水位） 项目的一部分。
// src/analysis/volume.rs - 旋转体体积估计
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

use std::f64::consts::PI;

use crate::{
  entity::Masked,
  geometry::BBox,
  mask::{FOREGROUND_THRESHOLD, Mask, Run},
};

pub const DEFAULT_STEP: usize = 1;

/// 假设物体绕自身竖直中线旋转对称，逐行累加环形切片得到体积。
///
/// 体积单位为内部评分单位：每个分段贡献 `π * 0.5 * (r_outer² - r_inner²)`，
/// 左右两半各贡献一次，未标定到物理体积。
///
/// `step` 大于 1 时跳过中间的扫描线且不做补偿，结果约按 `1 / step` 缩小。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEstimator {
  pub step: usize,
  pub threshold: f32,
}

impl Default for VolumeEstimator {
  fn default() -> Self {
    Self {
      step: DEFAULT_STEP,
      threshold: FOREGROUND_THRESHOLD,
    }
  }
}

impl VolumeEstimator {
  pub fn estimate<E: Masked + ?Sized>(&self, entity: &E) -> f64 {
    self.estimate_mask(entity.bbox(), entity.mask())
  }

  pub fn estimate_mask(&self, bbox: &BBox, mask: &Mask) -> f64 {
    let Some(b) = bbox.clamp_to(mask.width(), mask.height()) else {
      return 0.0;
    };
    let center = (b.x1 + b.x2).div_euclid(2);

    let mut volume = 0.0;
    for y in (b.y1..b.y2).step_by(self.step.max(1)) {
      let y = y as usize;
      let left = mask.scan_runs(y, b.x1, center, self.threshold);
      let right = mask.scan_runs(y, b.x2, center, self.threshold);
      volume += left.into_iter().chain(right).map(slice_volume).sum::<f64>();
    }
    volume
  }
}

/// 单个分段的环形切片体积
pub fn slice_volume(run: Run) -> f64 {
  let outer = run.outer as f64;
  let inner = run.inner as f64;
  PI * 0.5 * (outer * outer - inner * inner)
}
