// 该文件是 Shuiwei （水位） 项目的一部分。
// src/analysis.rs - 液位分析流程
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

use tracing::{debug, info};

use crate::{
  entity::{Container, partition},
  geometry::AreaConvention,
  mask::FOREGROUND_THRESHOLD,
  model::{Detection, ObjectClass, SegmentResult},
};

pub mod associate;
pub mod fill;
pub mod volume;

pub use self::associate::{Associator, DEFAULT_MIN_COVERAGE, Match};
pub use self::fill::fill_ratio;
pub use self::volume::{DEFAULT_STEP, VolumeEstimator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
  /// 体积积分的扫描线步长
  pub step: usize,
  /// 掩码前景阈值
  pub threshold: f32,
  /// 交集占液体框面积的最小比例（严格大于）
  pub min_coverage: f64,
  pub area_convention: AreaConvention,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      step: DEFAULT_STEP,
      threshold: FOREGROUND_THRESHOLD,
      min_coverage: DEFAULT_MIN_COVERAGE,
      area_convention: AreaConvention::default(),
    }
  }
}

/// 一个容器及其分析结果
#[derive(Debug, Clone)]
pub struct Vessel {
  pub container: Container,
  pub container_volume: f64,
  /// 未配对液体时为 None
  pub liquid_volume: Option<f64>,
}

impl Vessel {
  pub fn fill_ratio(&self) -> Option<f64> {
    self.container.fill_ratio()
  }
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
  pub vessels: Vec<Vessel>,
}

impl Analysis {
  pub fn is_empty(&self) -> bool {
    self.vessels.is_empty()
  }

  /// 对外输出的液位列表，每个容器一项
  pub fn fill_ratios(&self) -> Vec<Option<f64>> {
    self.vessels.iter().map(Vessel::fill_ratio).collect()
  }
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
  config: AnalysisConfig,
}

impl Analyzer {
  pub fn new(config: AnalysisConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &AnalysisConfig {
    &self.config
  }

  fn associator(&self) -> Associator {
    Associator {
      min_coverage: self.config.min_coverage,
      area_convention: self.config.area_convention,
    }
  }

  fn estimator(&self) -> VolumeEstimator {
    VolumeEstimator {
      step: self.config.step,
      threshold: self.config.threshold,
    }
  }

  pub fn analyze(&self, result: SegmentResult) -> Analysis {
    self.analyze_detections(result.into_detections())
  }

  pub fn analyze_detections(&self, detections: Vec<Detection<ObjectClass>>) -> Analysis {
    let (containers, liquids) = partition(detections);
    debug!("检测到 {} 个容器, {} 个液体", containers.len(), liquids.len());

    let matches = self.associator().associate(&containers, &liquids);
    let estimator = self.estimator();
    let mut liquids: Vec<_> = liquids.into_iter().map(Some).collect();

    let vessels = containers
      .into_iter()
      .zip(matches)
      .enumerate()
      .map(|(idx, (mut container, matched))| {
        let container_volume = estimator.estimate(&container);
        let liquid = matched.and_then(|m| liquids[m.liquid].take());
        let liquid_volume = liquid.map(|liquid| {
          let liquid_volume = estimator.estimate(&liquid);
          let ratio = fill_ratio(&container.mask, &liquid.mask, self.config.threshold);
          debug!(
            "容器 {}: 液体体积 {:.1}, 容器体积 {:.1}, 体积比 {:.3}",
            idx,
            liquid_volume,
            container_volume,
            if container_volume > 0.0 {
              liquid_volume / container_volume
            } else {
              0.0
            }
          );
          container.attach(liquid, ratio);
          liquid_volume
        });
        match container.fill_ratio() {
          Some(ratio) => info!("容器 {} {:?}: 液位 {:.3}", idx, container.bbox.to_array(), ratio),
          None => info!("容器 {} {:?}: 未检测到液体", idx, container.bbox.to_array()),
        }
        Vessel {
          container,
          container_volume,
          liquid_volume,
        }
      })
      .collect();

    Analysis { vessels }
  }
}
