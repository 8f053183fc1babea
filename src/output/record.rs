// 该文件是 Shuiwei （水位） 项目的一部分。
// src/output/record.rs - 分析结果记录
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

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidReport {
  pub bbox: [i32; 4],
  pub score: f32,
  pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselReport {
  pub bbox: [i32; 4],
  pub score: f32,
  pub fill_ratio: Option<f64>,
  pub volume: f64,
  pub liquid: Option<LiquidReport>,
}

/// `metadata` 为每个容器的液位，未检测到液体时为 null
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub metadata: Vec<Option<f64>>,
  pub vessels: Vec<VesselReport>,
}

impl From<&Analysis> for Report {
  fn from(analysis: &Analysis) -> Self {
    let vessels = analysis
      .vessels
      .iter()
      .map(|vessel| VesselReport {
        bbox: vessel.container.bbox.to_array(),
        score: vessel.container.score,
        fill_ratio: vessel.fill_ratio(),
        volume: vessel.container_volume,
        liquid: vessel
          .container
          .liquid()
          .zip(vessel.liquid_volume)
          .map(|(liquid, volume)| LiquidReport {
            bbox: liquid.bbox.to_array(),
            score: liquid.score,
            volume,
          }),
      })
      .collect();

    Report {
      metadata: analysis.fill_ratios(),
      vessels,
    }
  }
}

pub struct Record;

impl Record {
  /// 与图像同名的 JSON 文件
  pub fn record_path(path: &Path) -> PathBuf {
    path.with_extension("json")
  }

  pub fn record(&self, analysis: &Analysis, path: &Path) -> Result<(), std::io::Error> {
    let report = Report::from(analysis);
    let data = serde_json::to_vec_pretty(&report)?;
    std::fs::write(Self::record_path(path), data)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{analysis::Vessel, entity::Container, geometry::BBox, mask::Mask};

  #[test]
  fn unassociated_container_reports_null() {
    let analysis = Analysis {
      vessels: vec![Vessel {
        container: Container::new(BBox::new(1, 2, 3, 4), Mask::zeros(4, 4), 0.8),
        container_volume: 12.5,
        liquid_volume: None,
      }],
    };
    let value = serde_json::to_value(Report::from(&analysis)).unwrap();
    assert_eq!(value["metadata"], serde_json::json!([null]));
    assert_eq!(value["vessels"][0]["bbox"], serde_json::json!([1, 2, 3, 4]));
    assert_eq!(value["vessels"][0]["volume"], serde_json::json!(12.5));
    assert!(value["vessels"][0]["liquid"].is_null());
  }

  #[test]
  fn record_path_replaces_extension() {
    assert_eq!(
      Record::record_path(Path::new("/tmp/out/result.png")),
      PathBuf::from("/tmp/out/result.json")
    );
  }
}
