// 该文件是 Shuiwei （水位） 项目的一部分。
// src/model.rs - 模型
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

use crate::{geometry::BBox, mask::Mask};

/// 推理会话。由应用层构造并注入到任务中。
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_id(&self) -> i64;
  /// 未知标签返回 None
  fn from_label_id(id: i64) -> Option<Self>;
}

/// 分割模型的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
  Container,
  Liquid,
}

impl WithLabel for ObjectClass {
  fn to_label_id(&self) -> i64 {
    match self {
      ObjectClass::Container => 1,
      ObjectClass::Liquid => 2,
    }
  }

  fn from_label_id(id: i64) -> Option<Self> {
    match id {
      1 => Some(ObjectClass::Container),
      2 => Some(ObjectClass::Liquid),
      _ => None,
    }
  }
}

/// 单个检测实例
#[derive(Debug, Clone)]
pub struct Detection<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: BBox,
  pub mask: Mask,
}

/// 分割模型的原始输出：四个等长的并行序列
#[derive(Debug, Clone, Default)]
pub struct SegmentResult {
  pub boxes: Vec<[f32; 4]>, // [x_min, y_min, x_max, y_max]，像素坐标
  pub labels: Vec<i64>,
  pub scores: Vec<f32>,
  pub masks: Vec<Mask>,
}

impl SegmentResult {
  pub fn len(&self) -> usize {
    self
      .boxes
      .len()
      .min(self.labels.len())
      .min(self.scores.len())
      .min(self.masks.len())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn push(&mut self, bbox: [f32; 4], label: i64, score: f32, mask: Mask) {
    self.boxes.push(bbox);
    self.labels.push(label);
    self.scores.push(score);
    self.masks.push(mask);
  }

  /// 按类别拆分为检测实例，忽略未知标签。
  /// 序列长度不一致时截断到最短的序列。
  pub fn into_detections<T: WithLabel>(self) -> Vec<Detection<T>> {
    let lens = [
      self.boxes.len(),
      self.labels.len(),
      self.scores.len(),
      self.masks.len(),
    ];
    if lens.iter().any(|&l| l != lens[0]) {
      warn!(
        "模型输出序列长度不一致: boxes={}, labels={}, scores={}, masks={}",
        lens[0], lens[1], lens[2], lens[3]
      );
    }

    let mut detections = Vec::with_capacity(self.len());
    let items = self
      .boxes
      .into_iter()
      .zip(self.labels)
      .zip(self.scores)
      .zip(self.masks);
    for (((bbox, label), score), mask) in items {
      match T::from_label_id(label) {
        Some(kind) => detections.push(Detection {
          kind,
          score,
          bbox: BBox::from_xyxy(bbox),
          mask,
        }),
        None => debug!("忽略未知标签 {} 的检测结果", label),
      }
    }
    detections
  }
}

#[cfg(feature = "replay_model")]
mod replay;
#[cfg(feature = "replay_model")]
pub use self::replay::{ReplayModel, ReplayModelError};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_labels_are_skipped() {
    let mut result = SegmentResult::default();
    result.push([0.0, 0.0, 3.0, 3.0], 1, 0.9, Mask::zeros(4, 4));
    result.push([0.0, 0.0, 3.0, 3.0], 7, 0.8, Mask::zeros(4, 4));
    result.push([1.5, 1.5, 2.5, 2.5], 2, 0.7, Mask::zeros(4, 4));

    let detections: Vec<Detection<ObjectClass>> = result.into_detections();
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].kind, ObjectClass::Container);
    assert_eq!(detections[1].kind, ObjectClass::Liquid);
    assert_eq!(detections[1].bbox, BBox::new(1, 1, 2, 2));
  }

  #[test]
  fn mismatched_sequences_truncate() {
    let mut result = SegmentResult::default();
    result.push([0.0, 0.0, 1.0, 1.0], 1, 0.9, Mask::zeros(2, 2));
    result.labels.push(2);
    assert_eq!(result.len(), 1);
    let detections: Vec<Detection<ObjectClass>> = result.into_detections();
    assert_eq!(detections.len(), 1);
  }

  #[test]
  fn label_ids_round_trip() {
    for class in [ObjectClass::Container, ObjectClass::Liquid] {
      assert_eq!(ObjectClass::from_label_id(class.to_label_id()), Some(class));
    }
    assert_eq!(ObjectClass::from_label_id(0), None);
  }
}
