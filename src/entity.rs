// 该文件是 Shuiwei （水位） 项目的一部分。
// src/entity.rs - 容器与液体实体
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

use crate::{
  geometry::BBox,
  mask::Mask,
  model::{Detection, ObjectClass},
};

/// 带掩码的实体，容器与液体共用
pub trait Masked {
  fn kind(&self) -> ObjectClass;
  fn bbox(&self) -> &BBox;
  fn mask(&self) -> &Mask;
}

#[derive(Debug, Clone)]
pub struct Liquid {
  pub bbox: BBox,
  pub mask: Mask,
  pub score: f32,
}

#[derive(Debug, Clone)]
pub struct Container {
  pub bbox: BBox,
  pub mask: Mask,
  pub score: f32,
  liquid: Option<Liquid>,
  fill_ratio: Option<f64>,
}

impl Container {
  pub fn new(bbox: BBox, mask: Mask, score: f32) -> Self {
    Self {
      bbox,
      mask,
      score,
      liquid: None,
      fill_ratio: None,
    }
  }

  pub fn liquid(&self) -> Option<&Liquid> {
    self.liquid.as_ref()
  }

  /// 未检测到液体时为 None
  pub fn fill_ratio(&self) -> Option<f64> {
    self.fill_ratio
  }

  pub fn attach(&mut self, liquid: Liquid, fill_ratio: f64) {
    self.liquid = Some(liquid);
    self.fill_ratio = Some(fill_ratio);
  }
}

impl Masked for Container {
  fn kind(&self) -> ObjectClass {
    ObjectClass::Container
  }

  fn bbox(&self) -> &BBox {
    &self.bbox
  }

  fn mask(&self) -> &Mask {
    &self.mask
  }
}

impl Masked for Liquid {
  fn kind(&self) -> ObjectClass {
    ObjectClass::Liquid
  }

  fn bbox(&self) -> &BBox {
    &self.bbox
  }

  fn mask(&self) -> &Mask {
    &self.mask
  }
}

/// 按类别拆分检测结果，保持输入顺序
pub fn partition(detections: Vec<Detection<ObjectClass>>) -> (Vec<Container>, Vec<Liquid>) {
  let mut containers = Vec::new();
  let mut liquids = Vec::new();
  for Detection {
    kind,
    score,
    bbox,
    mask,
  } in detections
  {
    match kind {
      ObjectClass::Container => containers.push(Container::new(bbox, mask, score)),
      ObjectClass::Liquid => liquids.push(Liquid { bbox, mask, score }),
    }
  }
  (containers, liquids)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partition_keeps_order() {
    let det = |kind, x| Detection {
      kind,
      score: 1.0,
      bbox: BBox::new(x, 0, x + 1, 1),
      mask: Mask::zeros(1, 1),
    };
    let (containers, liquids) = partition(vec![
      det(ObjectClass::Liquid, 0),
      det(ObjectClass::Container, 1),
      det(ObjectClass::Container, 2),
      det(ObjectClass::Liquid, 3),
    ]);
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].bbox.x1, 1);
    assert_eq!(containers[1].bbox.x1, 2);
    assert_eq!(liquids[0].bbox.x1, 0);
    assert_eq!(liquids[1].bbox.x1, 3);
  }

  #[test]
  fn new_container_has_no_fill_ratio() {
    let c = Container::new(BBox::new(0, 0, 1, 1), Mask::zeros(2, 2), 0.9);
    assert!(c.liquid().is_none());
    assert_eq!(c.fill_ratio(), None);
    assert_eq!(c.kind(), ObjectClass::Container);
  }
}
