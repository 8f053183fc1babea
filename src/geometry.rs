// 该文件是 Shuiwei （水位） 项目的一部分。
// src/geometry.rs - 像素边界框
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

/// 像素坐标边界框 [x_min, y_min, x_max, y_max]，两端均包含
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BBox {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

/// 面积计算约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaConvention {
  /// 包含端点像素：(x2 - x1 + 1) * (y2 - y1 + 1)
  #[default]
  Inclusive,
  /// 坐标差绝对值：|x2 - x1| * |y2 - y1|
  Legacy,
}

impl BBox {
  pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
    Self { x1, y1, x2, y2 }
  }

  /// 模型输出的浮点坐标向零截断
  pub fn from_xyxy(bbox: [f32; 4]) -> Self {
    let [x1, y1, x2, y2] = bbox.map(|v| if v.is_finite() { v as i32 } else { 0 });
    Self { x1, y1, x2, y2 }
  }

  pub fn to_array(&self) -> [i32; 4] {
    [self.x1, self.y1, self.x2, self.y2]
  }

  /// 交换颠倒的角点
  pub fn normalized(&self) -> Self {
    Self {
      x1: self.x1.min(self.x2),
      y1: self.y1.min(self.y2),
      x2: self.x1.max(self.x2),
      y2: self.y1.max(self.y2),
    }
  }

  /// 裁剪到 `width` x `height` 的像素网格内，网格为空时返回 None
  pub fn clamp_to(&self, width: usize, height: usize) -> Option<Self> {
    if width == 0 || height == 0 {
      return None;
    }
    let max_x = i32::try_from(width - 1).unwrap_or(i32::MAX);
    let max_y = i32::try_from(height - 1).unwrap_or(i32::MAX);
    let b = self.normalized();
    let clamped = Self {
      x1: b.x1.max(0),
      y1: b.y1.max(0),
      x2: b.x2.min(max_x),
      y2: b.y2.min(max_y),
    };
    if clamped.x1 > clamped.x2 || clamped.y1 > clamped.y2 {
      return None;
    }
    Some(clamped)
  }

  /// 两个边界框相交部分的像素数（包含端点）
  pub fn intersection_area(&self, other: &BBox) -> i64 {
    let x1 = self.x1.max(other.x1) as i64;
    let y1 = self.y1.max(other.y1) as i64;
    let x2 = self.x2.min(other.x2) as i64;
    let y2 = self.y2.min(other.y2) as i64;
    (x2 - x1 + 1).max(0) * (y2 - y1 + 1).max(0)
  }

  pub fn area(&self, convention: AreaConvention) -> i64 {
    let dx = (self.x2 as i64 - self.x1 as i64).abs();
    let dy = (self.y2 as i64 - self.y1 as i64).abs();
    match convention {
      AreaConvention::Inclusive => (dx + 1) * (dy + 1),
      AreaConvention::Legacy => dx * dy,
    }
  }
}

impl From<[i32; 4]> for BBox {
  fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
    Self { x1, y1, x2, y2 }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_xyxy_truncates_toward_zero() {
    let b = BBox::from_xyxy([10.9, 20.2, 110.99, -0.5]);
    assert_eq!(b, BBox::new(10, 20, 110, 0));
  }

  #[test]
  fn from_xyxy_drops_nan() {
    let b = BBox::from_xyxy([f32::NAN, 1.0, f32::INFINITY, 3.0]);
    assert_eq!(b, BBox::new(0, 1, 0, 3));
  }

  #[test]
  fn intersection_counts_inclusive_pixels() {
    let a = BBox::new(0, 0, 100, 100);
    let b = BBox::new(0, 0, 100, 50);
    assert_eq!(a.intersection_area(&b), 101 * 51);
    let far = BBox::new(200, 200, 300, 300);
    assert_eq!(a.intersection_area(&far), 0);
  }

  #[test]
  fn touching_boxes_share_one_column() {
    let a = BBox::new(0, 0, 10, 10);
    let b = BBox::new(10, 0, 20, 10);
    assert_eq!(a.intersection_area(&b), 11);
  }

  #[test]
  fn area_conventions() {
    let b = BBox::new(0, 0, 100, 50);
    assert_eq!(b.area(AreaConvention::Inclusive), 101 * 51);
    assert_eq!(b.area(AreaConvention::Legacy), 100 * 50);
  }

  #[test]
  fn clamp_handles_out_of_range_and_reversed() {
    let b = BBox::new(120, -5, -10, 300);
    assert_eq!(b.clamp_to(100, 200), Some(BBox::new(0, 0, 99, 199)));
    assert_eq!(BBox::new(150, 0, 180, 10).clamp_to(100, 100), None);
    assert_eq!(BBox::new(0, 0, 10, 10).clamp_to(0, 0), None);
  }
}
