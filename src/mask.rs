// 该文件是 Shuiwei （水位） 项目的一部分。
// src/mask.rs - 实例掩码与扫描线分段
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

use image::GrayImage;
use thiserror::Error;

/// 掩码前景阈值
pub const FOREGROUND_THRESHOLD: f32 = 0.5;

#[derive(Error, Debug)]
pub enum MaskError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 单通道概率掩码，行优先存储，取值范围 [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
  width: usize,
  height: usize,
  data: Box<[f32]>,
}

/// 扫描线上的一段前景，半径均为到对称轴的像素距离
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
  pub outer: u32,
  pub inner: u32,
}

impl Mask {
  pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, MaskError> {
    if data.len() != width * height {
      return Err(MaskError::LengthMismatch {
        expected: width * height,
        actual: data.len(),
      });
    }
    Ok(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  pub fn zeros(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      data: vec![0.0; width * height].into_boxed_slice(),
    }
  }

  pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
      for x in 0..width {
        data.push(f(x, y));
      }
    }
    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  /// 灰度图转掩码，像素值除以 255
  pub fn from_luma(image: &GrayImage) -> Self {
    let (width, height) = image.dimensions();
    Self::from_fn(width as usize, height as usize, |x, y| {
      image.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    })
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  pub fn get(&self, x: usize, y: usize) -> Option<f32> {
    if x >= self.width || y >= self.height {
      return None;
    }
    Some(self.data[y * self.width + x])
  }

  pub fn is_foreground(&self, x: usize, y: usize, threshold: f32) -> bool {
    self.get(x, y).is_some_and(|v| v > threshold)
  }

  pub fn foreground_count(&self, threshold: f32) -> usize {
    self.data.iter().filter(|&&v| v > threshold).count()
  }

  /// 最近邻缩放，与 OpenCV INTER_NEAREST 的取样方式一致
  pub fn resize_nearest(&self, width: usize, height: usize) -> Mask {
    if width == self.width && height == self.height {
      return self.clone();
    }
    if self.width == 0 || self.height == 0 {
      return Mask::zeros(width, height);
    }
    Mask::from_fn(width, height, |x, y| {
      let sx = (x * self.width / width).min(self.width - 1);
      let sy = (y * self.height / height).min(self.height - 1);
      self.data[sy * self.width + sx]
    })
  }

  /// 在第 `y` 行从 `from` 向 `center` 扫描（不含 `center`），提取前景分段。
  ///
  /// 值大于 `threshold` 时分段开始，小于 `threshold` 时结束，恰好等于阈值的
  /// 像素保持当前状态。扫描结束时仍未闭合的分段在对称轴处闭合，内半径为 0。
  /// 越界像素视为背景。
  pub fn scan_runs(&self, y: usize, from: i32, center: i32, threshold: f32) -> Vec<Run> {
    let mut runs = Vec::new();
    let step: i32 = if from < center { 1 } else { -1 };
    let mut start: Option<i32> = None;
    let mut x = from;

    while x != center {
      let value = if x >= 0 {
        self.get(x as usize, y).unwrap_or(0.0)
      } else {
        0.0
      };
      match start {
        None if value > threshold => start = Some(x),
        Some(s) if value < threshold => {
          runs.push(Run {
            outer: center.abs_diff(s),
            inner: center.abs_diff(x),
          });
          start = None;
        }
        _ => {}
      }
      x += step;
    }

    if let Some(s) = start {
      runs.push(Run {
        outer: center.abs_diff(s),
        inner: 0,
      });
    }

    runs
  }
}
