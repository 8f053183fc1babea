// 该文件是 Shuiwei （水位） 项目的一部分。
// src/output/draw.rs - 分析结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{
  analysis::Analysis,
  entity::Masked,
  frame::{FromRgbImage, ToRgbImage},
  geometry::BBox,
  mask::{FOREGROUND_THRESHOLD, Mask},
  model::ObjectClass,
};

// 叠加渲染常量
pub const DEFAULT_ALPHA: f32 = 0.3;
pub const CONTAINER_COLOR: [u8; 3] = [150, 255, 200];
pub const LIQUID_COLOR: [u8; 3] = [50, 100, 255];

#[derive(Debug, Clone, PartialEq)]
pub struct DrawConfig {
  /// 掩码颜色的混合系数
  pub alpha: f32,
  pub threshold: f32,
  /// 是否绘制边界框，默认关闭
  pub draw_bbox: bool,
  pub container_color: [u8; 3],
  pub liquid_color: [u8; 3],
}

impl Default for DrawConfig {
  fn default() -> Self {
    Self {
      alpha: DEFAULT_ALPHA,
      threshold: FOREGROUND_THRESHOLD,
      draw_bbox: false,
      container_color: CONTAINER_COLOR,
      liquid_color: LIQUID_COLOR,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct Draw {
  config: DrawConfig,
}

impl Draw {
  pub fn new(config: DrawConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &DrawConfig {
    &self.config
  }

  pub fn config_mut(&mut self) -> &mut DrawConfig {
    &mut self.config
  }

  pub fn with_bbox(mut self, draw_bbox: bool) -> Self {
    self.config.draw_bbox = draw_bbox;
    self
  }

  fn color_of(&self, kind: ObjectClass) -> [u8; 3] {
    match kind {
      ObjectClass::Container => self.config.container_color,
      ObjectClass::Liquid => self.config.liquid_color,
    }
  }

  /// 将掩码前景区域按 alpha 混合上色，掩码尺寸不同时先最近邻缩放
  pub fn overlay_mask(&self, image: &mut RgbImage, mask: &Mask, color: [u8; 3]) {
    let (width, height) = image.dimensions();
    let resized;
    let mask = if mask.width() != width as usize || mask.height() != height as usize {
      resized = mask.resize_nearest(width as usize, height as usize);
      &resized
    } else {
      mask
    };

    let alpha = self.config.alpha.clamp(0.0, 1.0);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
      if !mask.is_foreground(x as usize, y as usize, self.config.threshold) {
        continue;
      }
      for c in 0..3 {
        let blended = pixel[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
        pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
      }
    }
  }

  // 边界框先裁剪到掩码网格，再换算到图像坐标系绘制
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BBox, mask: &Mask, color: [u8; 3]) {
    let Some(b) = bbox.clamp_to(mask.width(), mask.height()) else {
      return;
    };
    let (width, height) = image.dimensions();
    let scale_x = width as f32 / mask.width() as f32;
    let scale_y = height as f32 / mask.height() as f32;

    let x_min = (b.x1 as f32 * scale_x).floor() as i32;
    let y_min = (b.y1 as f32 * scale_y).floor() as i32;
    let x_max = (b.x2 as f32 * scale_x).ceil() as i32;
    let y_max = (b.y2 as f32 * scale_y).ceil() as i32;

    let rect_w = (x_max - x_min + 1).max(1) as u32;
    let rect_h = (y_max - y_min + 1).max(1) as u32;
    draw_hollow_rect_mut(image, Rect::at(x_min, y_min).of_size(rect_w, rect_h), Rgb(color));
  }

  pub fn draw_entity<E: Masked + ?Sized>(&self, image: &mut RgbImage, entity: &E) {
    let color = self.color_of(entity.kind());
    self.overlay_mask(image, entity.mask(), color);
    if self.config.draw_bbox {
      self.draw_bbox(image, entity.bbox(), entity.mask(), color);
    }
  }
}

pub trait DrawAnalysisOnImage {
  fn draw_analysis_on_image(&self, image: &mut RgbImage, analysis: &Analysis);
}

pub trait DrawAnalysisOnFrame<FromFrame, ToFrame> {
  fn draw_analysis(&self, frame: &FromFrame, analysis: &Analysis) -> ToFrame;
}

impl<FromFrame: ToRgbImage, ToFrame: FromRgbImage, D: DrawAnalysisOnImage>
  DrawAnalysisOnFrame<FromFrame, ToFrame> for D
{
  fn draw_analysis(&self, frame: &FromFrame, analysis: &Analysis) -> ToFrame {
    let mut image = frame.to_rgb_image();
    self.draw_analysis_on_image(&mut image, analysis);
    ToFrame::from_rgb_image(&image)
  }
}

impl DrawAnalysisOnImage for Draw {
  fn draw_analysis_on_image(&self, image: &mut RgbImage, analysis: &Analysis) {
    // 每个容器先画容器，再画其液体
    for vessel in analysis.vessels.iter() {
      self.draw_entity(image, &vessel.container);
      if let Some(liquid) = vessel.container.liquid() {
        self.draw_entity(image, liquid);
      }
    }
  }
}
