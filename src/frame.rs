// 该文件是 Shuiwei （水位） 项目的一部分。
// src/frame.rs - NHWC 帧定义
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

use image::{ImageBuffer, Rgb, RgbImage, imageops};

use crate::input::AsNhwcFrame;

const RGB_CHANNELS: usize = 3;

/// 分割模型的固定输入尺寸
pub const MODEL_INPUT_SIZE: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> From<Vec<u8>> for RgbNhwcFrame<W, H> {
  fn from(data: Vec<u8>) -> Self {
    if data.len() != (RGB_CHANNELS * W as usize * H as usize) {
      panic!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        RGB_CHANNELS * W as usize * H as usize,
        data.len()
      );
    }

    Self {
      data: data.into_boxed_slice(),
    }
  }
}

impl<const W: u32, const H: u32> RgbNhwcFrame<W, H> {
  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  /// 归一化到 [0, 1] 的 NCHW 浮点张量
  pub fn to_nchw_tensor(&self) -> Vec<f32> {
    let plane = self.width() * self.height();
    let mut tensor = vec![0f32; plane * RGB_CHANNELS];
    for (idx, pixel) in self.data.chunks_exact(RGB_CHANNELS).enumerate() {
      for (c, &value) in pixel.iter().enumerate() {
        tensor[c * plane + idx] = value as f32 / 255.0;
      }
    }
    tensor
  }

  /// 将任意尺寸的图像居中填充为黑边正方形，再缩放到帧尺寸
  pub fn letterbox(image: &RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let side = width.max(height);
    let mut square = RgbImage::new(side, side);
    let x_pad = (side - width) / 2;
    let y_pad = (side - height) / 2;
    imageops::replace(&mut square, image, x_pad as i64, y_pad as i64);

    let resized = if side == W && side == H {
      square
    } else {
      imageops::resize(&square, W, H, imageops::FilterType::Triangle)
    };
    Self::from_rgb_image(&resized)
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for RgbNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

pub trait FromRgbImage {
  fn from_rgb_image(image: &RgbImage) -> Self;
}

impl<const W: u32, const H: u32> ToRgbImage for RgbNhwcFrame<W, H> {
  fn to_rgb_image(&self) -> RgbImage {
    let width = self.width() as u32;
    let data = self.as_nhwc();

    ImageBuffer::from_fn(width, self.height() as u32, |x, y| {
      let idx = (y as usize * width as usize + x as usize) * RGB_CHANNELS;
      Rgb([data[idx], data[idx + 1], data[idx + 2]])
    })
  }
}

impl<const W: u32, const H: u32> FromRgbImage for RgbNhwcFrame<W, H> {
  /// 尺寸不符时先缩放
  fn from_rgb_image(image: &RgbImage) -> Self {
    if image.dimensions() != (W, H) {
      let resized = imageops::resize(image, W, H, imageops::FilterType::Triangle);
      return RgbNhwcFrame::from(resized.into_raw());
    }
    RgbNhwcFrame::from(image.as_raw().clone())
  }
}

impl ToRgbImage for RgbImage {
  fn to_rgb_image(&self) -> RgbImage {
    self.clone()
  }
}

impl FromRgbImage for RgbImage {
  fn from_rgb_image(image: &RgbImage) -> Self {
    image.clone()
  }
}
