// 该文件是 Shuiwei （水位） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::Path;

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  analysis::Analysis,
  frame::RgbNhwcFrame,
  output::{
    Render,
    draw::{Draw, DrawAnalysisOnFrame},
    record::Record,
  },
};

/// `image:///path/out.png[?bbox][&record]`
pub struct SaveImageFileOutput<const W: u32, const H: u32> {
  path: String,
  draw: Draw,
  record: Option<Record>,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl<const W: u32, const H: u32> FromUrlWithScheme for SaveImageFileOutput<W, H> {
  const SCHEME: &'static str = "image";
}

impl<const W: u32, const H: u32> FromUrl for SaveImageFileOutput<W, H> {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let draw_bbox = uri.query_pairs().any(|(k, _)| k == "bbox");
    let record = uri.query_pairs().any(|(k, _)| k == "record");

    Ok(SaveImageFileOutput {
      path: uri.path().to_string(),
      draw: Draw::default().with_bbox(draw_bbox),
      record: record.then_some(Record),
    })
  }
}

impl<const W: u32, const H: u32> SaveImageFileOutput<W, H> {
  pub fn draw_mut(&mut self) -> &mut Draw {
    &mut self.draw
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  fn save_image(&self, image: image::RgbImage, analysis: &Analysis) -> Result<(), SaveImageFileError> {
    let path = Path::new(&self.path);
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(path)?;
    info!("保存图像到文件: {}", self.path);

    if let Some(record) = &self.record {
      record.record(analysis, path)?;
      info!("保存分析结果到文件: {}", Record::record_path(path).display());
    }

    Ok(())
  }
}

impl<const W: u32, const H: u32> Render<RgbNhwcFrame<W, H>, Analysis> for SaveImageFileOutput<W, H> {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &RgbNhwcFrame<W, H>, result: &Analysis) -> Result<(), Self::Error> {
    let image: image::RgbImage = self.draw.draw_analysis(frame, result);
    self.save_image(image, result)
  }
}
