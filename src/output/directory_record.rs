// 该文件是 Shuiwei （水位） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

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

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// `folder:///dir[?always][&record][&bbox]`
///
/// 结果按日期写入 `dir/YYYY/MM/DD/HH-MM-SS-XXXX.png`，
/// 未检测到容器时跳过，除非指定 `always`。
pub struct DirectoryRecordOutput<const W: u32, const H: u32> {
  directory: PathBuf,
  draw: Draw,
  record: Option<Record>,
  frame_counter: AtomicU16,
  always: bool,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for DirectoryRecordOutput<W, H> {
  const SCHEME: &'static str = "folder";
}

impl<const W: u32, const H: u32> FromUrl for DirectoryRecordOutput<W, H> {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let has = |key: &str| uri.query_pairs().any(|(k, _)| k == key);

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      draw: Draw::default().with_bbox(has("bbox")),
      record: has("record").then_some(Record),
      frame_counter: AtomicU16::new(0),
      always: has("always"),
    })
  }
}

impl<const W: u32, const H: u32> DirectoryRecordOutput<W, H> {
  pub fn draw_mut(&mut self) -> &mut Draw {
    &mut self.draw
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl<const W: u32, const H: u32> Render<RgbNhwcFrame<W, H>, Analysis> for DirectoryRecordOutput<W, H> {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &RgbNhwcFrame<W, H>, result: &Analysis) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      debug!("未检测到容器，跳过记录");
      return Ok(());
    }

    let path = self.frame_path()?;
    let image: RgbImage = self.draw.draw_analysis(frame, result);
    image.save(&path)?;
    if let Some(record) = &self.record {
      record.record(result, &path)?;
    }
    info!("记录结果到: {}", path.display());
    Ok(())
  }
}
