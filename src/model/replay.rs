// 该文件是 Shuiwei （水位） 项目的一部分。
// src/model/replay.rs - 回放已记录的模型输出
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

use std::{
  marker::PhantomData,
  path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  mask::Mask,
  model::{Model, SegmentResult},
};

#[derive(Error, Debug)]
pub enum ReplayModelError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("掩码图像 {0} 读取错误: {1}")]
  MaskError(PathBuf, image::ImageError),
}

/// 记录文件格式，与分割模型输出的四个并行序列一致。
/// 掩码为灰度图像路径，相对路径以记录文件所在目录为基准。
#[derive(Debug, Deserialize)]
struct ReplayRecord {
  boxes: Vec<[f32; 4]>,
  labels: Vec<i64>,
  scores: Vec<f32>,
  masks: Vec<PathBuf>,
}

/// 以记录的模型输出代替推理会话，每次推理都重新读取记录文件
pub struct ReplayModel<Frame> {
  path: PathBuf,
  _phantom: PhantomData<fn(&Frame)>,
}

impl<Frame> FromUrlWithScheme for ReplayModel<Frame> {
  const SCHEME: &'static str = "replay";
}

impl<Frame> FromUrl for ReplayModel<Frame> {
  type Error = ReplayModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ReplayModelError::SchemeMismatch(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }
    Ok(Self::new(url.path()))
  }
}

impl<Frame> ReplayModel<Frame> {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
      _phantom: PhantomData,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn load_mask(&self, path: &Path) -> Result<Mask, ReplayModelError> {
    let full = match self.path.parent() {
      Some(parent) if path.is_relative() => parent.join(path),
      _ => path.to_path_buf(),
    };
    let image = image::open(&full).map_err(|e| ReplayModelError::MaskError(full.clone(), e))?;
    debug!("读取掩码 {}: {}x{}", full.display(), image.width(), image.height());
    Ok(Mask::from_luma(&image.into_luma8()))
  }
}

impl<Frame> Model for ReplayModel<Frame> {
  type Input = Frame;
  type Output = SegmentResult;
  type Error = ReplayModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    info!("回放模型输出: {}", self.path.display());
    let data = std::fs::read(&self.path)?;
    let record: ReplayRecord = serde_json::from_slice(&data)?;

    let masks = record
      .masks
      .iter()
      .map(|p| self.load_mask(p))
      .collect::<Result<Vec<_>, _>>()?;

    debug!("回放 {} 个检测结果", record.boxes.len());
    Ok(SegmentResult {
      boxes: record.boxes,
      labels: record.labels,
      scores: record.scores,
      masks,
    })
  }
}
