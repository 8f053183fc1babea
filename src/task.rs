// 该文件是 Shuiwei （水位） 项目的一部分。
// src/task.rs - 推理任务
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

use tracing::info;

use crate::{
  analysis::{Analysis, Analyzer},
  model::{Model, SegmentResult},
  output::Render,
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: &M, output: &O) -> Result<Self::Output, Self::Error>;
}

/// 取第一帧：推理、分析、渲染
#[derive(Debug, Clone, Default)]
pub struct OneShotTask {
  analyzer: Analyzer,
}

impl OneShotTask {
  pub fn new(analyzer: Analyzer) -> Self {
    Self { analyzer }
  }
}

impl<
  F,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = SegmentResult, Error = ME>,
  O: Render<F, Analysis, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = Analysis;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: &M, output: &O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(&frame)?;
    info!("推理完成，耗时: {:.2?}, 检测数 {}", now.elapsed(), result.len());

    let now = std::time::Instant::now();
    let analysis = self.analyzer.analyze(result);
    info!("分析完成，耗时: {:.2?}", now.elapsed());

    let now = std::time::Instant::now();
    output.render_result(&frame, &analysis)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(analysis)
  }
}
