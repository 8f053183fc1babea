// 该文件是 Shuiwei （水位） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像液位分析
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

use anyhow::Result;
use clap::{Parser, ValueEnum};
use url::Url;

use shuiwei::{
  FromUrl,
  analysis::{AnalysisConfig, Analyzer},
  frame::MODEL_INPUT_SIZE,
  geometry::AreaConvention,
  input::InputWrapper,
  model::ReplayModel,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AreaArg {
  /// 液体框面积包含端点像素
  Inclusive,
  /// 液体框面积取坐标差
  Legacy,
}

impl From<AreaArg> for AreaConvention {
  fn from(arg: AreaArg) -> Self {
    match arg {
      AreaArg::Inclusive => AreaConvention::Inclusive,
      AreaArg::Legacy => AreaConvention::Legacy,
    }
  }
}

/// Shuiwei 液位分析参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型输出（replay:///path/output.json）
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源（image:///path/photo.jpg）
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径（image:///path/out.png?record 或 folder:///dir?always）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 体积积分的扫描线步长
  #[arg(long, default_value = "1", value_name = "ROWS")]
  pub step: usize,
  /// 液体框被容器覆盖的最小比例
  #[arg(long, default_value = "0.5", value_name = "RATIO")]
  pub min_coverage: f64,
  /// 液体框面积约定
  #[arg(long, value_enum, default_value = "inclusive")]
  area_convention: AreaArg,
  /// 掩码叠加的混合系数
  #[arg(long, default_value = "0.3", value_name = "ALPHA")]
  pub alpha: f32,
  /// 绘制边界框
  #[arg(long)]
  pub bbox: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型输出: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = InputWrapper::<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>::from_url(&args.input)?;
  let model = ReplayModel::from_url(&args.model)?;
  let mut output = OutputWrapper::<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>::from_url(&args.output)?;
  {
    let draw = output.draw_mut().config_mut();
    draw.alpha = args.alpha;
    draw.draw_bbox |= args.bbox;
  }

  let analyzer = Analyzer::new(AnalysisConfig {
    step: args.step,
    min_coverage: args.min_coverage,
    area_convention: args.area_convention.into(),
    ..AnalysisConfig::default()
  });

  let analysis = OneShotTask::new(analyzer).run_task(input.into_nhwc(), &model, &output)?;

  for (idx, ratio) in analysis.fill_ratios().iter().enumerate() {
    match ratio {
      Some(ratio) => info!("容器 {}: 液位 {:.3}", idx, ratio),
      None => info!("容器 {}: 未检测到液体", idx),
    }
  }

  Ok(())
}
