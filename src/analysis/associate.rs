// 该文件是 Shuiwei （水位） 项目的一部分。
// src/analysis/associate.rs - 容器与液体配对
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

use tracing::debug;

use crate::{
  entity::Masked,
  geometry::{AreaConvention, BBox},
};

/// 默认的最小覆盖比例：交集必须严格大于液体框面积的一半
pub const DEFAULT_MIN_COVERAGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
  /// 液体在输入序列中的下标
  pub liquid: usize,
  /// 交集像素数
  pub overlap: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Associator {
  pub min_coverage: f64,
  pub area_convention: AreaConvention,
}

impl Default for Associator {
  fn default() -> Self {
    Self {
      min_coverage: DEFAULT_MIN_COVERAGE,
      area_convention: AreaConvention::default(),
    }
  }
}

impl Associator {
  /// 为单个容器挑选交集最大且满足覆盖条件的液体，平局时先出现者优先
  pub fn best_match<'a>(
    &self,
    container: &BBox,
    liquids: impl IntoIterator<Item = &'a BBox>,
  ) -> Option<Match> {
    let mut best: Option<Match> = None;
    for (idx, liquid) in liquids.into_iter().enumerate() {
      let overlap = container.intersection_area(liquid);
      let current = best.map_or(0, |m| m.overlap);
      if overlap > current && self.qualifies(overlap, liquid) {
        best = Some(Match {
          liquid: idx,
          overlap,
        });
      }
    }
    best
  }

  fn qualifies(&self, overlap: i64, liquid: &BBox) -> bool {
    overlap > 0 && overlap as f64 > liquid.area(self.area_convention) as f64 * self.min_coverage
  }

  /// 为每个容器给出配对的液体。
  ///
  /// 所有满足覆盖条件的（容器, 液体）组合按交集从大到小贪心分配，
  /// 每个容器与每个液体至多使用一次。交集相同时先出现的容器、再先出现的液体优先。
  /// 在争夺中落败的容器会继续尝试其余未被占用的液体。
  pub fn associate<C: Masked, L: Masked>(&self, containers: &[C], liquids: &[L]) -> Vec<Option<Match>> {
    let mut pairs = Vec::new();
    for (ci, container) in containers.iter().enumerate() {
      for (li, liquid) in liquids.iter().enumerate() {
        let overlap = container.bbox().intersection_area(liquid.bbox());
        if self.qualifies(overlap, liquid.bbox()) {
          pairs.push((ci, li, overlap));
        }
      }
    }
    // 稳定排序保留 (容器, 液体) 的输入顺序
    pairs.sort_by(|a, b| b.2.cmp(&a.2));

    let mut matches: Vec<Option<Match>> = vec![None; containers.len()];
    let mut owner: Vec<Option<usize>> = vec![None; liquids.len()];
    for (ci, li, overlap) in pairs {
      if matches[ci].is_some() {
        continue;
      }
      if let Some(prev) = owner[li] {
        debug!("液体 {} 已配对容器 {}，容器 {} 尝试其他液体", li, prev, ci);
        continue;
      }
      owner[li] = Some(ci);
      matches[ci] = Some(Match { liquid: li, overlap });
    }

    matches
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{Container, Liquid},
    mask::Mask,
  };

  fn container(b: [i32; 4]) -> Container {
    Container::new(BBox::from(b), Mask::zeros(1, 1), 1.0)
  }

  fn liquid(b: [i32; 4]) -> Liquid {
    Liquid {
      bbox: BBox::from(b),
      mask: Mask::zeros(1, 1),
      score: 1.0,
    }
  }

  #[test]
  fn picks_the_overlapping_liquid() {
    let containers = [container([0, 0, 100, 100])];
    let liquids = [liquid([0, 0, 100, 50]), liquid([200, 200, 300, 300])];
    let matches = Associator::default().associate(&containers, &liquids);
    assert_eq!(
      matches,
      vec![Some(Match {
        liquid: 0,
        overlap: 101 * 51
      })]
    );
  }

  #[test]
  fn non_overlapping_liquid_leaves_container_empty() {
    let containers = [container([0, 0, 100, 100])];
    let liquids = [liquid([200, 200, 300, 300])];
    let matches = Associator::default().associate(&containers, &liquids);
    assert_eq!(matches, vec![None]);
  }

  #[test]
  fn exactly_half_coverage_is_rejected() {
    let c = BBox::new(0, 0, 9999, 9999);
    let half = BBox::new(0, 5000, 9999, 14999);
    assert_eq!(Associator::default().best_match(&c, [&half]), None);
  }

  #[test]
  fn just_over_half_coverage_is_accepted() {
    let c = BBox::new(0, 0, 9999, 9999);
    let over = BBox::new(0, 4999, 9999, 14998);
    let m = Associator::default().best_match(&c, [&over]);
    assert_eq!(
      m,
      Some(Match {
        liquid: 0,
        overlap: 10000 * 5001
      })
    );
  }

  #[test]
  fn legacy_area_convention_is_more_permissive() {
    let c = BBox::new(0, 0, 100, 100);
    let l = BBox::new(0, 51, 100, 151);
    let inclusive = Associator::default();
    let legacy = Associator {
      area_convention: AreaConvention::Legacy,
      ..Associator::default()
    };
    assert_eq!(inclusive.best_match(&c, [&l]), None);
    assert!(legacy.best_match(&c, [&l]).is_some());
  }

  #[test]
  fn ties_keep_the_first_liquid() {
    let c = BBox::new(0, 0, 100, 100);
    let a = BBox::new(0, 0, 50, 50);
    let b = BBox::new(50, 50, 100, 100);
    let m = Associator::default().best_match(&c, [&a, &b]);
    assert_eq!(m.map(|m| m.liquid), Some(0));
  }

  #[test]
  fn larger_overlap_wins() {
    let c = BBox::new(0, 0, 100, 100);
    let small = BBox::new(0, 0, 10, 10);
    let large = BBox::new(0, 0, 60, 60);
    let m = Associator::default().best_match(&c, [&small, &large]);
    assert_eq!(m.map(|m| m.liquid), Some(1));
  }

  #[test]
  fn shared_liquid_goes_to_largest_overlap() {
    let containers = [container([0, 0, 40, 40]), container([0, 0, 100, 100])];
    let liquids = [liquid([0, 0, 50, 50])];
    let matches = Associator::default().associate(&containers, &liquids);
    assert_eq!(matches[0], None);
    assert_eq!(matches[1].map(|m| m.liquid), Some(0));
  }

  #[test]
  fn losing_container_falls_back_to_free_liquid() {
    let containers = [container([0, 0, 100, 100]), container([50, 50, 300, 300])];
    let liquids = [liquid([40, 40, 120, 120]), liquid([5, 5, 30, 30])];
    let matches = Associator::default().associate(&containers, &liquids);
    assert_eq!(
      matches,
      vec![
        Some(Match {
          liquid: 1,
          overlap: 26 * 26
        }),
        Some(Match {
          liquid: 0,
          overlap: 71 * 71
        }),
      ]
    );
  }

  #[test]
  fn each_container_keeps_its_best_liquid_without_conflicts() {
    let containers = [container([0, 0, 100, 100]), container([200, 0, 300, 100])];
    let liquids = [
      liquid([200, 50, 300, 100]),
      liquid([0, 80, 100, 100]),
      liquid([0, 40, 100, 100]),
    ];
    let matches = Associator::default().associate(&containers, &liquids);
    assert_eq!(matches[0].map(|m| m.liquid), Some(2));
    assert_eq!(matches[1].map(|m| m.liquid), Some(0));
  }
}
