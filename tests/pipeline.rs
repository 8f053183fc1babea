use image::{GrayImage, Luma, Rgb, RgbImage};
use shuiwei::{
  FromUrl,
  analysis::{AnalysisConfig, Analyzer},
  input::ImageFileInput,
  mask::{FOREGROUND_THRESHOLD, Mask},
  model::{Model, ReplayModel, SegmentResult},
  output::SaveImageFileOutput,
  task::{OneShotTask, Task},
};
use url::Url;

const SIZE: usize = 128;

fn circle(cx: i64, cy: i64, r: i64, keep: impl Fn(i64) -> bool) -> Mask {
  Mask::from_fn(SIZE, SIZE, |x, y| {
    let (x, y) = (x as i64, y as i64);
    let inside = (x - cx).pow(2) + (y - cy).pow(2) <= r * r;
    if inside && keep(y) { 1.0 } else { 0.0 }
  })
}

fn half_filled_bowl() -> SegmentResult {
  let mut result = SegmentResult::default();
  result.push([10.0, 10.0, 110.0, 110.0], 1, 0.95, circle(60, 60, 50, |_| true));
  result.push([10.0, 60.0, 110.0, 110.0], 2, 0.90, circle(60, 60, 50, |y| y >= 60));
  result
}

#[test]
fn half_filled_circle_reports_pixel_ratio() {
  let result = half_filled_bowl();
  let bowl_pixels = result.masks[0].foreground_count(FOREGROUND_THRESHOLD) as f64;
  let water_pixels = result.masks[1].foreground_count(FOREGROUND_THRESHOLD) as f64;

  let analysis = Analyzer::default().analyze(result);
  assert_eq!(analysis.vessels.len(), 1);

  let vessel = &analysis.vessels[0];
  assert!(vessel.container.liquid().is_some());
  let ratio = vessel.fill_ratio().unwrap();
  assert_eq!(ratio, water_pixels / bowl_pixels);
  assert!((ratio - 0.5).abs() < 0.02, "ratio {ratio}");

  let liquid_volume = vessel.liquid_volume.unwrap();
  assert!(liquid_volume > 0.0);
  assert!(liquid_volume < vessel.container_volume);
}

#[test]
fn empty_liquid_mask_gives_zero_volume_and_ratio() {
  let mut result = SegmentResult::default();
  result.push([10.0, 10.0, 110.0, 110.0], 1, 0.95, circle(60, 60, 50, |_| true));
  result.push([10.0, 60.0, 110.0, 110.0], 2, 0.90, Mask::zeros(SIZE, SIZE));

  let analysis = Analyzer::default().analyze(result);
  let vessel = &analysis.vessels[0];
  assert_eq!(vessel.fill_ratio(), Some(0.0));
  assert_eq!(vessel.liquid_volume, Some(0.0));
}

#[test]
fn container_without_liquid_has_no_fill_ratio() {
  let mut result = SegmentResult::default();
  result.push([0.0, 0.0, 50.0, 50.0], 1, 0.95, circle(25, 25, 20, |_| true));
  result.push([80.0, 80.0, 120.0, 120.0], 2, 0.90, circle(100, 100, 15, |_| true));
  result.push([0.0, 0.0, 10.0, 10.0], 9, 0.50, Mask::zeros(SIZE, SIZE));

  let analysis = Analyzer::default().analyze(result);
  assert_eq!(analysis.fill_ratios(), vec![None]);
  assert!(analysis.vessels[0].container_volume > 0.0);
  assert_eq!(analysis.vessels[0].liquid_volume, None);
}

#[test]
fn pipeline_is_idempotent() {
  let result = half_filled_bowl();
  let analyzer = Analyzer::new(AnalysisConfig {
    step: 2,
    ..AnalysisConfig::default()
  });

  let first = analyzer.analyze(result.clone());
  let second = analyzer.analyze(result);

  assert_eq!(first.fill_ratios(), second.fill_ratios());
  for (a, b) in first.vessels.iter().zip(second.vessels.iter()) {
    assert_eq!(a.container_volume, b.container_volume);
    assert_eq!(a.liquid_volume, b.liquid_volume);
    assert_eq!(
      a.container.liquid().map(|l| l.bbox),
      b.container.liquid().map(|l| l.bbox)
    );
  }
}

fn save_mask(mask: &Mask, path: &std::path::Path) {
  let image = GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
    let v = mask.get(x as usize, y as usize).unwrap_or(0.0);
    Luma([(v * 255.0).round() as u8])
  });
  image.save(path).unwrap();
}

#[test]
fn replayed_output_runs_through_task() {
  let dir = tempfile::tempdir().unwrap();
  let bowl = half_filled_bowl();
  save_mask(&bowl.masks[0], &dir.path().join("bowl.png"));
  save_mask(&bowl.masks[1], &dir.path().join("water.png"));

  let record = serde_json::json!({
    "boxes": [[10.0, 10.0, 110.0, 110.0], [10.0, 60.0, 110.0, 110.0]],
    "labels": [1, 2],
    "scores": [0.95, 0.9],
    "masks": ["bowl.png", "water.png"],
  });
  let record_path = dir.path().join("output.json");
  std::fs::write(&record_path, serde_json::to_vec(&record).unwrap()).unwrap();

  let model_url = Url::parse(&format!("replay://{}", record_path.display())).unwrap();
  let model = ReplayModel::from_url(&model_url).unwrap();

  let image_path = dir.path().join("out").join("annotated.png");
  let output_url = Url::parse(&format!("image://{}?record", image_path.display())).unwrap();
  let output = SaveImageFileOutput::<128, 128>::from_url(&output_url).unwrap();

  let photo = RgbImage::from_pixel(128, 128, Rgb([20, 20, 20]));
  let input = ImageFileInput::<128, 128>::from(photo).into_nhwc();

  let analysis = OneShotTask::default()
    .run_task(input, &model, &output)
    .unwrap();

  let expected = Analyzer::default().analyze(half_filled_bowl()).fill_ratios();
  assert_eq!(analysis.fill_ratios(), expected);

  let annotated = image::open(&image_path).unwrap().into_rgb8();
  assert_eq!(annotated.get_pixel(0, 0), &Rgb([20, 20, 20]));
  assert_ne!(annotated.get_pixel(60, 30), &Rgb([20, 20, 20]));
  assert_ne!(annotated.get_pixel(60, 90), annotated.get_pixel(60, 30));

  let report: serde_json::Value =
    serde_json::from_slice(&std::fs::read(dir.path().join("out").join("annotated.json")).unwrap())
      .unwrap();
  let reported = report["metadata"][0].as_f64().unwrap();
  assert_eq!(Some(reported), expected[0]);
}

#[test]
fn replay_reports_missing_mask() {
  let dir = tempfile::tempdir().unwrap();
  let record = serde_json::json!({
    "boxes": [[0.0, 0.0, 1.0, 1.0]],
    "labels": [1],
    "scores": [0.5],
    "masks": ["missing.png"],
  });
  let record_path = dir.path().join("output.json");
  std::fs::write(&record_path, serde_json::to_vec(&record).unwrap()).unwrap();

  let model = ReplayModel::<()>::new(&record_path);
  assert!(model.infer(&()).is_err());
}
