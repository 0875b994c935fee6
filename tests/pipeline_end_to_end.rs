use detpost::{
    detect, CoordParams, DetectConfig, Detector, FlatTensor, LabelTable, NestedTensor, Rect,
    TensorLayout, TransposedTensor,
};

const NUM_CLASSES: usize = 4;

fn labels() -> LabelTable {
    ["person", "bicycle", "car", "dog"].into_iter().collect()
}

fn make_row(cx: f32, cy: f32, w: f32, h: f32, objectness: f32, class_id: usize) -> Vec<f32> {
    let mut row = vec![cx, cy, w, h, objectness];
    for idx in 0..NUM_CLASSES {
        row.push(if idx == class_id { 0.8 } else { 0.05 });
    }
    row
}

fn flatten(rows: &[Vec<f32>]) -> Vec<f32> {
    rows.iter().flatten().copied().collect()
}

fn run(rows: &[Vec<f32>], config: DetectConfig) -> Vec<detpost::Detection> {
    let data = flatten(rows);
    let layout = TensorLayout::new(rows.len(), NUM_CLASSES).unwrap();
    let tensor = FlatTensor::new(&data, layout).unwrap();
    detect(&tensor, &labels(), &config, &CoordParams::identity()).unwrap()
}

#[test]
fn single_row_yields_labeled_detection() {
    let mut row = vec![100.0, 80.0, 40.0, 20.0, 0.9];
    row.extend_from_slice(&[0.1, 0.2, 0.6, 0.3]);

    let out = run(&[row], DetectConfig::default());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].label, "car");
    assert_eq!(out[0].class_id, 2);
    assert_eq!(out[0].confidence, 0.9);
    assert_eq!(out[0].bbox, Rect::new(80.0, 70.0, 120.0, 90.0));
}

#[test]
fn heavy_overlap_keeps_higher_confidence() {
    // Same center, widths 10 and 9: IoU = 0.9.
    let rows = vec![
        make_row(50.0, 50.0, 9.0, 10.0, 0.8, 0),
        make_row(50.0, 50.0, 10.0, 10.0, 0.9, 0),
    ];
    let out = run(&rows, DetectConfig::default());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].confidence, 0.9);
}

#[test]
fn disjoint_boxes_come_back_by_confidence() {
    let rows = vec![
        make_row(10.0, 10.0, 5.0, 5.0, 0.5, 1),
        make_row(90.0, 90.0, 5.0, 5.0, 0.9, 3),
    ];
    let out = run(&rows, DetectConfig::default());
    let confs: Vec<_> = out.iter().map(|d| d.confidence).collect();
    assert_eq!(confs, [0.9, 0.5]);
    assert_eq!(out[0].label, "dog");
    assert_eq!(out[1].label, "bicycle");
}

#[test]
fn limit_of_one_returns_best_only() {
    let rows = vec![
        make_row(10.0, 10.0, 5.0, 5.0, 0.6, 0),
        make_row(50.0, 50.0, 5.0, 5.0, 0.95, 1),
        make_row(90.0, 90.0, 5.0, 5.0, 0.7, 2),
    ];
    let out = run(
        &rows,
        DetectConfig {
            limit: 1,
            ..DetectConfig::default()
        },
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].confidence, 0.95);
}

#[test]
fn objectness_equal_to_threshold_is_excluded() {
    let rows = vec![
        make_row(10.0, 10.0, 5.0, 5.0, 0.3, 0),
        make_row(50.0, 50.0, 5.0, 5.0, 0.300_001, 0),
    ];
    let out = run(
        &rows,
        DetectConfig {
            confidence_threshold: 0.3,
            ..DetectConfig::default()
        },
    );
    assert_eq!(out.len(), 1);
    assert!(out[0].confidence > 0.3);
}

#[test]
fn all_tensor_shapes_produce_identical_results() {
    let rows = vec![
        make_row(10.0, 10.0, 8.0, 8.0, 0.6, 0),
        make_row(12.0, 11.0, 8.0, 8.0, 0.7, 1),
        make_row(60.0, 40.0, 20.0, 10.0, 0.2, 2),
        make_row(61.0, 40.0, 20.0, 10.0, 0.85, 3),
        make_row(-5.0, 100.0, 30.0, 30.0, 0.45, 2),
    ];
    let layout = TensorLayout::new(rows.len(), NUM_CLASSES).unwrap();
    let stride = layout.row_stride();
    let flat_data = flatten(&rows);
    let mut transposed_data = vec![0.0f32; flat_data.len()];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            transposed_data[c * rows.len() + r] = *value;
        }
    }
    assert_eq!(stride, rows[0].len());

    let labels = labels();
    let cfg = DetectConfig::default();
    let coords = CoordParams::normalized(640.0).unwrap();

    let flat = FlatTensor::new(&flat_data, layout).unwrap();
    let nested = NestedTensor::new(&rows, NUM_CLASSES).unwrap();
    let transposed = TransposedTensor::new(&transposed_data, layout).unwrap();

    let from_flat = detect(&flat, &labels, &cfg, &coords).unwrap();
    let from_nested = detect(&nested, &labels, &cfg, &coords).unwrap();
    let from_transposed = detect(&transposed, &labels, &cfg, &coords).unwrap();

    assert!(!from_flat.is_empty());
    assert_eq!(from_flat, from_nested);
    assert_eq!(from_flat, from_transposed);
}

#[test]
fn detector_is_reusable_across_calls() {
    let detector = Detector::new(labels(), TensorLayout::new(2, NUM_CLASSES).unwrap())
        .unwrap()
        .with_config(DetectConfig {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            ..DetectConfig::default()
        });

    let first = flatten(&[
        make_row(10.0, 10.0, 5.0, 5.0, 0.9, 0),
        make_row(40.0, 40.0, 5.0, 5.0, 0.1, 0),
    ]);
    let second = flatten(&[
        make_row(10.0, 10.0, 5.0, 5.0, 0.2, 0),
        make_row(40.0, 40.0, 5.0, 5.0, 0.5, 3),
    ]);

    let a = detector
        .detect(&FlatTensor::new(&first, detector.layout()).unwrap())
        .unwrap();
    let b = detector
        .detect(&FlatTensor::new(&second, detector.layout()).unwrap())
        .unwrap();
    let a_again = detector
        .detect(&FlatTensor::new(&first, detector.layout()).unwrap())
        .unwrap();

    assert_eq!(a.len(), 1);
    assert_eq!(a[0].label, "person");
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].label, "dog");
    assert_eq!(a, a_again);
}

#[test]
fn fit_view_places_boxes_in_view_space() {
    // 640x640 model input of a 1280x720 image shown in a 640x640 view.
    let coords = CoordParams::fit_view(640.0, 1280.0, 720.0, 640.0, 640.0).unwrap();
    let rows = vec![make_row(320.0, 320.0, 640.0, 640.0, 0.9, 0)];
    let data = flatten(&rows);
    let tensor = FlatTensor::new(&data, TensorLayout::new(1, NUM_CLASSES).unwrap()).unwrap();

    let out = detect(&tensor, &labels(), &DetectConfig::default(), &coords).unwrap();
    let bbox = out[0].bbox;
    assert!(bbox.left.abs() < 1e-3);
    assert!((bbox.right - 640.0).abs() < 1e-3);
    assert!((bbox.top - 140.0).abs() < 1e-3);
    assert!((bbox.bottom - 500.0).abs() < 1e-3);
}
