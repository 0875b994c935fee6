#![cfg(feature = "rayon")]

use detpost::lowlevel::{decode, decode_par};
use detpost::{detect, CoordParams, DetectConfig, FlatTensor, LabelTable, TensorLayout};

fn make_tensor(num_rows: usize, num_classes: usize) -> Vec<f32> {
    let stride = 5 + num_classes;
    let mut data = Vec::with_capacity(num_rows * stride);
    for r in 0..num_rows {
        let cx = ((r * 37) % 640) as f32;
        let cy = ((r * 91) % 640) as f32;
        let size = 8.0 + ((r * 13) % 48) as f32;
        let objectness = ((r * 7919) % 1000) as f32 / 1000.0;
        data.extend_from_slice(&[cx, cy, size, size * 0.75, objectness]);
        for c in 0..num_classes {
            data.push((((r + 3) * (c + 1) * 31) % 97) as f32 / 97.0);
        }
    }
    data
}

#[test]
fn parallel_decode_matches_sequential() {
    let num_classes = 80;
    let layout = TensorLayout::new(5_000, num_classes).unwrap();
    let data = make_tensor(layout.num_rows, num_classes);
    let tensor = FlatTensor::new(&data, layout).unwrap();
    let labels: LabelTable = (0..num_classes).map(|i| format!("class{i}")).collect();

    let seq = decode(&tensor, &labels, 0.3).unwrap();
    let par = decode_par(&tensor, &labels, 0.3).unwrap();
    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn parallel_pipeline_matches_sequential() {
    let num_classes = 20;
    let layout = TensorLayout::new(3_000, num_classes).unwrap();
    let data = make_tensor(layout.num_rows, num_classes);
    let tensor = FlatTensor::new(&data, layout).unwrap();
    let labels: LabelTable = (0..num_classes).map(|i| format!("class{i}")).collect();
    let coords = CoordParams::normalized(640.0).unwrap();

    let seq_cfg = DetectConfig {
        parallel: false,
        limit: 50,
        ..DetectConfig::default()
    };
    let par_cfg = DetectConfig {
        parallel: true,
        ..seq_cfg
    };

    let seq = detect(&tensor, &labels, &seq_cfg, &coords).unwrap();
    let par = detect(&tensor, &labels, &par_cfg, &coords).unwrap();
    assert_eq!(seq, par);
}
