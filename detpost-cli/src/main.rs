use clap::Parser;
use detpost::{
    detect, CoordParams, DetectConfig, Detection, FlatTensor, LabelTable, NestedTensor,
    SuppressionMode, TensorLayout, TensorSource, TransposedTensor,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Detector output post-processing (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the pipeline stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum TensorFormat {
    /// Raw little-endian `f32` values.
    #[default]
    F32Le,
    /// JSON array, flat or one array per row.
    Json,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum TensorOrder {
    #[default]
    RowMajor,
    ColumnMajor,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    ClassAgnostic,
    PerClass,
}

impl From<ModeConfig> for SuppressionMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::ClassAgnostic => SuppressionMode::ClassAgnostic,
            ModeConfig::PerClass => SuppressionMode::PerClass,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    limit: usize,
    mode: ModeConfig,
    max_candidates: Option<usize>,
    parallel: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            limit: cfg.limit,
            mode: ModeConfig::ClassAgnostic,
            max_candidates: cfg.max_candidates,
            parallel: cfg.parallel,
        }
    }
}

impl From<&DetectConfigJson> for DetectConfig {
    fn from(value: &DetectConfigJson) -> Self {
        Self {
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            limit: value.limit,
            mode: value.mode.into(),
            max_candidates: value.max_candidates,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CoordsConfig {
    #[default]
    Identity,
    Normalized {
        input_size: f32,
    },
    FitView {
        input_size: f32,
        image_width: f32,
        image_height: f32,
        view_width: f32,
        view_height: f32,
    },
    Explicit {
        scale_x: f32,
        scale_y: f32,
        view_scale_x: f32,
        view_scale_y: f32,
        start_x: f32,
        start_y: f32,
    },
}

impl CoordsConfig {
    fn to_params(&self) -> detpost::DetpostResult<CoordParams> {
        match *self {
            CoordsConfig::Identity => Ok(CoordParams::identity()),
            CoordsConfig::Normalized { input_size } => CoordParams::normalized(input_size),
            CoordsConfig::FitView {
                input_size,
                image_width,
                image_height,
                view_width,
                view_height,
            } => CoordParams::fit_view(
                input_size,
                image_width,
                image_height,
                view_width,
                view_height,
            ),
            CoordsConfig::Explicit {
                scale_x,
                scale_y,
                view_scale_x,
                view_scale_y,
                start_x,
                start_y,
            } => Ok(CoordParams {
                scale_x,
                scale_y,
                view_scale_x,
                view_scale_y,
                start_x,
                start_y,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    labels_path: String,
    tensor_path: String,
    tensor_format: TensorFormat,
    tensor_order: TensorOrder,
    num_classes: Option<usize>,
    num_rows: Option<usize>,
    output_path: Option<String>,
    detect: DetectConfigJson,
    coords: CoordsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels_path: String::new(),
            tensor_path: String::new(),
            tensor_format: TensorFormat::F32Le,
            tensor_order: TensorOrder::RowMajor,
            num_classes: None,
            num_rows: None,
            output_path: None,
            detect: DetectConfigJson::default(),
            coords: CoordsConfig::Identity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTensor {
    Flat(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

enum TensorData {
    Flat(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: String,
    class_id: usize,
    confidence: f32,
    bbox: BoxRecord,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            class_id: value.class_id,
            confidence: value.confidence,
            bbox: BoxRecord {
                left: value.bbox.left,
                top: value.bbox.top,
                right: value.bbox.right,
                bottom: value.bbox.bottom,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn read_tensor(config: &Config) -> Result<TensorData, Box<dyn std::error::Error>> {
    match config.tensor_format {
        TensorFormat::F32Le => {
            let bytes = fs::read(&config.tensor_path)?;
            if bytes.len() % 4 != 0 {
                return Err(format!(
                    "{} is {} bytes, not a whole number of f32 values",
                    config.tensor_path,
                    bytes.len()
                )
                .into());
            }
            let values = bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            Ok(TensorData::Flat(values))
        }
        TensorFormat::Json => {
            let text = fs::read_to_string(&config.tensor_path)?;
            Ok(match serde_json::from_str(&text)? {
                JsonTensor::Flat(values) => TensorData::Flat(values),
                JsonTensor::Rows(rows) => TensorData::Rows(rows),
            })
        }
    }
}

fn flat_layout(
    values: &[f32],
    num_rows: Option<usize>,
    num_classes: usize,
) -> detpost::DetpostResult<TensorLayout> {
    match num_rows {
        Some(num_rows) => TensorLayout::new(num_rows, num_classes),
        None => FlatTensor::infer_rows(values, num_classes).map(|t| t.layout()),
    }
}

fn run<S: TensorSource + Sync + ?Sized>(
    source: &S,
    labels: &LabelTable,
    config: &Config,
) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
    let detect_cfg = DetectConfig::from(&config.detect);
    let coords = config.coords.to_params()?;
    Ok(detect(source, labels, &detect_cfg, &coords)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detpost=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.labels_path.is_empty() || config.tensor_path.is_empty() {
        return Err("labels_path and tensor_path must be set in the config".into());
    }

    let labels = LabelTable::from_text(&fs::read_to_string(&config.labels_path)?)?;
    let num_classes = config.num_classes.unwrap_or(labels.len());
    tracing::info!(classes = labels.len(), "loaded labels");

    let detections = match read_tensor(&config)? {
        TensorData::Flat(values) => {
            let layout = flat_layout(&values, config.num_rows, num_classes)?;
            tracing::info!(rows = layout.num_rows, "loaded tensor");
            match config.tensor_order {
                TensorOrder::RowMajor => {
                    run(&FlatTensor::new(&values, layout)?, &labels, &config)?
                }
                TensorOrder::ColumnMajor => {
                    run(&TransposedTensor::new(&values, layout)?, &labels, &config)?
                }
            }
        }
        TensorData::Rows(rows) => {
            if matches!(config.tensor_order, TensorOrder::ColumnMajor) {
                return Err("column_major order needs a flat tensor".into());
            }
            let tensor = NestedTensor::new(&rows, num_classes)?;
            if let Some(expected) = config.num_rows {
                if expected != rows.len() {
                    return Err(format!(
                        "num_rows is {expected} but the tensor has {} rows",
                        rows.len()
                    )
                    .into());
                }
            }
            run(&tensor, &labels, &config)?
        }
    };

    let output = Output {
        count: detections.len(),
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
