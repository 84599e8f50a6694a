use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use visage::{
    AppState, BuiltinModel, DetailCatalog, FaceShapeClassifier, ModelManager, ShapePredictor,
    StyleCatalog,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: String,

    /// Root directory of the hairstyle asset store
    #[arg(long, default_value = "hairstyles")]
    assets_dir: PathBuf,

    /// Whether the asset store is partitioned by gender
    /// (<root>/<gender>/<category> instead of <root>/<category>)
    #[arg(long)]
    gendered: bool,

    /// Maximum number of recommendations returned per prediction
    #[arg(long, default_value_t = 3)]
    max_recommendations: usize,

    /// Maximum accepted upload size in bytes
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    body_limit: usize,

    /// Optional JSON file overriding the built-in face shape detail table
    #[arg(long)]
    details_file: Option<PathBuf>,

    /// Path to a custom ONNX model (requires --labels-file)
    #[arg(long, requires = "labels_file")]
    model_file: Option<PathBuf>,

    /// Path to the label-index JSON for a custom model
    #[arg(long, requires = "model_file")]
    labels_file: Option<PathBuf>,

    /// Force a fresh download of the built-in model files
    #[arg(short, long)]
    fresh: bool,
}

async fn build_classifier(args: &Args) -> anyhow::Result<FaceShapeClassifier> {
    if let (Some(model_file), Some(labels_file)) = (&args.model_file, &args.labels_file) {
        info!("Loading custom model from {:?}", model_file);
        let classifier = FaceShapeClassifier::builder()
            .with_custom_model(
                model_file.to_str().context("Model path is not valid UTF-8")?,
                labels_file.to_str().context("Label path is not valid UTF-8")?,
                None,
            )?
            .build()?;
        return Ok(classifier);
    }

    let manager = ModelManager::new_default()?;
    let model = BuiltinModel::FaceShapeMobileNetV2;

    if args.fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(model)?;
    }
    manager.ensure_model_downloaded(model).await?;

    let classifier = FaceShapeClassifier::builder()
        .with_model(model)?
        .build()?;
    Ok(classifier)
}

fn load_details(args: &Args) -> DetailCatalog {
    match &args.details_file {
        Some(path) => match DetailCatalog::from_file(path) {
            Ok(catalog) => {
                info!("Loaded {} detail entries from {:?}", catalog.len(), path);
                catalog
            }
            Err(e) => {
                warn!("Failed to load {:?} ({}), using built-in detail table", path, e);
                DetailCatalog::builtin()
            }
        },
        None => DetailCatalog::builtin(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let classifier = build_classifier(&args).await?;
    let classifier_info = classifier.info();
    info!(
        "Classifier ready: {} classes ({:?}), input {}x{}",
        classifier_info.num_classes,
        classifier_info.class_labels,
        classifier_info.input_width,
        classifier_info.input_height
    );

    if !args.assets_dir.exists() {
        warn!(
            "Asset store {:?} does not exist; recommendations will be empty",
            args.assets_dir
        );
    }

    let styles = StyleCatalog::new(&args.assets_dir, args.gendered);
    let details = load_details(&args);

    let state = AppState::new(
        Arc::new(classifier) as Arc<dyn ShapePredictor>,
        styles,
        details,
        args.max_recommendations,
    );
    let app = visage::build_router(state, &args.assets_dir, args.body_limit);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;
    info!("Listening on http://{}", args.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
