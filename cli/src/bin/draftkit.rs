use clap::{Parser, Subcommand};
use cli::{load_shapes, DraftConfig};
use color_eyre::eyre::Result;
use draft_common::Document;
use extrude::export_document;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};
use vectorize::{
    algorithms::StaticShapeDetector, render_overlay, PipelineBuilder, TraceOutcome, TraceWorker,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vectorize an image into a polyline document
    Trace {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Path to save the document JSON
        #[arg(short, long)]
        output: PathBuf,
        /// Save a copy of the image with the polylines drawn over it
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// JSON list of shapes from an external detector to append
        #[arg(long)]
        shapes: Option<PathBuf>,
    },
    /// Extrude a polyline document into an OBJ mesh
    Export {
        /// Path to the document JSON
        #[arg(short, long)]
        document: PathBuf,
        /// Path of the .obj file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Extrusion depth in millimeters (overrides the configuration)
        #[arg(long)]
        depth: Option<f64>,
        /// Also write the Grasshopper JSON next to the OBJ
        #[arg(long)]
        interchange: bool,
    },
    /// Trace an image and export the result in one go
    Run {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Directory receiving paths.json, model.obj and README.txt
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Extrusion depth in millimeters (overrides the configuration)
        #[arg(long)]
        depth: Option<f64>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Write a configuration file with default values
    InitConfig {
        /// Destination (.toml or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => DraftConfig::from_file(path)?,
        None => DraftConfig::default(),
    };

    match &cli.command {
        Commands::Trace { input, output, overlay, shapes } => {
            let document = trace_to_document(&config, input, overlay.as_deref(), shapes.as_deref()).await?;
            document.to_json_file(output)?;
            info!("📄 Document saved to: {:?}", output);
        }
        Commands::Export { document, output, depth, interchange } => {
            let document = Document::from_json_file(document)?;
            let mut export = config.export.clone();
            export.depth = depth.or(export.depth);
            export.write_interchange |= *interchange;
            let report = export_document(&document, &export, output)?;
            info!("✅ Exported {} faces to {:?}", report.obj.face_count, report.obj.obj_path);
        }
        Commands::Run { input, output_dir, depth } => {
            std::fs::create_dir_all(output_dir)?;
            let document = trace_to_document(&config, input, None, None).await?;
            document.to_json_file(output_dir.join("paths.json"))?;

            let mut export = config.export.clone();
            export.depth = depth.or(export.depth);
            let report = export_document(&document, &export, output_dir.join("model.obj"))?;
            info!(
                "✅ {} paths, {} vertices, {} faces written to {:?}",
                document.paths.len(),
                report.obj.vertex_count,
                report.obj.face_count,
                output_dir
            );
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&DraftConfig::schema())?);
        }
        Commands::InitConfig { output } => {
            DraftConfig::default().to_file(output)?;
            info!("📄 Default configuration saved to: {:?}", output);
        }
    }

    Ok(())
}

async fn trace_to_document(
    config: &DraftConfig,
    input: &Path,
    overlay: Option<&Path>,
    shapes: Option<&Path>,
) -> Result<Document> {
    config.trace.validate()?;

    let mut builder = PipelineBuilder::from_config(config.trace.clone());
    if let Some(path) = shapes {
        let shapes = load_shapes(path)?;
        info!("Replaying {} external shapes from {:?}", shapes.len(), path);
        builder = builder.add_shape_detector(StaticShapeDetector { shapes });
    }
    let worker = TraceWorker::new(builder.build());
    info!("{}", worker.pipeline().info());

    let mut document = Document::new();
    config.building.apply(&mut document);

    let image = match image::open(input) {
        Ok(image) => image,
        Err(error) => {
            warn!("Could not load {:?}: {}; nothing traced", input, error);
            return Ok(document);
        }
    };

    let handle = worker.spawn(image.clone());
    let mut progress = handle.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let fraction = *progress.borrow_and_update();
            info!("🔍 Tracing {:.0}%", fraction * 100.0);
        }
    });

    let outcome: TraceOutcome = handle.join().await?;
    if let Err(error) = reporter.await {
        warn!("Progress reporter stopped early: {}", error);
    }

    info!(
        "Traced {} contours, {} lines, {} shapes ({} points, {:.0} px of strokes)",
        outcome.contour_count,
        outcome.line_count,
        outcome.shape_count,
        outcome.point_count(),
        outcome.stroke_length()
    );
    if let Some((min, max)) = outcome.bounds() {
        info!("Drawing spans ({:.0}, {:.0}) to ({:.0}, {:.0})", min.x, min.y, max.x, max.y);
    }

    if let Some(path) = overlay {
        render_overlay(&image, &outcome.polylines).save(path)?;
        info!("🖼️ Overlay saved to: {:?}", path);
    }

    document.apply_trace(outcome.polylines);
    Ok(document)
}
