use clap::{Parser, ValueEnum};
use flowviz_core::glyph::build_glyphs;
use flowviz_core::{
    CameraDirection, ConstantVelocityField, ContourConfig, ContourView, FluentVelocityField,
    GlyphConfig, HsvColorMapper, SampleStrategy, Vec3, VelocityColorMapper, VelocityComponent,
    VelocityField, WorkerPool,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Render a velocity contour slice to an image without a window
#[derive(Parser, Debug)]
#[command(name = "flowviz-headless")]
#[command(about = "Headless velocity field contour renderer", long_about = None)]
struct Args {
    /// Dataset with X_VELOCITY, Y_VELOCITY and Z_VELOCITY cell arrays (.vtk or .json)
    #[arg(short, long, conflicts_with = "constant")]
    input: Option<PathBuf>,

    /// Use a constant test field instead, given as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
    constant: Option<Vec<f32>>,

    /// Axis the camera looks along
    #[arg(long, value_enum, default_value_t = Axis::Y)]
    camera: Axis,

    /// Velocity component to color
    #[arg(long, value_enum, default_value_t = Component::X)]
    component: Component,

    /// Slice position along the camera axis (default: center of the field)
    #[arg(short, long)]
    depth: Option<f32>,

    /// Texels per side of the contour cache
    #[arg(short, long, default_value_t = 1024, value_parser = positive_size)]
    resolution: usize,

    /// Output image width in pixels
    #[arg(long, default_value_t = 800, value_parser = positive_size)]
    width: usize,

    /// Output image height in pixels
    #[arg(long, default_value_t = 600, value_parser = positive_size)]
    height: usize,

    /// Worker threads (-1 = all hardware threads)
    #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
    threads: i32,

    /// Output PPM image
    #[arg(short, long, default_value = "contour.ppm")]
    output: PathBuf,

    /// Also write the color legend to this PPM image
    #[arg(long)]
    color_bar: Option<PathBuf>,

    /// Sample this many arrow glyphs and report them
    #[arg(long)]
    glyphs: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Axis {
    X,
    Y,
    Z,
}

impl From<Axis> for CameraDirection {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => CameraDirection::X,
            Axis::Y => CameraDirection::Y,
            Axis::Z => CameraDirection::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Component {
    X,
    Y,
    Z,
    Magnitude,
}

impl From<Component> for VelocityComponent {
    fn from(component: Component) -> Self {
        match component {
            Component::X => VelocityComponent::X,
            Component::Y => VelocityComponent::Y,
            Component::Z => VelocityComponent::Z,
            Component::Magnitude => VelocityComponent::Magnitude,
        }
    }
}

/// Parse a size that must be at least one
fn positive_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn load_field(args: &Args) -> Result<Box<dyn VelocityField>, String> {
    match (&args.input, &args.constant) {
        (Some(path), _) => FluentVelocityField::open(path)
            .map(|f| Box::new(f) as Box<dyn VelocityField>)
            .map_err(|e| e.to_string()),
        (None, Some(v)) => Ok(Box::new(ConstantVelocityField::new(Vec3::new(v[0], v[1], v[2])))),
        (None, None) => Err("either --input or --constant is required".to_string()),
    }
}

fn run(args: &Args) -> Result<(), String> {
    let field = load_field(args)?;
    let bounds = field.bounding_box();
    println!(
        "Field bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
        bounds.lower.x, bounds.lower.y, bounds.lower.z, bounds.upper.x, bounds.upper.y, bounds.upper.z
    );

    let config = ContourConfig {
        resolution: args.resolution,
        worker_count: args.threads,
        ..ContourConfig::default()
    };
    let pool = Arc::new(WorkerPool::new(config.worker_count).map_err(|e| e.to_string())?);

    let mut view = ContourView::new(field.as_ref(), pool, config, args.width, args.height);
    view.set_camera_direction(args.camera.into());
    view.set_component(args.component.into());
    if let Some(depth) = args.depth {
        view.set_depth(depth);
    }

    let (low, high) = view.velocity_range();
    println!(
        "Camera {:?}, component {:?}, depth {:.3}, velocity range [{:.4}, {:.4}]",
        view.camera_direction(),
        view.component(),
        view.depth(),
        low,
        high
    );

    let start = Instant::now();
    let image = view.render();
    info!("Rendered {}x{} in {:?}", image.width(), image.height(), start.elapsed());

    image
        .write_ppm(&args.output)
        .map_err(|e| format!("Failed to write {}: {e}", args.output.display()))?;
    println!("Wrote {}", args.output.display());

    if let Some(path) = &args.color_bar {
        view.color_bar(32, args.height)
            .write_ppm(path)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    if let Some(count) = args.glyphs {
        let mut mapper = HsvColorMapper::default();
        mapper.set_velocity_range(
            field.min_velocity(VelocityComponent::Magnitude),
            field.max_velocity(VelocityComponent::Magnitude),
        );
        let glyph_config = GlyphConfig {
            sample_count: count,
            strategy: SampleStrategy::Halton,
            ..GlyphConfig::default()
        };
        let glyphs = build_glyphs(field.as_ref(), &mapper, &glyph_config);
        println!("Sampled {} of {} arrow glyphs", glyphs.len(), count);
        for g in glyphs.iter().take(5) {
            println!(
                "  at ({:.3}, {:.3}, {:.3}) velocity ({:.3}, {:.3}, {:.3})",
                g.position.x, g.position.y, g.position.z, g.velocity.x, g.velocity.y, g.velocity.z
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
