use element_detector::image::io::{load_rgb_image, save_grayscale_f32, write_json_file};
use element_detector::image::ImageRgb8;
use element_detector::pyramid::Pyramid;
use element_detector::{ElementDetector, ElementType, RecognitionConfig};
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

struct CliOptions {
    input_path: PathBuf,
    config_path: Option<PathBuf>,
    preset: Option<String>,
    types: Option<Vec<ElementType>>,
    json_out: Option<PathBuf>,
    debug_dir: Option<PathBuf>,
    diagnose: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <image> [options]\n\
         \n\
         Options:\n\
         \x20 --config <path>   JSON configuration file\n\
         \x20 --preset <name>   'fast' or 'accurate' (ignored with --config)\n\
         \x20 --types <list>    comma-separated subset: button,icon,text,link,input\n\
         \x20 --json <path>     write detections (or diagnostics) as JSON\n\
         \x20 --debug-dir <dir> save pyramid luma planes as grayscale PNGs\n\
         \x20 --diagnose        report pipeline internals instead of detections"
    )
}

fn parse_cli(program: &str) -> Result<CliOptions, String> {
    let mut args = env::args().skip(1);
    let mut input_path = None;
    let mut options = CliOptions {
        input_path: PathBuf::new(),
        config_path: None,
        preset: None,
        types: None,
        json_out: None,
        debug_dir: None,
        diagnose: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or_else(|| usage(program))?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--preset" => {
                options.preset = Some(args.next().ok_or_else(|| usage(program))?);
            }
            "--types" => {
                let value = args.next().ok_or_else(|| usage(program))?;
                let mut types = Vec::new();
                for name in value.split(',') {
                    types.push(parse_type(name.trim())?);
                }
                options.types = Some(types);
            }
            "--json" => {
                let value = args.next().ok_or_else(|| usage(program))?;
                options.json_out = Some(PathBuf::from(value));
            }
            "--debug-dir" => {
                let value = args.next().ok_or_else(|| usage(program))?;
                options.debug_dir = Some(PathBuf::from(value));
            }
            "--diagnose" => options.diagnose = true,
            "--help" | "-h" => return Err(usage(program)),
            other if input_path.is_none() && !other.starts_with('-') => {
                input_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("Unknown argument '{other}'\n\n{}", usage(program))),
        }
    }

    options.input_path = input_path.ok_or_else(|| usage(program))?;
    Ok(options)
}

fn parse_type(name: &str) -> Result<ElementType, String> {
    ElementType::ALL
        .into_iter()
        .find(|ty| ty.as_str() == name)
        .ok_or_else(|| format!("Unknown element type '{name}'"))
}

fn load_config(options: &CliOptions) -> Result<RecognitionConfig, String> {
    if let Some(path) = &options.config_path {
        return RecognitionConfig::from_json_file(path);
    }
    match options.preset.as_deref() {
        None => Ok(RecognitionConfig::default()),
        Some("fast") => Ok(RecognitionConfig::fast()),
        Some("accurate") => Ok(RecognitionConfig::accurate()),
        Some(other) => Err(format!("Unknown preset '{other}'")),
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "detect_elements".to_string());
    let options = parse_cli(&program)?;
    let config = load_config(&options)?;

    let frame = load_rgb_image(&options.input_path)?;
    let image = frame.as_view();

    let detector = ElementDetector::new(config).map_err(|e| e.to_string())?;

    if let Some(dir) = &options.debug_dir {
        save_debug_artifacts(dir, &image, &config)?;
        println!("Debug artifacts written to {}", dir.display());
    }

    if options.diagnose {
        let report = detector.diagnose_image(&image).map_err(|e| e.to_string())?;
        println!("Image {}x{}", report.width, report.height);
        for level in &report.pyramid {
            println!(
                "  level {}: {}x{} scale={:.3} edges={} regions={}",
                level.index, level.width, level.height, level.scale, level.edge_count,
                level.region_count
            );
        }
        println!("  regions: {}", report.region_count);
        println!("  features: {}", report.feature_count);
        println!("  detections: {}", report.detection_count);
        println!("  total: {:.1} ms", report.timings.total_ms);
        if let Some(path) = &options.json_out {
            write_json_file(path, &report)?;
            println!("JSON report written to {}", path.display());
        }
        return Ok(());
    }

    let detections = match &options.types {
        Some(types) => detector
            .detect_multiple_types(&image, types)
            .map(|grouped| grouped.into_values().flatten().collect::<Vec<_>>()),
        None => detector.detect_clickable_elements(&image),
    }
    .map_err(|e| e.to_string())?;

    println!("{} detections", detections.len());
    for d in &detections {
        println!(
            "  {:<6} ({:>4}, {:>4}) {:>4}x{:<4} conf={:.2}",
            d.element_type, d.bbox.x, d.bbox.y, d.bbox.w, d.bbox.h, d.confidence
        );
    }
    let stats = detector.performance_stats();
    println!("latency: {:.1} ms", stats.last_latency_ms);

    if let Some(path) = &options.json_out {
        write_json_file(path, &detections)?;
        println!("JSON results written to {}", path.display());
    }

    Ok(())
}

fn save_debug_artifacts(
    dir: &Path,
    image: &ImageRgb8<'_>,
    config: &RecognitionConfig,
) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    let pyramid = Pyramid::build(image, config.pyramid).map_err(|e| e.to_string())?;
    for level in &pyramid.levels {
        let path = dir.join(format!("pyramid_level_{}.png", level.index));
        save_grayscale_f32(&path, &level.image)?;
    }
    Ok(())
}
