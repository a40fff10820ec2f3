//! terrain-noise CLI - procedural heightmap generator.
//!
//! Generate Perlin, simplex or diamond-square heightmaps and export them,
//! or sample single noise values.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use terrain_noise::export::{
    expected_file_size, export_heightmap_png, export_heightmap_raw, PngExportOptions, RawFormat,
};
use terrain_noise::noise::{
    perlin_fbm, perlin_noise, simplex_fbm, simplex_noise, FractalNoiseConfig, NoiseKind,
};
use terrain_noise::terrain::{
    diamond_square, is_valid_size, sample_heightmap, DiamondSquareConfig, Heightmap, SamplingConfig,
    DEFAULT_NOISE_SCALE,
};

/// Procedural noise and heightmap generator.
#[derive(Parser)]
#[command(name = "terrain-noise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a heightmap and export it.
    Generate {
        /// Generation algorithm.
        #[arg(short, long, default_value = "perlin")]
        algorithm: Algorithm,

        /// Grid side length in cells (2^n + 1 for diamond-square).
        #[arg(long, default_value = "257")]
        size: u32,

        /// Random seed for reproducible generation.
        #[arg(short, long, default_value = "0")]
        seed: u32,

        /// Number of fBm octaves (noise algorithms).
        #[arg(long, default_value = "4")]
        octaves: u32,

        /// Amplitude decay per octave (persistence).
        #[arg(long, default_value = "0.5")]
        persistence: f64,

        /// Frequency multiplier per octave (lacunarity).
        #[arg(long, default_value = "2.0")]
        lacunarity: f64,

        /// Noise-space distance between cells.
        #[arg(long, default_value_t = DEFAULT_NOISE_SCALE)]
        scale: f64,

        /// Per-round displacement decay exponent (diamond-square).
        #[arg(long, default_value = "0.5")]
        roughness: f32,

        /// Wrap edges toroidally (diamond-square).
        #[arg(long)]
        wrap: bool,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "heightmap")]
        name: String,

        /// Export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,
    },

    /// Print the noise value at one point.
    Sample {
        /// Noise algorithm.
        #[arg(short, long, default_value = "perlin")]
        algorithm: NoiseAlgorithm,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Third coordinate (Perlin only).
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        z: f64,

        /// Random seed.
        #[arg(short, long, default_value = "0")]
        seed: u32,

        /// Layer this many octaves of fBm instead of a single sample.
        #[arg(long)]
        octaves: Option<u32>,

        /// Amplitude decay per octave.
        #[arg(long, default_value = "0.5")]
        persistence: f64,

        /// Frequency multiplier per octave.
        #[arg(long, default_value = "2.0")]
        lacunarity: f64,
    },

    /// Display information about a grid size.
    Info {
        /// Grid side length in cells.
        #[arg(long, default_value = "257")]
        size: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Perlin fBm.
    Perlin,
    /// Simplex fBm.
    Simplex,
    /// Diamond-square midpoint displacement.
    DiamondSquare,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoiseAlgorithm {
    Perlin,
    Simplex,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            algorithm,
            size,
            seed,
            octaves,
            persistence,
            lacunarity,
            scale,
            roughness,
            wrap,
            output,
            name,
            format,
        } => {
            let fractal = FractalNoiseConfig {
                octaves,
                persistence,
                lacunarity,
                seed,
            };
            let request = GenerateRequest {
                algorithm,
                size,
                fractal,
                scale,
                roughness,
                wrap,
            };
            run_generate(&request, &output, &name, format);
        }
        Commands::Sample {
            algorithm,
            x,
            y,
            z,
            seed,
            octaves,
            persistence,
            lacunarity,
        } => {
            run_sample(algorithm, x, y, z, seed, octaves, persistence, lacunarity);
        }
        Commands::Info { size } => {
            run_info(size);
        }
    }
}

/// Generation parameters collected from the command line.
struct GenerateRequest {
    algorithm: Algorithm,
    size: u32,
    fractal: FractalNoiseConfig,
    scale: f64,
    roughness: f32,
    wrap: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{}", message);
    std::process::exit(1);
}

fn build_heightmap(request: &GenerateRequest) -> Heightmap {
    match request.algorithm {
        Algorithm::Perlin | Algorithm::Simplex => {
            let kind = if matches!(request.algorithm, Algorithm::Perlin) {
                NoiseKind::Perlin
            } else {
                NoiseKind::Simplex
            };
            let config = SamplingConfig {
                kind,
                fractal: request.fractal,
                scale: request.scale,
                ..Default::default()
            };
            sample_heightmap(request.size, &config).unwrap_or_else(|e| fail(e))
        }
        Algorithm::DiamondSquare => {
            let config = DiamondSquareConfig {
                size: request.size,
                roughness: request.roughness,
                seed: request.fractal.seed,
                wrap: request.wrap,
            };
            diamond_square(&config).unwrap_or_else(|e| fail(e))
        }
    }
}

fn run_generate(request: &GenerateRequest, output: &Path, name: &str, format: ExportFormat) {
    tracing::info!(
        size = request.size,
        seed = request.fractal.seed,
        output = %output.display(),
        "generating heightmap"
    );

    let start = Instant::now();
    let heightmap = build_heightmap(request);
    let (min_h, max_h) = heightmap.height_range();
    tracing::info!(elapsed = ?start.elapsed(), min = min_h, max = max_h, "generation completed");

    std::fs::create_dir_all(output)
        .unwrap_or_else(|e| fail(format!("Error creating output directory: {}", e)));

    let export_start = Instant::now();
    let path = match format {
        ExportFormat::Png => {
            let path = output.join(format!("{}.png", name));
            export_heightmap_png(&heightmap, &path, &PngExportOptions::default())
                .unwrap_or_else(|e| fail(format!("Error exporting PNG: {}", e)));
            path
        }
        ExportFormat::Raw | ExportFormat::RawFloat => {
            let raw_format = if matches!(format, ExportFormat::Raw) {
                RawFormat::R16LittleEndian
            } else {
                RawFormat::R32Float
            };
            let path = output.join(format!("{}.raw", name));
            export_heightmap_raw(&heightmap, &path, raw_format, 0.0, 1.0)
                .unwrap_or_else(|e| fail(format!("Error exporting RAW: {}", e)));
            path
        }
    };

    tracing::info!(path = %path.display(), elapsed = ?export_start.elapsed(), "export completed");
    println!("{}", path.display());
}

#[allow(clippy::too_many_arguments)]
fn run_sample(
    algorithm: NoiseAlgorithm,
    x: f64,
    y: f64,
    z: f64,
    seed: u32,
    octaves: Option<u32>,
    persistence: f64,
    lacunarity: f64,
) {
    let value = match octaves {
        None => match algorithm {
            NoiseAlgorithm::Perlin => perlin_noise(x, y, z, seed),
            NoiseAlgorithm::Simplex => simplex_noise(x, y, seed),
        },
        Some(octaves) => {
            let config = FractalNoiseConfig {
                octaves,
                persistence,
                lacunarity,
                seed,
            };
            let result = match algorithm {
                NoiseAlgorithm::Perlin => perlin_fbm(x, y, &config),
                NoiseAlgorithm::Simplex => simplex_fbm(x, y, &config),
            };
            result.unwrap_or_else(|e| fail(e))
        }
    };

    println!("{}", value);
}

fn run_info(size: u32) {
    let cells = u64::from(size) * u64::from(size);
    let bytes_heights = cells * 4; // f32

    println!("terrain-noise - Grid Info");
    println!("=========================");
    println!();
    println!("Size: {}x{} ({} cells)", size, size, cells);
    println!(
        "Heights in memory: {} bytes ({:.2} MB)",
        bytes_heights,
        bytes_heights as f64 / 1024.0 / 1024.0
    );
    println!();

    if is_valid_size(size) {
        println!("Diamond-square: OK (2^{} + 1)", (size - 1).trailing_zeros());
    } else {
        let (below, above) = nearest_valid_sizes(size);
        let below = below.map_or_else(|| "none below".to_string(), |s| s.to_string());
        let above = above.map_or_else(|| "none above".to_string(), |s| s.to_string());
        println!("Diamond-square: invalid, nearest sizes {} and {}", below, above);
    }
    println!();

    println!("Export file sizes:");
    println!("  RAW (R16): {:>12} bytes", expected_file_size(size, RawFormat::R16LittleEndian));
    println!("  RAW (R32): {:>12} bytes", expected_file_size(size, RawFormat::R32Float));
}

/// Closest `2^n + 1` sizes below and above `size`, where they fit in a `u32`.
fn nearest_valid_sizes(size: u32) -> (Option<u32>, Option<u32>) {
    let above = size
        .saturating_sub(1)
        .max(2)
        .checked_next_power_of_two()
        .and_then(|p| p.checked_add(1));
    let below = if size > 3 {
        Some((1_u32 << (31 - (size - 2).leading_zeros())) + 1)
    } else {
        None
    };
    (below, above)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_valid_sizes() {
        assert_eq!(nearest_valid_sizes(10), (Some(9), Some(17)));
        assert_eq!(nearest_valid_sizes(4), (Some(3), Some(5)));
        assert_eq!(nearest_valid_sizes(0), (None, Some(3)));
        assert_eq!(nearest_valid_sizes(2), (None, Some(3)));
    }

    #[test]
    fn test_nearest_valid_sizes_near_u32_limit() {
        assert_eq!(nearest_valid_sizes(u32::MAX), (Some((1 << 31) + 1), None));
        assert_eq!(nearest_valid_sizes((1 << 31) + 2), (Some((1 << 31) + 1), None));
    }
}
