use std::collections::HashSet;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use shapecount::{shapefile::ShapeFile, ViewDir};

mod generate;
use generate::generate;

pub fn make_bar(len: u64) -> indicatif::ProgressBar {
    let bar = ProgressBar::new(len);

    let pos_width = format!("{len}").len();

    let template =
        format!("[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>{pos_width}}}/{{len}} {{msg}}");

    bar.set_style(
        ProgressStyle::with_template(&template)
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

fn unknown_bar() -> ProgressBar {
    let style = ProgressStyle::with_template("[{elapsed_precise}] {spinner} {pos} {msg}").unwrap();
    ProgressBar::new_spinner().with_style(style)
}

#[derive(Clone, Parser)]
pub enum Opts {
    /// Generate guess-the-count puzzle shapes
    Generate(GenerateOpts),
    /// Perform operations on .shapes files
    #[clap(subcommand)]
    Shapes(ShapesCommands),
}

#[derive(Clone, Args)]
pub struct GenerateOpts {
    /// How many shapes to generate.
    #[clap(default_value_t = 1)]
    pub count: usize,

    /// Board size along the x axis.
    #[clap(long, default_value_t = 5)]
    pub size_x: usize,

    /// Board size along the y axis.
    #[clap(long, default_value_t = 4)]
    pub size_y: usize,

    /// Board size along the z axis.
    #[clap(long, default_value_t = 5)]
    pub size_z: usize,

    /// Smallest acceptable block count.
    #[clap(long, default_value_t = 6)]
    pub min_blocks: usize,

    /// Largest acceptable block count.
    #[clap(long, default_value_t = 14)]
    pub max_blocks: usize,

    /// Viewing directions every cube must be visible along.
    #[clap(long, value_enum, value_delimiter = ',', default_value = "xp,xn,zp")]
    pub views: Vec<View>,

    /// The view the puzzle opens on.
    #[clap(long, value_enum, default_value = "xp")]
    pub initial_view: View,

    /// Skip the occlusion fill behind the initial view.
    #[clap(long)]
    pub no_fill: bool,

    /// Generation attempts per shape before falling back.
    #[clap(long, default_value_t = 800)]
    pub max_tries: usize,

    /// Seed for reproducible batches. Random when omitted.
    #[clap(long, short)]
    pub seed: Option<u64>,

    /// Write the batch to a .shapes file instead of printing it.
    #[clap(long, short)]
    pub output: Option<String>,

    /// The output compression to use
    #[clap(long, short = 'z', value_enum, default_value = "none")]
    pub compression: Compression,

    /// Disable parallelism.
    #[clap(long, short = 'p')]
    pub no_parallelism: bool,

    /// Worker threads for batch generation. 0 uses every core.
    #[clap(long, short = 't', default_value_t = 0)]
    pub threads: usize,

    /// Don't print the generated shapes.
    #[clap(long, short = 'q')]
    pub quiet: bool,
}

/// CLI spelling of [`ViewDir`].
#[derive(Clone, Copy, ValueEnum)]
pub enum View {
    Xp,
    Xn,
    Zp,
}

impl From<View> for ViewDir {
    fn from(value: View) -> Self {
        match value {
            View::Xp => ViewDir::XP,
            View::Xn => ViewDir::XN,
            View::Zp => ViewDir::ZP,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Compression {
    None,
    Gzip,
}

impl From<Compression> for shapecount::shapefile::Compression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => shapecount::shapefile::Compression::None,
            Compression::Gzip => shapecount::shapefile::Compression::Gzip,
        }
    }
}

#[derive(Clone, Subcommand)]
pub enum ShapesCommands {
    Validate(ValidateArgs),
    Info {
        #[clap(required = true)]
        path: Vec<String>,
    },
}

#[derive(Clone, Args)]
pub struct ValidateArgs {
    /// The path of the .shapes file to check
    pub path: String,

    /// Viewing directions to check visibility against
    #[clap(long, value_enum, value_delimiter = ',', default_value = "xp,xn,zp")]
    pub views: Vec<View>,

    /// Don't validate that all shapes in the file are unique
    #[clap(short = 'u', long)]
    pub no_uniqueness: bool,

    /// Don't validate that shapes are connected
    #[clap(short = 'c', long)]
    pub no_connectivity: bool,

    /// Validate that every shape has at least this many blocks
    #[clap(long)]
    pub min: Option<usize>,

    /// Validate that every shape has at most this many blocks
    #[clap(long)]
    pub max: Option<usize>,
}

pub fn validate(opts: &ValidateArgs) -> std::io::Result<()> {
    let path = &opts.path;

    let file = ShapeFile::new_file(path)?;
    let all_valid = file.all_valid();
    let len = file.len();

    let bar = if let Some(len) = len {
        make_bar(len as u64)
    } else {
        unknown_bar()
    };

    bar.set_message("shapes validated");
    bar.println(format!("Validating {}", path));

    let views: Vec<ViewDir> = opts.views.iter().map(|&v| v.into()).collect();

    let mut uniqueness = if opts.no_uniqueness {
        bar.println("Not verifying uniqueness");
        None
    } else {
        bar.println("Verifying uniqueness.");
        Some(HashSet::new())
    };

    if all_valid {
        bar.println("Verifying connectivity and visibility. File indicates that all shapes passed generation checks.");
    } else {
        bar.println("Not verifying connectivity and visibility. File admits fallback shapes.");
    }

    if let Some(min) = opts.min {
        bar.println(format!("Verifying that all shapes have at least {min} blocks"));
    }
    if let Some(max) = opts.max {
        bar.println(format!("Verifying that all shapes have at most {max} blocks"));
    }

    let exit = |msg: &str| {
        bar.abandon();
        println!("{msg}");
        std::process::exit(1);
    };

    let mut total_read = 0;

    for shape in file {
        let shape = match shape {
            Ok(s) => s,
            Err(e) => {
                println!("Error: Reading the file failed. Error: {e}.");
                std::process::exit(1);
            }
        };

        total_read += 1;
        bar.inc(1);

        if let Some(min) = opts.min {
            if shape.len() < min {
                exit(&format!(
                    "Error: Found a shape with fewer than {min} blocks. Value: {}",
                    shape.len()
                ));
            }
        }

        if let Some(max) = opts.max {
            if shape.len() > max {
                exit(&format!(
                    "Error: Found a shape with more than {max} blocks. Value: {}",
                    shape.len()
                ));
            }
        }

        if all_valid {
            if !opts.no_connectivity && !shape.is_connected() {
                exit("Error: Found a disconnected shape in a file that claims all shapes are valid.");
            }

            if !shape.satisfies_visibility(&views) {
                exit("Error: Found a shape with a fully hidden cube in a file that claims all shapes are valid.");
            }
        }

        if let Some(uniqueness) = &mut uniqueness {
            if !uniqueness.insert(shape.points_sorted()) {
                exit("Found non-unique shapes.");
            }
        }
    }

    bar.finish();

    println!("Success: {path}, containing {total_read} shapes, is valid");

    Ok(())
}

fn info(path: &str) {
    let file = match ShapeFile::new_file(path) {
        Ok(f) => f,
        Err(e) => {
            println!("Failed to open file. {e}");
            std::process::exit(1);
        }
    };

    let len = file
        .len()
        .map(|v| format!("{v}"))
        .unwrap_or("Unknown (is a stream)".to_string());
    let compression = file.compression();
    let all_valid = if file.all_valid() { "yes" } else { "no" };

    println!();
    println!("Info for {path}");
    println!("Amount of shapes: {len}");
    println!("Compression method: {compression:?}");
    println!("All shapes passed generation checks: {all_valid}");
}

fn main() {
    let opts = Opts::parse();

    match opts {
        Opts::Generate(g) => generate(&g),
        Opts::Shapes(ShapesCommands::Validate(a)) => validate(&a).unwrap(),
        Opts::Shapes(ShapesCommands::Info { path }) => {
            path.iter().map(String::as_str).for_each(info)
        }
    }
}
