//! Slip Grid CLI
//!
//! Usage:
//!   slip-grid [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -v, --validate           Validate coordinate maps instead of printing them
//!   --seed <SEED>            Seed for validation sampling
//!   --tests <N>              Override the number of validation trials per panel
//!   --sample-size <N>        Override the numbers sampled per trial
//!   --geometric              Ignore saved anchors
//!   -f, --fill-orders        Describe the supported fill orders
//!   -d, --debug              Enable debug logging
//!   -h, --help               Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use slip_grid::{
    map_template, positions_to_json, validate_template_with, FillOrder, MapConfig, Template,
};

#[derive(Parser)]
#[command(name = "slip-grid")]
#[command(about = "Number-cell coordinates for scanned lottery slips")]
struct Cli {
    /// Template file (TOML)
    template: Option<PathBuf>,

    /// Validate coordinate maps instead of printing them
    #[arg(short, long)]
    validate: bool,

    /// Seed for validation sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the number of validation trials per panel
    #[arg(long)]
    tests: Option<usize>,

    /// Override the numbers sampled per trial
    #[arg(long)]
    sample_size: Option<usize>,

    /// Ignore saved anchors and use corner geometry only
    #[arg(long)]
    geometric: bool,

    /// Describe the supported fill orders
    #[arg(short, long)]
    fill_orders: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.fill_orders {
        print_fill_orders();
        return;
    }

    let Some(path) = &cli.template else {
        print_intro();
        return;
    };

    let template = match Template::from_file(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error loading template '{}': {}", path.display(), e);
            process::exit(1);
        }
    };

    let config = if cli.geometric {
        MapConfig::geometric()
    } else {
        MapConfig::default()
    };

    if cli.validate {
        let mut validator_config = template.validation.clone();
        if let Some(tests) = cli.tests {
            validator_config = validator_config.with_max_tests(tests);
        }
        if let Some(sample_size) = cli.sample_size {
            validator_config = validator_config.with_sample_size(sample_size);
        }
        if let Err(e) = validator_config.check() {
            eprintln!("Error: {}", e);
            process::exit(1);
        }

        let result = validate_template_with(&template, &config, &validator_config, cli.seed);
        print!("{}", result);
        if !result.overall_pass() {
            process::exit(1);
        }
        return;
    }

    match positions_to_json(&map_template(&template, &config)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Install a stderr subscriber; `RUST_LOG` wins unless `--debug` is given
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("slip_grid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn print_intro() {
    println!(
        r#"Slip Grid - number-cell coordinates for scanned lottery slips

USAGE:
    slip-grid [OPTIONS] <TEMPLATE>

OPTIONS:
    -v, --validate       Validate coordinate maps and print a report
    --seed <SEED>        Seed for validation sampling (default 0)
    --tests <N>          Validation trials per panel
    --sample-size <N>    Numbers sampled per trial
    --geometric          Ignore saved anchors
    -f, --fill-orders    Describe the supported fill orders
    -d, --debug          Debug logging on stderr
    -h, --help           Print help

TEMPLATE FORMAT:
    [validation]
    number_range = [1, 54]

    [[panels]]
    id = "A"
    corners = [[120, 340], [610, 980]]
    columns = 5
    rows = 11
    start = 1
    end = 54
    fill_order = "column_bottom_to_top"

    [panels.anchors]
    "1" = [169, 951]

Without --validate, prints every panel's number -> [x, y] map as JSON."#
    );
}

fn print_fill_orders() {
    println!("FILL ORDERS");
    println!("===========");
    for order in FillOrder::ALL {
        println!();
        println!("{} ({})", order.name(), order.label());
        println!("    {}", order.description());
    }
}
