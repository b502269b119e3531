// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Error};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cfnpp::{
    config::{DEFAULT_NAME, DEFAULT_STACK_URL_BASE},
    load_file,
    option_arg::{apply_option_args, options_from_yaml, OptionArg},
    sink::{store_all, DirectorySink},
    yaml_utils::{emit_to_string, OutputFormat},
    Options, TransformConfig,
};

/// Expands templates and nested stacks in a CloudFormation document.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Document to transform (YAML or JSON).
    input: PathBuf,

    /// Base name of the result.
    #[arg(long, default_value = DEFAULT_NAME)]
    name: String,

    /// Option for `CfnPPRef` and `localOption()`. A bare NAME declares an
    /// option without a value.
    #[arg(long = "opt", value_name = "NAME[=VALUE]")]
    opts: Vec<OptionArg>,

    /// YAML map of option names to values. `--opt` overrides it.
    #[arg(long, value_name = "FILE")]
    options_file: Option<PathBuf>,

    /// Prefix of the `TemplateURL` given to nested stacks.
    #[arg(long, default_value = DEFAULT_STACK_URL_BASE)]
    stack_url_base: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the result and its nested stacks under this directory instead of
    /// printing the result.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// More logging. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut options = match &args.options_file {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            options_from_yaml(&text).with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => Options::new(),
    };
    apply_option_args(&mut options, args.opts);

    let config = TransformConfig::new()
        .with_name(args.name)
        .with_options(options.clone())
        .with_stack_url_base(args.stack_url_base);

    let result =
        load_file(&args.input, &config).with_context(|| format!("failed to transform {}", args.input.display()))?;
    info!(name = result.name(), substacks = result.substacks().len(), "transformed document");

    match args.out_dir {
        Some(out_dir) => {
            let mut sink = DirectorySink::new(out_dir, options);
            for artifact in store_all(&mut sink, &result)? {
                println!("{}\t{}", artifact.name, artifact.location.display());
            }
        }
        None => print!("{}", emit_to_string(result.data(), args.format)?),
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
