//! Command-line interface for ddms-rs

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use ddms::config::{self, Config};
#[cfg(feature = "cli")]
use ddms::versions::SchemaKind;
#[cfg(feature = "cli")]
use ddms::{Component, Resource, Version};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "ddms")]
#[command(author, version, about = "DDMS metadata validation and rendering tool", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log parsing and validation steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a DDMS resource and list its warnings
    Validate {
        /// Path to the resource XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output messages as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Render a valid DDMS resource as XML, HTML meta tags or text
    Render {
        /// Path to the resource XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: RenderFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the supported DDMS versions and their namespaces
    Versions,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderFormat {
    Xml,
    Html,
    Text,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_ref()).and_then(|_| match cli.command {
        Commands::Validate { file, json } => cmd_validate(file, json),
        Commands::Render { file, format, output } => cmd_render(file, format, output),
        Commands::Versions => cmd_versions(),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "ddms=debug" } else { "ddms=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        config::install(Config::from_file(path)?)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn read_resource(file: &PathBuf) -> Result<Resource, Box<dyn std::error::Error>> {
    let xml = fs::read_to_string(file)?;
    Ok(Resource::from_xml(&xml)?)
}

#[cfg(feature = "cli")]
fn cmd_validate(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let resource = read_resource(&file)?;
    let warnings = resource.warnings();

    if json {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "version": resource.version().to_string(),
            "valid": true,
            "messages": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} is a valid DDMS {} resource.", file.display(), resource.version());
    for message in warnings {
        println!("  {} at {}: {}", message.kind, message.locator, message.text);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_render(file: PathBuf, format: RenderFormat, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let resource = read_resource(&file)?;
    let rendered = match format {
        RenderFormat::Xml => resource.to_xml(),
        RenderFormat::Html => resource.to_html(),
        RenderFormat::Text => resource.to_text(),
    };

    if let Some(output_path) = output {
        fs::write(output_path, &rendered)?;
    } else {
        print!("{}", rendered);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_versions() -> Result<(), Box<dyn std::error::Error>> {
    let current = ddms::versions::current_version();
    for version in Version::ALL {
        let marker = if version == current { "*" } else { " " };
        let ntk = version.namespace_for(SchemaKind::Ntk).unwrap_or("-");
        println!(
            "{} {:<6} ddms={} ism={} ntk={}",
            marker,
            version.to_string(),
            version.ddms_namespace(),
            version.ism_namespace(),
            ntk
        );
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
