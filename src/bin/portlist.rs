// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use portlist::{
    catalog::{Catalog, WalkPolicy},
    config::{Settings, VcpkgRoot},
    path::{default_config_file, fallback_root_dir},
    port::Port,
    status::StatusParagraph,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "portlist [options] <portlist-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Path to package manager root.
    #[arg(short, long, global = true, value_name = "path")]
    pub root: Option<PathBuf>,

    /// Keep loading remaining ports when one fails to load.
    #[arg(short, long, global = true)]
    pub best_effort: bool,

    /// Show debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::load(default_config_file()?)?,
        };

        let root = match self.root {
            Some(path) => VcpkgRoot::new(path),
            None => match settings.root() {
                Some(root) => root,
                None => VcpkgRoot::new(fallback_root_dir()?),
            },
        };

        let policy = if self.best_effort {
            WalkPolicy::BestEffort
        } else {
            settings.catalog.policy
        };

        let catalog = Catalog::new();
        if !catalog.is_root(root.as_path()) {
            warn!("{root} does not look like a package manager root");
        }

        let context = Context {
            settings,
            root,
            policy,
            catalog,
        };

        match self.command {
            Command::Ports(opts) => run_ports(&context, opts),
            Command::Show(opts) => run_show(&context, opts),
            Command::Installed(opts) => run_installed(&context, opts),
            Command::Config => run_config(&context),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List ports in ports folder.
    #[command(override_usage = "portlist ports [options] [keyword]")]
    Ports(PortsOptions),

    /// Show source and feature paragraphs of one port.
    #[command(override_usage = "portlist show [options] <port_name>")]
    Show(ShowOptions),

    /// List installed packages.
    #[command(override_usage = "portlist installed [options] [keyword]")]
    Installed(InstalledOptions),

    /// Show effective settings.
    #[command(override_usage = "portlist config [options]")]
    Config,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PortsOptions {
    /// Only list ports matching keyword.
    #[arg(value_name = "keyword")]
    pub keyword: Option<String>,

    /// Match keyword against port names only.
    #[arg(short, long)]
    pub name_only: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowOptions {
    /// Name of port to show.
    #[arg(required = true, value_name = "port_name")]
    pub port_name: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstalledOptions {
    /// Only list packages matching keyword.
    #[arg(value_name = "keyword")]
    pub keyword: Option<String>,

    /// Match keyword against package names only.
    #[arg(short, long)]
    pub name_only: bool,

    /// Include packages that are not fully installed.
    #[arg(short, long)]
    pub all: bool,
}

struct Context {
    settings: Settings,
    root: VcpkgRoot,
    policy: WalkPolicy,
    catalog: Catalog,
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer().compact().with_target(false).without_time();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_ports(context: &Context, opts: PortsOptions) -> Result<()> {
    let mut report = context
        .catalog
        .walk(context.root.ports_dir(), context.policy)?;
    if context.settings.catalog.sorted {
        report.sort();
    }

    for failure in &report.failures {
        warn!("{:?}: {}", failure.directory.display(), failure.error);
    }

    let keyword = opts.keyword.unwrap_or_default();
    for port in report
        .ports
        .iter()
        .filter(|port| port.matches(&keyword, opts.name_only))
    {
        print_port_line(port);
    }

    Ok(())
}

fn run_show(context: &Context, opts: ShowOptions) -> Result<()> {
    let control = context
        .root
        .ports_dir()
        .join(&opts.port_name)
        .join(portlist::catalog::CONTROL_FILE_NAME);
    let port = context.catalog.read_port(control)?;
    let source = port.source();

    println!("Source: {}", source.name);
    println!("Version: {}", source.version);
    if let Some(maintainer) = &source.maintainer {
        println!("Maintainer: {maintainer}");
    }
    if !source.depends.is_empty() {
        println!("Build-Depends: {}", source.depends.join(", "));
    }
    if let Some(description) = &source.description {
        println!("Description: {description}");
    }

    for feature in port.features() {
        println!();
        println!("Feature: {}", feature.name);
        if !feature.depends.is_empty() {
            println!("Build-Depends: {}", feature.depends.join(", "));
        }
        if let Some(description) = &feature.description {
            println!("Description: {description}");
        }
    }

    info!(
        "install with: {}",
        port.install_spec(port.features().iter())
    );

    Ok(())
}

fn run_installed(context: &Context, opts: InstalledOptions) -> Result<()> {
    let status_file = context.root.status_file();
    let records = context.catalog.load_status(&status_file)?;
    if records.is_empty() {
        info!("no package records in {:?}", status_file.display());
        return Ok(());
    }

    let keyword = opts.keyword.unwrap_or_default();
    for record in records
        .iter()
        .filter(|record| opts.all || record.is_installed())
        .filter(|record| record.matches(&keyword, opts.name_only))
    {
        print_record_line(record, opts.all);
    }

    Ok(())
}

fn run_config(context: &Context) -> Result<()> {
    info!("package manager root: {}", context.root);
    print!("{}", context.settings);

    Ok(())
}

fn print_port_line(port: &Port) {
    let source = port.source();
    println!(
        "{:<32} {:<16} {}",
        source.name,
        source.version,
        first_line(source.description.as_deref())
    );

    for feature in port.features() {
        println!(
            "  {:<30} {}",
            format!("[{}]", feature.name),
            first_line(feature.description.as_deref())
        );
    }
}

fn print_record_line(record: &StatusParagraph, with_state: bool) {
    if with_state {
        println!(
            "{:<40} {:<16} {} {}",
            record.remove_spec(),
            record.version,
            record.want,
            record.state
        );
    } else {
        println!(
            "{:<40} {:<16} {}",
            record.remove_spec(),
            record.version,
            first_line(record.description.as_deref())
        );
    }
}

fn first_line(text: Option<&str>) -> &str {
    text.and_then(|text| text.lines().next()).unwrap_or_default()
}
