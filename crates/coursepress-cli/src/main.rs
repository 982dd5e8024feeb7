mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{avatar::AvatarSubcommand, course::CourseSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "coursepress",
    about = "Author SCORM 1.2 courses: scaffold lessons and moments, edit them, export ZIP packages",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: nearest ancestor with coursepress.yaml)
    #[arg(long, global = true, env = "COURSEPRESS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a CoursePress workspace in the current directory
    Init {
        /// Site name stored in coursepress.yaml (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        subcommand: CourseSubcommand,
    },

    /// Package a course as a SCORM ZIP
    Export {
        id: String,
        /// Output file (default: ./<id>.zip)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage avatar images
    Avatar {
        #[command(subcommand)]
        subcommand: AvatarSubcommand,
    },

    /// Run the HTTP API and course preview server
    Serve {
        /// Port to listen on (default: server.port from config, 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Open the browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Course { subcommand } => cmd::course::run(&root, subcommand, cli.json),
        Commands::Export { id, out } => cmd::export::run(&root, &id, out, cli.json),
        Commands::Avatar { subcommand } => cmd::avatar::run(&root, subcommand, cli.json),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
