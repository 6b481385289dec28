//! CLI entry point for postdex

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postdex::commands::query::QueryArgs;

#[derive(Parser)]
#[command(name = "postdex")]
#[command(version)]
#[command(about = "Validate, index and query a collection of blog posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new collection with a sample post
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Validate every record and report problems
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List collection information
    List {
        /// Type of content to list (post, tag, author, archive)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Query posts
    #[command(alias = "q")]
    Query {
        /// Exact tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Exact author name
        #[arg(short, long)]
        author: Option<String>,

        /// Earliest date (inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Latest date (inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Case-insensitive text in title or excerpt
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (date-desc, date-asc, title-asc)
        #[arg(long)]
        sort: Option<String>,

        /// Page size (defaults to per_page from the config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of results to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Print the result page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one post by id or slug
    Show {
        /// Post id or slug
        key: String,
    },

    /// Load the collection and keep it in sync with the source directory
    #[command(alias = "w")]
    Watch,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postdex=debug,info"
    } else {
        "postdex=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing collection in {:?}", target_dir);
            postdex::commands::init::init_collection(&target_dir)?;
            println!("Initialized collection in {:?}", target_dir);
        }

        Commands::Check { json } => {
            let app = postdex::Postdex::new(&base_dir)?;
            postdex::commands::check::run(&app, json)?;
        }

        Commands::List { r#type } => {
            let app = postdex::Postdex::new(&base_dir)?;
            postdex::commands::list::run(&app, &r#type)?;
        }

        Commands::Query {
            tag,
            author,
            from,
            to,
            search,
            sort,
            limit,
            offset,
            json,
        } => {
            let app = postdex::Postdex::new(&base_dir)?;
            let args = QueryArgs {
                tag,
                author,
                from,
                to,
                search,
                sort,
                limit,
                offset,
            };
            postdex::commands::query::run(&app, &args, json)?;
        }

        Commands::Show { key } => {
            let app = postdex::Postdex::new(&base_dir)?;
            postdex::commands::show::run(&app, &key)?;
        }

        Commands::Watch => {
            let app = postdex::Postdex::new(&base_dir)?;
            postdex::commands::watch::run(&app)?;
        }

        Commands::Version => {
            println!("postdex version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
