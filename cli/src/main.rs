use anyhow::Result;
use clap::{Parser, Subcommand};
use skillbox_core::{
    CommandExecutor, Config, DirectoryResolver, ExecuteCommandTool, ListSkillsTool,
    LoadRecordStore, LoadSkillTool, SkillIndex, ToolRegistry, config, load_and_record,
};
use std::sync::Arc;

mod serve;
mod skills;

#[derive(Parser)]
#[command(name = "skillbox")]
#[command(about = "skillbox - discover, load, and run agent skills", long_about = None)]
struct Cli {
    /// Search only this skills directory instead of the well-known ones
    #[arg(long, global = true)]
    dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed skills
    List,
    /// Print a skill's SKILL.md and record the load
    Read { name: String },
    /// Run a shell command with the configured timeout
    Exec {
        /// The whole command line, quoted as one argument
        command: String,
    },
    /// Show which skills have been loaded and when
    Loaded,
    /// Print the tool specs as JSON
    Tools,
    /// Serve tool requests as line-delimited JSON on stdio
    Serve,
}

struct Services {
    index: Arc<SkillIndex>,
    records: Arc<LoadRecordStore>,
    executor: CommandExecutor,
}

impl Services {
    fn new(config: &Config) -> Result<Self> {
        let mut resolver = DirectoryResolver::from_env(config.dirs.clone())?;
        if let Some(dir) = &config.skills_dir {
            resolver = resolver.with_explicit(dir.clone());
        }

        let index =
            SkillIndex::new(resolver).with_require_description(config.require_description);

        Ok(Self {
            index: Arc::new(index),
            records: Arc::new(LoadRecordStore::open(config::get_load_record_path())),
            executor: CommandExecutor::new(&config.exec),
        })
    }

    fn registry(&self) -> ToolRegistry {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(ListSkillsTool::new(self.index.clone())));
        registry.register(Arc::new(LoadSkillTool::new(
            self.index.clone(),
            self.records.clone(),
        )));
        registry.register(Arc::new(ExecuteCommandTool::new(self.executor.clone())));
        registry
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load_or_init()?;
    if cli.dir.is_some() {
        config.skills_dir = cli.dir;
    }
    let services = Services::new(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::List => {
            let catalog = services.index.catalog()?;
            skills::print_catalog(&catalog);
        }
        Commands::Read { name } => {
            let loaded = load_and_record(&services.index, &services.records, &name)?;
            skills::print_loaded(&loaded);
        }
        Commands::Exec { command } => {
            let outcome = services.executor.execute(&command).await;
            skills::print_outcome(&outcome);
            if outcome.timed_out() {
                anyhow::bail!(
                    "Command timed out after {}s",
                    services.executor.timeout().as_secs()
                );
            }
            if !outcome.success() {
                anyhow::bail!("Command failed: {:?}", outcome.status);
            }
        }
        Commands::Loaded => {
            skills::print_records(&services.records.entries());
        }
        Commands::Tools => {
            let specs = services.registry().get_specs();
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        Commands::Serve => {
            serve::run(Arc::new(services.registry())).await?;
        }
    }

    Ok(())
}
