use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use depscope::{AnalysisConfig, ContainerConfig, ExclusionFilter, MethodSelector, OutputConfig};

#[derive(Parser)]
#[command(name = "depscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Source root to index; repeat for multi-module trees
    #[arg(short, long = "root", global = true)]
    pub roots: Vec<PathBuf>,

    /// Jar or zip whose classes count as known types
    #[arg(long = "archive", global = true)]
    pub archives: Vec<PathBuf>,

    /// Where the class location map is persisted between runs
    #[arg(long, global = true)]
    pub cache_file: Option<PathBuf>,

    /// Fail on the first expression that cannot be resolved
    #[arg(long, global = true)]
    pub strict: bool,

    /// Excluded qualified-name prefix; replaces the defaults when given
    #[arg(long = "exclude", global = true)]
    pub excludes: Vec<String>,

    #[arg(long, global = true, default_value = "output/reports")]
    pub output_dir: PathBuf,

    #[arg(long, global = true, default_value = "analysis")]
    pub prefix: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect the external symbols used by one or more methods
    Analyze {
        #[command(flatten)]
        target: TargetArgs,

        /// Method name; repeat to merge several methods into one report
        #[arg(short, long = "method", required = true)]
        methods: Vec<String>,

        /// Print the report without writing a JSON file
        #[arg(long)]
        no_export: bool,
    },

    /// List the method calls in a line range with their declaring classes
    Calls {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        start: u32,

        #[arg(short, long)]
        end: u32,
    },

    /// Walk call receivers transitively from a method or line range
    Reach {
        #[arg(long, conflicts_with = "file", requires = "method")]
        class: Option<String>,

        #[arg(short, long, requires = "class")]
        method: Option<String>,

        #[arg(short, long, requires_all = ["start", "end"])]
        file: Option<PathBuf>,

        #[arg(short, long)]
        start: Option<u32>,

        #[arg(short, long)]
        end: Option<u32>,

        /// Stop after this many hops (1 = receivers of the target only)
        #[arg(short, long)]
        depth: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Manage the class location cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Simple or qualified class name
    #[arg(short, long)]
    pub class: Option<String>,

    /// Source file declaring the method
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum CacheAction {
    /// Scan every source root and store the result
    Rebuild,
    /// Print the stored map
    Show,
    /// Delete the stored map
    Clear,
}

impl Cli {
    pub fn container_config(&self) -> ContainerConfig {
        let exclusions = if self.excludes.is_empty() {
            ExclusionFilter::default()
        } else {
            ExclusionFilter::new(self.excludes.iter().cloned())
        };

        let mut analysis = AnalysisConfig::new(self.roots.clone())
            .with_archives(self.archives.clone())
            .with_ignore_unresolved(!self.strict)
            .with_exclusions(exclusions);
        if let Some(cache_file) = &self.cache_file {
            analysis = analysis.with_cache_file(cache_file);
        }

        ContainerConfig {
            analysis,
            output: OutputConfig::new(&self.output_dir, &self.prefix),
        }
    }
}

impl TargetArgs {
    pub fn selectors(&self, methods: &[String]) -> Vec<MethodSelector> {
        methods
            .iter()
            .filter_map(|method| match (&self.class, &self.file) {
                (Some(class), _) => Some(MethodSelector::by_name(class, method)),
                (None, Some(file)) => Some(MethodSelector::in_file(file, method)),
                (None, None) => None,
            })
            .collect()
    }
}
