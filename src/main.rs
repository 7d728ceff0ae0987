mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{CacheAction, Cli, Commands};
use depscope::{
    ClassLocationStore, Container, DependencyReport, DomainError, JsonClassLocationStore,
    MethodSelector,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Cache {
        action: CacheAction::Show,
    } = &cli.command
    {
        return show_cache(cli.cache_file.as_deref());
    }

    let container = Container::new(cli.container_config())?;

    match cli.command {
        Commands::Analyze {
            target,
            methods,
            no_export,
        } => {
            let selectors = target.selectors(&methods);
            let outcome = container.analyze_use_case().analyze(&selectors, !no_export)?;

            for target in &outcome.targets {
                println!("Target: {} ({})", target.qualified_method(), target.location());
            }
            print_report(&outcome.report);

            if let Some(path) = &outcome.export_path {
                println!("\nReport written to {}", path.display());
            }
            if let Some(e) = &outcome.export_error {
                eprintln!("\nReport was not written: {}", e);
            }
        }

        Commands::Calls { file, start, end } => {
            let inspection = container
                .inspect_calls_use_case()
                .inspect(&file, start, end)?;

            if inspection.method_calls.is_empty() {
                println!("No method calls in {}:{}-{}.", file.display(), start, end);
            }
            for call in &inspection.method_calls {
                let owner = call.class_qualified_name.as_deref().unwrap_or("?");
                print!("{}:{}  {}  {}", call.line, call.column, call.method_name, owner);
                if let Some(error) = &call.error_message {
                    print!("  ({})", error);
                }
                println!();
            }
        }

        Commands::Reach {
            class,
            method,
            file,
            start,
            end,
            depth,
            json,
        } => {
            let locator = container.locate_use_case();
            let selector = match (class, method, file, start, end) {
                (Some(class), Some(method), _, _, _) => MethodSelector::by_name(class, method),
                (None, _, Some(file), Some(start), Some(end)) => {
                    MethodSelector::by_range(file, start, end)
                }
                _ => {
                    return Err(DomainError::invalid_input(
                        "Give either --class and --method or --file, --start and --end",
                    )
                    .into())
                }
            };
            let target = locator
                .locate(&selector)?
                .with_context(|| format!("Method {} not found", selector.describe()))?;

            let reachability = container.reachability_use_case().explore(&target, depth)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reachability)?);
            } else {
                println!("Reachable from {}:", target.qualified_method());
                for reached in &reachability.dependencies {
                    println!(
                        "  {}{}  (via {})",
                        "  ".repeat(reached.depth.saturating_sub(1)),
                        reached.qualified_name,
                        reached.via
                    );
                }
                for diagnostic in &reachability.diagnostics {
                    println!("  unresolved: {}", diagnostic);
                }
            }
        }

        Commands::Cache { action } => {
            let cache = container.class_locations();
            match action {
                CacheAction::Rebuild => {
                    if container.cache_file().is_none() {
                        println!("No --cache-file given; the map is not persisted.");
                    }
                    let locations = cache.rebuild_and_save();
                    println!("Indexed {} types.", locations.len());
                }
                CacheAction::Clear => {
                    cache.clear()?;
                    println!("Class location cache cleared.");
                }
                CacheAction::Show => {}
            }
        }
    }

    Ok(())
}

fn show_cache(cache_file: Option<&Path>) -> Result<()> {
    let path = cache_file.context("--cache-file is required to show the cache")?;
    match JsonClassLocationStore::new(path).load()? {
        Some(locations) => {
            for (name, file) in locations.iter() {
                println!("{}  {}", name, file.display());
            }
            println!("{} types.", locations.len());
        }
        None => println!("No cache at {}.", path.display()),
    }
    Ok(())
}

fn print_report(report: &DependencyReport) {
    if report.is_empty() {
        println!("No external dependencies.");
    }

    for (owner, symbols) in report.classes() {
        println!("\n{}", owner);
        if symbols.referenced_as_type {
            println!("  (used as type)");
        }
        for (label, members) in [
            ("fields", &symbols.fields),
            ("enums", &symbols.enum_constants),
            ("annotations", &symbols.annotations),
            ("methods", &symbols.methods),
        ] {
            if !members.is_empty() {
                let list: Vec<&str> = members.iter().map(String::as_str).collect();
                println!("  {}: {}", label, list.join(", "));
            }
        }
    }

    if !report.diagnostics().is_empty() {
        println!("\nUnresolved ({}):", report.diagnostics().len());
        for diagnostic in report.diagnostics() {
            println!("  {}", diagnostic);
        }
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn analyze_requires_class_or_file() {
        let res = Cli::try_parse_from(["depscope", "-r", "src", "analyze", "--method", "run"]);
        assert!(res.is_err());

        let res = Cli::try_parse_from([
            "depscope", "analyze", "--class", "A", "--file", "A.java", "--method", "run",
        ]);
        assert!(res.is_err(), "--class and --file are exclusive");
    }

    #[test]
    fn exclude_replaces_defaults() {
        let cli = Cli::try_parse_from([
            "depscope", "-r", "src", "--exclude", "com.vendor.", "calls", "-f", "A.java", "-s",
            "1", "-e", "2",
        ])
        .unwrap();
        let config = cli.container_config();

        assert!(config.analysis.exclusions.is_excluded("com.vendor.Foo"));
        assert!(!config.analysis.exclusions.is_excluded("java.util.List"));
    }

    #[test]
    fn strict_disables_lenient_mode() {
        let cli = Cli::try_parse_from(["depscope", "--strict", "cache", "rebuild"]).unwrap();
        assert!(!cli.container_config().analysis.ignore_unresolved);
    }

    #[test]
    fn selectors_per_method() {
        let cli = Cli::try_parse_from([
            "depscope", "analyze", "--class", "Checkout", "-m", "run", "-m", "total",
        ])
        .unwrap();
        let Commands::Analyze {
            target, methods, ..
        } = cli.command
        else {
            panic!("expected analyze");
        };

        assert_eq!(
            target.selectors(&methods),
            vec![
                MethodSelector::by_name("Checkout", "run"),
                MethodSelector::by_name("Checkout", "total"),
            ]
        );
    }
}
