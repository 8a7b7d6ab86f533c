use crate::output;
use auric::{AurApi, DependencySpec, Fetch, Package};
use colored::Colorize;

pub async fn deps<F: Fetch>(api: &AurApi<F>, names: &[String], make: bool) -> anyhow::Result<()> {
    if names.is_empty() {
        println!("Usage: auric deps <package>...");
        return Ok(());
    }

    let is_tty = output::is_tty();
    let spinner = output::spinner(
        format!("Fetching {} PKGBUILD(s)...", names.len()),
        is_tty,
    );

    let fetches = names.iter().map(|name| api.package(name));
    let results = futures::future::join_all(fetches).await;
    spinner.finish_and_clear();

    let mut failures = 0;
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(Some(package)) => {
                if let Err(e) = print_package(&package, make) {
                    eprintln!("{} {}: {}", "✗".red(), name, e);
                    failures += 1;
                }
            }
            Ok(None) => {
                eprintln!("{} No package named '{}' in the AUR", "✗".red(), name);
                failures += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} packages failed", failures, names.len());
    }
    Ok(())
}

fn print_package(package: &Package, make: bool) -> auric::Result<()> {
    let metadata = package.recipe.metadata()?;
    let runtime = metadata.dependencies()?;
    let build = if make {
        metadata.make_dependencies()?
    } else {
        Vec::new()
    };

    let name = package.info.name().unwrap_or(package.recipe.name());
    let version = metadata
        .version()
        .or_else(|| package.info.version().map(str::to_string))
        .unwrap_or_default();
    println!("{}", format!("==> {} {}", name, version).bold().green());

    if runtime.is_empty() && build.is_empty() {
        println!("  {} No dependencies", "✓".green());
        return Ok(());
    }

    print_tree("Runtime dependencies:", &runtime);
    if make {
        print_tree("Build dependencies:", &build);
    }
    Ok(())
}

fn print_tree(label: &str, specs: &[DependencySpec]) {
    if specs.is_empty() {
        return;
    }

    println!("  {}", label.bold());
    for (i, spec) in specs.iter().enumerate() {
        let prefix = output::branch(i, specs.len());
        match (spec.comparator, &spec.version) {
            (Some(cmp), Some(version)) => {
                println!(
                    "  {} {} {}",
                    prefix,
                    spec.package.cyan(),
                    format!("{}{}", cmp, version).dimmed()
                );
            }
            _ => println!("  {} {}", prefix, spec.package.cyan()),
        }
    }
}
