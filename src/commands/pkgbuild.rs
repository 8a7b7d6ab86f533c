use crate::output;
use auric::{AurApi, Fetch, Recipe};
use auric::pkgbuild::{FieldValue, RECOGNIZED_FIELDS};
use colored::Colorize;
use std::path::Path;

pub async fn pkgbuild<F: Fetch>(
    api: &AurApi<F>,
    name: Option<&str>,
    file: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let recipe = match (file, name) {
        (Some(path), _) => Recipe::read(path)?,
        (None, Some(name)) => {
            let spinner = output::spinner(
                format!("Fetching PKGBUILD for {}...", name),
                !json && output::is_tty(),
            );
            let recipe = api.recipe(name).await;
            spinner.finish_and_clear();
            recipe?
        }
        (None, None) => anyhow::bail!("either a package name or --file is required"),
    };

    let metadata = recipe.metadata()?;

    if json {
        println!("{}", serde_json::to_string_pretty(metadata)?);
        return Ok(());
    }

    let title = match metadata.version() {
        Some(version) => format!("==> {} {}", recipe.name(), version),
        None => format!("==> {}", recipe.name()),
    };
    println!("{}", title.bold().green());

    for field in RECOGNIZED_FIELDS {
        match metadata.get(field) {
            Some(FieldValue::Scalar(value)) => println!("{}: {}", field.bold(), value),
            Some(FieldValue::Sequence(items)) if !items.is_empty() => {
                println!("{}: {}", field.bold(), items.join("  "));
            }
            _ => {}
        }
    }

    Ok(())
}
