use crate::output;
use auric::{AurApi, Fetch, RpcRecord, SearchQuery};
use colored::Colorize;

pub async fn search<F: Fetch>(api: &AurApi<F>, query: &str, json: bool) -> anyhow::Result<()> {
    let is_tty = output::is_tty();
    let query = SearchQuery::new(query)?;

    let spinner = output::spinner(
        format!("Searching for '{}'...", query.remote_term()),
        !json && is_tty,
    );
    let results = api.search(&query).await;
    spinner.finish_and_clear();
    let results = results?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        if is_tty {
            println!(
                "{} No packages found matching '{}'",
                "✗".red(),
                query.remote_term()
            );
        }
        return Ok(());
    }

    for record in results.by_votes() {
        if is_tty {
            print_entry(record);
        } else if let Some(name) = record.name() {
            println!("{}", name);
        }
    }

    if is_tty {
        println!();
        println!(
            "{} Found {} package{}",
            "✓".green(),
            results.len().to_string().bold(),
            if results.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

fn print_entry(record: &RpcRecord) {
    let name = record.name().unwrap_or_default();
    let version = record.version().unwrap_or_default();
    let version = if record.is_outdated() {
        format!("{} (Out-of-date)", version).red().to_string()
    } else {
        version.green().to_string()
    };

    println!(
        "{}{} {} {}",
        "aur/".magenta().bold(),
        name.bold(),
        version,
        format!(
            "(+{} {:.2})",
            record.votes().unwrap_or(0),
            record.popularity().unwrap_or(0.0)
        )
        .dimmed()
    );
    if let Some(desc) = record.desc() {
        println!("    {}", desc);
    }
}
