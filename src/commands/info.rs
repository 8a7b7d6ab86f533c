use crate::output;
use auric::{AurApi, Fetch, RpcRecord};
use colored::Colorize;

const SUGGESTION_LIMIT: usize = 3;

/// Labelled list fields, in display order.
const LIST_FIELDS: &[(&str, &str)] = &[
    ("license", "Licenses"),
    ("provides", "Provides"),
    ("conflicts", "Conflicts"),
    ("depends", "Depends On"),
    ("makedepends", "Make Deps"),
    ("checkdepends", "Check Deps"),
    ("optdepends", "Optional Deps"),
    ("keywords", "Keywords"),
];

pub async fn info<F: Fetch>(api: &AurApi<F>, name: &str, json: bool) -> anyhow::Result<()> {
    let is_tty = output::is_tty();

    let spinner = output::spinner(format!("Fetching info for {}...", name), !json && is_tty);
    let record = api.info(name).await;
    spinner.finish_and_clear();

    let Some(record) = record? else {
        eprintln!("{} No package named '{}' in the AUR", "✗".red(), name);

        let suggestions = api.suggest(name, SUGGESTION_LIMIT).await;
        if !suggestions.is_empty() {
            eprintln!("Did you mean: {}?", suggestions.join(", ").cyan());
        }
        anyhow::bail!("package not found: {}", name);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn print_record(record: &RpcRecord) {
    println!(
        "{}",
        format!(
            "==> {} {}",
            record.name().unwrap_or_default(),
            record.version().unwrap_or_default()
        )
        .bold()
        .green()
    );
    if let Some(desc) = record.desc() {
        println!("{}", desc);
    }
    if let Some(url) = record.text("url") {
        println!("{}: {}", "Homepage".bold(), url);
    }
    if let Some(base) = record.text("packagebase")
        && Some(base) != record.name()
    {
        println!("{}: {}", "Package Base".bold(), base);
    }

    for (key, label) in LIST_FIELDS {
        let items = record.list(key);
        if !items.is_empty() {
            println!("{}: {}", label.bold(), items.join("  "));
        }
    }

    println!(
        "{}: {}",
        "Maintainer".bold(),
        record.text("maintainer").unwrap_or("(orphaned)")
    );
    println!(
        "{}: {}  {}: {:.2}",
        "Votes".bold(),
        record.votes().unwrap_or(0),
        "Popularity".bold(),
        record.popularity().unwrap_or(0.0)
    );

    for (key, label) in [("firstsubmitted", "First Submitted"), ("lastmodified", "Last Modified")] {
        if let Some(when) = record.timestamp(key) {
            println!("{}: {}", label.bold(), when.format("%Y-%m-%d %H:%M UTC"));
        }
    }

    if record.is_outdated() {
        println!("{}: {}", "Out Of Date".bold(), "Yes".red());
    }
}
