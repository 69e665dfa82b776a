use std::io::{BufRead, Write};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use librarian_core::config_file::{self, ApiConfig, ConfigFile, FiltersConfig};
use librarian_core::filter::FilterChange;
use librarian_core::{
    BookForm, BookId, BookStatus, ClientConfig, Confirm, HttpCatalog, Session, SortField,
    SortOrder,
};

mod output;

use output::{ColorMode, Sections, TextView};

/// Librarian - manage a book catalog served over a REST API
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides LIBRARIAN_SERVER and the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// API path prefix, e.g. /api/v1
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog
    List {
        /// Free-text search over title and author
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by author
        #[arg(short, long)]
        author: Option<String>,

        /// Earliest publication year
        #[arg(long)]
        year_min: Option<i32>,

        /// Latest publication year
        #[arg(long)]
        year_max: Option<i32>,

        /// Sort key: created_at, title, author or year
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction: asc or desc
        #[arg(long)]
        order: Option<String>,

        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show one book in detail
    Show { id: String },

    /// Add a book
    Add {
        #[command(flatten)]
        fields: BookFields,

        /// Fill missing fields from the ISBN lookup service before saving
        #[arg(long)]
        lookup: bool,
    },

    /// Update a book; only the given fields change
    Update {
        id: String,

        #[command(flatten)]
        fields: BookFields,
    },

    /// Delete a book
    Delete {
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Fetch metadata for an ISBN without saving anything
    Lookup { isbn: String },

    /// Create the two sample books
    Seed,

    /// Print the resolved configuration
    Config {
        /// Write the resolved connection and filter settings to the
        /// platform config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug, Default)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// available, borrowed, reserved or maintenance
    #[arg(long)]
    status: Option<String>,
}

impl BookFields {
    /// Overwrite the form fields that were given on the command line.
    fn apply_to(self, form: &mut BookForm) -> anyhow::Result<()> {
        if let Some(status) = &self.status
            && BookStatus::parse(status).is_none()
        {
            anyhow::bail!("Unknown status \"{}\"", status);
        }
        let pairs = [
            (self.title, &mut form.title),
            (self.author, &mut form.author),
            (self.year, &mut form.year),
            (self.isbn, &mut form.isbn),
            (self.description, &mut form.description),
            (self.status, &mut form.status),
        ];
        for (value, slot) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
        Ok(())
    }
}

/// Asks on stderr and reads the answer from stdin.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

type CliSession = Session<HttpCatalog, TextView<std::io::Stdout, std::io::Stderr>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let mut config = ClientConfig::load();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    let color = ColorMode(!cli.no_color);

    match cli.command {
        Command::List {
            query,
            author,
            year_min,
            year_max,
            sort,
            order,
            limit,
        } => {
            let mut s = session(&config, color, Sections {
                list: true,
                stats: true,
                ..Sections::default()
            });
            if let Some(q) = query {
                s.set_filter(FilterChange::Query(q));
            }
            if let Some(a) = author {
                s.set_filter(FilterChange::Author(a));
            }
            s.set_filter(FilterChange::YearMin(year_min));
            s.set_filter(FilterChange::YearMax(year_max));
            if let Some(sort) = sort {
                let field = SortField::parse(&sort)
                    .with_context(|| format!("Unknown sort key \"{}\"", sort))?;
                s.set_filter(FilterChange::Sort(field));
            }
            if let Some(order) = order {
                let order = SortOrder::parse(&order)
                    .with_context(|| format!("Unknown sort order \"{}\"", order))?;
                s.set_filter(FilterChange::Order(order));
            }
            if let Some(limit) = limit {
                s.set_filter(FilterChange::Limit(limit.max(1)));
            }
            s.refresh().await.context("Failed to load the catalog")?;
            finish(s)
        }
        Command::Show { id } => {
            let mut s = session(&config, color, Sections {
                inspector: true,
                ..Sections::default()
            });
            s.open(&BookId::new(id)).await?;
            finish(s)
        }
        Command::Add { fields, lookup } => {
            let mut s = session(&config, color, Sections {
                inspector: true,
                ..Sections::default()
            });
            fields.apply_to(s.form_fields_mut())?;
            if lookup {
                s.lookup().await.context("ISBN lookup failed")?;
            }
            s.submit().await?;
            finish(s)
        }
        Command::Update { id, fields } => {
            let mut s = session(&config, color, Sections {
                inspector: true,
                ..Sections::default()
            });
            let id = BookId::new(id);
            s.open(&id).await?;
            s.enter_edit()?;
            fields.apply_to(s.form_fields_mut())?;
            s.submit().await?;
            finish(s)
        }
        Command::Delete { id, yes } => {
            let mut s = session(&config, color, Sections::default());
            s.open(&BookId::new(id)).await?;
            let deleted = if yes {
                s.delete_selected(&mut true).await?
            } else {
                s.delete_selected(&mut StdinConfirm).await?
            };
            if !deleted {
                eprintln!("Cancelled.");
            }
            finish(s)
        }
        Command::Lookup { isbn } => {
            let mut s = session(&config, color, Sections {
                form: true,
                ..Sections::default()
            });
            s.form_fields_mut().isbn = isbn;
            s.lookup().await?;
            finish(s)
        }
        Command::Seed => {
            let mut s = session(&config, color, Sections {
                list: true,
                ..Sections::default()
            });
            s.seed().await?;
            finish(s)
        }
        Command::Config { save } => print_config(&config, save),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn session(config: &ClientConfig, color: ColorMode, sections: Sections) -> CliSession {
    tracing::debug!(root = %config.api_root(), "using backend");
    Session::new(
        HttpCatalog::from_config(config),
        TextView::stdio(color, sections),
        config,
    )
}

fn finish(s: CliSession) -> anyhow::Result<()> {
    s.into_view().finish().context("Failed to write output")
}

fn print_config(config: &ClientConfig, save: bool) -> anyhow::Result<()> {
    println!("API root:        {}", config.api_root());
    println!("Timeout:         {}s", config.timeout_secs);
    println!("Min query chars: {}", config.policy.min_query_chars);
    println!("Year validation: {}", config.policy.validate_year_range);
    println!(
        "Default sort:    {} {}",
        config.default_sort.as_str(),
        config.default_order.as_str()
    );
    println!("Default limit:   {}", config.default_limit);
    println!("Debounce:        {}ms", config.debounce_ms);

    if save {
        // Keep whatever else the platform file holds (e.g. the TUI theme).
        let existing = config_file::config_path()
            .and_then(|p| config_file::load_from_path(&p))
            .unwrap_or_default();
        let resolved = ConfigFile {
            api: Some(ApiConfig {
                server_url: Some(config.server_url.clone()),
                api_base: Some(config.api_base.clone()),
                timeout_secs: Some(config.timeout_secs),
            }),
            filters: Some(FiltersConfig {
                min_query_chars: Some(config.policy.min_query_chars),
                validate_year_range: Some(config.policy.validate_year_range),
                sort: Some(config.default_sort.as_str().to_string()),
                order: Some(config.default_order.as_str().to_string()),
                limit: Some(config.default_limit),
                debounce_ms: Some(config.debounce_ms),
            }),
            display: None,
        };
        let path = config_file::save_config(&config_file::merge(existing, resolved))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_fields_are_applied() {
        let mut form = BookForm {
            title: "Old".into(),
            author: "Kept".into(),
            ..BookForm::default()
        };
        BookFields {
            title: Some("New".into()),
            year: Some("1999".into()),
            ..BookFields::default()
        }
        .apply_to(&mut form)
        .unwrap();

        assert_eq!(form.title, "New");
        assert_eq!(form.author, "Kept");
        assert_eq!(form.year, "1999");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = BookForm::default();
        let fields = BookFields {
            status: Some("lost".into()),
            ..BookFields::default()
        };
        assert!(fields.apply_to(&mut form).is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "librarian", "list", "-q", "clean", "--server", "http://x", "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://x"));
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::List { query: Some(ref q), .. } if q == "clean"));
    }
}
