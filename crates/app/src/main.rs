use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "extracto",
    about = "Turn bank statement text into normalized, rule-corrected transactions."
)]
struct Cli {
    /// Data directory holding templates, rules and processed statements.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a statement text file into a stored statement.
    Process {
        /// Path to the extracted statement text
        file: PathBuf,
        /// Library template file name; when absent the best match is used
        #[arg(long)]
        template: Option<String>,
        /// Output statement name (default: derived from the input file)
        #[arg(long)]
        name: Option<String>,
        /// Treat the input as this file type when matching (pdf, csv, xlsx)
        #[arg(long, default_value = "pdf")]
        kind: String,
    },
    /// Inspect the template library.
    Templates {
        #[command(subcommand)]
        command: TemplatesCommands,
    },
    /// Refine a template revision by revision inside a session.
    Refine {
        #[command(subcommand)]
        command: RefineCommands,
    },
    /// Record transaction correction rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage stored statements.
    Statements {
        #[command(subcommand)]
        command: StatementsCommands,
    },
    /// Aggregate every stored statement into one combined summary.
    Summary,
}

#[derive(Subcommand)]
enum TemplatesCommands {
    /// List templates in library order.
    List,
    /// Score every template against a statement text file.
    Match {
        file: PathBuf,
        #[arg(long, default_value = "pdf")]
        kind: String,
    },
    /// Promote a session's latest revision into the library.
    Promote { session: String },
}

#[derive(Subcommand)]
enum RefineCommands {
    /// Start a session from a library template.
    Start {
        session: String,
        /// Library template file name to start from
        template: String,
    },
    /// Add an ignore pattern on top of a base revision.
    Ignore {
        session: String,
        /// Source statement text file
        file: PathBuf,
        #[arg(long)]
        base: u32,
        pattern: String,
    },
    /// Add a force-positive pattern on top of a base revision.
    Positive {
        session: String,
        file: PathBuf,
        #[arg(long)]
        base: u32,
        pattern: String,
    },
    /// Replace the row regex on top of a base revision.
    Regex {
        session: String,
        file: PathBuf,
        #[arg(long)]
        base: u32,
        regex: String,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Ignore (or stop ignoring, with --off) matching transactions.
    Ignore {
        /// Transaction description, required with --global
        #[arg(long, default_value = "")]
        description: String,
        /// Exact transaction id
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long)]
        global: bool,
        /// Remove the ignore instead of adding it
        #[arg(long)]
        off: bool,
    },
    /// Force the sign of matching transactions (positive unless --negative).
    Sign {
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long)]
        global: bool,
        #[arg(long)]
        negative: bool,
    },
    /// Set a display title and category for an original description.
    Category {
        original_description: String,
        title: String,
        #[arg(long)]
        category_id: String,
        #[arg(long)]
        category_name: String,
    },
}

#[derive(Subcommand)]
enum StatementsCommands {
    List,
    Rename { from: String, to: String },
    Delete { name: String },
    /// Recompute a statement's summary from its rows.
    Recalc { name: String },
    /// Change a transaction's display description, keeping its id.
    EditDescription { id: String, description: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let paths = commands::Paths::resolve(cli.data_dir)?;

    match cli.command {
        Commands::Process {
            file,
            template,
            name,
            kind,
        } => commands::process(&paths, &file, template.as_deref(), name.as_deref(), &kind),
        Commands::Templates { command } => match command {
            TemplatesCommands::List => commands::templates_list(&paths),
            TemplatesCommands::Match { file, kind } => {
                commands::templates_match(&paths, &file, &kind)
            }
            TemplatesCommands::Promote { session } => commands::templates_promote(&paths, &session),
        },
        Commands::Refine { command } => match command {
            RefineCommands::Start { session, template } => {
                commands::refine_start(&paths, &session, &template)
            }
            RefineCommands::Ignore {
                session,
                file,
                base,
                pattern,
            } => commands::refine(&paths, &session, &file, base, commands::Edit::Ignore(pattern)),
            RefineCommands::Positive {
                session,
                file,
                base,
                pattern,
            } => commands::refine(&paths, &session, &file, base, commands::Edit::Positive(pattern)),
            RefineCommands::Regex {
                session,
                file,
                base,
                regex,
            } => commands::refine(&paths, &session, &file, base, commands::Edit::Regex(regex)),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Ignore {
                description,
                id,
                global,
                off,
            } => commands::rule_ignore(&paths, &description, &id, !off, global),
            RulesCommands::Sign {
                description,
                id,
                global,
                negative,
            } => commands::rule_sign(&paths, &description, &id, !negative, global),
            RulesCommands::Category {
                original_description,
                title,
                category_id,
                category_name,
            } => commands::rule_category(
                &paths,
                &original_description,
                &title,
                &category_id,
                &category_name,
            ),
        },
        Commands::Statements { command } => match command {
            StatementsCommands::List => commands::statements_list(&paths),
            StatementsCommands::Rename { from, to } => commands::statements_rename(&paths, &from, &to),
            StatementsCommands::Delete { name } => commands::statements_delete(&paths, &name),
            StatementsCommands::Recalc { name } => commands::statements_recalc(&paths, &name),
            StatementsCommands::EditDescription { id, description } => {
                commands::edit_description(&paths, &id, &description)
            }
        },
        Commands::Summary => commands::summary(&paths),
    }
}
