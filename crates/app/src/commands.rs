use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use extracto_core::{FileKind, Statement};
use extracto_engine::{
    find_match, match_report, normalize_text, rollup, PlainTextExtractor, RuleResolver,
    TextExtractor,
};
use extracto_storage::{Refiner, RevisionStore, RuleStore, StatementStore, TemplateLibrary};

/// On-disk layout under the data directory.
pub struct Paths {
    pub templates: TemplateLibrary,
    pub statements: StatementStore,
    pub rules: RuleStore,
    pub revisions: RevisionStore,
}

impl Paths {
    pub fn resolve(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let root = match data_dir {
            Some(dir) => dir,
            None => directories::ProjectDirs::from("com", "extracto", "Extracto")
                .ok_or_else(|| anyhow!("could not determine a data directory"))?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating data directory {}", root.display()))?;

        Ok(Self {
            templates: TemplateLibrary::new(root.join("templates")),
            statements: StatementStore::new(root.join("statements")),
            rules: RuleStore::new(root.join("rules")),
            revisions: RevisionStore::new(root.join("sessions")),
        })
    }
}

pub enum Edit {
    Ignore(String),
    Positive(String),
    Regex(String),
}

// ── Processing ───────────────────────────────────────────────────────────────

pub fn process_file(
    paths: &Paths,
    file: &Path,
    template_name: Option<&str>,
    kind: FileKind,
) -> anyhow::Result<(Statement, usize, usize)> {
    let text = PlainTextExtractor.extract(file, None)?;

    let template = match template_name {
        Some(name) => paths.templates.get(name)?,
        None => {
            let library = paths.templates.load_all()?;
            let normalized = normalize_text(&text);
            find_match(&library, &normalized, kind)
                .cloned()
                .ok_or_else(|| anyhow!("no template matched {}", file.display()))?
        }
    };

    let extraction = extracto_engine::process(&template, &text)?;
    let rows_matched = extraction.rows_matched;
    let rows_skipped = extraction.rows_skipped;

    let ignore_rules = paths.rules.ignore_rules()?;
    let sign_rules = paths.rules.sign_rules()?;
    let category_rules = paths.rules.category_rules()?;
    let resolver = RuleResolver::new(&ignore_rules, &sign_rules, &category_rules);

    let mut statement = Statement::new(&template.entity, template.account_type);
    statement.transactions = extraction.transactions;
    resolver.apply(&mut statement.transactions);
    extracto_engine::recalculate(&mut statement);

    Ok((statement, rows_matched, rows_skipped))
}

pub fn process(
    paths: &Paths,
    file: &Path,
    template_name: Option<&str>,
    output_name: Option<&str>,
    kind: &str,
) -> anyhow::Result<()> {
    let kind: FileKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let (statement, rows_matched, rows_skipped) = process_file(paths, file, template_name, kind)?;

    let name = match output_name {
        Some(n) if n.ends_with(".json") => n.to_string(),
        Some(n) => format!("{n}.json"),
        None => {
            let stem = file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            format!("{stem}.json")
        }
    };
    paths.statements.save(&name, &statement)?;

    let summary = &statement.meta_info.summary;
    println!("{name}: {rows_matched} rows extracted, {rows_skipped} skipped");
    println!(
        "  credits {}  debits {}  balance {}",
        summary.total_credits, summary.total_debits, summary.balance
    );
    Ok(())
}

// ── Templates ────────────────────────────────────────────────────────────────

pub fn templates_list(paths: &Paths) -> anyhow::Result<()> {
    let names = paths.templates.list()?;
    if names.is_empty() {
        println!("library is empty");
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn templates_match(paths: &Paths, file: &Path, kind: &str) -> anyhow::Result<()> {
    let kind: FileKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let text = PlainTextExtractor.extract(file, None)?;
    let library = paths.templates.load_all()?;
    let normalized = normalize_text(&text);

    for score in match_report(&library, &normalized, kind) {
        let marker = if score.is_match { "*" } else { " " };
        println!(
            "{marker} {:<30} {}/{} keywords ({:.0}%)",
            score.entity, score.matched_keywords, score.total_keywords, score.percentage
        );
    }
    Ok(())
}

pub fn templates_promote(paths: &Paths, session: &str) -> anyhow::Result<()> {
    let (template, version) = paths.revisions.latest_template(session)?;
    let name = paths.templates.save(&template)?;
    println!("session {session} v{version} promoted to {name}");
    Ok(())
}

// ── Refinement ───────────────────────────────────────────────────────────────

pub fn refine_start(paths: &Paths, session: &str, template_name: &str) -> anyhow::Result<()> {
    let template = paths.templates.get(template_name)?;
    let version = paths.revisions.append_template(session, &template)?;
    println!("session {session} started at v{version} from {template_name}");
    Ok(())
}

pub fn refine(
    paths: &Paths,
    session: &str,
    file: &Path,
    base: u32,
    edit: Edit,
) -> anyhow::Result<()> {
    let text = PlainTextExtractor.extract(file, None)?;

    let before = paths.revisions.template(session, base)?;
    let rows_before = extracto_engine::process(&before, &text)
        .map(|e| e.transactions.len())
        .unwrap_or(0);

    let refiner = Refiner::new(&paths.revisions, session, &text);
    let outcome = match edit {
        Edit::Ignore(pattern) => refiner.add_ignore_pattern(base, &pattern)?,
        Edit::Positive(pattern) => refiner.add_positive_pattern(base, &pattern)?,
        Edit::Regex(regex) => refiner.update_regex(base, &regex)?,
    };

    println!(
        "v{base} -> v{}: {rows_before} -> {} rows",
        outcome.version,
        outcome.extraction.transactions.len()
    );
    println!(
        "  credits {}  debits {}",
        outcome.extraction.total_credits, outcome.extraction.total_debits
    );
    Ok(())
}

// ── Rules ────────────────────────────────────────────────────────────────────

pub fn rule_ignore(
    paths: &Paths,
    description: &str,
    id: &str,
    is_ignored: bool,
    global: bool,
) -> anyhow::Result<()> {
    paths.rules.set_ignore(description, id, is_ignored, global)?;
    println!("ignore rule {}", if is_ignored { "set" } else { "removed" });
    Ok(())
}

pub fn rule_sign(
    paths: &Paths,
    description: &str,
    id: &str,
    is_positive: bool,
    global: bool,
) -> anyhow::Result<()> {
    paths
        .rules
        .set_sign(description, id, is_positive, Some(true), global)?;
    println!(
        "sign rule set: {}",
        if is_positive { "positive" } else { "negative" }
    );
    Ok(())
}

pub fn rule_category(
    paths: &Paths,
    original_description: &str,
    title: &str,
    category_id: &str,
    category_name: &str,
) -> anyhow::Result<()> {
    paths
        .rules
        .set_category(original_description, title, category_id, category_name)?;
    println!("category rule set: {original_description} -> {title} ({category_name})");
    Ok(())
}

// ── Statements ───────────────────────────────────────────────────────────────

pub fn statements_list(paths: &Paths) -> anyhow::Result<()> {
    for name in paths.statements.list()? {
        let statement = paths.statements.load(&name)?;
        println!(
            "{name}: {} ({}), {} rows, balance {}",
            statement.meta_info.bank,
            statement.meta_info.account_kind,
            statement.transactions.len(),
            statement.meta_info.summary.balance
        );
    }
    Ok(())
}

pub fn statements_rename(paths: &Paths, from: &str, to: &str) -> anyhow::Result<()> {
    paths.statements.rename(from, to)?;
    println!("{from} -> {to}");
    Ok(())
}

pub fn statements_delete(paths: &Paths, name: &str) -> anyhow::Result<()> {
    paths.statements.delete(name)?;
    println!("{name} deleted");
    Ok(())
}

pub fn statements_recalc(paths: &Paths, name: &str) -> anyhow::Result<()> {
    let statement = paths.statements.recalculate(name)?;
    let summary = &statement.meta_info.summary;
    println!(
        "{name}: credits {}  debits {}  balance {}",
        summary.total_credits, summary.total_debits, summary.balance
    );
    Ok(())
}

pub fn edit_description(paths: &Paths, id: &str, description: &str) -> anyhow::Result<()> {
    let file = paths.statements.update_description(id, description)?;
    println!("updated in {file}");
    Ok(())
}

// ── Aggregation ──────────────────────────────────────────────────────────────

pub fn summary(paths: &Paths) -> anyhow::Result<()> {
    let statements = paths.statements.load_all()?;
    if statements.is_empty() {
        println!("no statements stored");
        return Ok(());
    }

    let combined = rollup(statements.iter());
    println!("{} statements", statements.len());
    println!("  income   {}", combined.total_credits);
    println!("  expenses {}", combined.total_debits);
    println!("  balance  {}", combined.balance);
    Ok(())
}
