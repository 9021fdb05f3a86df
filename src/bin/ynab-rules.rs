use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use ynab_rules::{
    load_dotenv, Action, AppConfig, Condition, JsonFileSource, LogicOperator, RandomIds, Rule,
    RuleDraft, RuleStore, RulesApp,
};

/// Manage transaction rules and run them over exported transactions.
#[derive(Parser, Debug)]
#[command(name = "ynab-rules", about = "Rules engine for budget transactions")]
struct Cli {
    /// Directory holding rule storage (default: ~/.ynab_rules)
    #[arg(long, global = true, env = "YNAB_RULES_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Rules file override (default: <config-dir>/rules.json)
    #[arg(long, global = true, env = "YNAB_RULES_FILE")]
    rules_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rules in priority order
    List,

    /// Print one rule as JSON
    Show { id: String },

    /// Create a rule
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Higher runs first
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        priority: i64,

        /// How conditions combine: and, or
        #[arg(long, default_value = "and")]
        logic: String,

        /// Store the rule disabled
        #[arg(long)]
        disabled: bool,

        /// Condition as field:operator:value, repeatable
        #[arg(long = "condition")]
        conditions: Vec<String>,

        /// Action as field:operation[:value], repeatable
        #[arg(long = "action")]
        actions: Vec<String>,
    },

    /// Change fields of an existing rule, keeping its id
    Edit {
        id: String,

        #[command(flatten)]
        edits: RuleEdits,
    },

    /// Delete a rule by id
    Delete { id: String },

    /// Save every rule in a JSON array file, replacing rules with the same id
    Import { file: PathBuf },

    /// Run the rules over a JSON array of transactions
    Process {
        #[arg(long)]
        transactions: PathBuf,

        /// Report changes without writing them
        #[arg(long)]
        dry_run: bool,

        /// Evaluate transactions on all cores
        #[arg(long)]
        parallel: bool,

        /// Write updated transactions here instead of back to the input file
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

/// Fields left unset keep the rule's current value
#[derive(Args, Debug, Default)]
struct RuleEdits {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    priority: Option<i64>,

    /// How conditions combine: and, or
    #[arg(long)]
    logic: Option<String>,

    #[arg(long, conflicts_with = "disable")]
    enable: bool,

    #[arg(long)]
    disable: bool,

    /// Replaces every condition; field:operator:value, repeatable
    #[arg(long = "condition")]
    conditions: Vec<String>,

    /// Replaces every action; field:operation[:value], repeatable
    #[arg(long = "action")]
    actions: Vec<String>,
}

fn apply_edits(mut draft: RuleDraft, edits: &RuleEdits) -> Result<RuleDraft> {
    if let Some(name) = &edits.name {
        draft.name = name.clone();
    }
    if let Some(description) = &edits.description {
        draft.description = description.clone();
    }
    if let Some(priority) = edits.priority {
        draft.priority = priority;
    }
    if let Some(logic) = &edits.logic {
        draft.logic_operator = logic.parse()?;
    }
    if edits.enable {
        draft.enabled = true;
    }
    if edits.disable {
        draft.enabled = false;
    }
    if !edits.conditions.is_empty() {
        draft.conditions = edits
            .conditions
            .iter()
            .map(|raw| parse_condition(raw))
            .collect::<Result<_>>()?;
    }
    if !edits.actions.is_empty() {
        draft.actions = edits
            .actions
            .iter()
            .map(|raw| parse_action(raw))
            .collect::<Result<_>>()?;
    }
    Ok(draft)
}

fn parse_condition(raw: &str) -> Result<Condition> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(operator), Some(value)) => Condition::parse(field, operator, value)
            .with_context(|| format!("invalid condition '{}'", raw)),
        _ => bail!("condition '{}' must look like field:operator:value", raw),
    }
}

fn parse_action(raw: &str) -> Result<Action> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next()) {
        (Some(field), Some(operation)) => {
            let value = parts.next().unwrap_or("");
            Action::parse(field, operation, value).with_context(|| format!("invalid action '{}'", raw))
        }
        _ => bail!("action '{}' must look like field:operation[:value]", raw),
    }
}

fn print_warnings(rule: &Rule) {
    for warning in rule.warnings() {
        eprintln!("Warning: {}", warning);
    }
}

fn main() -> Result<()> {
    // Before parsing so `.env` values reach clap's env fallbacks
    let dotenv_error = load_dotenv();
    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .context("failed to load configuration")?
        .with_overrides(cli.config_dir, cli.rules_file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = dotenv_error {
        warn!(error = %e, "ignoring unreadable .env file");
    }

    let mut app = RulesApp::from_config(&config).context("failed to prepare rule storage")?;

    match cli.command {
        Command::List => {
            let rules = app.engine().load_rules();
            if rules.is_empty() {
                println!("No rules defined.");
            }
            for rule in rules {
                println!("{}", rule.id);
                println!("{}", rule);
            }
        }

        Command::Show { id } => {
            let rule = app
                .engine()
                .store()
                .get_rule_by_id(&id)
                .with_context(|| format!("no rule with id '{}'", id))?;
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }

        Command::Add {
            name,
            description,
            priority,
            logic,
            disabled,
            conditions,
            actions,
        } => {
            let logic: LogicOperator = logic.parse()?;
            let mut draft = RuleDraft::new(name)
                .description(description)
                .priority(priority)
                .enabled(!disabled)
                .logic(logic);
            for raw in &conditions {
                draft = draft.condition(parse_condition(raw)?);
            }
            for raw in &actions {
                draft = draft.action(parse_action(raw)?);
            }

            let rule = draft.build(&mut RandomIds)?;
            print_warnings(&rule);
            if !app.store_mut().save_rule(&rule) {
                bail!("failed to save rule '{}'", rule.name);
            }
            info!(rule_id = %rule.id, "rule created");
            println!("{}", rule.id);
        }

        Command::Edit { id, edits } => {
            let current = app
                .engine()
                .store()
                .get_rule_by_id(&id)
                .with_context(|| format!("no rule with id '{}'", id))?;
            let rule = current.revise(apply_edits(current.to_draft(), &edits)?)?;
            print_warnings(&rule);
            if !app.store_mut().save_rule(&rule) {
                bail!("failed to save rule '{}'", rule.name);
            }
            info!(rule_id = %rule.id, "rule updated");
            println!("{}", rule);
        }

        Command::Delete { id } => {
            if !app.store_mut().delete_rule(&id) {
                bail!("no rule with id '{}' was deleted", id);
            }
            println!("Deleted {}", id);
        }

        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let rules: Vec<Rule> = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse rules in {}", file.display()))?;

            let mut saved = 0;
            for rule in &rules {
                print_warnings(rule);
                if app.store_mut().save_rule(rule) {
                    saved += 1;
                }
            }
            println!("Imported {} of {} rules", saved, rules.len());
        }

        Command::Process {
            transactions,
            dry_run,
            parallel,
            write,
        } => {
            let mut source = JsonFileSource::open(&transactions)?;
            if let Some(output) = write {
                source = source.with_output(output);
            }

            let mut app = app.with_source(Box::new(source));
            let outcome = app.process(dry_run, parallel)?;

            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            eprint!("{}", outcome.report);
            match outcome.changes_applied {
                Some(count) => eprintln!("Applied {} change(s)", count),
                None => eprintln!("Dry run: no changes written"),
            }

            if !outcome.failures.is_empty() {
                bail!("{} update(s) failed", outcome.failures.len());
            }
        }
    }

    Ok(())
}
