//! Command-line interface for querydesk.
//!
//! Parses arguments with clap and maps each subcommand onto the workspace.

use crate::app::{QueryOutcome, Workspace};
use crate::db::Dialect;
use crate::error::{QueryDeskError, Result};
use crate::output::CommandOutput;
use crate::persistence::Template;
use crate::results::{AxisSelection, ChartKind};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Compose, run and keep track of database queries through a remote query API.
#[derive(Parser, Debug)]
#[command(name = "querydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the JSON stores
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Query API base URL (overrides VITE_API_URL and the settings file)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Write logs to the log file instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Execute a query with the current connection config
    Run(RunArgs),

    /// Send a fixed test query with a blank config and print the raw response
    Diagnose,

    /// Run the dialect's test query against the current config
    TestConnection,

    /// Show or change the connection config
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Browse and manage query history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Browse and manage query templates
    #[command(subcommand)]
    Templates(TemplateCommand),

    /// Log file utilities
    #[command(subcommand)]
    Logs(LogsCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug, PartialEq)]
pub struct RunArgs {
    /// Query text; `{table_name}` is replaced for postgres
    pub query: String,

    /// Allow writes (queries are read-only by default)
    #[arg(long)]
    pub write: bool,

    /// Print the normalized rows as JSON
    #[arg(long, conflicts_with = "chart")]
    pub json: bool,

    /// Print a chart series instead of the table
    #[arg(long, value_name = "KIND")]
    pub chart: Option<ChartKind>,

    /// Column for the chart's x axis
    #[arg(long, value_name = "COLUMN", requires = "chart")]
    pub x: Option<String>,

    /// Numeric column for the chart's y axis
    #[arg(long, value_name = "COLUMN", requires = "chart")]
    pub y: Option<String>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommand {
    /// Print the current connection config (password masked)
    Show,
    /// Switch dialect: postgres, mysql or mongodb
    Dialect { dialect: Dialect },
    /// Set the connection URL
    Url { url: String },
    /// Set the table name substituted for `{table_name}`
    Table { name: String },
    /// Print an example connection URL for the current dialect
    Placeholder,
}

/// `history` subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum HistoryCommand {
    /// List entries, most recent first
    List {
        /// Only show favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Print an entry's query text
    Show { id: String },
    /// Toggle an entry's favorite flag
    Favorite { id: String },
    /// Delete an entry
    Delete { id: String },
    /// Record a query without executing it
    Save { query: String },
}

/// `templates` subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum TemplateCommand {
    /// List templates
    List {
        /// Only templates for this dialect (defaults to all)
        #[arg(long)]
        dialect: Option<Dialect>,
        /// Only templates for the current dialect
        #[arg(long, conflicts_with = "dialect")]
        current: bool,
    },
    /// Print a template
    Show { id: String },
    /// Create a template
    New(TemplateArgs),
    /// Edit an existing template
    Edit {
        id: String,
        #[command(flatten)]
        fields: TemplateArgs,
    },
    /// Delete a template
    Delete { id: String },
    /// Switch to a template's dialect and print its query
    Apply { id: String },
}

/// Editable template fields.
#[derive(Args, Debug, PartialEq, Default)]
pub struct TemplateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub dialect: Option<Dialect>,
    /// Share the template with other users
    #[arg(long)]
    pub public: Option<bool>,
}

impl TemplateArgs {
    fn apply_to(&self, template: &mut Template) {
        if let Some(name) = &self.name {
            template.name = name.clone();
        }
        if let Some(description) = &self.description {
            template.description = description.clone();
        }
        if let Some(query) = &self.query {
            template.query = query.clone();
        }
        if let Some(category) = &self.category {
            template.category = category.clone();
        }
        if let Some(dialect) = self.dialect {
            template.dialect = dialect;
        }
        if let Some(is_public) = self.public {
            template.is_public = is_public;
        }
    }
}

/// `logs` subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum LogsCommand {
    /// Copy the log file to PATH
    Export { path: PathBuf },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the settings file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Settings::default_path)
    }

    /// Returns true when logs should go to the log file.
    ///
    /// `logs` commands always log to stderr: opening the log file for
    /// writing truncates it.
    pub fn log_to_file(&self) -> bool {
        self.log_file && !matches!(self.command, Command::Logs(_))
    }
}

/// Runs a `logs` subcommand against the log file at `log_path`.
pub fn handle_logs(cmd: &LogsCommand, log_path: &Path) -> Result<CommandOutput> {
    match cmd {
        LogsCommand::Export { path } => {
            let bytes = crate::logging::export_log_file(log_path, path)?;
            Ok(CommandOutput::info(format!(
                "Exported {bytes} bytes of logs to {}",
                path.display()
            )))
        }
    }
}

/// Runs a workspace subcommand. `logs` is handled before a workspace exists.
pub async fn dispatch(command: Command, workspace: &mut Workspace) -> Result<CommandOutput> {
    match command {
        Command::Run(args) => run_query(args, workspace).await,
        Command::Diagnose => {
            let body = workspace.run_diagnostic().await?;
            Ok(CommandOutput::multiple(vec![
                CommandOutput::info("Test query succeeded. Raw response:"),
                CommandOutput::Json(body),
            ]))
        }
        Command::TestConnection => {
            let outcome = workspace.test_connection().await?;
            Ok(CommandOutput::info(format!(
                "Connection OK ({}). {}",
                workspace.connection().dialect.display_name(),
                outcome.message()
            )))
        }
        Command::Config(cmd) => Ok(handle_config(cmd, workspace)),
        Command::History(cmd) => handle_history(cmd, workspace),
        Command::Templates(cmd) => handle_templates(cmd, workspace),
        Command::Logs(_) => Err(QueryDeskError::internal(
            "logs commands do not need a workspace",
        )),
    }
}

async fn run_query(args: RunArgs, workspace: &mut Workspace) -> Result<CommandOutput> {
    let outcome = workspace.submit(&args.query, !args.write).await?;

    let QueryOutcome::Rows(set) = &outcome else {
        return Ok(CommandOutput::info(outcome.message()));
    };

    if args.json {
        let rows = set.rows().iter().cloned().map(Value::Object).collect();
        return Ok(CommandOutput::Json(Value::Array(rows)));
    }

    if let Some(kind) = args.chart {
        let axes = AxisSelection::choose(set, args.x.as_deref(), args.y.as_deref())
            .ok_or_else(|| {
                QueryDeskError::query("Result has no numeric column to chart.")
            })?;
        let rows = (0..set.row_count())
            .zip(set.numeric_values(&axes.y))
            .map(|(i, y)| {
                vec![
                    set.cell(i, &axes.x),
                    y.map(|v| v.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        return Ok(CommandOutput::multiple(vec![
            CommandOutput::info(format!("{kind} chart: {} by {}", axes.y, axes.x)),
            CommandOutput::table(vec![axes.x, axes.y], rows),
        ]));
    }

    Ok(CommandOutput::multiple(vec![
        CommandOutput::result_set(set),
        CommandOutput::info(outcome.message()),
    ]))
}

fn handle_config(cmd: ConfigCommand, workspace: &mut Workspace) -> CommandOutput {
    let store = workspace.config_store();
    match cmd {
        ConfigCommand::Show => CommandOutput::info(store.current().display_string()),
        ConfigCommand::Dialect { dialect } => {
            store.set_dialect(dialect);
            CommandOutput::info(format!("Dialect set to {}", dialect.display_name()))
        }
        ConfigCommand::Url { url } => {
            store.set_connection_url(url);
            CommandOutput::info(format!(
                "Connection URL set: {}",
                store.current().display_string()
            ))
        }
        ConfigCommand::Table { name } => {
            store.set_table_name(name.trim());
            CommandOutput::info(format!("Table name set to '{}'", name.trim()))
        }
        ConfigCommand::Placeholder => CommandOutput::info(store.connection_placeholder()),
    }
}

fn handle_history(cmd: HistoryCommand, workspace: &mut Workspace) -> Result<CommandOutput> {
    match cmd {
        HistoryCommand::List { favorites } => {
            Ok(CommandOutput::history(&workspace.history().list(favorites)))
        }
        HistoryCommand::Show { id } => Ok(CommandOutput::info(workspace.recall(&id)?)),
        HistoryCommand::Favorite { id } => {
            if workspace.history().get(&id).is_none() {
                return Err(QueryDeskError::history(format!(
                    "History entry '{id}' not found"
                )));
            }
            let starred = workspace.history_mut().toggle_favorite(&id);
            Ok(CommandOutput::info(if starred {
                format!("Added {id} to favorites")
            } else {
                format!("Removed {id} from favorites")
            }))
        }
        HistoryCommand::Delete { id } => {
            workspace.history_mut().delete(&id);
            Ok(CommandOutput::info(format!("Deleted {id}")))
        }
        HistoryCommand::Save { query } => {
            let entry = workspace.save_query(&query)?;
            Ok(CommandOutput::info(format!("Saved as {}", entry.id)))
        }
    }
}

fn handle_templates(cmd: TemplateCommand, workspace: &mut Workspace) -> Result<CommandOutput> {
    match cmd {
        TemplateCommand::List { dialect, current } => {
            let templates = match (dialect, current) {
                (Some(d), _) => workspace.templates().by_dialect(d),
                (None, true) => workspace.templates_for_current_dialect(),
                (None, false) => workspace.templates().all().iter().collect(),
            };
            Ok(CommandOutput::templates(&templates))
        }
        TemplateCommand::Show { id } => {
            let template = find_template(workspace, &id)?;
            Ok(CommandOutput::Json(serde_json::to_value(template).map_err(
                |e| QueryDeskError::internal(format!("Failed to encode template: {e}")),
            )?))
        }
        TemplateCommand::New(fields) => {
            let mut template = workspace.new_template();
            fields.apply_to(&mut template);
            let id = template.id.clone();
            workspace.save_template(template)?;
            Ok(CommandOutput::info(format!("Created template {id}")))
        }
        TemplateCommand::Edit { id, fields } => {
            let mut template = find_template(workspace, &id)?.clone();
            fields.apply_to(&mut template);
            workspace.save_template(template)?;
            Ok(CommandOutput::info(format!("Updated template {id}")))
        }
        TemplateCommand::Delete { id } => {
            workspace.templates_mut().delete(&id);
            Ok(CommandOutput::info(format!("Deleted template {id}")))
        }
        TemplateCommand::Apply { id } => Ok(CommandOutput::info(workspace.apply_template(&id)?)),
    }
}

fn find_template<'a>(workspace: &'a Workspace, id: &str) -> Result<&'a Template> {
    workspace
        .templates()
        .get(id)
        .ok_or_else(|| QueryDeskError::template(format!("Template '{id}' not found")))
}
