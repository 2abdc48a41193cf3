use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::auth;
use crate::config::{self, AppConfig, JiraConfig, TrelloConfig};
use crate::error::TrackerError;
use crate::pattern::{Pattern, Patterns};
use crate::pipeline::{SyncMode, SyncPipeline};
use crate::providers::jira::{JiraAuth, JiraClient};
use crate::providers::trello::TrelloClient;

const DEFAULT_LIST_PATTERN: &str = "MUST PER (RELEASE|BUILD)";

/// Sync Trello cards into Jira issues.
#[derive(Debug, Parser)]
#[command(name = "cardsync", version)]
pub struct Cli {
    /// Log debug information to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store Trello and Jira credentials for further queries
    Target(TargetArgs),
    /// Query Trello boards for cards matching a pattern and print them as JSON
    Query(QueryArgs),
    /// Sync cards of matching Trello boards into a Jira epic
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Jira host, e.g. issues.example.com
    pub jira_host: String,
    #[arg(long)]
    pub trello_key: String,
    #[arg(long)]
    pub trello_token: String,
    #[arg(long, required_unless_present = "gss_api")]
    pub jira_user: Option<String>,
    #[arg(long, required_unless_present = "gss_api")]
    pub jira_password: Option<String>,
    /// Negotiate a Jira session with Kerberos instead of a password
    #[arg(long)]
    pub gss_api: bool,
    /// Skip TLS certificate verification against Jira
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Debug, Args)]
pub struct CardFilter {
    /// Board name pattern (case insensitive)
    pub board_regexp: String,
    /// List name pattern (case insensitive)
    #[arg(long, default_value = DEFAULT_LIST_PATTERN)]
    pub list_regexp: String,
    /// Card name pattern (case insensitive)
    #[arg(long, default_value = ".*")]
    pub card_regexp: String,
}

impl CardFilter {
    fn patterns(&self) -> Result<Patterns> {
        Ok(Patterns::new(
            &self.board_regexp,
            &self.list_regexp,
            &self.card_regexp,
        )?)
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub filter: CardFilter,
    /// Keep only cards whose summary, description, checklists or labels match (case insensitive)
    #[arg(long, default_value = ".*")]
    pub content_regexp: String,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub filter: CardFilter,
    /// Key of the Jira epic new issues are linked to
    pub epic: String,
    /// Do not push anything to Jira
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Target(args) => handle_target(args),
        Command::Query(args) => handle_query(args).await,
        Command::Sync(args) => handle_sync(args).await,
    }
}

fn handle_target(args: TargetArgs) -> Result<()> {
    let mut config = config::load_config().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unable to read existing configuration");
        AppConfig::default()
    });
    let extra_labels = config
        .jira
        .take()
        .map(|j| j.extra_labels)
        .unwrap_or_default();

    config.trello = Some(TrelloConfig {
        key: args.trello_key,
        token: args.trello_token,
    });
    config.jira = Some(JiraConfig {
        host: args.jira_host,
        username: args.jira_user,
        password: args.jira_password,
        gss_api: args.gss_api,
        strict_ssl: !args.insecure,
        extra_labels,
    });

    let path = config::save_config(&config)?;
    println!("Configuration stored in {}", path.display());
    Ok(())
}

async fn handle_query(args: QueryArgs) -> Result<()> {
    let config = config::load_config()?;
    let patterns = args.filter.patterns()?;
    let content = Pattern::new(&args.content_regexp)?;

    let trello = trello_client(config.trello()?);
    let cards = SyncPipeline::new(&trello)
        .collect(&patterns)
        .await
        .context("Unable to fetch cards from Trello")?;
    tracing::debug!("Query contains {} cards before the content filter", cards.len());

    let cards: Vec<_> = cards
        .into_iter()
        .filter(|c| c.matches_content(&content))
        .collect();
    tracing::debug!("Query contains {} cards after the content filter", cards.len());

    println!("{}", serde_json::to_string_pretty(&cards)?);
    Ok(())
}

async fn handle_sync(args: SyncArgs) -> Result<()> {
    let config = config::load_config()?;
    let patterns = args.filter.patterns()?;
    let trello = trello_client(config.trello()?);
    let jira_config = config.jira()?;
    let pipeline = SyncPipeline::new(&trello);

    // Dry run never talks to Jira
    if args.dry_run {
        println!("-- Dry run --");
        let report = pipeline.sync(&patterns, SyncMode::Preview).await?;
        println!("{}", serde_json::to_string_pretty(&report.cards)?);
        println!(
            "Dry-run - otherwise would create {} issues linked to {}",
            report.cards.len(),
            args.epic
        );
        return Ok(());
    }

    // Authenticate, then collect cards and create issues under the epic
    let jira = jira_client(jira_config).await?;
    let report = pipeline
        .sync(
            &patterns,
            SyncMode::Apply {
                tracker: &jira,
                epic: &args.epic,
                extra_labels: &jira_config.extra_labels,
            },
        )
        .await?;

    println!(
        "Created {} issues in epic {} based on content of '{}' lists in '{}' boards",
        report.issues.len(),
        args.epic,
        args.filter.list_regexp,
        args.filter.board_regexp
    );
    // Browse links for the created issues
    for issue in &report.issues {
        println!("  - https://{}/browse/{}", jira_config.host, issue.key);
    }
    Ok(())
}

fn trello_client(config: &TrelloConfig) -> TrelloClient {
    TrelloClient::new(config.key.clone(), config.token.clone())
}

async fn jira_client(config: &JiraConfig) -> Result<JiraClient> {
    let auth = jira_auth(config).await?;
    let client = JiraClient::new(&config.host, &auth, config.strict_ssl).map_err(TrackerError::from)?;
    Ok(client)
}

async fn jira_auth(config: &JiraConfig) -> Result<JiraAuth> {
    if config.gss_api {
        let cookie = auth::negotiate_session(&config.host, config.strict_ssl)
            .await
            .map_err(TrackerError::from)?;
        return Ok(JiraAuth::Session(cookie));
    }

    let username = config
        .username
        .clone()
        .context("Jira username is not configured and gss_api is disabled")?;
    let password = config
        .password
        .clone()
        .context("Jira password is not configured and gss_api is disabled")?;
    Ok(JiraAuth::Basic { username, password })
}
