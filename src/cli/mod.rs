pub mod commands;
pub mod context;
pub mod output;

use clap::{Args, Parser, Subcommand};

use crate::core::models::ai::DocumentKind;
use crate::core::models::common::{Actor, Level};
use crate::core::models::configuration_item::{CiStatus, CiType};
use crate::core::models::process_asset::AssetType;
use crate::core::models::requirement::{Priority, RequirementStatus};
use crate::core::models::risk::RiskStatus;
use crate::core::models::test_case::TestStatus;

/// Track requirements, risks, tests and configuration items. Keep them in GitHub.
#[derive(Parser, Debug)]
#[command(name = "ignition", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace directory
    #[arg(long, global = true, default_value = ".ignition")]
    pub dir: String,

    /// GitHub Personal Access Token
    #[arg(long, global = true, env = "IGNITION_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub ai_key: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Ignition in the current project
    Init {
        /// Project name (default: current directory name)
        #[arg(long)]
        name: Option<String>,
        /// GitHub repository used for sync (owner/repo or URL)
        #[arg(long)]
        repo: Option<String>,
    },

    /// Manage requirements
    Req {
        #[command(subcommand)]
        action: ReqAction,
    },

    /// Manage test cases
    Test {
        #[command(subcommand)]
        action: TestAction,
    },

    /// Manage risks
    Risk {
        #[command(subcommand)]
        action: RiskAction,
    },

    /// Manage configuration items
    Ci {
        #[command(subcommand)]
        action: CiAction,
    },

    /// Manage reusable process assets
    Asset {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Link requirements to tests, risks, configuration items or issues
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Delete any entity by id and remove every reference to it
    Remove {
        /// Entity id or unique id prefix
        id: String,
    },

    /// Show project metrics
    Dashboard,

    /// Show the audit log
    Log {
        /// Filter by actor
        #[arg(long, value_enum)]
        actor: Option<Actor>,
        /// Filter by event type (e.g. EntityCreated)
        #[arg(long)]
        event: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },

    /// Push the project to GitHub
    Push {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Replace the local project with the copy on GitHub
    Pull,

    /// List open GitHub issues
    Issues,

    /// Work with GitHub pull requests
    Prs {
        #[command(subcommand)]
        action: PrsAction,
    },

    /// AI-assisted documents, reviews and scaffolding
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Write the whole project to a JSON file
    Export {
        /// Destination file
        file: String,
    },

    /// Replace the local project with a JSON file
    Import {
        /// Source file
        file: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReqAction {
    /// Add a requirement
    Add {
        description: String,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    /// Update a requirement
    Update {
        /// Requirement id or unique prefix
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<RequirementStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },
    /// List requirements
    List {
        #[arg(long, value_enum)]
        status: Option<RequirementStatus>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TestAction {
    /// Add a test case
    Add {
        description: String,
        /// Gherkin scenario text
        #[arg(long)]
        gherkin: Option<String>,
    },
    /// Update a test case
    Update {
        /// Test case id or unique prefix
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TestStatus>,
        #[arg(long)]
        gherkin: Option<String>,
    },
    /// List test cases
    List {
        #[arg(long, value_enum)]
        status: Option<TestStatus>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RiskAction {
    /// Add a risk
    Add {
        description: String,
        #[arg(long, value_enum, default_value_t = Level::Medium)]
        probability: Level,
        #[arg(long, value_enum, default_value_t = Level::Medium)]
        impact: Level,
        #[arg(long)]
        mitigation: Option<String>,
    },
    /// Update a risk
    Update {
        /// Risk id or unique prefix
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        probability: Option<Level>,
        #[arg(long, value_enum)]
        impact: Option<Level>,
        #[arg(long, value_enum)]
        status: Option<RiskStatus>,
        #[arg(long)]
        mitigation: Option<String>,
    },
    /// List risks, highest score first
    List {
        /// Only open risks
        #[arg(long)]
        open: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CiAction {
    /// Add a configuration item
    Add {
        name: String,
        #[arg(long = "type", value_enum, default_value_t = CiType::Software)]
        ci_type: CiType,
        #[arg(long, default_value = "0.1.0")]
        version: String,
        #[arg(long, value_enum)]
        status: Option<CiStatus>,
        /// Quality attribute (repeatable)
        #[arg(long = "quality")]
        quality: Vec<String>,
        /// Id of a configuration item this one depends on (repeatable)
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },
    /// Update a configuration item
    Update {
        /// Configuration item id or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_enum)]
        ci_type: Option<CiType>,
        #[arg(long)]
        version: Option<String>,
        #[arg(long, value_enum)]
        status: Option<CiStatus>,
        /// Add a quality attribute (repeatable)
        #[arg(long = "quality")]
        quality: Vec<String>,
        /// Add a dependency (repeatable)
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
        /// Remove a dependency (repeatable)
        #[arg(long = "drop-dependency")]
        drop_dependency: Vec<String>,
    },
    /// List configuration items
    List {
        #[arg(long = "type", value_enum)]
        ci_type: Option<CiType>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssetAction {
    /// Add a process asset
    Add {
        name: String,
        #[arg(long = "type", value_enum)]
        asset_type: AssetType,
        /// Template content
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List process assets
    List,
    /// Create an entity from a process asset
    Apply {
        /// Asset id or unique prefix
        id: String,
    },
}

/// Exactly one link target.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct LinkTargetArgs {
    /// Test case id or unique prefix
    #[arg(long)]
    pub test: Option<String>,
    /// Risk id or unique prefix
    #[arg(long)]
    pub risk: Option<String>,
    /// Configuration item id or unique prefix
    #[arg(long)]
    pub ci: Option<String>,
    /// GitHub issue number
    #[arg(long)]
    pub issue: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum LinkAction {
    /// Add a link
    Add {
        /// Requirement id or unique prefix
        requirement: String,
        #[command(flatten)]
        target: LinkTargetArgs,
    },
    /// Remove a link
    Remove {
        /// Requirement id or unique prefix
        requirement: String,
        #[command(flatten)]
        target: LinkTargetArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum PrsAction {
    /// List open pull requests
    List,
    /// List files changed by a pull request
    Files { number: u64 },
    /// Comment on a pull request
    Comment { number: u64, body: String },
}

#[derive(Subcommand, Debug)]
pub enum AiAction {
    /// Draft a document from project data
    Draft {
        #[arg(value_enum)]
        kind: DocumentKind,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Review a pull request against the project
    ReviewPr {
        number: u64,
        /// Post the review as a PR comment
        #[arg(long)]
        comment: bool,
    },
    /// Propose initial files for a repository
    Scaffold {
        description: String,
        /// Commit the proposed files to the configured repository
        #[arg(long)]
        commit: bool,
    },
}
