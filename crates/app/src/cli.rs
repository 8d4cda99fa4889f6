use attend_core::model::{AdvisorSettings, AdvisorSettingsDraft, AdvisorSettingsError, DEFAULT_TARGET, SubjectId};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_DB_URL: &str = "sqlite://attend.sqlite3";

/// Track class attendance against a target percentage.
#[derive(Debug, Parser)]
#[command(name = "attend", version, about)]
pub struct Cli {
    /// `SQLite` database URL or file path
    #[arg(long = "db", env = "ATTEND_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Log filter (overrides RUST_LOG), e.g. `debug` or `services=info`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub advisor: AdvisorArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct AdvisorArgs {
    /// API key for the tip backend; tips are disabled without one
    #[arg(long = "ai-api-key", env = "ATTEND_AI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long = "ai-base-url", env = "ATTEND_AI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    #[arg(long = "ai-model", env = "ATTEND_AI_MODEL", global = true)]
    pub model: Option<String>,

    #[arg(long = "ai-system-prompt", env = "ATTEND_AI_SYSTEM_PROMPT", global = true)]
    pub system_prompt: Option<String>,
}

impl AdvisorArgs {
    pub fn into_settings(self) -> Result<AdvisorSettings, AdvisorSettingsError> {
        AdvisorSettingsDraft {
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url,
            system_prompt: self.system_prompt,
        }
        .validate()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project attendance from raw counts without saving anything
    Calc {
        #[arg(long)]
        attended: u32,
        #[arg(long)]
        total: u32,
        /// Target percentage, 1 to 100
        #[arg(long, default_value_t = 85.0)]
        target: f64,
    },
    /// Sign in; any password is accepted
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show who is signed in
    Whoami,
    /// Manage tracked subjects
    Subjects {
        #[command(subcommand)]
        command: SubjectsCommand,
    },
    /// Overall attendance and per-subject projections
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Ask the tip backend for advice on subjects below target
    Tips,
    /// Add the sample subjects to the signed-in account
    Seed {
        /// Sign in as this email first
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubjectsCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = DEFAULT_TARGET)]
        target: u8,
    },
    /// Record an attended class
    Present { id: SubjectId },
    /// Record a missed class
    Absent { id: SubjectId },
    Update {
        id: SubjectId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        attended: Option<u32>,
        #[arg(long)]
        total: Option<u32>,
        #[arg(long)]
        target: Option<u8>,
    },
    Delete { id: SubjectId },
}
