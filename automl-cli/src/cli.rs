use automl_types::ResourceId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "automl",
    about = "AutoML Studio - train and query models from the terminal",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, env = "AUTOML_API_URL", help = "Backend base URL")]
    pub api_url: Option<String>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(help = "Username or email")]
        username: String,

        #[arg(long, env = "AUTOML_PASSWORD", hide_env_values = true, help = "Password (prompted when omitted; the prompt echoes input)")]
        password: Option<String>,
    },

    #[command(about = "Create an account and log in")]
    Signup {
        #[arg(help = "Email address")]
        email: String,

        #[arg(help = "Username")]
        username: String,

        #[arg(long, env = "AUTOML_PASSWORD", hide_env_values = true, help = "Password (prompted when omitted; the prompt echoes input)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored session token")]
    Logout,

    #[command(about = "Show session and backend status")]
    Status,

    #[command(subcommand, about = "Upload, list and inspect datasets")]
    Datasets(DatasetCommands),

    #[command(about = "List algorithms applicable to a dataset")]
    Algorithms {
        #[arg(help = "Dataset id (defaults to the last used dataset)")]
        dataset: Option<ResourceId>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Train a model on a dataset")]
    Train {
        #[arg(help = "Dataset id (defaults to the last used dataset)")]
        dataset: Option<ResourceId>,

        #[arg(short, long, help = "Target column")]
        target: Option<String>,

        #[arg(long, help = "Task type (classification, regression)")]
        task: Option<String>,

        #[arg(short, long = "feature", help = "Feature column (repeatable, all columns when omitted)")]
        features: Vec<String>,

        #[arg(short, long, help = "Algorithm name")]
        algorithm: Option<String>,

        #[arg(long, conflicts_with_all = ["target", "task", "features", "algorithm"], help = "Reuse the last configuration trained on this dataset")]
        reuse: bool,
    },

    #[command(about = "Show metrics of a trained model")]
    Results {
        #[arg(help = "Model id (defaults to the last trained model)")]
        model: Option<ResourceId>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Show the input schema of a model")]
    Schema {
        #[arg(help = "Model id (defaults to the last trained model)")]
        model: Option<ResourceId>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Run a prediction")]
    Predict {
        #[arg(help = "Model id (defaults to the last trained model)")]
        model: Option<ResourceId>,

        #[arg(short, long = "set", value_name = "FEATURE=VALUE", conflicts_with = "input", help = "Feature value (repeatable)")]
        values: Vec<String>,

        #[arg(long = "json", value_name = "JSON", help = "Record object or array of records")]
        input: Option<String>,
    },

    #[command(about = "Train every applicable algorithm and rank them")]
    Automl {
        #[arg(help = "Dataset id (defaults to the last used dataset)")]
        dataset: Option<ResourceId>,

        #[arg(short, long, help = "Target column")]
        target: String,

        #[arg(long, help = "Task type (detected by the backend when omitted)")]
        task: Option<String>,
    },

    #[command(about = "Show recent activity")]
    History {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(subcommand, about = "View and modify the account")]
    Account(AccountCommands),
}

#[derive(Subcommand)]
pub enum DatasetCommands {
    #[command(about = "List uploaded datasets")]
    List {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Validate and upload a CSV or JSON file")]
    Upload {
        #[arg(help = "Path to the dataset file")]
        path: PathBuf,
    },

    #[command(about = "Show the first rows of a dataset")]
    Preview {
        #[arg(help = "Dataset id (defaults to the last used dataset)")]
        dataset: Option<ResourceId>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Run the backend analysis of a dataset")]
    Analyze {
        #[arg(help = "Dataset id (defaults to the last used dataset)")]
        dataset: Option<ResourceId>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Show account details")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Update account details")]
    Update {
        #[arg(long, help = "New email address")]
        email: Option<String>,

        #[arg(long, help = "New username")]
        username: Option<String>,

        #[arg(long, help = "New password")]
        password: Option<String>,
    },
}

impl Commands {
    /// Stable name of the command, remembered as the last visited path.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Signup { .. } => "signup",
            Self::Logout => "logout",
            Self::Status => "status",
            Self::Datasets(DatasetCommands::List { .. }) => "datasets/list",
            Self::Datasets(DatasetCommands::Upload { .. }) => "datasets/upload",
            Self::Datasets(DatasetCommands::Preview { .. }) => "datasets/preview",
            Self::Datasets(DatasetCommands::Analyze { .. }) => "datasets/analyze",
            Self::Algorithms { .. } => "algorithms",
            Self::Train { .. } => "train",
            Self::Results { .. } => "results",
            Self::Schema { .. } => "schema",
            Self::Predict { .. } => "predict",
            Self::Automl { .. } => "automl",
            Self::History { .. } => "history",
            Self::Account(AccountCommands::Show { .. }) => "account/show",
            Self::Account(AccountCommands::Update { .. }) => "account/update",
        }
    }

    /// Commands that only touch the local session.
    pub const fn is_session_command(&self) -> bool {
        matches!(self, Self::Login { .. } | Self::Signup { .. } | Self::Logout | Self::Status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn password_help_warns_about_echo() {
        let command = Cli::command();
        for name in ["login", "signup"] {
            let sub = command.find_subcommand(name).unwrap();
            let arg = sub.get_arguments().find(|a| a.get_id() == "password").unwrap();
            let help = arg.get_help().unwrap().to_string();
            assert!(help.contains("echoes"), "{name}: {help}");
        }
    }

    #[test]
    fn predict_accepts_repeated_set() {
        let cli = Cli::try_parse_from(["automl", "predict", "5", "--set", "age=31", "-s", "city=Oslo"])
            .unwrap();
        match cli.command {
            Commands::Predict { model, values, input } => {
                assert_eq!(model, Some(ResourceId::from(5)));
                assert_eq!(values, vec!["age=31", "city=Oslo"]);
                assert!(input.is_none());
            },
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn reuse_conflicts_with_explicit_config() {
        assert!(Cli::try_parse_from(["automl", "train", "3", "--reuse", "--target", "y"]).is_err());
        assert!(Cli::try_parse_from(["automl", "train", "3", "--reuse"]).is_ok());
    }

    #[test]
    fn paths_name_nested_commands() {
        let cli = Cli::try_parse_from(["automl", "datasets", "preview", "2"]).unwrap();
        assert_eq!(cli.command.path(), "datasets/preview");
        assert!(!cli.command.is_session_command());
    }
}
