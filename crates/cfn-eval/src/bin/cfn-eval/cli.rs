//! cfn-eval cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a CloudFormation expression
    ///
    /// The expression is parsed as json. Anything that is not valid json is taken as a string.
    #[command(alias = "eval")]
    Evaluate(EvaluateCommand),

    /// Best-effort physical name of a resource
    PhysicalName(PhysicalNameCommand),

    /// List resources referencing a logical id
    References(ReferencesCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Expression to evaluate
    pub expression: String,
}

#[derive(Parser, Debug)]
pub struct PhysicalNameCommand {
    /// Logical id of the resource
    pub logical_id: String,

    /// Physical name expression from the template, tried before the deployed resource
    #[clap(long = "expr")]
    pub expression: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ReferencesCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Logical id of the referenced resource
    pub logical_id: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// CloudFormation template (.json, .yaml or .yml)
    #[clap(short = 't', long = "template", global(true))]
    pub template: Option<PathBuf>,

    /// Cloud state: deployed stack resources, exports and nested stacks (.json, .yaml or .yml)
    #[clap(short = 's', long = "state", global(true))]
    pub state: Option<PathBuf>,

    /// Name of the deployed stack
    #[clap(long = "stack-name", default_value = "stack", global(true))]
    pub stack_name: String,

    #[clap(long = "account", default_value = "111111111111", global(true))]
    pub account: String,

    #[clap(long = "region", default_value = "us-east-1", global(true))]
    pub region: String,

    /// Derived from the region unless given
    #[clap(long = "partition", global(true))]
    pub partition: Option<String>,

    /// Parameter value, as KEY=VALUE
    ///
    /// Can be specified multiple times.
    #[clap(short = 'p', long = "parameter", value_parser = parse_parameter, global(true))]
    pub parameters: Vec<(String, String)>,
}

fn parse_parameter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid parameter {s:?}, expected KEY=VALUE"))
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    Template,
    State,
}
