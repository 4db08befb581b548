mod cli;

use cfn_eval::client::InMemoryClient;
use cfn_eval::context::EvaluationContext;
use cfn_eval::evaluator::{Evaluator, EvaluatorProps};
use cfn_eval::template::{NestedStackTemplates, Template};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;

/// Everything known about the deployed cloud state
#[derive(Deserialize, Debug, Default)]
struct State {
    #[serde(flatten)]
    client: InMemoryClient,
    #[serde(default)]
    nested_stacks: IndexMap<String, NestedStackTemplates>,
}

#[tokio::main]
async fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFN_EVAL_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = run(cli).await;

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let template = load_template(&cli.input)?;
    let state = load_state(&cli.input)?;

    match cli.command {
        cli::Command::Evaluate(evaluate_cli) => {
            let evaluator = evaluator(&cli.input, template, state);
            evaluate(evaluator, evaluate_cli).await
        }
        cli::Command::PhysicalName(physical_name_cli) => {
            let evaluator = evaluator(&cli.input, template, state);
            physical_name(evaluator, physical_name_cli).await
        }
        cli::Command::References(references_cli) => {
            let evaluator = evaluator(&cli.input, template, state);
            let references = evaluator.find_references_to(&references_cli.logical_id);
            output(&references_cli.output, &references)
        }
        cli::Command::Dev(dev_cli) => dev(dev_cli, &template, &state),
    }
}

fn load_template(input: &cli::InputArgs) -> anyhow::Result<Template> {
    match &input.template {
        Some(path) => Ok(Template::from_path(path)?),
        None => Ok(Template::default()),
    }
}

fn load_state(input: &cli::InputArgs) -> anyhow::Result<State> {
    match &input.state {
        Some(path) => Ok(cfn_eval::template::load(path)?),
        None => Ok(State::default()),
    }
}

fn evaluator(input: &cli::InputArgs, template: Template, state: State) -> Evaluator {
    let mut context = EvaluationContext::new(&input.account, &input.region);
    if let Some(partition) = &input.partition {
        context = context.with_partition(partition);
    }
    for (key, value) in &input.parameters {
        context = context.with_parameter(key, value.as_str());
    }

    Evaluator::new(EvaluatorProps {
        stack_name: input.stack_name.clone(),
        template,
        context,
        nested_stacks: state.nested_stacks,
        client: Arc::new(state.client),
    })
}

/// Parse as json, fall back to a plain string
fn parse_expression(expression: &str) -> serde_json::Value {
    serde_json::from_str(expression).unwrap_or_else(|_| expression.into())
}

async fn evaluate(evaluator: Evaluator, cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    let expression = parse_expression(&cli.expression);
    let value = evaluator.evaluate(&expression).await?;

    output(&cli.output, &value)
}

async fn physical_name(
    evaluator: Evaluator,
    cli: cli::PhysicalNameCommand,
) -> anyhow::Result<()> {
    let expression = cli.expression.as_deref().map(parse_expression);
    let name = evaluator
        .establish_resource_physical_name(&cli.logical_id, expression.as_ref())
        .await?;

    match name {
        Some(name) => println!("{name}"),
        None => anyhow::bail!("No physical name found for {}", cli.logical_id),
    }

    Ok(())
}

fn output(output: &cli::OutputArgs, value: &impl serde::Serialize) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), value)?;
            println!();
        }
    };

    Ok(())
}

/// (cfn-eval-)developer utilities
///
/// A quick way to expose loaded inputs for debugging purposes
fn dev(cli: cli::DevCommand, template: &Template, state: &State) -> anyhow::Result<()> {
    match cli.command {
        cli::DevSubCommand::Template => println!("{template:#?}"),
        cli::DevSubCommand::State => println!("{state:#?}"),
    }

    Ok(())
}
