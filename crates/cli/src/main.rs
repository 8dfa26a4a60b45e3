//! `flowmill` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`      — execute a workflow JSON file.
//! - `validate` — validate a workflow file and print its execution order.
//! - `status`   — show a persisted run and its node events.
//! - `migrate`  — run pending database migrations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use ai::CompletionClient;
use engine::{ExecutionStore, MemoryExecutionStore, Workflow, WorkflowExecutor};

#[derive(Parser)]
#[command(
    name = "flowmill",
    about = "DAG workflow engine for AI assistant pipelines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a workflow definition JSON file.
    Run {
        /// Path to the workflow JSON file ({"nodes": [...], "edges": [...]}).
        workflow: PathBuf,
        /// Path to a JSON file with the run's input data (defaults to {}).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Persist run state to this Postgres database; in-memory when unset.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        /// Echo prompts back instead of calling the completion provider.
        #[arg(long)]
        mock_ai: bool,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Show a persisted run and its node events.
    Status {
        /// Execution ID printed by `run`.
        execution_id: Uuid,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            workflow,
            input,
            database_url,
            mock_ai,
        } => {
            let definition = read_json(&workflow);
            let workflow: Workflow = serde_json::from_value(definition)
                .unwrap_or_else(|e| panic!("invalid workflow definition: {e}"));

            let input_data = match input {
                Some(path) => read_json(&path),
                None => serde_json::json!({}),
            };

            let store: Arc<dyn ExecutionStore> = match database_url {
                Some(url) => {
                    let pool = db::pool::create_pool(&url, 5)
                        .await
                        .expect("failed to connect to database");
                    Arc::new(db::PgExecutionStore::new(pool))
                }
                None => {
                    info!("no database configured, keeping run state in memory");
                    Arc::new(MemoryExecutionStore::new())
                }
            };

            let client: Arc<dyn CompletionClient> = if mock_ai {
                Arc::new(ai::MockCompletionClient::echoing())
            } else {
                Arc::new(ai::OpenAiClient::new(ai::AiConfig::from_env()))
            };

            let executor = WorkflowExecutor::with_client(store, client);
            let outcome = executor.execute(&workflow, input_data).await;

            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).expect("outcome serializes")
            );
            if !outcome.success {
                std::process::exit(1);
            }
        }

        Command::Validate { path } => {
            let workflow: Workflow = serde_json::from_value(read_json(&path))
                .unwrap_or_else(|e| panic!("invalid workflow definition: {e}"));

            match engine::execution_order(&workflow) {
                Ok(order) => {
                    println!("✅ Workflow is valid. Execution order: {order:?}");
                }
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Command::Status {
            execution_id,
            database_url,
        } => {
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            let run = db::repository::executions::get_execution(&pool, execution_id)
                .await
                .unwrap_or_else(|e| panic!("cannot load execution {execution_id}: {e}"));
            let events = db::repository::executions::list_node_events(&pool, execution_id)
                .await
                .expect("cannot load node events");

            let report = serde_json::json!({
                "execution": run,
                "events": events,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("rows serialize")
            );
        }

        Command::Migrate { database_url } => {
            info!("running migrations");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            db::pool::run_migrations(&pool)
                .await
                .expect("migration failed");
            info!("migrations applied successfully");
        }
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read file {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("invalid JSON in {}: {e}", path.display()))
}
