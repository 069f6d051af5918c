use clap::{Args, Subcommand};
use std::io::{self, Write};

use todo_api::{TodoGateway, TodoItem, TodoPayload};

use super::OutputFormat;

#[derive(Args)]
pub struct TodoCommand {
    #[command(subcommand)]
    pub command: TodoSubcommand,
}

#[derive(Subcommand)]
pub enum TodoSubcommand {
    /// Create a new todo item
    Create {
        /// Title of the item
        title: String,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// List all todo items
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a todo item
    Show {
        /// Item ID (32 hex digits)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing todo item
    Update {
        /// Item ID (32 hex digits)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete a todo item
    Delete {
        /// Item ID (32 hex digits)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

fn payload_bytes(payload: &TodoPayload) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(payload)
}

impl TodoCommand {
    pub async fn run(&self, gateway: &TodoGateway) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TodoSubcommand::Create { title, description } => {
                if title.trim().is_empty() {
                    return Err("Title cannot be empty".into());
                }

                let payload =
                    TodoPayload::new(title.trim(), description.clone().unwrap_or_default());
                let created = gateway.create(&payload_bytes(&payload)?).await?;
                println!("Created todo:");
                println!("{}", created);
                Ok(())
            }

            TodoSubcommand::List { format } => {
                let items = gateway.list().await?;

                if items.is_empty() {
                    println!("No todo items found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&items)?);
                    }
                    OutputFormat::Text => print_table(&items),
                }
                Ok(())
            }

            TodoSubcommand::Show { id, format } => {
                let item = gateway.get(id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&item)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", item);
                    }
                }
                Ok(())
            }

            TodoSubcommand::Update {
                id,
                title,
                description,
            } => {
                if title.is_none() && description.is_none() {
                    return Err("No updates specified. Use --title or --description.".into());
                }

                // Replace overwrites every field, so fill unspecified ones from the current item
                let current = gateway.get(id).await?;
                let payload = TodoPayload::new(
                    title.clone().unwrap_or(current.title),
                    description.clone().unwrap_or(current.description),
                );

                let updated = gateway.replace(id, &payload_bytes(&payload)?).await?;
                println!("Updated todo:");
                println!("{}", updated);
                Ok(())
            }

            TodoSubcommand::Delete { id, force } => {
                let item = gateway.get(id).await?;

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete todo '{}'? [y/N] ", item.title);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                gateway.delete(id).await?;
                println!("Deleted todo: {}", item.title);
                Ok(())
            }
        }
    }
}

fn print_table(items: &[TodoItem]) {
    println!("{:<32}  {:<30}  DESCRIPTION", "ID", "TITLE");
    println!("{}", "-".repeat(90));
    for item in items {
        println!(
            "{:<32}  {:<30}  {}",
            item.id,
            truncate(&item.title, 30),
            truncate(&item.description, 24)
        );
    }
    println!("\nTotal: {} item(s)", items.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
