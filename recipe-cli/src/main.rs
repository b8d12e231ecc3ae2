use clap::{Args, Parser, Subcommand};
use recipe_client::{LabelKind, RecipeClientHttp, RecipeClientTrait, RecipeInput};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long)]
    server: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        name: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Show the logged-in account.
    Me,
    #[clap(subcommand)]
    Recipes(RecipeCommand),
    #[clap(subcommand)]
    Tags(LabelCommand),
    #[clap(subcommand)]
    Ingredients(LabelCommand),
}

#[derive(Subcommand, Debug)]
enum RecipeCommand {
    List,
    Get {
        id: i64,
    },
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        time_minutes: i32,
        #[clap(long)]
        price: Decimal,
        #[clap(flatten)]
        extra: RecipeExtra,
    },
    Update {
        id: i64,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        time_minutes: Option<i32>,
        #[clap(long)]
        price: Option<Decimal>,
        #[clap(flatten)]
        extra: RecipeExtra,
        /// Remove every tag from the recipe.
        #[clap(long, conflicts_with = "tags")]
        clear_tags: bool,
        /// Remove every ingredient from the recipe.
        #[clap(long, conflicts_with = "ingredients")]
        clear_ingredients: bool,
        /// Send a full replacement (PUT) instead of a partial update.
        #[clap(long)]
        replace: bool,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct RecipeExtra {
    #[clap(long)]
    description: Option<String>,
    #[clap(long)]
    link: Option<String>,
    #[clap(long = "tag")]
    tags: Vec<String>,
    #[clap(long = "ingredient")]
    ingredients: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum LabelCommand {
    List {
        /// Only labels used by at least one of your recipes.
        #[clap(long)]
        assigned_only: bool,
    },
    Rename {
        id: i64,
        #[clap(long)]
        name: String,
    },
    Delete {
        id: i64,
    },
}

fn labels(names: Vec<String>, clear: bool) -> Option<Vec<String>> {
    if clear || !names.is_empty() {
        Some(names)
    } else {
        None
    }
}

async fn run_labels(
    client: &mut impl RecipeClientTrait,
    kind: LabelKind,
    command: LabelCommand,
) -> anyhow::Result<()> {
    match command {
        LabelCommand::List { assigned_only } => {
            let list = client.list_labels(kind, assigned_only).await?;
            println!("{} ({})", kind.path(), list.len());
            for label in list {
                println!("- [{}] {}", label.id, label.name);
            }
        }
        LabelCommand::Rename { id, name } => {
            let label = client.rename_label(kind, id, name).await?;
            println!("Renamed: [{}] {}", label.id, label.name);
        }
        LabelCommand::Delete { id } => {
            client.delete_label(kind, id).await?;
            println!("Deleted!");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let endpoint = args.server.as_deref().unwrap_or("http://127.0.0.1:8080");
    let mut client = RecipeClientHttp::connect(endpoint).await?;

    match args.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            client.register(email, password, name).await?;
            println!("Successfully registered!");
        }
        Command::Login { email, password } => {
            client.login(email, password).await?;
            println!("Successfully logged in!");
        }
        Command::Me => {
            let user = client.me().await?;
            println!("{} <{}> ({})", user.name, user.email, user.id);
        }
        Command::Recipes(command) => match command {
            RecipeCommand::List => {
                let recipes = client.list_recipes().await?;
                println!("Recipes ({})", recipes.len());
                for recipe in recipes {
                    println!(
                        "- [{}] {} ({} min, {})",
                        recipe.id, recipe.title, recipe.time_minutes, recipe.price
                    );
                }
            }
            RecipeCommand::Get { id } => {
                let recipe = client.get_recipe(id).await?;
                println!("{}", recipe);
            }
            RecipeCommand::Create {
                title,
                time_minutes,
                price,
                extra,
            } => {
                let input = RecipeInput {
                    title: Some(title),
                    time_minutes: Some(time_minutes),
                    price: Some(price),
                    description: extra.description,
                    link: extra.link,
                    tags: labels(extra.tags, false),
                    ingredients: labels(extra.ingredients, false),
                };
                let recipe = client.create_recipe(input).await?;
                println!("Recipe created! ID: {}", recipe.id);
            }
            RecipeCommand::Update {
                id,
                title,
                time_minutes,
                price,
                extra,
                clear_tags,
                clear_ingredients,
                replace,
            } => {
                let input = RecipeInput {
                    title,
                    time_minutes,
                    price,
                    description: extra.description,
                    link: extra.link,
                    tags: labels(extra.tags, clear_tags),
                    ingredients: labels(extra.ingredients, clear_ingredients),
                };
                let recipe = client.update_recipe(id, input, replace).await?;
                println!("Recipe updated:\n{}", recipe);
            }
            RecipeCommand::Delete { id } => {
                client.delete_recipe(id).await?;
                println!("Recipe deleted!");
            }
        },
        Command::Tags(command) => run_labels(&mut client, LabelKind::Tag, command).await?,
        Command::Ingredients(command) => {
            run_labels(&mut client, LabelKind::Ingredient, command).await?
        }
    }

    Ok(())
}
