use anyhow::{Context, Result};
use clap::Parser;
use fx_imoveis::{config::ConfigLoader, db, repositories::UserRepository};

/// Creates a back-office user, or resets the name and password of an
/// existing one.
#[derive(Debug, Parser)]
#[command(name = "create_admin_user", version)]
struct Args {
    /// Login name
    #[arg(long)]
    username: String,

    /// Display name shown in the back office
    #[arg(long)]
    name: String,

    /// Password, at least 8 characters
    #[arg(long, env = "FX_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new();
    let config = loader.load().context("loading configuration")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await.context("running migrations")?;

    let user = UserRepository::new(&db)
        .upsert(&args.username, &args.name, &args.password)
        .await
        .context("saving admin user")?;

    println!("Admin user '{}' ready (id {})", user.username, user.id);
    Ok(())
}
