use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

mod anchors;
mod article;
mod config;
mod frontmatter;
mod generator;
mod listing;
mod loader;
mod registry;
mod source;
mod templates;
mod toc;

use config::Config;
use generator::SiteGenerator;
use listing::{LinkStyle, ListingFilter};
use loader::{LoadState, PostLoader};
use registry::{derive_category, excerpt_reading_time, PostMetadata};
use templates::AssetPaths;

const BANNER: &str = r#"
   ◜ f o l i o ◝
   notes • posts
"#;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Render a markdown blog: posts, tables of contents and a listing page")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every registered post and the listing into the output directory
    Generate {
        /// Path to config file
        #[arg(short, long, default_value = "folio.json")]
        config: PathBuf,
    },
    /// Serve posts on demand at /post.html?id=<id>
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "3007")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Path to config file
        #[arg(short, long, default_value = "folio.json")]
        config: PathBuf,
    },
    /// Render a single post and print the resulting view
    Render {
        /// Post identifier
        id: String,

        /// Print the whole page instead of the article fragment
        #[arg(long)]
        page: bool,

        /// Path to config file
        #[arg(short, long, default_value = "folio.json")]
        config: PathBuf,
    },
    /// List registered posts
    List {
        /// Only posts whose title or excerpt contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only posts in this derived category
        #[arg(long)]
        category: Option<String>,

        /// Path to config file
        #[arg(short, long, default_value = "folio.json")]
        config: PathBuf,
    },
    /// Create a new post and register it
    New {
        /// Title of the new post
        #[arg(short, long)]
        title: String,

        /// Excerpt shown on the listing
        #[arg(short, long)]
        excerpt: Option<String>,

        /// Category shown on the post page
        #[arg(long)]
        category: Option<String>,

        /// Path to config file
        #[arg(short, long, default_value = "folio.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config } => {
            println!("{}", BANNER);
            let config = Config::load(&config)
                .context("Failed to load configuration")?;
            let registry = Arc::new(config.registry()?);
            let source = config.source();
            log::info!("reading posts from {}", source.describe());

            let generator = SiteGenerator::new(config, registry, source);
            if let Err(e) = generator.generate().await {
                eprintln!("{}", format!("Error: {:#}", e).red());
                std::process::exit(1);
            }
        }
        Commands::Serve { port, host, config } => {
            println!("{}", BANNER);
            serve_site(config, host, port).await?;
        }
        Commands::Render { id, page, config } => {
            render_post(id, page, config).await?;
        }
        Commands::List { search, category, config } => {
            list_posts(ListingFilter { search, category }, config)?;
        }
        Commands::New { title, excerpt, category, config } => {
            create_new_post(title, excerpt, category, config)?;
        }
    }

    Ok(())
}

async fn serve_site(config_path: PathBuf, host: String, port: u16) -> Result<()> {
    let config = Config::load(&config_path)
        .context("Failed to load configuration")?;
    let registry = Arc::new(config.registry()?);
    let source = config.source();

    println!("{}", "Starting server...".green().bold());
    println!("{}", format!("Posts from: {}", source.describe()).blue());
    println!("{}", format!("URL: http://{}:{}/blog.html", host, port).blue());
    println!("{}", "Press Ctrl+C to stop".yellow());

    let loader = Arc::new(PostLoader::new(registry.clone(), source, config.fetch_timeout()));
    let config = Arc::new(config);

    let post_config = config.clone();
    let post = warp::path("post.html")
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .then(move |query: HashMap<String, String>| {
            let loader = loader.clone();
            let config = post_config.clone();
            async move {
                let state = loader
                    .load_with(query.get("id").map(String::as_str), |state| {
                        log::debug!("serving post.html in state {}", state.name())
                    })
                    .await;
                let status = match state {
                    LoadState::NotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::OK,
                };
                let page = templates::render_post_page(&config, &state, AssetPaths::ROOT, "blog.html");
                warp::reply::with_status(warp::reply::html(page), status)
            }
        });

    let listing_config = config.clone();
    let blog = warp::path("blog.html")
        .and(warp::path::end())
        .or(warp::path::end())
        .unify()
        .and(warp::query::<HashMap<String, String>>())
        .map(move |mut query: HashMap<String, String>| {
            let filter = ListingFilter {
                search: query.remove("search"),
                category: query.remove("category"),
            };
            let listing = listing::render_listing(
                &registry,
                &listing_config.categories,
                &filter,
                &listing_config.intro,
                LinkStyle::Query,
            );
            warp::reply::html(templates::render_listing_page(&listing_config, &listing, AssetPaths::ROOT))
        });

    let css = templates::generate_css();
    let style = warp::path("style.css")
        .and(warp::path::end())
        .map(move || warp::reply::with_header(css.clone(), "content-type", "text/css; charset=utf-8"));

    let js = templates::generate_js();
    let script = warp::path("post.js")
        .and(warp::path::end())
        .map(move || warp::reply::with_header(js.clone(), "content-type", "application/javascript"));

    let generated = warp::fs::dir(PathBuf::from(&config.output_dir));
    let content = warp::fs::dir(PathBuf::from(&config.content_dir));

    let routes = post
        .or(blog)
        .or(style)
        .or(script)
        .or(generated)
        .or(content)
        .with(warp::log("folio"));

    let addr: std::net::IpAddr = host.parse()
        .context("Invalid host address")?;

    warp::serve(routes)
        .run((addr, port))
        .await;

    Ok(())
}

async fn render_post(id: String, page: bool, config_path: PathBuf) -> Result<()> {
    let config = Config::load(&config_path)
        .context("Failed to load configuration")?;
    let registry = Arc::new(config.registry()?);
    let loader = PostLoader::new(registry, config.source(), config.fetch_timeout());

    let state = loader
        .load_with(Some(id.as_str()), |state| {
            if !state.is_terminal() {
                eprintln!("{}", format!("[{}]", state.name()).cyan());
            }
        })
        .await;

    let output = if page {
        templates::render_post_page(&config, &state, AssetPaths::NESTED, "../")
    } else {
        templates::render_state(&config, &state, "../")
    };
    println!("{}", output);

    match &state {
        LoadState::Rendered(article) => {
            eprintln!("{}", format!("Rendered '{}' ({} min read)", article.title, article.reading_time).green());
            Ok(())
        }
        LoadState::NotFound { .. } => bail!("No post registered with id '{}'", id),
        LoadState::Error { message, .. } => bail!("Failed to load '{}': {}", id, message),
        LoadState::Idle | LoadState::Loading { .. } => Ok(()),
    }
}

fn list_posts(filter: ListingFilter, config_path: PathBuf) -> Result<()> {
    let config = Config::load(&config_path)
        .context("Failed to load configuration")?;
    let registry = config.registry()?;
    let cards = listing::cards(&registry, &config.categories, &filter);

    if cards.is_empty() {
        println!("{}", "No posts found.".yellow());
        return Ok(());
    }

    for card in cards {
        println!(
            "{}  {:<10} {}  {} {}",
            card.post.date.format("%Y-%m-%d").to_string().white(),
            card.category.cyan(),
            card.post.id.green(),
            card.post.title,
            format!("(~{} min)", card.reading_time).dimmed()
        );
    }

    Ok(())
}

fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn create_new_post(
    title: String,
    excerpt: Option<String>,
    category: Option<String>,
    config_path: PathBuf,
) -> Result<()> {
    let mut config = Config::load(&config_path)
        .context("Failed to load configuration")?;

    let id = slugify_title(&title);
    if id.is_empty() {
        bail!("Title '{}' does not produce a usable post id", title);
    }
    if config.posts.iter().any(|p| p.id == id) {
        bail!("A post with id '{}' is already registered", id);
    }

    let today = chrono::Local::now().date_naive();
    let file = format!("blog/{}-{}.md", today.format("%Y-%m-%d"), id);
    let file_path = Path::new(&config.content_dir).join(&file);
    if file_path.exists() {
        bail!("File '{}' already exists", file_path.display());
    }
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create blog directory")?;
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\n---\n\n# {}\n\nWrite your post content here...\n",
        title,
        today.format("%Y-%m-%d"),
        title
    );
    std::fs::write(&file_path, content)
        .context("Failed to write new post file")?;

    let excerpt = excerpt.unwrap_or_default();
    let derived = derive_category(&title, &config.categories).to_string();
    config.posts.push(PostMetadata {
        id: id.clone(),
        title: title.clone(),
        date: today,
        file,
        category: category.or(Some(derived)),
        excerpt: excerpt.clone(),
    });
    config.registry()?;
    config.save(&config_path)?;

    println!("{}", "New post created successfully!".green().bold());
    println!();
    println!("{}: {}", "Id".white().bold(), id.cyan());
    println!("{}: {}", "Title".white().bold(), title.cyan());
    println!("{}: {}", "Author".white().bold(), config.author.cyan());
    println!("{}: {}", "Date".white().bold(), today.to_string().cyan());
    if !excerpt.is_empty() {
        println!(
            "{}: {} (~{} min)",
            "Excerpt".white().bold(),
            excerpt.cyan(),
            excerpt_reading_time(&excerpt)
        );
    }
    println!("{}: {}", "File".white().bold(), file_path.display().to_string().cyan());
    println!();
    println!("Next steps:");
    println!("  1. Edit the file: {}", file_path.display().to_string().yellow());
    println!("  2. Preview it: {}", format!("folio render {}", id).yellow());
    println!("  3. Serve locally: {}", "folio serve".yellow());

    Ok(())
}
