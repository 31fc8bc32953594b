use std::path::PathBuf;
use std::sync::Arc;

use newsroll::models::{Cluster, RawItem, Table, TagTree};
use newsroll::{Config, DirTransport, NewsStore, Result};

const USAGE: &str = "usage: newsroll [--data-dir DIR] <command>

commands:
  meta                 show the latest id of every table
  recent [N]           newest raw items (default 20)
  clusters [N]         newest clusters (default 20)
  item ID              one raw item
  cluster ID           one cluster and its items
  tag ID [N]           items listed under a tag (default 20)
  tags                 the tag tree
  search QUERY [N]     search recent raw items (default 20)
  pages                ids that get a static page";

const DEFAULT_LIMIT: usize = 20;
const WIDTH: usize = 80;

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Meta,
    Recent(usize),
    Clusters(usize),
    Item(u64),
    Cluster(u64),
    Tag(u64, usize),
    Tags,
    Search(String, usize),
    Pages,
}

fn usage_error(msg: &str) -> newsroll::AppError {
    anyhow::anyhow!("{}\n\n{}", msg, USAGE).into()
}

fn parse_number<T: std::str::FromStr>(arg: Option<&String>, what: &str) -> Result<Option<T>> {
    match arg {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| usage_error(&format!("invalid {}: {}", what, s))),
    }
}

fn parse_command(args: &[String]) -> Result<Command> {
    let Some(name) = args.first() else {
        return Ok(Command::Help);
    };
    let limit = |i: usize| -> Result<usize> {
        Ok(parse_number(args.get(i), "limit")?.unwrap_or(DEFAULT_LIMIT))
    };
    let id = |i: usize| -> Result<u64> {
        parse_number(args.get(i), "id")?.ok_or_else(|| usage_error("missing id"))
    };

    let command = match name.as_str() {
        "help" | "-h" | "--help" => Command::Help,
        "meta" => Command::Meta,
        "recent" => Command::Recent(limit(1)?),
        "clusters" => Command::Clusters(limit(1)?),
        "item" => Command::Item(id(1)?),
        "cluster" => Command::Cluster(id(1)?),
        "tag" => Command::Tag(id(1)?, limit(2)?),
        "tags" => Command::Tags,
        "search" => {
            let query = args.get(1).ok_or_else(|| usage_error("missing query"))?;
            Command::Search(query.clone(), limit(2)?)
        }
        "pages" => Command::Pages,
        other => return Err(usage_error(&format!("unknown command: {}", other))),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // Check for --data-dir flag (read a local mirror instead of the API)
    let data_dir = if args.len() >= 2 && args[0] == "--data-dir" {
        let dir = PathBuf::from(args.remove(1));
        args.remove(0);
        Some(dir)
    } else {
        None
    };

    let command = parse_command(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }
    let config = Config::load()?;

    let store = match data_dir {
        Some(dir) => NewsStore::new(Arc::new(DirTransport::new(dir)), &config),
        None => NewsStore::from_config(&config)?,
    };

    run(&store, command).await
}

async fn run(store: &NewsStore, command: Command) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Meta => {
            let meta = store.fetch_meta().await?;
            match meta.generated_at {
                Some(at) => println!("generated at {}", at.to_rfc3339()),
                None => println!("generated at unknown"),
            }
            for table in Table::all() {
                println!("  {:<14} {}", table.as_str(), meta.latest_id(table));
            }
        }
        Command::Recent(limit) => {
            for item in store.fetch_recent::<RawItem>(limit).await? {
                print_item(&item);
            }
        }
        Command::Clusters(limit) => {
            for cluster in store.fetch_recent::<Cluster>(limit).await? {
                print_cluster(&cluster);
            }
        }
        Command::Item(id) => match store.fetch_by_id::<RawItem>(id).await {
            Some(item) => {
                print_item(&item);
                if let Some(source) = store.resolve_source(&item).await? {
                    println!("    source: {}", source.title);
                }
            }
            None => println!("item {} not found", id),
        },
        Command::Cluster(id) => match store.fetch_cluster(id).await {
            Some(cluster) => {
                print_cluster(&cluster);
                for item in store.cluster_items(&cluster).await {
                    print_item(&item);
                }
            }
            None => println!("cluster {} not found", id),
        },
        Command::Tag(id, limit) => {
            let items = store.fetch_by_tag(id, limit).await?;
            if items.is_empty() {
                println!("no items for tag {}", id);
            }
            for item in items {
                print_item(&item);
            }
        }
        Command::Tags => {
            let tree = store.tag_tree().await?;
            for root in tree.roots() {
                print_tag(&tree, root.id, 0);
            }
        }
        Command::Search(query, limit) => {
            let hits = store.search::<RawItem>(&query, limit).await?;
            println!("{} matches for {:?}", hits.len(), query);
            for item in hits {
                print_item(&item);
            }
        }
        Command::Pages => {
            let items = store.static_page_ids::<RawItem>().await?;
            let clusters = store.static_page_ids::<Cluster>().await?;
            println!("news_raw: {} pages", items.len());
            println!("news_articles: {} pages", clusters.len());
            for id in clusters {
                println!("  /article/{}", id);
            }
        }
    }
    Ok(())
}

fn wrapped(text: &str) -> String {
    textwrap::indent(&textwrap::fill(text.trim(), WIDTH - 4), "    ")
}

fn print_item(item: &RawItem) {
    println!("#{} {}", item.id, item.title);
    if let Some(created) = item.created_at {
        println!("    {}", created.format("%Y-%m-%d %H:%M"));
    }
    if !item.body.trim().is_empty() {
        println!("{}", wrapped(&item.body));
    }
}

fn print_cluster(cluster: &Cluster) {
    println!("[{}] {} ({} items)", cluster.id, cluster.title, cluster.articles.len());
    if !cluster.description.trim().is_empty() {
        println!("{}", wrapped(&cluster.description));
    }
}

fn print_tag(tree: &TagTree, id: u64, depth: usize) {
    let Some(tag) = tree.get(id) else {
        return;
    };
    println!("{}{} ({})", "  ".repeat(depth), tag.name, tag.id);
    // multi-parent tags show up under each parent; depth guards against cycles
    if depth < 16 {
        for child in tree.children(id) {
            print_tag(tree, child.id, depth + 1);
        }
    }
}
