use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use muddle::cluster::{attach_clusters, project_2d, Clustering, Kmeans};
use muddle::dataset::{ingredient_counts, prepare, profiles, Cocktail, Dataset, Ingredient};
use muddle::plot::ScatterPlot;
use muddle::similarity::Recommender;
use muddle::vectorize::vectorize;
use muddle::PipelineConfig;

#[derive(Parser)]
#[command(name = "muddle")]
#[command(about = "Cocktail recommendations and ingredient clusters", long_about = None)]
struct Cli {
    /// Cocktail dataset (JSON array, or an object with a `data` array)
    #[arg(short, long, env = "MUDDLE_DATA")]
    data: PathBuf,

    /// Drop createdAt/updatedAt columns (the default)
    #[arg(long, overrides_with = "keep_times")]
    drop_times: bool,

    /// Keep createdAt/updatedAt columns (parsed as date-times)
    #[arg(long, overrides_with = "drop_times")]
    keep_times: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Timestamp handling requested on the command line, if any. The last of
    /// `--drop-times` and `--keep-times` wins.
    fn drop_times(&self) -> Option<bool> {
        if self.drop_times {
            Some(true)
        } else if self.keep_times {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest cocktails with the most similar ingredients
    Recommend {
        /// Exact cocktail name
        name: String,
        /// How many suggestions to show
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Group cocktails by ingredient composition
    Cluster {
        /// Number of clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,
        /// Seed for k-means initialisation
        #[arg(long)]
        seed: Option<u64>,
        /// Write scatter-plot data (JSON) to this file
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Leave cocktail names off the plot
        #[arg(long)]
        no_labels: bool,
    },
    /// Show how often each ingredient is used
    Ingredients {
        /// Show only the most used N
        #[arg(short = 'n', long, default_value_t = 20)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("reading MUDDLE_* settings")?;
    if let Some(drop_times) = cli.drop_times() {
        config = config.with_drop_times(drop_times);
    }

    let (cocktails, ingredients) = load(&cli.data, config.drop_times)?;

    match cli.command {
        Commands::Recommend { name, top_k } => {
            if let Some(k) = top_k {
                config = config.with_top_k(k);
            }
            config.validate()?;
            run_recommend(&config, &cocktails, &ingredients, &name)
        }
        Commands::Cluster {
            clusters,
            seed,
            plot,
            no_labels,
        } => {
            if let Some(k) = clusters {
                config = config.with_n_clusters(k);
            }
            if let Some(s) = seed {
                config = config.with_seed(s);
            }
            if no_labels {
                config = config.with_annotate(false);
            }
            config.validate()?;
            run_cluster(&config, cocktails, &ingredients, plot.as_deref())
        }
        Commands::Ingredients { top } => run_ingredients(&cocktails, &ingredients, top),
    }
}

fn load(path: &Path, drop_times: bool) -> Result<(Vec<Cocktail>, Vec<Ingredient>)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let dataset = Dataset::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(cocktails = dataset.len(), path = %path.display(), "loaded dataset");

    let tables = prepare(dataset.records(), drop_times).context("preprocessing dataset")?;
    Ok(tables)
}

fn run_recommend(
    config: &PipelineConfig,
    cocktails: &[Cocktail],
    ingredients: &[Ingredient],
    name: &str,
) -> Result<()> {
    let table = profiles(cocktails, ingredients)?;
    let recommender = Recommender::fit(&table).with_top_k(config.top_k);

    let query = recommender.index_of(name)?;
    let picks = recommender.neighbors(name)?;

    println!("Your cocktail:");
    println!("  {} ({})", table[query].name, table[query].ingredients);
    println!("Suggested cocktails (most similar at the top):");
    for (row, score) in picks {
        let pick = &table[row];
        println!("  {score:.3}  {} ({})", pick.name, pick.ingredients);
    }
    Ok(())
}

fn run_cluster(
    config: &PipelineConfig,
    mut cocktails: Vec<Cocktail>,
    ingredients: &[Ingredient],
    plot_path: Option<&Path>,
) -> Result<()> {
    let table = profiles(&cocktails, ingredients)?;
    let docs: Vec<&str> = table.iter().map(|p| p.ingredients.as_str()).collect();
    let (matrix, vocab) = vectorize(&docs);
    tracing::info!(cocktails = matrix.nrows(), tokens = vocab.len(), "vectorized ingredients");

    let kmeans = Kmeans::from_config(config);
    let labels = kmeans.fit_predict(matrix.view())?;
    attach_clusters(&mut cocktails, &labels)?;

    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for c in &cocktails {
        if let Some(label) = c.cluster {
            groups.entry(label).or_default().push(c.name.as_str());
        }
    }
    println!("clusters={}", kmeans.n_clusters());
    for (label, names) in &groups {
        println!("  cluster {label} ({} cocktails): {}", names.len(), names.join(", "));
    }

    if let Some(path) = plot_path {
        let coords = project_2d(&matrix)?;
        let names: Vec<&str> = cocktails.iter().map(|c| c.name.as_str()).collect();
        let plot = ScatterPlot::build(&coords, &labels, &names, config.annotate)?;
        std::fs::write(path, plot.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), points = plot.points.len(), "wrote plot data");
    }
    Ok(())
}

fn run_ingredients(cocktails: &[Cocktail], ingredients: &[Ingredient], top: usize) -> Result<()> {
    let counts = ingredient_counts(cocktails, ingredients)?;

    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    for (name, count) in ranked.into_iter().take(top) {
        println!("{count:>5}  {name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["muddle", "--data", "cocktails.json"];
        argv.extend_from_slice(args);
        argv.push("ingredients");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn timestamp_flags_override_both_ways() {
        assert_eq!(parse(&[]).drop_times(), None);
        assert_eq!(parse(&["--keep-times"]).drop_times(), Some(false));
        assert_eq!(parse(&["--drop-times"]).drop_times(), Some(true));
        assert_eq!(parse(&["--drop-times", "--keep-times"]).drop_times(), Some(false));
        assert_eq!(parse(&["--keep-times", "--drop-times"]).drop_times(), Some(true));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
