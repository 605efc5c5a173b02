use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use sigstat_dataset::{
    Database, DatasetExporter, DatasetGenerator, DatasetParameters, FilterSummary, InputDevice,
    Origin, Progress, RunManifest, SignatureFilter, SignatureMeta, SignatureStatistics, Signer,
    Split, StatisticsEngine,
};
use sigstat_dtw::{Dtw, Euclidean};
use sigstat_io::{
    ArchiveLoader, CsvExporter, DatabaseTable, DirectoryLoader, LoadReport, SignatureReader,
    classify,
};

#[derive(Parser)]
#[command(name = "sigstat")]
#[command(about = "Signature-pair statistics and dataset generation for online signature verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Signature selection shared by `summary` and `generate`. An empty list allows everything.
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Databases to include, comma-separated (e.g. "mcyt,biosecurid")
    #[arg(long, value_delimiter = ',')]
    database: Vec<Database>,

    /// Input devices to include: "finger", "stylus", "unknown"
    #[arg(long, value_delimiter = ',')]
    device: Vec<InputDevice>,

    /// Splits to include: "development", "evaluation", "unknown"
    #[arg(long, value_delimiter = ',')]
    split: Vec<Split>,
}

impl FilterArgs {
    fn build(self) -> SignatureFilter {
        let mut filter = SignatureFilter::all();
        if !self.database.is_empty() {
            filter = filter.with_databases(self.database);
        }
        if !self.device.is_empty() {
            filter = filter.with_devices(self.device);
        }
        if !self.split.is_empty() {
            filter = filter.with_splits(self.split);
        }
        filter
    }
}

#[derive(Subcommand)]
enum Command {
    /// Report how many signers and pairs the selected signatures can supply
    Summary {
        /// Signature database: an extracted root directory or its zip archive
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Sample signature pairs and export their statistics as CSV datasets
    Generate {
        /// Signature database: an extracted root directory or its zip archive
        #[arg(long)]
        data: PathBuf,

        /// Output directory for datasets and the run manifest
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Run name; the manifest is written to <name>.txt (must match [a-zA-Z0-9_-]+)
        #[arg(long, default_value = "dataset")]
        name: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Training dataset name
        #[arg(long, default_value = "training")]
        training_name: String,

        /// Number of training signers
        #[arg(long)]
        training_signers: usize,

        /// Genuine pairs per training signer
        #[arg(long, default_value_t = 0)]
        training_genuine: usize,

        /// Skilled forgery pairs per training signer
        #[arg(long, default_value_t = 0)]
        training_forged: usize,

        /// Random forgery pairs per training signer
        #[arg(long, default_value_t = 0)]
        training_random: usize,

        /// Test dataset name
        #[arg(long, default_value = "test")]
        test_name: String,

        /// Number of test signers
        #[arg(long, default_value_t = 0)]
        test_signers: usize,

        /// Genuine pairs per test signer
        #[arg(long, default_value_t = 0)]
        test_genuine: usize,

        /// Skilled forgery pairs per test signer
        #[arg(long, default_value_t = 0)]
        test_forged: usize,

        /// Random forgery pairs per test signer
        #[arg(long, default_value_t = 0)]
        test_random: usize,
    },

    /// Align two signature files and report their DTW distance
    Align {
        /// Reference signature file
        #[arg(long)]
        reference: PathBuf,

        /// Questioned signature file
        #[arg(long)]
        questioned: PathBuf,

        /// Database layout for files whose path does not identify one
        #[arg(long, default_value = "evaldb")]
        database: Database,

        /// Also print the warping path
        #[arg(long, default_value_t = false)]
        path: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SummaryOutput {
    signers_loaded: usize,
    signatures_loaded: usize,
    files_skipped: usize,
    filter: SignatureFilter,
    selection: FilterSummary,
}

#[derive(Serialize)]
struct GenerateOutput {
    run: String,
    output_dir: PathBuf,
    seed: u64,
    training: SliceOutput,
    test: SliceOutput,
}

#[derive(Serialize)]
struct SliceOutput {
    name: String,
    signers: usize,
    genuine_pairs: usize,
    forged_pairs: usize,
    random_pairs: usize,
}

#[derive(Serialize)]
struct AlignOutput {
    reference: String,
    questioned: String,
    dtw_distance: f64,
    reference_statistics: SignatureStatistics,
    questioned_statistics: SignatureStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<(usize, usize)>>,
}

fn load_signers(data: &Path) -> Result<(Vec<Signer>, usize)> {
    let progress = |signers: usize, signatures: usize| debug!(signers, signatures, "loading");
    let report: LoadReport = if data.is_file() {
        ArchiveLoader::new(data).load_with_progress(progress)
    } else {
        DirectoryLoader::new(data).load_with_progress(progress)
    }
    .with_context(|| format!("failed to load signatures from {}", data.display()))?;
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "some signature files were skipped");
    }
    Ok((report.signers, report.skipped.len()))
}

/// Metadata for a standalone file: from its path when that follows a known
/// layout, otherwise an unknown-device, unknown-origin record of `database`.
fn standalone_meta(path: &Path, table: &DatabaseTable, database: Database) -> SignatureMeta {
    let file = path.to_string_lossy().replace('\\', "/");
    classify(&file, table).unwrap_or_else(|e| {
        info!(file = %file, reason = %e, "path not classifiable, using --database");
        let name = path
            .file_name()
            .map_or_else(|| file.clone(), |n| n.to_string_lossy().into_owned());
        SignatureMeta {
            id: name.clone(),
            signer_id: name,
            file,
            origin: Origin::Unknown,
            database,
            device: InputDevice::Unknown,
            split: Split::Unknown,
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Summary { data, filter } => {
            let (signers, skipped) = load_signers(&data)?;
            let filter = filter.build();
            let selection = FilterSummary::compute(&signers, &filter);
            info!(signers = selection.signer_count, "selection summarized");

            let output = SummaryOutput {
                signers_loaded: signers.len(),
                signatures_loaded: signers.iter().map(|s| s.signatures().len()).sum(),
                files_skipped: skipped,
                filter,
                selection,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Generate {
            data,
            output_dir,
            name,
            filter,
            training_name,
            training_signers,
            training_genuine,
            training_forged,
            training_random,
            test_name,
            test_signers,
            test_genuine,
            test_forged,
            test_random,
        } => {
            let training = DatasetParameters::new(&training_name)?
                .with_signer_count(training_signers)
                .with_genuine_pairs(training_genuine)
                .with_skilled_forgery_pairs(training_forged)
                .with_random_forgery_pairs(training_random);
            let test = DatasetParameters::new(&test_name)?
                .with_signer_count(test_signers)
                .with_genuine_pairs(test_genuine)
                .with_skilled_forgery_pairs(test_forged)
                .with_random_forgery_pairs(test_random);
            let manifest = RunManifest::new(&name, training, test)?
                .with_seed(cli.seed)
                .with_filter(filter.build());

            // 1. Manifest first, so a failed load still records the run
            let mut exporter = CsvExporter::new(&output_dir)?;
            exporter
                .save_info(&manifest)
                .context("failed to write run manifest")?;

            // 2. Load
            let (signers, _) = load_signers(&data)?;

            // 3. Generate and export
            let last_percent = AtomicUsize::new(0);
            let progress = |p: Progress| {
                let percent = (p.fraction() * 100.0) as usize;
                if percent > last_percent.fetch_max(percent, Ordering::Relaxed) {
                    info!(
                        percent,
                        remaining_secs = p.remaining().map(|d| d.as_secs()),
                        "computing pair statistics"
                    );
                }
            };
            let summary = DatasetGenerator::new(&signers)
                .generate_slices(&manifest, &mut exporter, &progress)
                .context("dataset generation failed")?;

            // 4. Print summary
            let slice = |s: &sigstat_dataset::SliceSummary| SliceOutput {
                name: s.name.clone(),
                signers: s.signers.len(),
                genuine_pairs: s.pairs.genuine,
                forged_pairs: s.pairs.forged,
                random_pairs: s.pairs.random,
            };
            let output = GenerateOutput {
                run: manifest.name().to_string(),
                output_dir,
                seed: summary.seed,
                training: slice(&summary.training),
                test: slice(&summary.test),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Align {
            reference,
            questioned,
            database,
            path,
        } => {
            let reader = SignatureReader::default();
            let engine = StatisticsEngine::default();

            let mut prepared = Vec::with_capacity(2);
            for file in [&reference, &questioned] {
                let meta = standalone_meta(file, reader.table(), database);
                let (signature, repairs) = reader
                    .read(file, meta)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                if !repairs.is_clean() {
                    info!(file = %file.display(), ?repairs, "signature repaired");
                }
                let ready = engine
                    .prepare(&signature)
                    .with_context(|| format!("failed to prepare {}", file.display()))?;
                prepared.push(ready);
            }
            let (r, q) = (&prepared[0], &prepared[1]);

            let dtw = Dtw::new(Euclidean);
            let (distance, warping) = if path {
                let (d, p) = dtw.distance_and_path(&r.trajectory, &q.trajectory)?;
                (d, Some(p.to_pairs()))
            } else {
                (dtw.distance(&r.trajectory, &q.trajectory)?, None)
            };
            info!(distance = distance.value(), "alignment complete");

            let output = AlignOutput {
                reference: reference.display().to_string(),
                questioned: questioned.display().to_string(),
                dtw_distance: distance.value(),
                reference_statistics: r.statistics,
                questioned_statistics: q.statistics,
                path: warping,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
