//! Vitals CLI - Command-line interface for vitalscore
//!
//! Commands:
//! - score: Compute a subject's composite health score from a dataset
//! - observation: Render the score as a FHIR-shaped Observation resource
//! - inspect: Summarize a dataset and flag referential problems

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vitalscore::observation::build_health_observation;
use vitalscore::{
    MemoryStore, ScoreEngine, ScoreError, SubjectId, DEFAULT_WINDOW_DAYS, ENGINE_VERSION,
    PRODUCER_NAME,
};

/// Vitals - composite health scores from personal health metrics
#[derive(Parser)]
#[command(name = "vitals")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score health metrics against the population", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a subject's composite health score
    Score {
        /// Dataset file path (use - for stdin)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Subject to score
        #[arg(short, long)]
        subject: SubjectId,

        /// Rolling window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        window_days: u32,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Render a subject's score as a FHIR-shaped Observation
    Observation {
        /// Dataset file path (use - for stdin)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Subject to score
        #[arg(short, long)]
        subject: SubjectId,

        /// Rolling window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        window_days: u32,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Summarize a dataset and flag referential problems
    Inspect {
        /// Dataset file path (use - for stdin)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), VitalsCliError> {
    match cli.command {
        Commands::Score {
            dataset,
            subject,
            window_days,
            output,
            format,
        } => cmd_score(&dataset, subject, window_days, &output, format),

        Commands::Observation {
            dataset,
            subject,
            window_days,
            output,
            format,
        } => cmd_observation(&dataset, subject, window_days, &output, format),

        Commands::Inspect { dataset, json } => cmd_inspect(&dataset, json),
    }
}

fn cmd_score(
    dataset: &Path,
    subject: SubjectId,
    window_days: u32,
    output: &Path,
    format: OutputFormat,
) -> Result<(), VitalsCliError> {
    let engine = load_engine(dataset, subject)?;
    let score = engine.compute(subject, window_days)?;
    write_output(output, &to_json(&score, &format)?)
}

fn cmd_observation(
    dataset: &Path,
    subject: SubjectId,
    window_days: u32,
    output: &Path,
    format: OutputFormat,
) -> Result<(), VitalsCliError> {
    let engine = load_engine(dataset, subject)?;
    let score = engine.compute(subject, window_days)?;
    let observation = build_health_observation(subject, &score);
    write_output(output, &to_json(&observation, &format)?)
}

fn cmd_inspect(dataset: &Path, json: bool) -> Result<(), VitalsCliError> {
    let data = read_input(dataset)?;
    let parsed: vitalscore::Dataset = serde_json::from_str(&data)?;

    let known: std::collections::BTreeSet<SubjectId> =
        parsed.subjects.iter().map(|s| s.id).collect();
    let mut orphans: Vec<SubjectId> = parsed
        .activities
        .iter()
        .map(|r| r.subject_id)
        .chain(parsed.sleeps.iter().map(|r| r.subject_id))
        .chain(parsed.blood_tests.iter().map(|r| r.subject_id))
        .filter(|id| !known.contains(id))
        .collect();
    orphans.sort_unstable();
    orphans.dedup();

    let report = InspectReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        subjects: parsed.subjects.len(),
        activities: parsed.activities.len(),
        sleeps: parsed.sleeps.len(),
        blood_tests: parsed.blood_tests.len(),
        orphan_subjects: orphans,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Dataset Report");
        println!("==============");
        println!("Subjects:    {}", report.subjects);
        println!("Activities:  {}", report.activities);
        println!("Sleeps:      {}", report.sleeps);
        println!("Blood tests: {}", report.blood_tests);

        if !report.orphan_subjects.is_empty() {
            println!("\nRecords reference unknown subjects:");
            for id in &report.orphan_subjects {
                println!("  - {id}");
            }
        }
    }

    if report.orphan_subjects.is_empty() {
        Ok(())
    } else {
        Err(VitalsCliError::OrphanRecords(report.orphan_subjects.len()))
    }
}

// Helper functions

fn load_engine(dataset: &Path, subject: SubjectId) -> Result<ScoreEngine<MemoryStore>, VitalsCliError> {
    let data = read_input(dataset)?;
    let store = MemoryStore::from_json(&data)?;

    // Existence check is the caller's job, not the engine's
    if !store.contains_subject(subject) {
        return Err(VitalsCliError::SubjectNotFound(subject));
    }

    Ok(ScoreEngine::new(store))
}

fn read_input(path: &Path) -> Result<String, VitalsCliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading dataset from terminal; pipe a JSON dataset or pass --dataset FILE");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, data: &str) -> Result<(), VitalsCliError> {
    if path.to_string_lossy() == "-" {
        println!("{data}");
        Ok(())
    } else {
        Ok(fs::write(path, data)?)
    }
}

fn to_json<T: serde::Serialize>(value: &T, format: &OutputFormat) -> Result<String, VitalsCliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    })
}

// Error types

#[derive(Debug)]
enum VitalsCliError {
    Io(io::Error),
    Score(ScoreError),
    Json(serde_json::Error),
    SubjectNotFound(SubjectId),
    OrphanRecords(usize),
}

impl From<io::Error> for VitalsCliError {
    fn from(e: io::Error) -> Self {
        VitalsCliError::Io(e)
    }
}

impl From<ScoreError> for VitalsCliError {
    fn from(e: ScoreError) -> Self {
        VitalsCliError::Score(e)
    }
}

impl From<serde_json::Error> for VitalsCliError {
    fn from(e: serde_json::Error) -> Self {
        VitalsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitalsCliError> for CliError {
    fn from(e: VitalsCliError) -> Self {
        match e {
            VitalsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitalsCliError::Score(e) => CliError {
                code: "SCORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the window and dataset contents".to_string()),
            },
            VitalsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check dataset JSON syntax".to_string()),
            },
            VitalsCliError::SubjectNotFound(id) => CliError {
                code: "SUBJECT_NOT_FOUND".to_string(),
                message: format!("Subject {id} is not in the dataset"),
                hint: Some("Run 'vitals inspect' to list dataset contents".to_string()),
            },
            VitalsCliError::OrphanRecords(count) => CliError {
                code: "ORPHAN_RECORDS".to_string(),
                message: format!("Records reference {count} unknown subject(s)"),
                hint: Some("Add the missing subjects or drop the records".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    producer: String,
    version: String,
    subjects: usize,
    activities: usize,
    sleeps: usize,
    blood_tests: usize,
    orphan_subjects: Vec<SubjectId>,
}
