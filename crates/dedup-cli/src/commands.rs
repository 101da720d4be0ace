use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::ProgressBar;
use tracing::info;

use dedup_batch::{
    InMemoryRepository, JobReport, JobService, MergeOutcome, RecordPage,
    RecordRepository, RepositoryError,
};
use dedup_cli::ingest::load_records;
use dedup_match::{MatcherOptions, MatcherRegistry};
use dedup_model::{JobRunState, MasterStrategy, MatchConfig, MergePlan};

use crate::cli::{RunArgs, StrategyArg};
use crate::summary::apply_table_style;

/// Outcome of one `dedup run` invocation.
pub struct RunResult {
    pub state: Option<JobRunState>,
    pub report: Option<JobReport>,
    pub error: Option<String>,
}

impl RunResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

pub fn run_dedup(args: &RunArgs) -> Result<RunResult> {
    let records = load_records(&args.records_csv)?;
    let config_text = fs::read_to_string(&args.config)
        .with_context(|| format!("read {}", args.config.display()))?;
    let mut config: MatchConfig =
        serde_json::from_str(&config_text).context("parse match configuration")?;

    // CLI knobs override the configuration file.
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(strategy) = args.strategy {
        config.master_strategy = master_strategy(strategy);
    }
    config.validate()?;

    let config_id = args
        .records_csv
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("records")
        .to_string();
    info!(
        records = records.len(),
        config = %args.config.display(),
        dry_run = args.dry_run,
        "starting deduplication run"
    );

    let total_pages = records.len().div_ceil(config.page_size);
    let bar = ProgressBar::new(total_pages as u64);
    let repository = ProgressRepository {
        inner: InMemoryRepository::new(records).with_config(&config_id, config.clone()),
        bar: bar.clone(),
    };
    let registry = MatcherRegistry::new(MatcherOptions {
        blank_pair_score: config.blank_pair_score,
        ..MatcherOptions::default()
    });
    let mut service = JobService::new(repository, registry);

    let launched = service.start_job(&config_id, args.dry_run, None);
    bar.finish_and_clear();

    match launched {
        Ok(job_id) => {
            let state = service.job_status(&job_id).cloned();
            let report = service.job_report(&job_id).cloned();
            if let (Some(dir), Some(report)) = (&args.plans_out, report.as_ref()) {
                write_plans(dir, &report.plans)?;
            }
            Ok(RunResult {
                state,
                report,
                error: None,
            })
        }
        Err(error) => Ok(RunResult {
            state: service.last_job().cloned(),
            report: None,
            error: Some(error.to_string()),
        }),
    }
}

pub fn run_matchers() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Matcher", "Handles"]);
    apply_table_style(&mut table);
    for (name, kinds) in MatcherRegistry::builtin_summaries() {
        table.add_row(vec![name, kinds]);
    }
    println!("{table}");
    Ok(())
}

fn master_strategy(arg: StrategyArg) -> MasterStrategy {
    match arg {
        StrategyArg::Oldest => MasterStrategy::OldestCreated,
        StrategyArg::Newest => MasterStrategy::NewestCreated,
        StrategyArg::MostComplete => MasterStrategy::MostComplete,
    }
}

fn write_plans(dir: &Path, plans: &[MergePlan]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    for plan in plans {
        let path = dir.join(format!("{}.json", plan.master_id));
        let json = serde_json::to_string_pretty(plan).context("serialize merge plan")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

/// Repository decorator that advances the progress bar as pages stream in.
struct ProgressRepository<R> {
    inner: R,
    bar: ProgressBar,
}

impl<R: RecordRepository> RecordRepository for ProgressRepository<R> {
    fn load_config(&self, config_id: &str) -> Result<MatchConfig, RepositoryError> {
        self.inner.load_config(config_id)
    }

    fn fetch_page(
        &mut self,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<RecordPage, RepositoryError> {
        let page = self.inner.fetch_page(cursor, page_size)?;
        self.bar.inc(1);
        Ok(page)
    }

    fn apply_merge_plan(
        &mut self,
        plan: &MergePlan,
    ) -> Result<MergeOutcome, RepositoryError> {
        self.inner.apply_merge_plan(plan)
    }

    fn persist_job_state(&mut self, state: &JobRunState) -> Result<(), RepositoryError> {
        self.inner.persist_job_state(state)
    }
}
