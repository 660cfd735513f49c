use clap::Parser;
use kata_judger::{
    config::ClientConfig,
    judge::{
        files::SolutionFiles, spawn_submit, spawn_test, JudgeSession, OutcomeRecorder,
        SharedSession,
    },
    provider::{JudgeError, JudgeResult, Outcome, ProblemDescriptor, ProviderRegistry},
};
use opt::SubCmd;
use std::process::exit;
use tracing_subscriber::EnvFilter;

mod opt;

/// Stands in for the review scheduler: outcomes only go to the log.
struct LogRecorder;

impl OutcomeRecorder for LogRecorder {
    fn record_outcome(&self, id: &str, outcome: &Outcome) {
        tracing::info!(%id, verdict = ?outcome.verdict(), "Recorded outcome");
    }
}

#[tokio::main]
async fn main() {
    let opt = opt::Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match run(opt).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_retryable() {
                eprintln!("This may be temporary, try again later.");
            }
            2
        }
    };
    exit(code);
}

/// Returns whether the command succeeded with a positive verdict.
async fn run(opt: opt::Opts) -> JudgeResult<bool> {
    let cfg_path = opt
        .opt
        .config
        .clone()
        .unwrap_or_else(ClientConfig::default_path);
    let mut cfg = ClientConfig::load(&cfg_path).await?;
    if let Some(provider) = opt.opt.provider {
        cfg.provider = provider;
    }
    if let Some(lang) = opt.opt.lang {
        cfg.language = lang;
    }
    let registry = ProviderRegistry::with_defaults();

    match opt.cmd {
        SubCmd::Providers => {
            for name in registry.available() {
                println!("{}", name);
            }
            Ok(true)
        }
        SubCmd::AuthHelp => {
            let mut provider = registry.create(&cfg.provider, &cfg)?;
            match provider.as_authenticator() {
                Some(auth) => print!("{}", auth.auth_help()),
                None => println!("{} needs no credentials", cfg.provider),
            }
            Ok(true)
        }
        SubCmd::Fetch(cmd) => {
            let mut provider = registry.create(&cfg.provider, &cfg)?;
            let problem = provider.fetch_problem(&cmd.id, &cfg.language).await?;
            print_problem(&problem);
            Ok(true)
        }
        SubCmd::Test(cmd) => {
            let mut files = SolutionFiles::new(&cfg.solutions_dir, &cfg.provider);
            if let Some(f) = cmd.file {
                files = files.with_code_file(f);
            }
            if let Some(f) = cmd.input_file {
                files = files.with_input_file(f);
            }
            let session = open_session(&registry, &cfg, files)?;
            let outcome = spawn_test(session, cmd.id)
                .await
                .map_err(|e| JudgeError::Any(e.into()))??;
            Ok(report(&outcome))
        }
        SubCmd::Submit(cmd) => {
            let mut files = SolutionFiles::new(&cfg.solutions_dir, &cfg.provider);
            if let Some(f) = cmd.file {
                files = files.with_code_file(f);
            }
            let session = open_session(&registry, &cfg, files)?;
            let outcome = spawn_submit(session, cmd.id)
                .await
                .map_err(|e| JudgeError::Any(e.into()))??;
            Ok(report(&outcome))
        }
    }
}

fn open_session(
    registry: &ProviderRegistry,
    cfg: &ClientConfig,
    files: SolutionFiles,
) -> JudgeResult<SharedSession> {
    let provider = registry.create(&cfg.provider, cfg)?;
    let mut session = JudgeSession::new(provider, Box::new(files), cfg.language.clone())
        .with_recorder(Box::new(LogRecorder));
    session.authenticate()?;
    Ok(session.into_shared())
}

fn report(outcome: &Outcome) -> bool {
    println!("{}", outcome.report().trim_end());
    outcome.is_success()
}

fn print_problem(p: &ProblemDescriptor) {
    println!("{} [{}]", p.title, p.difficulty);
    if !p.tags.is_empty() {
        println!("Tags: {}", p.tags.join(", "));
    }
    println!("\n{}", p.description);
    if !p.examples.is_empty() {
        println!("\n{}", p.examples);
    }
    if !p.constraints.is_empty() {
        println!("\nConstraints:\n{}", p.constraints);
    }
    if !p.code_snippet.is_empty() {
        println!("\n{}", p.code_snippet);
    }
}
