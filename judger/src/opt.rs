use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(name = "kata", about = "Practice problems against a remote judge")]
pub struct Opts {
    #[clap(subcommand)]
    pub cmd: SubCmd,

    #[clap(flatten)]
    pub opt: GlobalOpts,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file, defaults to ~/.kata/config.toml
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Judge backend to use, overriding the config file
    #[clap(long, short, global = true)]
    pub provider: Option<String>,

    /// Solution language, overriding the config file
    #[clap(long, short, global = true)]
    pub lang: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCmd {
    /// List available judge backends
    #[clap(name = "providers")]
    Providers,

    /// Fetch and print a problem
    #[clap(name = "fetch")]
    Fetch(FetchSubCmd),

    /// Run a solution against custom input
    #[clap(name = "test")]
    Test(TestSubCmd),

    /// Submit a solution for grading
    #[clap(name = "submit")]
    Submit(SubmitSubCmd),

    /// Show how to set up credentials for the backend
    #[clap(name = "auth-help")]
    AuthHelp,
}

#[derive(Args, Debug, Clone)]
pub struct FetchSubCmd {
    /// Problem id, like `two-sum`
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct TestSubCmd {
    /// Problem id, like `two-sum`
    pub id: String,

    /// Solution file. Defaults to `solution.*` in the problem's folder.
    #[clap(long, short)]
    pub file: Option<PathBuf>,

    /// Input file. Defaults to the problem's `testcases.txt`.
    #[clap(long = "input-file", short)]
    pub input_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SubmitSubCmd {
    /// Problem id, like `two-sum`
    pub id: String,

    /// Solution file. Defaults to `solution.*` in the problem's folder.
    #[clap(long, short)]
    pub file: Option<PathBuf>,
}
