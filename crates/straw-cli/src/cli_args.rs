use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "straw")]
#[command(about = "Scripted automation harness for component trees")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Run scripts against a scene, sharing one component tree.
    Run(RunArgs),
    /// Run a suite directory and check every expected outcome.
    Suite(SuiteArgs),
    /// Print component snapshots from a scene.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "scene")]
    pub(crate) scene: String,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
    /// Script files; relative to --scripts-dir when it is given.
    pub(crate) scripts: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct SuiteArgs {
    #[arg(long = "dir")]
    pub(crate) dir: String,
    /// Suite case file, `<dir>/suite.json` by default.
    #[arg(long = "case")]
    pub(crate) case: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct InfoArgs {
    #[arg(long = "scene")]
    pub(crate) scene: String,
    #[arg(long = "id")]
    pub(crate) id: Option<String>,
    #[arg(long = "recursive")]
    pub(crate) recursive: bool,
}
