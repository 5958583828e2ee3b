use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for wavescope")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
    }

    Ok(())
}

fn run_step(name: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {name}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {name} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    run_step("fmt --check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    run_step(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn run_tests() -> Result<()> {
    run_step("test", &["test", "--workspace"])
}

fn run_doc() -> Result<()> {
    run_step("doc", &["doc", "--workspace", "--no-deps"])
}

fn run_build() -> Result<()> {
    run_step("build", &["build", "--workspace"])
}
