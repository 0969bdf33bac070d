use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::codegen::{self, GenerateOptions};
use crate::error::ConfigurationError;
use crate::parse;
use crate::sema;

#[derive(Debug)]
pub struct Request {
    pub input: PathBuf,
    pub action: Action,
}

#[derive(Debug)]
pub enum Action {
    Parse,
    Sema,
    Generate {
        out_dir: Option<PathBuf>,
        include_asn1: bool,
    },
}

/// Validates the option combination and absolutizes the input path. Runs
/// before any file is opened and before the generation stage may change the
/// working directory, so a relative input path keeps meaning what it meant
/// on the command line.
pub fn resolve(cli: &Cli) -> Result<Request> {
    if cli.outdir.is_some() && !cli.action.r#gen {
        return Err(ConfigurationError.into());
    }

    let input = std::path::absolute(&cli.file)
        .with_context(|| format!("failed to resolve {}", cli.file.display()))?;

    let action = if cli.action.parse {
        Action::Parse
    } else if cli.action.sema {
        Action::Sema
    } else {
        Action::Generate {
            out_dir: cli.outdir.clone(),
            include_asn1: cli.include_asn1,
        }
    };

    Ok(Request { input, action })
}

pub fn run(cli: Cli) -> Result<()> {
    let request = resolve(&cli)?;

    let source = fs::read_to_string(&request.input)
        .with_context(|| format!("failed to read {}", request.input.display()))?;
    let tree = parse::parse_asn1(&source)?;

    match &request.action {
        Action::Parse => {
            println!("{}", parse::render_parse_tree(&tree)?);
        }
        Action::Sema => {
            for module in sema::build_semantic_model(&tree)? {
                println!("{module}");
            }
        }
        Action::Generate {
            out_dir,
            include_asn1,
        } => {
            run_generator(&request.input, out_dir.as_deref(), *include_asn1)?;
        }
    }

    Ok(())
}

/// Invokes the generator, with the working directory redirected at `out_dir`
/// when split output is requested. The previous directory is restored on
/// every exit path, generator failures included.
fn run_generator(input: &Path, out_dir: Option<&Path>, include_asn1: bool) -> Result<()> {
    let _scope = match out_dir {
        Some(dir) => Some(WorkingDirGuard::change_to(dir)?),
        None => None,
    };
    codegen::generate(&GenerateOptions {
        input,
        split: out_dir.is_some(),
        include_asn1,
    })
}

struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    fn change_to(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().context("failed to read the current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            eprintln!(
                "warning: failed to restore working directory {}: {err}",
                self.previous.display()
            );
        }
    }
}
