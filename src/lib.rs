pub mod cli;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod parse;
pub mod sema;

use anyhow::Result;
use cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    driver::run(cli)
}
