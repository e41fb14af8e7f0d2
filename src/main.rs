use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod lastfm;
pub mod report;
pub mod stats;
pub mod storage;
mod sync;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}
