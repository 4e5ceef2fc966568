//! Constructs the root system of the Feingold-Frenkel algebra and writes the multiplicity table.
//!
//! The construction height and the output file are asked for interactively. The defaults are
//! taken from the `ROOTS_HEIGHT` and `ROOTS_OUTPUT` environment variables, so a closed stdin runs
//! with those. Logging is controlled with `RUST_LOG`.
use std::sync::Arc;

use anyhow::Context;
use lie::Algebra;
use roots::root_system::RootSystem;
use roots::utils::{self, Timer};

fn main() -> anyhow::Result<()> {
    utils::init_logging()?;

    let config = utils::query_config()?;
    let algebra = Arc::new(Algebra::feingold_frenkel());
    tracing::info!("Algebra {algebra}");

    let timer = Timer::start();
    let mut root_system = RootSystem::new(algebra);
    root_system.construct(config.max_height);
    timer.end(format_args!(
        "Constructed {} roots up to height {}",
        root_system.num_roots(),
        root_system.constructed_height()
    ));
    tracing::debug!("Roots per height:\n{}", root_system.graded_count_string());

    if let Some(height) = root_system.first_anomalous_height() {
        tracing::warn!(
            "Peterson's formula gave {} non-integral or out of range multiplicities. \
             Multiplicities from height {height} on are unreliable",
            root_system.anomalies().len()
        );
    }

    root_system
        .export_table(&config.output)
        .context("Failed to export the multiplicity table")?;

    println!("{}", config.output.display());
    Ok(())
}
