use anyhow::Result;
use tracing::info;

use crate::cli::RegistryArgs;
use crate::registry::MetadataRegistry;
use crate::util::write_json_stdout;

pub fn run(args: RegistryArgs) -> Result<()> {
    let registry = MetadataRegistry::load(&args.registry_path)?;
    let stats = registry.stats();

    info!(
        path = %args.registry_path.display(),
        version = %stats.version.as_deref().unwrap_or("unversioned"),
        sha256 = %stats.sha256.as_deref().unwrap_or_default(),
        total_documents = stats.total_documents,
        skipped_entries = stats.skipped_entries,
        "registry status"
    );
    for (product, count) in &stats.products {
        info!(product = %product, documents = count, "registry product");
    }

    if args.json {
        write_json_stdout(&stats)?;
    }
    Ok(())
}
