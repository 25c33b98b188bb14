use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

use crate::capping::cap_orders;
use crate::models::Instance;

/// Save a serializable object to a pretty-printed JSON file.
pub fn save_to_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow!("Failed to create file {}: {}", path.display(), e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, data)
        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}

/// Load a deserializable object from a JSON file.
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).map_err(|e| anyhow!("Failed to open file {}: {}", path.display(), e))?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader)
        .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
    Ok(data)
}

/// Read an instance file and cap its orders by the account balances it lists.
pub fn read_instance(path: &Path) -> Result<Instance> {
    let mut instance: Instance = load_from_file(path)?;
    let total = instance.orders.len();
    instance.orders = cap_orders(std::mem::take(&mut instance.orders), &instance.accounts)
        .with_context(|| format!("capping orders of {}", path.display()))?;
    info!(
        path = %path.display(),
        orders = instance.orders.len(),
        dropped = total - instance.orders.len(),
        "read instance"
    );
    Ok(instance)
}

/// Write `instance` as `instance-<batch_id>.json` inside `dir`.
pub fn write_instance(
    instance: &Instance,
    dir: &Path,
    batch_id: u32,
) -> Result<std::path::PathBuf> {
    let path = dir.join(format!("instance-{}.json", batch_id));
    save_to_file(instance, &path)?;
    info!(path = %path.display(), orders = instance.orders.len(), "wrote instance");
    Ok(path)
}
