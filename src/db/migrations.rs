use anyhow::{bail, Context, Result};
use rusqlite::{Connection, Transaction};

const CURRENT_SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read feedback schema version")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "feedback database is at schema {version}, this build only knows up to {CURRENT_SCHEMA_VERSION}"
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to begin feedback schema upgrade")?;

    // All steps share one transaction.
    while version < CURRENT_SCHEMA_VERSION {
        version += 1;
        apply_migration(&tx, version)
            .with_context(|| format!("feedback schema upgrade to v{version} failed"))?;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to record feedback schema version")?;
    tx.commit().context("failed to commit feedback schema upgrade")?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    let script = match version {
        1 => include_str!("schemas/schema_v1.sql"),
        _ => bail!("no feedback schema script for v{version}"),
    };
    tx.execute_batch(script)
        .with_context(|| format!("failed to create feedback schema v{version}"))
}
