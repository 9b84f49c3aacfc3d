//! Delete command.

use std::io::Write;

use anyhow::Result;
use bt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: i64) -> Result<()> {
    if !db.delete_event(id)? {
        anyhow::bail!("event not found: #{id}");
    }
    writeln!(writer, "Deleted event #{id}")?;
    Ok(())
}
