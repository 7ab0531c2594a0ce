use rusqlite::{params, Connection, OptionalExtension};

// ── Session state ──

pub fn get_session_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM session_state WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_session_values(conn: &mut Connection, values: &[(&str, &str)]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for (key, value) in values {
        tx.execute(
            "INSERT INTO session_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = datetime('now')",
            params![key, value],
        )?;
    }
    tx.commit()
}

pub fn clear_session(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM session_state", [])
}
