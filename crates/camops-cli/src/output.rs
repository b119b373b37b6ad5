use serde::Serialize;

/// Render any `--json` payload. Pretty-printed so operators can read run
/// results straight off a terminal scrollback.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
