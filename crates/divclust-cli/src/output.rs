//! Output formatting utilities

use crate::error::Result;
use colored::Colorize;
use divclust::tree::ClusterAssignment;
use serde::Serialize;
use std::io::Write;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Pretty-printed JSON on stdout.
pub(crate) fn json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}

/// `id,cluster` rows with a header.
pub(crate) fn assignments_csv<W: Write>(out: W, assignments: &[ClusterAssignment]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["id", "cluster"])?;
    for a in assignments {
        let cluster = a.cluster.to_string();
        writer.write_record([a.id.as_str(), cluster.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignments_csv() {
        let assignments = vec![
            ClusterAssignment { id: "a".into(), cluster: 1 },
            ClusterAssignment { id: "b,c".into(), cluster: 2 },
        ];
        let mut buf = Vec::new();
        assignments_csv(&mut buf, &assignments).expect("write csv");

        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "id,cluster\na,1\n\"b,c\",2\n");
    }
}
