//! Text rendering of branch history.

use std::fmt::Write;

use strand_store::Commit;

/// Separator line between log entries.
pub const ENTRY_SEPARATOR: &str = "--------";

const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// Render one commit as a log entry.
pub fn format_commit(commit: &Commit) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "commit {}", commit.id());
    let _ = writeln!(out, "Author: {}", commit.author());
    if commit.committer() != commit.author() {
        let _ = writeln!(out, "Committer: {}", commit.committer());
    }
    let _ = writeln!(out, "Date: {}", commit.timestamp().format(DATE_FORMAT));
    if let (Some(parent), Some(parent2)) = (commit.parent(), commit.parent2()) {
        let _ = writeln!(out, "Merge: {} {}", parent.short_hex(), parent2.short_hex());
    }
    let _ = writeln!(out);
    for line in commit.message().lines() {
        let _ = writeln!(out, "    {line}");
    }
    let _ = writeln!(out);
    for (name, blob) in commit.index() {
        let _ = writeln!(out, "    {} {name}", blob.short_hex());
    }
    out
}

/// Join entries, most recent first, with [`ENTRY_SEPARATOR`] lines.
pub fn render_log<'a>(commits: impl IntoIterator<Item = &'a Commit>) -> String {
    commits
        .into_iter()
        .map(format_commit)
        .collect::<Vec<_>>()
        .join(&format!("{ENTRY_SEPARATOR}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use strand_store::Blob;
    use strand_types::ObjectId;

    fn at(secs: i64) -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn entry_layout() {
        let blob = Blob::text("x");
        let commit = Commit::builder("alice")
            .timestamp(at(0))
            .message("first line\nsecond line")
            .entry("a.txt", blob.id())
            .build()
            .unwrap();
        let text = format_commit(&commit);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("commit {}", commit.id()));
        assert_eq!(lines[1], "Author: alice");
        assert_eq!(lines[2], "Date: Thu Jan 01 00:00:00 1970 +0000");
        assert_eq!(lines[4], "    first line");
        assert_eq!(lines[5], "    second line");
        assert_eq!(lines[7], format!("    {} a.txt", blob.id().short_hex()));
    }

    #[test]
    fn merge_and_committer_lines() {
        let p1 = ObjectId::from_hash([1; 32]);
        let p2 = ObjectId::from_hash([2; 32]);
        let commit = Commit::builder("alice")
            .committer("bot")
            .timestamp(at(0))
            .parent(Some(p1))
            .parent2(Some(p2))
            .message("merge")
            .build()
            .unwrap();
        let text = format_commit(&commit);
        assert!(text.contains("Committer: bot\n"));
        assert!(text.contains(&format!("Merge: {} {}\n", p1.short_hex(), p2.short_hex())));
    }

    #[test]
    fn entries_separated() {
        let a = Commit::builder("a").timestamp(at(0)).message("one").build().unwrap();
        let b = Commit::builder("b").timestamp(at(1)).message("two").build().unwrap();
        let log = render_log([&b, &a]);
        assert_eq!(log.matches(ENTRY_SEPARATOR).count(), 1);
        assert!(log.find("two").unwrap() < log.find("one").unwrap());
        assert_eq!(render_log(std::iter::empty::<&Commit>()), "");
    }
}
