//! Export rendering.
//!
//! Export reads only finally-committed tags: the pre-tags file is a
//! staging layer and is never part of the exported artifact, whatever the
//! per-row status says. Single-file projects export the tags file
//! verbatim; multi-file projects synthesize a `FILE,TAG` table here.

/// Render the multi-file export table.
///
/// Header `FILE,TAG`, then one `name,tag` line per row, pairing the index
/// file's name at row `i` with the final-tags value at row `i`. Callers
/// pass slices already cut to the project's row count.
pub fn multi_file_table(names: &[String], tags: &[String]) -> String {
    let mut out = String::from("FILE,TAG");
    for (name, tag) in names.iter().zip(tags.iter()) {
        out.push('\n');
        out.push_str(name);
        out.push(',');
        out.push_str(tag);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn table_has_header_and_one_line_per_row() {
        let out = multi_file_table(
            &strings(&["a.txt", "b.txt", "c.txt"]),
            &strings(&["pos", "NO_LABEL", "neg"]),
        );
        assert_eq!(out, "FILE,TAG\na.txt,pos\nb.txt,NO_LABEL\nc.txt,neg");
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn empty_input_is_just_the_header() {
        assert_eq!(multi_file_table(&[], &[]), "FILE,TAG");
    }
}
