//! Marker-based splicing of rule snippets into generated sources.
//!
//! Markers are whole-line comments such as `// pos12`. A snippet is placed
//! right below its marker inside a fenced block:
//!
//! ```text
//! // pos12
//! // rule:begin pos12 Post
//! ...
//! // rule:end pos12 Post
//! ```
//!
//! The marker stays in place, and a later run replaces the fenced block
//! instead of adding a second copy.

const BEGIN: &str = "// rule:begin";
const END: &str = "// rule:end";
pub const IMPORT_MARKER: &str = "// posimport";
pub const ROUTER_MARKER: &str = "// posrouter";

pub fn marker(pos: &str) -> String {
    let pos = pos.trim();
    let pos = pos.strip_prefix("//").map(str::trim).unwrap_or(pos);
    format!("// {}", pos)
}

fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn find_line(lines: &[&str], text: &str) -> Option<usize> {
    lines.iter().position(|l| l.trim() == text)
}

fn join(lines: Vec<String>, trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}

/// Place `snippet` below the marker `pos`, labelled with `label`. Returns
/// `None` when the marker line does not exist.
pub fn splice(source: &str, pos: &str, label: &str, snippet: &str) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let marker = marker(pos);
    let pos = &marker[3..];
    let marker_idx = find_line(&lines, &marker)?;
    let indent = indent_of(lines[marker_idx]);
    let begin = format!("{} {} {}", BEGIN, pos, label);
    let end = format!("{} {} {}", END, pos, label);

    let mut block = vec![format!("{}{}", indent, begin)];
    for line in snippet.lines() {
        if line.trim().is_empty() {
            block.push(String::new());
        } else {
            block.push(format!("{}{}", indent, line));
        }
    }
    block.push(format!("{}{}", indent, end));

    let existing = find_line(&lines, &begin).and_then(|b| {
        lines[b..]
            .iter()
            .position(|l| l.trim() == end)
            .map(|e| (b, b + e + 1))
    });
    let (start, stop) = match existing {
        Some(range) => range,
        None => {
            // after the marker and any blocks already fenced below it
            let mut i = marker_idx + 1;
            while i < lines.len() && lines[i].trim().starts_with(BEGIN) {
                match lines[i..].iter().position(|l| l.trim().starts_with(END)) {
                    Some(k) => i += k + 1,
                    None => break,
                }
            }
            (i, i)
        }
    };

    let mut out: Vec<String> = lines[..start].iter().map(|l| l.to_string()).collect();
    out.extend(block);
    out.extend(lines[stop..].iter().map(|l| l.to_string()));
    Some(join(out, source.ends_with('\n')))
}

/// Add each import not yet quoted anywhere in `source` below the
/// `// posimport` marker. Returns `None` when the marker is missing and an
/// import had to be added.
pub fn add_imports(source: &str, imports: &[String]) -> Option<String> {
    let missing: Vec<&str> = imports
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .filter(|i| !source.contains(&format!("\"{}\"", i)))
        .collect();
    if missing.is_empty() {
        return Some(source.to_string());
    }

    let lines: Vec<&str> = source.lines().collect();
    let idx = find_line(&lines, IMPORT_MARKER)?;
    let indent = indent_of(lines[idx]);
    let mut out: Vec<String> = lines[..=idx].iter().map(|l| l.to_string()).collect();
    let mut seen = Vec::new();
    for imp in missing {
        if !seen.contains(&imp) {
            out.push(format!("{}\"{}\"", indent, imp));
            seen.push(imp);
        }
    }
    out.extend(lines[idx + 1..].iter().map(|l| l.to_string()));
    Some(join(out, source.ends_with('\n')))
}

/// Replace the first whole-line `marker` with `replacement`, indenting the
/// first replacement line like the marker.
pub fn replace_marker(source: &str, marker: &str, replacement: &str) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let idx = find_line(&lines, marker)?;
    let indent = indent_of(lines[idx]);
    let mut out: Vec<String> = lines[..idx].iter().map(|l| l.to_string()).collect();
    out.push(format!("{}{}", indent, replacement.trim_end_matches('\n')));
    out.extend(lines[idx + 1..].iter().map(|l| l.to_string()));
    Some(join(out, source.ends_with('\n')))
}
