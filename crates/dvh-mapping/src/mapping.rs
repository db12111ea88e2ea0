//! Parser and data model for the upstream side-mapping text format (a
//! ProGuard-style `original -> mapped:` class/member listing), and the
//! reversal into the canonical deobf-keyed direction (spec §4.6).
//!
//! In this crate's vocabulary, "original" is the obfuscated, as-shipped
//! identifier and "mapped" is the human-readable deobfuscated one — the
//! same convention the superset check in spec §4.6 uses ("original
//! descriptor -> mapped mappedDescriptor").

use indexmap::IndexMap;

use dvh_util::errors::DvhError;

/// One class's worth of member mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMapping {
    pub mapped_name: String,
    /// Keyed by original field signature (`"<type> <name>"`), valued by
    /// mapped name.
    pub fields: IndexMap<String, String>,
    /// Keyed by original method signature (`"<returnType> <name>(<params>)"`),
    /// valued by mapped name.
    pub methods: IndexMap<String, String>,
}

/// A full side mapping: obfuscated class name -> [`ClassMapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingFile {
    pub classes: IndexMap<String, ClassMapping>,
}

/// Parse the ProGuard-style text format.
///
/// ```text
/// net.minecraft.client.Minecraft -> a:
///     int field1 -> a
///     1:12:void method1(int) -> b
/// ```
///
/// The left-hand side of each line is always the original (obfuscated)
/// identifier and the right-hand side (after `->`) is the mapped
/// (deobfuscated) one — i.e. the file is already in original->mapped
/// order, which this parser preserves verbatim.
pub fn parse(text: &str) -> Result<MappingFile, DvhError> {
    let mut classes = IndexMap::new();
    let mut current: Option<(String, ClassMapping)> = None;

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end();
        if line.is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            if let Some((name, mapping)) = current.take() {
                classes.insert(name, mapping);
            }
            let (original, mapped) = split_arrow(line, lineno)?;
            let original = original.trim_end_matches(':').trim().to_string();
            let mapped = mapped.trim_end_matches(':').trim().to_string();
            current = Some((
                original,
                ClassMapping {
                    mapped_name: mapped,
                    fields: IndexMap::new(),
                    methods: IndexMap::new(),
                },
            ));
            continue;
        }

        let Some((_, ref mut mapping)) = current else {
            return Err(DvhError::Generic {
                message: format!("mapping line {} has no preceding class header", lineno + 1),
            });
        };

        let member_line = line.trim_start();
        let (original_sig, mapped_name) = split_arrow(member_line, lineno)?;
        let original_sig = strip_line_number_prefix(original_sig.trim());
        let mapped_name = mapped_name.trim().to_string();

        if original_sig.contains('(') {
            mapping.methods.insert(original_sig.to_string(), mapped_name);
        } else {
            mapping.fields.insert(original_sig.to_string(), mapped_name);
        }
    }

    if let Some((name, mapping)) = current.take() {
        classes.insert(name, mapping);
    }

    Ok(MappingFile { classes })
}

fn split_arrow(line: &str, lineno: usize) -> Result<(&str, &str), DvhError> {
    line.split_once("->").ok_or_else(|| DvhError::Generic {
        message: format!("mapping line {} is missing '->'", lineno + 1),
    })
}

/// Strip a leading `N:M:` line-number range prefix from a method signature,
/// as ProGuard-style mapping files attach to most method entries.
fn strip_line_number_prefix(sig: &str) -> &str {
    let mut parts = sig.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(rest)) if a.parse::<u32>().is_ok() && b.parse::<u32>().is_ok() => {
            rest
        }
        _ => sig,
    }
}

impl MappingFile {
    /// Reverse every class and member entry so the mapping is keyed by the
    /// mapped (deobfuscated) identifier instead of the original
    /// (obfuscated) one — the canonical deobf -> obf direction spec §4.6
    /// requires downstream of parsing.
    pub fn reversed(&self) -> MappingFile {
        let mut classes = IndexMap::new();
        for (original_name, class) in &self.classes {
            let mut fields = IndexMap::new();
            for (original_sig, mapped_name) in &class.fields {
                fields.insert(reverse_field_sig(original_sig, mapped_name), field_name(original_sig).to_string());
            }
            let mut methods = IndexMap::new();
            for (original_sig, mapped_name) in &class.methods {
                methods.insert(
                    reverse_method_sig(original_sig, mapped_name),
                    method_name(original_sig).to_string(),
                );
            }
            classes.insert(
                class.mapped_name.clone(),
                ClassMapping {
                    mapped_name: original_name.clone(),
                    fields,
                    methods,
                },
            );
        }
        MappingFile { classes }
    }
}

pub(crate) fn field_name(sig: &str) -> &str {
    sig.rsplit(' ').next().unwrap_or(sig)
}

pub(crate) fn method_name(sig: &str) -> &str {
    match sig.split_once('(') {
        Some((before, _)) => before.rsplit(' ').next().unwrap_or(before),
        None => sig,
    }
}

/// The parenthesized parameter portion of a method signature, e.g.
/// `"(int)"` from `"void method1(int)"`, used by the TSRG2 writer as a
/// stand-in for a real JVM method descriptor.
pub(crate) fn method_params(sig: &str) -> &str {
    let open = sig.find('(').unwrap_or(sig.len());
    &sig[open..]
}

fn reverse_field_sig(original_sig: &str, mapped_name: &str) -> String {
    let ty = original_sig.rsplit_once(' ').map(|(t, _)| t).unwrap_or("");
    format!("{ty} {mapped_name}")
}

fn reverse_method_sig(original_sig: &str, mapped_name: &str) -> String {
    match original_sig.split_once('(') {
        Some((before, rest)) => {
            let ty = before.rsplit_once(' ').map(|(t, _)| t).unwrap_or(before);
            format!("{ty} {mapped_name}({rest}")
        }
        None => mapped_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_class_and_members() {
        let text = "\
net.minecraft.client.Minecraft -> a:
    int field1 -> b
    void method1(int) -> c
";
        let parsed = parse(text).unwrap();
        let reversed = parsed.reversed();
        let class = reversed.classes.get("a").unwrap();
        assert_eq!(class.mapped_name, "net.minecraft.client.Minecraft");
        assert_eq!(class.fields.get("int b").map(String::as_str), Some("field1"));
        assert_eq!(
            class.methods.get("void c(int)").map(String::as_str),
            Some("method1")
        );
    }

    #[test]
    fn parses_class_header_and_members() {
        let text = "\
net.minecraft.client.Minecraft -> a:
    int field1 -> a
    1:12:void method1(int) -> b
";
        let parsed = parse(text).unwrap();
        let class = parsed.classes.get("net.minecraft.client.Minecraft").unwrap();
        assert_eq!(class.mapped_name, "a");
        assert_eq!(class.fields.get("int field1").map(String::as_str), Some("a"));
        assert_eq!(
            class.methods.get("void method1(int)").map(String::as_str),
            Some("b")
        );
    }

    #[test]
    fn parses_multiple_classes() {
        let text = "\
a.B -> x:
    int f -> g
c.D -> y:
    void m() -> h
";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.classes.len(), 2);
        assert!(parsed.classes.contains_key("a.B"));
        assert!(parsed.classes.contains_key("c.D"));
    }

    #[test]
    fn member_without_class_header_errors() {
        let text = "    int field1 -> a\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "\
# header comment
a.B -> x:

    int f -> g
";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.classes.len(), 1);
    }

    #[test]
    fn strip_line_number_prefix_only_strips_numeric_ranges() {
        assert_eq!(strip_line_number_prefix("1:12:void m()"), "void m()");
        assert_eq!(strip_line_number_prefix("void m()"), "void m()");
    }
}
