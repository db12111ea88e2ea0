//! TSRG2 writer: serializes a verified, merged mapping to the canonical
//! form the remap tool consumes downstream (spec §4.6, `moj_to_obf.tsrg`).

use crate::mapping::{field_name, method_name, method_params, MappingFile};

const HEADER: &str = "tsrg2 obf mapped\n";

/// Serialize `merged` to TSRG2 text: one `<key class> <class.mapped_name>`
/// header line per class, followed by tab-indented `<key field>
/// <mapped field>` and `<key method> <params> <mapped method>` member
/// lines. `crate::merge` feeds this the output of [`MappingFile::reversed`]
/// so the written file is keyed by the mapped (deobfuscated) identifier
/// with obfuscated names as the values — `moj_to_obf.tsrg`'s own direction.
/// Called directly with an unreversed [`MappingFile`] (as in this module's
/// own tests), it writes the opposite, obf-keyed direction instead.
pub fn write(merged: &MappingFile) -> String {
    let mut out = String::from(HEADER);
    for (original_class, class) in &merged.classes {
        out.push_str(original_class);
        out.push(' ');
        out.push_str(&class.mapped_name);
        out.push('\n');

        for (sig, mapped) in &class.fields {
            out.push('\t');
            out.push_str(field_name(sig));
            out.push(' ');
            out.push_str(mapped);
            out.push('\n');
        }
        for (sig, mapped) in &class.methods {
            out.push('\t');
            out.push_str(method_name(sig));
            out.push(' ');
            out.push_str(method_params(sig));
            out.push(' ');
            out.push_str(mapped);
            out.push('\n');
        }
    }
    out
}
