//! Decoy predicates
//!
//! Decoy entries are recognized by plain string checks against the decoy
//! tag: protein *names* are decoys when they start with the tag, while full
//! FASTA *headers* are decoys when they contain it anywhere.

/// Does this protein name carry the decoy prefix?
pub fn is_decoy_name(name: &str, decoy_tag: &str) -> bool {
    name.starts_with(decoy_tag)
}

/// Does this header mention the decoy tag anywhere?
pub fn is_decoy_header(header: &str, decoy_tag: &str) -> bool {
    header.contains(decoy_tag)
}

/// Strip the decoy tag from a protein name, returning the target name it
/// was generated from
pub fn target_name<'a>(name: &'a str, decoy_tag: &str) -> Option<&'a str> {
    name.strip_prefix(decoy_tag)
}
