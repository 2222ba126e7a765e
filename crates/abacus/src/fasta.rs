//! Reference protein database
//!
//! Headers are expected to follow the UniProt convention:
//!
//! ```text
//! >sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
//! ```
//!
//! Headers that don't follow it still produce a record, with the missing
//! metadata left empty.

use crate::decoy;
use regex::Regex;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    /// Full header line, without the leading '>'
    pub original_header: String,
    /// Header text up to the first whitespace
    pub part_header: String,
    /// Accession
    pub id: String,
    pub entry_name: String,
    pub description: String,
    pub organism: String,
    pub gene_names: String,
    pub protein_existence: String,
    pub decoy: bool,
}

pub struct Fasta {
    pub records: Vec<Record>,
}

struct HeaderParser {
    organism: Regex,
    gene: Regex,
    existence: Regex,
}

impl HeaderParser {
    fn new() -> Self {
        Self {
            organism: Regex::new(r"OS=(.+?)(?:\s+(?:OX|GN|PE|SV)=|$)").expect("valid regex"),
            gene: Regex::new(r"GN=(\S+)").expect("valid regex"),
            existence: Regex::new(r"PE=(\d)").expect("valid regex"),
        }
    }

    fn capture(re: &Regex, header: &str) -> String {
        re.captures(header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    fn parse(&self, header: &str, decoy_tag: &str) -> Record {
        let (part_header, rest) = match header.split_once(char::is_whitespace) {
            Some((part, rest)) => (part, rest.trim()),
            None => (header, ""),
        };

        let fields = part_header.split('|').collect::<Vec<_>>();
        let (id, entry_name) = match fields.as_slice() {
            [_, id, entry, ..] => (id.to_string(), entry.to_string()),
            [_, id] => (id.to_string(), String::new()),
            _ => (part_header.to_string(), String::new()),
        };

        // Description runs up to the first key=value field
        let description = match rest.find(" OS=").or_else(|| rest.find("OS=")) {
            Some(end) => rest[..end].trim(),
            None => rest,
        };

        let existence = Self::capture(&self.existence, rest);

        Record {
            original_header: header.to_string(),
            part_header: part_header.to_string(),
            id,
            entry_name,
            description: description.to_string(),
            organism: Self::capture(&self.organism, rest),
            gene_names: Self::capture(&self.gene, rest),
            protein_existence: protein_existence(&existence),
            decoy: decoy::is_decoy_header(header, decoy_tag),
        }
    }
}

/// Expand a UniProt `PE=` level into its descriptive form
pub fn protein_existence(level: &str) -> String {
    let text = match level {
        "1" => "Experimental evidence at protein level",
        "2" => "Experimental evidence at transcript level",
        "3" => "Protein inferred from homology",
        "4" => "Protein predicted",
        "5" => "Protein uncertain",
        _ => return String::new(),
    };
    format!("{}:{}", level, text)
}

impl Fasta {
    // Parse a string into a fasta database. Only headers are kept, residues
    // are never needed for the reports.
    pub fn parse(contents: &str, decoy_tag: &str) -> Fasta {
        let parser = HeaderParser::new();
        let records = contents
            .lines()
            .filter_map(|line| line.trim().strip_prefix('>'))
            .map(|header| parser.parse(header.trim(), decoy_tag))
            .collect();
        Fasta { records }
    }

    pub fn targets(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| !r.decoy)
    }
}
