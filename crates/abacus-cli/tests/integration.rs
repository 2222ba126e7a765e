use abacus_cli::input::Input;
use abacus_cli::Runner;
use std::path::Path;

const FASTA: &str = r#">rev_sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
KEDITPEP
>sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTFISLLLLFSSAYSRGVFRRPEPTIDEK
>sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog OS=Homo sapiens OX=9606 GN=VAT1 PE=1 SV=2
MSDEREVAEAATGEDASSPPPKTEAASDPQHPAASEGAAAAAASPPLLRCLVLTGFGGYDLQSRPAAPPAPGPGQLTLR
"#;

const PROTEINS: &str = r#"{"groups": [
  {"group_number": 2, "proteins": [{
    "protein_name": "sp|Q99536|VAT1_HUMAN", "length": 79, "probability": 0.95,
    "peptide_ions": [{"sequence": "LQSRPAAPPAPGPGQLTLR", "charge": 3, "probability": 0.9}]
  }]},
  {"group_number": 1, "proteins": [{
    "protein_name": "sp|P02769|ALBU_BOVIN", "length": 32, "probability": 1.0,
    "indistinguishable_proteins": ["sp|P02769-2|ALBU_BOVIN"],
    "peptide_ions": [{"sequence": "PEPTIDEK", "charge": 2, "probability": 0.99}]
  }]},
  {"group_number": 3, "proteins": [{
    "protein_name": "rev_sp|P02769|ALBU_BOVIN", "probability": 0.1,
    "peptide_ions": [{"sequence": "KEDITPEP", "charge": 2, "probability": 0.6}]
  }]}
]}"#;

const PSMS: &str = r#"[
  {"peptide": "PEPTIDEK", "protein": "sp|P02769|ALBU_BOVIN", "probability": 0.99},
  {"peptide": "LQSRPAAPPAPGPGQLTLR", "protein": "sp|Q99536|VAT1_HUMAN", "probability": 0.9},
  {"peptide": "PEPTIDEK", "protein": "sp|P02769|ALBU_BOVIN", "probability": 0.8},
  {"peptide": "KEDITPEP", "protein": "rev_sp|P02769|ALBU_BOVIN", "probability": 0.05}
]"#;

const GENE: &str = r#"{
  "proteins": [{
    "original_header": "sp|P02769|ALBU_BOVIN Serum albumin",
    "part_header": "sp|P02769|ALBU_BOVIN",
    "protein_id": "P02769",
    "total_spc": 4, "unique_spc": 3, "razor_spc": 3,
    "total_intensity": 2000.0, "unique_intensity": 1500.0, "razor_intensity": 1500.4,
    "total_peptides": ["PEPTIDEK", "AAAK"],
    "razor_peptides": ["PEPTIDEK"]
  }],
  "peptides": [{
    "sequence": "PEPTIDEK", "protein": "sp|P02769|ALBU_BOVIN", "protein_id": "P02769",
    "protein_description": "Serum albumin", "gene_name": "ALB",
    "spc": 3, "intensity": 1500.5, "probability": 0.99, "charge_states": [2],
    "modifications": [{"mass_diff": 15.9949, "kind": "assigned"}]
  }]
}"#;

const CONTROL: &str = r#"{
  "proteins": [
    {
      "original_header": "rev_sp|P02769|ALBU_BOVIN",
      "part_header": "rev_sp|P02769|ALBU_BOVIN",
      "protein_id": "P02769",
      "total_spc": 9, "unique_spc": 9, "razor_spc": 9
    },
    {
      "original_header": "sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein",
      "part_header": "sp|Q99536|VAT1_HUMAN",
      "protein_id": "Q99536",
      "total_spc": 2, "unique_spc": 2, "razor_spc": 2,
      "razor_intensity": 800.0,
      "total_peptides": ["LQSRPAAPPAPGPGQLTLR"]
    }
  ],
  "peptides": [{
    "sequence": "LQSRPAAPPAPGPGQLTLR", "protein": "sp|Q99536|VAT1_HUMAN", "protein_id": "Q99536",
    "spc": 2, "intensity": 800.0, "probability": 0.9, "charge_states": [3, 4]
  }]
}"#;

fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[test]
fn combined_reports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path();
    write(&base.join("db.fasta"), FASTA)?;
    write(&base.join("combined.prot.json"), PROTEINS)?;
    write(&base.join("combined.pep.json"), PSMS)?;
    write(&base.join("runs/GENE_cond_rep1/evidence.json"), GENE)?;
    write(&base.join("runs/Control_rep1/evidence.json"), CONTROL)?;
    write(&base.join("runs/Control_rep1/annotation.txt"), "126 ctrl\n")?;
    write(
        &base.join("params.json"),
        r#"{
            "experiments": ["runs/GENE_cond_rep1", "runs/Control_rep1"],
            "fasta": "db.fasta",
            "protein": true,
            "peptide": true,
            "reprint": true,
            "work_directory": "work",
            "output_directory": "out"
        }"#,
    )?;

    let input = Input::load(base.join("params.json"))?;
    let settings = Runner::new(input.build_in(base)?)?.run()?;
    assert_eq!(settings.output_paths.len(), 10);

    for file in [
        "combined_protein.tsv",
        "combined_peptide.tsv",
        "reprint.spc.tsv",
        "reprint.int.tsv",
    ] {
        assert!(base.join("work").join(file).exists());
        assert!(base.join("out").join(file).exists());
    }
    let summary = std::fs::read_to_string(base.join("out/abacus.json"))?;
    assert_eq!(summary, std::fs::read_to_string(base.join("work/abacus.json"))?);
    assert!(summary.contains(&base.join("out/abacus.json").display().to_string()));

    let proteins = std::fs::read_to_string(base.join("out/combined_protein.tsv"))?;
    let lines = proteins.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(
        "Control_rep1 Spectral Count\tGENE_cond_rep1 Spectral Count\t\
         Control_rep1 Intensity\tGENE_cond_rep1 Intensity\tIndistinguishable Proteins"
    ));
    assert_eq!(
        lines[1],
        "sp|P02769|ALBU_BOVIN\tP02769\tALBU_BOVIN\tALB\t32\tBos taurus\t\
         1:Experimental evidence at protein level\tSerum albumin\t1.0000\t0.9900\t\
         2\t3\t3\t4\t0\t3\t     0\t  1500\tsp|P02769-2|ALBU_BOVIN"
    );
    assert!(lines[2].starts_with("sp|Q99536|VAT1_HUMAN\tQ99536\tVAT1_HUMAN\tVAT1\t79\t"));
    assert!(lines[2].ends_with("\t1\t2\t2\t2\t2\t0\t   800\t     0\t"));

    let peptides = std::fs::read_to_string(base.join("out/combined_peptide.tsv"))?;
    let lines = peptides.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "LQSRPAAPPAPGPGQLTLR\t3,4\t0.900000\t\t\tsp|Q99536|VAT1_HUMAN\tQ99536\t\t\
         2\t800.0000\t0\t0.0000"
    );
    assert_eq!(
        lines[2],
        "PEPTIDEK\t2\t0.990000\t15.994900\tALB\tsp|P02769|ALBU_BOVIN\tP02769\tSerum albumin\t\
         0\t0.0000\t3\t1500.5000"
    );

    let reprint = std::fs::read_to_string(base.join("out/reprint.spc.tsv"))?;
    let lines = reprint.lines().collect::<Vec<_>>();
    assert_eq!(lines[1], "na\tna\tna\tCONTROL\tGENE_cond");
    assert_eq!(lines[2], "P02769\tALB\t32\t0\t3");
    Ok(())
}

#[test]
fn missing_pooled_file_is_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path();
    write(&base.join("runs/A/evidence.json"), "{}")?;
    write(
        &base.join("params.json"),
        r#"{"experiments": ["runs/A"], "peptide": true}"#,
    )?;

    let input = Input::load(base.join("params.json"))?;
    assert!(Runner::new(input.build_in(base)?)?.run().is_err());
    assert!(!base.join("combined_peptide.tsv").exists());
    Ok(())
}
