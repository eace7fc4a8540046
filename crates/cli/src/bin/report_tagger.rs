use anyhow::Result;

fn main() -> Result<()> {
    report_tagger_cli::main_entry()
}
