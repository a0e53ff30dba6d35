//! Generates the codecs for `schema.json` into `OUT_DIR`.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use wiregen_codegen::{Generator, GeneratorConfig, OutputGrouping};
use wiregen_schema::Schema;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=schema.json");

    let schema = Schema::from_json(&fs::read_to_string("schema.json")?)?;
    let names: Vec<&str> = schema.types.iter().map(|d| d.name.as_str()).collect();
    let generator = Generator::new(GeneratorConfig {
        grouping: OutputGrouping::PerSource,
        ..GeneratorConfig::default()
    });
    let code = generator.run(&schema, &names)?;

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    for unit in code.iter() {
        fs::write(out_dir.join(&unit.file_name), &unit.contents)?;
    }
    Ok(())
}
