use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    // the default input lives under data/
    let data_dir = Path::new(&manifest_dir).join("data");
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).expect("Failed to create data directory");
    }

    let input_file = data_dir.join("B3Acoes.xlsx");
    if !input_file.exists() {
        println!("cargo:warning=data/B3Acoes.xlsx not found. The default run will have no symbols to query.");
        println!("cargo:warning=Run 'cargo run --bin create_sample_input' to generate a starter file.");
    } else {
        println!("cargo:rerun-if-changed=data/B3Acoes.xlsx");
    }
}
