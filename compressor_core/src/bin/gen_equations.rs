//! Generate EQUATIONS.md from the equation registry.
//!
//! This binary generates the equations reference documentation from the
//! centralized equation registry in compressor_core.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-equations
//! ```
//!
//! The generated file is written to `compressor_core/src/equations/EQUATIONS.md`.

use std::fs;
use std::path::Path;

use compressor_core::equations::{generate_equations_markdown, ALL_EQUATIONS};

fn main() {
    println!("Generating EQUATIONS.md for {} equations...", ALL_EQUATIONS.len());

    let markdown = generate_equations_markdown();

    // Relative to workspace root
    let output_path = Path::new("compressor_core/src/equations/EQUATIONS.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            std::process::exit(1);
        }
    }
}
