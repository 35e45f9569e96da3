//! Render every fixture under `tests/fixtures` in every dialect, for eyeballing.
use std::path::PathBuf;

use guardgen::{DialectKind, RenderOptions, TypeGraph, generate_exports, render};

fn main() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures");
    let mut paths = std::fs::read_dir(&dir)
        .expect("fixtures directory")
        .map(|entry| entry.expect("fixture entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    for path in paths {
        let source = std::fs::read_to_string(&path).expect("readable fixture");
        let graph = match TypeGraph::from_json_str(&source) {
            Ok(graph) => graph,
            Err(error) => {
                eprintln!("❌ {}: {error}", path.display());
                continue;
            }
        };
        let names = graph.exports.keys().cloned().collect::<Vec<_>>();
        for kind in DialectKind::ALL {
            println!("—— {} ({kind}) ——", path.display());
            let generated = match generate_exports(&graph, kind.writer(), &names) {
                Ok(x) => x,
                Err(error) => {
                    eprintln!("❌ failed: {error}");
                    continue;
                }
            };
            for diagnostic in &generated.diagnostics {
                eprintln!("⚠️  {diagnostic}");
            }
            match render(&generated.instructions, &RenderOptions::new("./types")) {
                Ok(text) => println!("{text}"),
                Err(error) => eprintln!("❌ failed: {error}"),
            }
        }
    }
}
