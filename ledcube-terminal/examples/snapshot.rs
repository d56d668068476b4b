/// Example: Render one frame of an STL file to a PNG
///
/// Usage: cargo run --example snapshot -- [path/to/file.stl] [seconds] [out.png]
use anyhow::Context;
use ledcube_core::Config;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = Config {
        model: args.get(1).map(PathBuf::from),
        ..Config::default()
    };
    let elapsed: f64 = match args.get(2) {
        Some(s) => s.parse().context("seconds must be a number")?,
        None => 0.0,
    };
    let out = args.get(3).map(String::as_str).unwrap_or("snapshot.png");

    if config.model.is_none() {
        eprintln!("Usage: {} <stl-file> [seconds] [out.png]", args[0]);
        eprintln!("\nNo STL file provided, using default cube...");
    }

    let model = config.load_model()?;
    println!("Loaded {} triangles", model.len());

    let renderer = config.renderer(model)?;
    let visible = renderer.visible_triangles(&renderer.camera_space(elapsed));
    println!("{} triangles visible at t = {}s", visible.len(), elapsed);

    renderer
        .frame(elapsed)
        .save(out)
        .with_context(|| format!("writing {}", out))?;
    println!("Wrote {}", out);
    Ok(())
}
