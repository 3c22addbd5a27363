use log::info;
use paramfile_rs::{ConfigTree, ParsedFunction, Pattern};

const DEFAULT_INPUT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/data/convection-box.prm");

fn main() -> paramfile_rs::Result<()> {
    pretty_env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let tree = ConfigTree::from_file(&path)?;
    info!("Loaded {}", path);

    tree.get_checked(&[], "Dimension", &Pattern::integer_range(2, 3))?;
    let dim: usize = tree.get(&[], "Dimension")?;
    let model = tree.get_selection(&["Geometry model"], "Model name", &["box", "sphere", "chunk"])?;
    let x_extent = tree.get_real(&["Geometry model", "Box"], "X extent")?;
    let y_extent = tree.get_real(&["Geometry model", "Box"], "Y extent")?;
    println!("{}d {} of {} x {} m", dim, model, x_extent, y_extent);

    let indicators: Vec<String> = tree.get_list(
        &["Boundary velocity model"],
        "Prescribed velocity boundary indicators",
    )?;
    println!("Prescribed boundaries: {}", indicators.join(", "));

    let velocity =
        ParsedFunction::from_section(&tree, &["Boundary velocity model", "Function"], dim, dim)?;
    println!("u(x, y, t) = {}", velocity.function());

    for step in 0..=4 {
        let y = y_extent * step as f64 / 4.0;
        let u = velocity.evaluate_at(&[0.0, y], 0.0)?;
        println!("  left boundary, y = {:>8.0}: u = {:?}", y, u);
    }

    let temperature =
        ParsedFunction::from_section(&tree, &["Initial temperature model", "Function"], dim, 1)?;
    let centre = temperature.value_at(&[x_extent / 2.0, y_extent / 2.0], 0.0, 0)?;
    println!("Initial temperature at the centre: {:.1} K", centre);

    println!("\nNormalized input:\n{}", tree);
    Ok(())
}
