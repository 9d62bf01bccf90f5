//! Falling-water demo.
//!
//! Compiles the preset rule script, loads the demo basin, and prints
//! each generation until the water settles.
//!
//! Run with: `cargo run --example falling_water`

use loam_automata::presets::{DEMO_MAP, FALLING_WATER_RULES, falling_water_alphabet};
use loam_automata::{Grid, RuleSet};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Falling Water ===\n");

    let alphabet = falling_water_alphabet();
    let rules = RuleSet::compile(&alphabet, FALLING_WATER_RULES)?;
    println!("Compiled {} rules\n", rules.len());

    let mut grid = Grid::from_text(&alphabet, DEMO_MAP)?.with_boundary('#')?;

    for generation in 0..10 {
        println!("generation {generation}:");
        print_grid(&grid);
        println!();

        let before = grid.serialize();
        grid.step(&rules);
        if grid.serialize() == before {
            println!("settled after {generation} generations");
            break;
        }
    }

    Ok(())
}

fn print_grid(grid: &Grid) {
    let mut row = String::new();
    let mut last_y = 0;
    grid.for_each_cell(|_, y, tile| {
        if y != last_y {
            println!("  {row}");
            row.clear();
            last_y = y;
        }
        row.push(tile.display());
    });
    println!("  {row}");
}
