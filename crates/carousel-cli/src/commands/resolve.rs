use anyhow::Result;

use carousel_core::geometry::{nearest_index, resolve_with_threshold, visibility_ratio};
use carousel_core::CarouselConfig;

pub fn run(config: &CarouselConfig, offset: f64, items: usize) -> Result<()> {
    config.validate()?;
    let viewport = config.viewport();

    let active = resolve_with_threshold(offset, viewport, items, config.visibility_threshold);
    let live = nearest_index(offset, viewport, items);

    println!(
        "offset {} | item width {} | container width {} | threshold {}",
        offset, viewport.item_width, viewport.container_width, config.visibility_threshold
    );
    match active {
        Some(index) => println!("active item: {}", index),
        None => println!("active item: none"),
    }
    match live {
        Some(index) => println!("rounding estimate: {}", index),
        None => println!("rounding estimate: none"),
    }

    if viewport.is_valid() {
        let clamped = viewport.clamp_offset(offset, items);
        for index in 0..items {
            let ratio = visibility_ratio(
                viewport.offset_of(index),
                viewport.item_width,
                clamped,
                viewport.container_width,
            );
            if ratio > 0.0 {
                println!("  item {:>3}: {:>5.1}% visible", index, ratio * 100.0);
            }
        }
    }

    Ok(())
}
