use water_surface::uniforms::{FieldLayout, FrameUniforms, FRAME_BLOCK_SIZE};
use water_surface::{PackingConvention, WaveLayout};

fn print_fields(fields: &[FieldLayout]) {
    println!("{:<14} {:<9} {:>6} {:>6} {:>6} {:>6}", "field", "kind", "offset", "stride", "count", "size");
    for field in fields {
        println!(
            "{:<14} {:<9} {:>6} {:>6} {:>6} {:>6}",
            field.name,
            format!("{:?}", field.kind),
            field.offset,
            field.stride,
            field.count,
            field.size()
        );
    }
}

fn main() {
    // Print every uniform block layout so shader declarations can be checked by hand
    println!("Frame block ({} bytes)", FRAME_BLOCK_SIZE);
    println!("{}", "=".repeat(50));
    print_fields(&FrameUniforms::fields());

    for convention in [
        PackingConvention::Inline,
        PackingConvention::Interleaved,
        PackingConvention::Strided,
    ] {
        for wave_count in 1..=3 {
            let Ok(layout) = WaveLayout::new(convention, wave_count) else {
                continue;
            };
            println!();
            println!(
                "Wave block {:?} x{} ({} bytes)",
                convention,
                wave_count,
                layout.declared_size()
            );
            println!("{}", "=".repeat(50));
            print_fields(&layout.fields());
        }
    }
}
