use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata backs `notify-relay --version` and the health report
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata for notify-relay");
}
