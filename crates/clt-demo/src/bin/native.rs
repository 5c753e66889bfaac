#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();
    clt_demo::native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build starts through the library's start() function.
}
