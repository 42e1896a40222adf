/// Display version information
pub fn execute() {
    println!("concord {}", env!("CARGO_PKG_VERSION"));
    println!("M-of-N multi-owner wallet");
}
